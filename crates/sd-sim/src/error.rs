use sd_core::{CoreError, VehicleId};
use sd_sink::SinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("sink failed for vehicle {vehicle}: {source}")]
    Sink {
        vehicle: VehicleId,
        #[source]
        source:  SinkError,
    },

    #[error("vehicle task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type SimResult<T> = Result<T, SimError>;
