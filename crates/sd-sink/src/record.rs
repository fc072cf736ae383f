//! Plain data row types handed to and read back from sinks.

use sd_core::{GeoPoint, Timestamp, VehicleId, VehicleKind};
use serde::Serialize;

/// The externalised state of one vehicle at one tick.
///
/// Built fresh after a step completes and dropped once the sink returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkRecord {
    pub id:        VehicleId,
    pub kind:      VehicleKind,
    pub timestamp: Timestamp,
    pub longitude: f64,
    pub latitude:  f64,
    /// Degrees in `[0, 360)`.
    pub heading:   f64,
}

impl SinkRecord {
    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// The form body sent by the remote sink.
    pub fn form_fields(&self) -> FormFields<'_> {
        FormFields {
            uid:       self.id.to_string(),
            kind:      self.kind.as_str(),
            timestamp: self.timestamp.as_secs_f64(),
            longitude: self.longitude,
            lattitude: self.latitude,
            heading:   self.heading,
        }
    }
}

/// Form-encoded ingest payload.  Key names are the ingest endpoint's wire
/// contract, including the `lattitude` spelling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormFields<'a> {
    pub uid:       String,
    #[serde(rename = "type")]
    pub kind:      &'a str,
    pub timestamp: f64,
    pub longitude: f64,
    pub lattitude: f64,
    pub heading:   f64,
}

/// One row of the `traffic` table as read back by the admin commands.
///
/// Kinds are kept as text: the ingest endpoint writes to the same table and
/// does not restrict them to [`VehicleKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficRow {
    pub uid:       String,
    #[serde(rename = "type")]
    pub kind:      String,
    pub timestamp: f64,
    pub longitude: f64,
    pub lattitude: f64,
    pub heading:   f64,
}

impl From<&SinkRecord> for TrafficRow {
    fn from(r: &SinkRecord) -> Self {
        Self {
            uid:       r.id.to_string(),
            kind:      r.kind.as_str().to_owned(),
            timestamp: r.timestamp.as_secs_f64(),
            longitude: r.longitude,
            lattitude: r.latitude,
            heading:   r.heading,
        }
    }
}
