//! Closed enumerations shared across the simulator: vehicle kind and sink mode.
//!
//! Both parse from the strings used on the command line and in stored rows,
//! so an unknown value is rejected before any vehicle is created.

use std::str::FromStr;

use crate::CoreError;

// ── VehicleKind ───────────────────────────────────────────────────────────────

/// The category of a simulated vehicle.  Fixed at creation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VehicleKind {
    #[default]
    Bus,
    Taxi,
    Tram,
    Train,
}

impl VehicleKind {
    /// Every allowed kind, in declaration order.
    pub const ALL: [VehicleKind; 4] = [
        VehicleKind::Bus,
        VehicleKind::Taxi,
        VehicleKind::Tram,
        VehicleKind::Train,
    ];

    /// Label written to the `type` column / form field.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::Bus   => "bus",
            VehicleKind::Taxi  => "taxi",
            VehicleKind::Tram  => "tram",
            VehicleKind::Train => "train",
        }
    }
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind(s.to_owned()))
    }
}

// ── SinkMode ──────────────────────────────────────────────────────────────────

/// Where a pool's in-catchment states go.  Chosen once per pool.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SinkMode {
    /// States are traced but never persisted.
    None,
    /// Rows appended straight into the SQLite `traffic` table.
    #[default]
    Direct,
    /// Form POSTs to the ingest endpoint.
    Remote,
}

impl SinkMode {
    /// `true` if ticks in this mode are handed to a sink at all.
    #[inline]
    pub fn persists(self) -> bool {
        !matches!(self, SinkMode::None)
    }

    /// The selector spelling accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            SinkMode::None   => "none",
            SinkMode::Direct => "database",
            SinkMode::Remote => "api",
        }
    }
}

impl std::fmt::Display for SinkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none"                 => Ok(SinkMode::None),
            "database" | "direct"  => Ok(SinkMode::Direct),
            "api" | "remote"       => Ok(SinkMode::Remote),
            other                  => Err(CoreError::UnknownSinkMode(other.to_owned())),
        }
    }
}
