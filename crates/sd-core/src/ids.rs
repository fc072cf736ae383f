//! Strongly typed vehicle identifier.
//!
//! Vehicles are identified by a random UUID so that rows written by several
//! simulator processes into the same store never collide.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Opaque unique identifier of one simulated vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleId(pub Uuid);

impl VehicleId {
    /// A fresh random (v4) identifier.
    pub fn new_v4() -> Self {
        VehicleId(Uuid::new_v4())
    }

    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hyphenated lowercase, the form stored in the `uid` column.
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for VehicleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(VehicleId)
    }
}
