//! Geographic coordinate type and geodesic navigation on the WGS-84 ellipsoid.
//!
//! Distances and destination points solve the inverse and direct geodesic
//! problems with Karney's algorithms (`geographiclib-rs`), accurate to a few
//! nanometres everywhere, nearly antipodal pairs included.

use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};

use crate::{CoreError, CoreResult};

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A WGS-84 geographic coordinate in degrees.
///
/// Valid points have `lat ∈ [-90, 90]` and `lon ∈ (-180, 180]`.  Use
/// [`GeoPoint::try_new`] at trust boundaries (config files, CLI input);
/// [`GeoPoint::new`] does not check.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Construct a point, rejecting out-of-range or non-finite coordinates.
    pub fn try_new(lat: f64, lon: f64) -> CoreResult<Self> {
        let p = Self { lat, lon };
        p.validate()?;
        Ok(p)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && self.lon > -180.0
            && self.lon <= 180.0
    }

    pub fn validate(self) -> CoreResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoreError::InvalidCoordinate { lat: self.lat, lon: self.lon })
        }
    }

    /// Ellipsoidal distance to `other` in metres.  See [`distance_m`].
    #[inline]
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        distance_m(self, other)
    }

    /// Point reached by travelling `distance_m` along `bearing_deg`.
    /// See [`destination`].
    #[inline]
    pub fn destination(self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        destination(self, bearing_deg, distance_m)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Normalisation ─────────────────────────────────────────────────────────────

/// Wrap any bearing into `[0, 360)`.
#[inline]
pub fn normalize_bearing(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0.
    if h >= 360.0 { 0.0 } else { h }
}

/// Wrap any longitude into `(-180, 180]`.
#[inline]
pub fn normalize_lon(deg: f64) -> f64 {
    let x = deg.rem_euclid(360.0);
    if x > 180.0 { x - 360.0 } else { x }
}

// ── Geodesics ──────────────────────────────────────────────────────────────────

/// Geodesic distance in metres between `a` and `b` on the WGS-84 ellipsoid.
///
/// Symmetric, and exactly `0.0` when `a == b`.  Converges for every pair of
/// points, antipodal ones included.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }
    Geodesic::wgs84().inverse(a.lat, a.lon, b.lat, b.lon)
}

/// The point reached by travelling `distance_m` metres from `origin` along the
/// initial bearing `bearing_deg` (any real value; wrapped mod 360).
///
/// The resulting longitude is normalised into `(-180, 180]`.  A zero distance
/// returns `origin` unchanged.
pub fn destination(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    if distance_m == 0.0 {
        return origin;
    }
    let (lat, lon): (f64, f64) = Geodesic::wgs84().direct(
        origin.lat,
        origin.lon,
        normalize_bearing(bearing_deg),
        distance_m,
    );
    GeoPoint { lat, lon: normalize_lon(lon) }
}

// ── Bounding box ──────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon box, e.g. for map viewports around the home point.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub lower_left:  GeoPoint,
    pub upper_right: GeoPoint,
}

impl BoundingBox {
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.lower_left.lat..=self.upper_right.lat).contains(&p.lat)
            && (self.lower_left.lon..=self.upper_right.lon).contains(&p.lon)
    }
}

/// Box spanned by the points `radius_m` due north, east, south and west of
/// `center`.
pub fn bounding_box(center: GeoPoint, radius_m: f64) -> BoundingBox {
    let north = destination(center, 0.0, radius_m);
    let east  = destination(center, 90.0, radius_m);
    let south = destination(center, 180.0, radius_m);
    let west  = destination(center, 270.0, radius_m);
    BoundingBox {
        lower_left:  GeoPoint::new(south.lat, west.lon),
        upper_right: GeoPoint::new(north.lat, east.lon),
    }
}

// ── Catchment ─────────────────────────────────────────────────────────────────

/// A circle around a reference point; states ending inside it are persisted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Catchment {
    pub center:   GeoPoint,
    pub radius_m: f64,
}

impl Catchment {
    pub fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    /// Strictly inside: a point exactly on the rim is outside.
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        distance_m(self.center, p) < self.radius_m
    }
}
