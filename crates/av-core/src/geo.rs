//! Geographic coordinate type and great-circle geodesy.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  The motion loop integrates
//! thousands of sub-metre steps per drive and the routing layer compares
//! distances at millimetre tolerances, which puts single precision out of
//! reach; with networks of a few dozen nodes there is no memory pressure
//! pushing the other way.
//!
//! All functions are pure and total over finite inputs: coincident
//! coordinates produce distance 0 and a conventional bearing of 0 rather
//! than an error.

/// Mean Earth radius in kilometres (spherical model).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic coordinate in degrees.
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

    /// Haversine great-circle distance in kilometres.
    ///
    /// Symmetric (`a.distance_km(b) == b.distance_km(a)`) and zero exactly
    /// when both coordinates coincide.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Initial bearing from `self` toward `other` along the great circle,
    /// in degrees `[0, 360)` clockwise from true north.
    ///
    /// For coincident points the direction is conventionally undefined;
    /// this returns `0.0` rather than failing.
    pub fn initial_bearing_deg(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// Forward geodesic projection: the point reached by travelling
    /// `distance_km` from `self` on the given initial bearing.
    ///
    /// Inverse-consistent with [`distance_km`](Self::distance_km) and
    /// [`initial_bearing_deg`](Self::initial_bearing_deg) up to
    /// floating-point tolerance.
    pub fn destination_point(self, bearing_deg: f64, distance_km: f64) -> GeoPoint {
        let delta = distance_km / EARTH_RADIUS_KM; // angular distance
        let theta = bearing_deg.to_radians();

        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos())
                .atan2(delta.cos() - lat1.sin() * lat2.sin());

        // Normalize longitude to [-180, 180).
        let lon2_deg = (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
        GeoPoint::new(lat2.to_degrees(), lon2_deg)
    }

    /// `true` if `self` lies within `tolerance_km` of the segment from `a`
    /// to `b`.
    ///
    /// Two-stage test: a triangle-inequality rejection throws out points
    /// whose overshoot past either endpoint exceeds the tolerance, then the
    /// cross-track (perpendicular) distance decides.  Points near the
    /// infinite great circle but past a segment end by more than the
    /// tolerance are rejected by the first stage.
    pub fn is_on_segment(self, a: GeoPoint, b: GeoPoint, tolerance_km: f64) -> bool {
        let seg_km = a.distance_km(b);
        let d_a = a.distance_km(self);
        let d_b = b.distance_km(self);

        if d_a > seg_km + tolerance_km || d_b > seg_km + tolerance_km {
            return false;
        }

        // Degenerate (near-zero-length) segment: plain endpoint proximity.
        if seg_km <= tolerance_km {
            return d_a <= tolerance_km;
        }

        let theta_ab = a.initial_bearing_deg(b).to_radians();
        let theta_ap = a.initial_bearing_deg(self).to_radians();
        let cross_track_km =
            ((d_a / EARTH_RADIUS_KM).sin() * (theta_ap - theta_ab).sin()).asin() * EARTH_RADIUS_KM;

        cross_track_km.abs() <= tolerance_km
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
