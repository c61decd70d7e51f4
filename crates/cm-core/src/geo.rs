//! Surface coordinates on the Mars sphere.
//!
//! `Coordinates` stores latitude/longitude in degrees as `f64`.  Mission
//! distances span hundreds of kilometres, where single precision would drift
//! by tens of metres and break the arrival tolerance.

/// Mean volumetric radius of Mars in kilometres.
pub const MARS_RADIUS_KM: f64 = 3_389.5;

/// Absolute latitude (degrees) beyond which a site counts as polar.
pub const POLAR_LATITUDE_DEG: f64 = 75.0;

/// A planetocentric surface coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: Coordinates) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).clamp(0.0, 1.0).sqrt());
        MARS_RADIUS_KM * c
    }

    /// The point reached by travelling `distance_km` along the initial
    /// `bearing_rad` (clockwise from north).
    pub fn destination(self, bearing_rad: f64, distance_km: f64) -> Coordinates {
        let delta = distance_km / MARS_RADIUS_KM;
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing_rad.cos()).asin();
        let lon2 = lon1
            + (bearing_rad.sin() * delta.sin() * lat1.cos())
                .atan2(delta.cos() - lat1.sin() * lat2.sin());

        // Normalise longitude into (-180, 180].
        let mut lon_deg = lon2.to_degrees();
        while lon_deg > 180.0 {
            lon_deg -= 360.0;
        }
        while lon_deg <= -180.0 {
            lon_deg += 360.0;
        }
        Coordinates { lat: lat2.to_degrees(), lon: lon_deg }
    }

    /// Initial bearing (radians, clockwise from north) from `self` to `other`.
    pub fn bearing_to(self, other: Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x)
    }

    /// Move up to `step_km` toward `target`; lands exactly on `target` when
    /// it is within reach.
    pub fn step_toward(self, target: Coordinates, step_km: f64) -> Coordinates {
        let remaining = self.distance_km(target);
        if remaining <= step_km {
            return target;
        }
        self.destination(self.bearing_to(target), step_km)
    }

    #[inline]
    pub fn is_polar(self) -> bool {
        self.lat.abs() >= POLAR_LATITUDE_DEG
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}
