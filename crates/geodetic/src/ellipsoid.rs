//! Reference ellipsoids and geodetic to Cartesian conversion.
//!
//! Positions are converted with the standard closed form using the prime
//! vertical radius of curvature:
//!
//! ```text
//! N = a / sqrt(1 - e² sin²φ)
//! X = (N + h) cosφ cosλ
//! Y = (N + h) cosφ sinλ
//! Z = (N (1 - e²) + h) sinφ
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GeodeticError, Result};
use crate::CartesianVector;

/// An oblate reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    /// GRS80, the ellipsoid of ETRS89 and ITRF realizations.
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// WGS84.
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// Square of the first eccentricity.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Semi-minor axis (meters).
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// Prime vertical radius of curvature at geodetic latitude `lat` (radians).
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        let sin_lat = lat.sin();
        self.a / (1.0 - self.e2() * sin_lat * sin_lat).sqrt()
    }

    /// Convert geodetic coordinates to Earth-centered Cartesian coordinates.
    ///
    /// # Arguments
    /// * `lat_deg` - Geodetic latitude (degrees, within [-90, 90])
    /// * `lon_deg` - Longitude (degrees, any value)
    /// * `h` - Ellipsoidal height (meters)
    ///
    /// Returns (X, Y, Z) in meters.
    pub fn geodetic_to_cartesian(&self, lat_deg: f64, lon_deg: f64, h: f64) -> Result<CartesianVector> {
        if !lat_deg.is_finite() || !lon_deg.is_finite() || !h.is_finite() {
            return Err(GeodeticError::NonFinite("geodetic position"));
        }
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(GeodeticError::InvalidLatitude(lat_deg));
        }

        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let n = self.prime_vertical_radius(lat);

        Ok(CartesianVector::new(
            (n + h) * cos_lat * cos_lon,
            (n + h) * cos_lat * sin_lon,
            (n * (1.0 - self.e2()) + h) * sin_lat,
        ))
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::GRS80
    }
}

/// Named ellipsoids selectable from configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceEllipsoid {
    #[default]
    Grs80,
    Wgs84,
}

impl ReferenceEllipsoid {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grs80" => Some(Self::Grs80),
            "wgs84" => Some(Self::Wgs84),
            _ => None,
        }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        match self {
            Self::Grs80 => Ellipsoid::GRS80,
            Self::Wgs84 => Ellipsoid::WGS84,
        }
    }
}

impl std::fmt::Display for ReferenceEllipsoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grs80 => write!(f, "grs80"),
            Self::Wgs84 => write!(f, "wgs84"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_prime_meridian() {
        let p = Ellipsoid::GRS80.geodetic_to_cartesian(0.0, 0.0, 0.0).unwrap();
        assert!((p.x - 6_378_137.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!(p.z.abs() < 1e-6);
    }

    #[test]
    fn test_north_pole_is_semi_minor_axis() {
        let e = Ellipsoid::GRS80;
        let p = e.geodetic_to_cartesian(90.0, 0.0, 0.0).unwrap();
        assert!(p.x.abs() < 1e-6);
        assert!((p.z - e.b()).abs() < 1e-6, "z = {}, b = {}", p.z, e.b());
        assert!((e.b() - 6_356_752.314_140).abs() < 1e-3);
    }

    #[test]
    fn test_grs80_at_60n_10e() {
        let p = Ellipsoid::GRS80.geodetic_to_cartesian(60.0, 10.0, 0.0).unwrap();
        assert!((p.x - 3_148_533.384_432).abs() < 1e-3, "x = {}", p.x);
        assert!((p.y - 555_171.385_337).abs() < 1e-3, "y = {}", p.y);
        assert!((p.z - 5_500_477.133_825).abs() < 1e-3, "z = {}", p.z);
    }

    #[test]
    fn test_height_moves_along_normal() {
        let e = Ellipsoid::GRS80;
        let p0 = e.geodetic_to_cartesian(45.0, 45.0, 0.0).unwrap();
        let p1 = e.geodetic_to_cartesian(45.0, 45.0, 100.0).unwrap();
        assert!(((p1 - p0).norm() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_latitude_rejected() {
        let e = Ellipsoid::GRS80;
        assert_eq!(
            e.geodetic_to_cartesian(90.5, 0.0, 0.0),
            Err(GeodeticError::InvalidLatitude(90.5))
        );
        assert!(matches!(
            e.geodetic_to_cartesian(f64::NAN, 0.0, 0.0),
            Err(GeodeticError::NonFinite(_))
        ));
    }

    #[test]
    fn test_reference_ellipsoid_parse() {
        assert_eq!(ReferenceEllipsoid::parse("GRS80"), Some(ReferenceEllipsoid::Grs80));
        assert_eq!(ReferenceEllipsoid::parse("wgs84"), Some(ReferenceEllipsoid::Wgs84));
        assert_eq!(ReferenceEllipsoid::parse("bessel"), None);
        assert_eq!(ReferenceEllipsoid::Wgs84.ellipsoid(), Ellipsoid::WGS84);
    }
}
