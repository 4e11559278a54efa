//! Local topocentric (North, East, Up) frame.
//!
//! A NEU vector at geodetic position (φ, λ) maps to the Earth-centered frame
//! through the rotation
//!
//! ```text
//!     | -sinφ cosλ   -sinλ   cosφ cosλ |
//! R = | -sinφ sinλ    cosλ   cosφ sinλ |
//!     |  cosφ         0      sinφ      |
//! ```
//!
//! `R` is orthogonal, so the inverse is `Rᵀ`. The solve-based inverse is kept
//! alongside the closed form and is what the transpose is checked against.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::error::{GeodeticError, Result};
use crate::{CartesianVector, NeuVector};

/// How XYZ vectors are taken back into the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InverseMethod {
    /// Closed-form `Rᵀ · v`.
    #[default]
    Transpose,
    /// LU solve of `R · x = v`.
    Solve,
}

impl InverseMethod {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "transpose" => Some(Self::Transpose),
            "solve" => Some(Self::Solve),
            _ => None,
        }
    }

    /// Apply this inverse to `xyz` at (lat, lon) in radians.
    pub fn to_local(&self, xyz: &CartesianVector, lat: f64, lon: f64) -> Result<NeuVector> {
        match self {
            Self::Transpose => to_local(xyz, lat, lon),
            Self::Solve => to_local_solved(xyz, lat, lon),
        }
    }
}

impl std::fmt::Display for InverseMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transpose => write!(f, "transpose"),
            Self::Solve => write!(f, "solve"),
        }
    }
}

/// Rotation matrix from NEU to XYZ at (lat, lon) in radians.
///
/// The columns are the North, East and Up unit vectors.
#[rustfmt::skip]
pub fn rotation_matrix(lat: f64, lon: f64) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    Matrix3::new(
        -sin_lat * cos_lon, -sin_lon, cos_lat * cos_lon,
        -sin_lat * sin_lon,  cos_lon, cos_lat * sin_lon,
         cos_lat,            0.0,     sin_lat,
    )
}

/// Convert a NEU vector to the Cartesian frame at (lat, lon) in radians.
pub fn to_cartesian(neu: &NeuVector, lat: f64, lon: f64) -> CartesianVector {
    rotation_matrix(lat, lon) * neu
}

/// Convert a Cartesian vector to NEU at (lat, lon) using the closed-form transpose.
pub fn to_local(xyz: &CartesianVector, lat: f64, lon: f64) -> Result<NeuVector> {
    check_inputs(xyz, lat, lon)?;
    Ok(rotation_matrix(lat, lon).transpose() * xyz)
}

/// Convert a Cartesian vector to NEU at (lat, lon) by solving `R · x = xyz`.
pub fn to_local_solved(xyz: &CartesianVector, lat: f64, lon: f64) -> Result<NeuVector> {
    check_inputs(xyz, lat, lon)?;
    rotation_matrix(lat, lon)
        .lu()
        .solve(xyz)
        .ok_or(GeodeticError::SingularMatrix { lat, lon })
}

fn check_inputs(xyz: &CartesianVector, lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(GeodeticError::NonFinite("local frame position"));
    }
    if xyz.iter().any(|v| !v.is_finite()) {
        return Err(GeodeticError::NonFinite("cartesian vector"));
    }
    if lat.abs() >= FRAC_PI_2 {
        return Err(GeodeticError::PoleCell(lat));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &NeuVector, b: &NeuVector, tol: f64) {
        for i in 0..3 {
            let scale = a[i].abs().max(b[i].abs()).max(1.0);
            assert!(
                (a[i] - b[i]).abs() <= tol * scale,
                "component {}: {} vs {}",
                i,
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn test_roundtrip_over_latitudes() {
        let neu = NeuVector::new(1.25, -3.5, 0.75);
        for lat_deg in [-89.0, -60.0, -12.5, 0.0, 33.3, 60.0, 89.0] {
            for lon_deg in [-180.0, -45.0, 0.0, 10.0, 123.4, 359.0] {
                let (lat, lon) = (f64::to_radians(lat_deg), f64::to_radians(lon_deg));
                let xyz = to_cartesian(&neu, lat, lon);
                let back = to_local(&xyz, lat, lon).unwrap();
                assert_close(&back, &neu, 1e-9);
                let solved = to_local_solved(&xyz, lat, lon).unwrap();
                assert_close(&solved, &neu, 1e-9);
            }
        }
    }

    #[test]
    fn test_rotation_is_orthogonal() {
        for lat_deg in [-75.0, -30.0, 0.0, 45.0, 57.8, 80.0] {
            for lon_deg in [-120.0, 0.0, 7.9, 15.3, 170.0] {
                let r = rotation_matrix(f64::to_radians(lat_deg), f64::to_radians(lon_deg));
                let identity = r.transpose() * r;
                assert!(
                    (identity - Matrix3::identity()).abs().max() < 1e-12,
                    "RᵀR deviates from I at ({}, {})",
                    lat_deg,
                    lon_deg
                );
                assert!((r.determinant().abs() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rotation_columns_are_neu_axes() {
        let (lat, lon) = (f64::to_radians(60.0), f64::to_radians(10.0));
        let r = rotation_matrix(lat, lon);
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        let up = r.column(2);
        assert!((up[0] - cos_lat * cos_lon).abs() < 1e-15);
        assert!((up[1] - cos_lat * sin_lon).abs() < 1e-15);
        assert!((up[2] - sin_lat).abs() < 1e-15);
        // east has no Z component
        assert_eq!(r[(2, 1)], 0.0);
        assert!((r[(0, 1)] + sin_lon).abs() < 1e-15);
        assert!((r[(2, 0)] - cos_lat).abs() < 1e-15);
    }

    #[test]
    fn test_transpose_matches_solve() {
        let xyz = CartesianVector::new(-0.4, 2.1, 1.3);
        for lat_deg in [54.5, 56.0, 57.8, 71.0] {
            for lon_deg in [4.0, 10.0, 15.3, 31.0] {
                let (lat, lon) = (f64::to_radians(lat_deg), f64::to_radians(lon_deg));
                let a = InverseMethod::Transpose.to_local(&xyz, lat, lon).unwrap();
                let b = InverseMethod::Solve.to_local(&xyz, lat, lon).unwrap();
                assert_close(&a, &b, 1e-12);
            }
        }
    }

    #[test]
    fn test_up_points_along_position_at_equator() {
        let xyz = to_cartesian(&NeuVector::new(0.0, 0.0, 1.0), 0.0, 0.0);
        assert!((xyz.x - 1.0).abs() < 1e-15);
        let east = to_cartesian(&NeuVector::new(0.0, 1.0, 0.0), 0.0, 0.0);
        assert!((east.y - 1.0).abs() < 1e-15);
        let north = to_cartesian(&NeuVector::new(1.0, 0.0, 0.0), 0.0, 0.0);
        assert!((north.z - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_pole_rejected() {
        let xyz = CartesianVector::new(1.0, 0.0, 0.0);
        assert_eq!(
            to_local(&xyz, FRAC_PI_2, 0.0),
            Err(GeodeticError::PoleCell(FRAC_PI_2))
        );
        assert!(matches!(
            to_local_solved(&xyz, -FRAC_PI_2, 0.3),
            Err(GeodeticError::PoleCell(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let xyz = CartesianVector::new(f64::NAN, 0.0, 0.0);
        assert!(matches!(to_local(&xyz, 0.5, 0.5), Err(GeodeticError::NonFinite(_))));
    }

    #[test]
    fn test_inverse_method_parse() {
        assert_eq!(InverseMethod::parse("SOLVE"), Some(InverseMethod::Solve));
        assert_eq!(InverseMethod::parse("transpose"), Some(InverseMethod::Transpose));
        assert_eq!(InverseMethod::parse("qr"), None);
    }
}
