//! Geodetic building blocks for velocity-grid realignment.
//!
//! Three small, pure pieces composed per grid cell:
//!
//! - [`Ellipsoid`]: geodetic (lat, lon, h) to Earth-centered Cartesian (X, Y, Z)
//! - [`local_frame`]: local North/East/Up vectors to and from the global frame
//! - [`HelmertRates`]: 7-parameter similarity transform applied to velocities

pub mod ellipsoid;
pub mod error;
pub mod helmert;
pub mod local_frame;

pub use ellipsoid::{Ellipsoid, ReferenceEllipsoid};
pub use error::{GeodeticError, Result};
pub use helmert::{mas_to_rad, HelmertParameters, HelmertRates};
pub use local_frame::{
    rotation_matrix, to_cartesian, to_local, to_local_solved, InverseMethod,
};

/// Cartesian (X, Y, Z) vector in meters or meters/year.
pub type CartesianVector = nalgebra::Vector3<f64>;

/// Local topocentric (North, East, Up) vector.
pub type NeuVector = nalgebra::Vector3<f64>;
