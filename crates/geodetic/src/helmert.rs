//! Helmert similarity transform applied as a rate.
//!
//! Velocities are realigned between two reference frames with the linearized
//! 7-parameter transform:
//!
//! ```text
//! Vx' = Vx + Tx + D·X − Rz·Y + Ry·Z
//! Vy' = Vy + Ty + D·Y + Rz·X − Rx·Z
//! Vz' = Vz + Tz + D·Z − Ry·X + Rx·Y
//! ```
//!
//! Reference: Häkli et al., "The NKG2008 GPS campaign - final transformation
//! results and a new common Nordic reference frame".

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{GeodeticError, Result};
use crate::CartesianVector;

const MM_PER_M: f64 = 1000.0;

/// Milliarcseconds to radians.
pub fn mas_to_rad(mas: f64) -> f64 {
    mas * PI / (1000.0 * 3600.0 * 180.0)
}

/// Helmert rate parameters in their published units.
///
/// Rotations are given in milliarcseconds/year here and converted once by
/// [`HelmertParameters::rates`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelmertParameters {
    /// Translation rates (m/yr)
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    /// Scale rate (1/yr)
    pub d: f64,
    /// Rotation rates (mas/yr)
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl HelmertParameters {
    /// NKG_RF03 to ETRF2000 realignment (Häkli et al.).
    pub const NKG_RF03_TO_ETRF2000: HelmertParameters = HelmertParameters {
        tx: 0.00211,
        ty: 0.00056,
        tz: 0.00127,
        d: -0.465e-9,
        rx: 0.016120,
        ry: -0.03066,
        rz: 0.01435,
    };

    /// Check that all parameters are finite.
    pub fn validate(&self) -> Result<()> {
        let values = [self.tx, self.ty, self.tz, self.d, self.rx, self.ry, self.rz];
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(GeodeticError::NonFinite("helmert parameter"))
        }
    }

    /// Convert to rates with rotations in radians/year.
    pub fn rates(&self) -> Result<HelmertRates> {
        self.validate()?;
        Ok(HelmertRates {
            tx: self.tx,
            ty: self.ty,
            tz: self.tz,
            d: self.d,
            rx: mas_to_rad(self.rx),
            ry: mas_to_rad(self.ry),
            rz: mas_to_rad(self.rz),
        })
    }
}

impl Default for HelmertParameters {
    fn default() -> Self {
        Self::NKG_RF03_TO_ETRF2000
    }
}

/// Helmert rates ready for use: translations in m/yr, scale in 1/yr,
/// rotations in rad/yr.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmertRates {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub d: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl HelmertRates {
    /// The default NKG_RF03 to ETRF2000 rates.
    pub fn nkg_rf03_to_etrf2000() -> Self {
        let p = HelmertParameters::NKG_RF03_TO_ETRF2000;
        Self {
            tx: p.tx,
            ty: p.ty,
            tz: p.tz,
            d: p.d,
            rx: mas_to_rad(p.rx),
            ry: mas_to_rad(p.ry),
            rz: mas_to_rad(p.rz),
        }
    }

    /// Realign a Cartesian velocity.
    ///
    /// # Arguments
    /// * `velocity` - (Vx, Vy, Vz) in mm/yr
    /// * `position` - (X, Y, Z) in meters
    ///
    /// Returns the realigned velocity in mm/yr.
    pub fn realign(&self, velocity: &CartesianVector, position: &CartesianVector) -> CartesianVector {
        let v = velocity / MM_PER_M;
        let (x, y, z) = (position.x, position.y, position.z);

        let realigned = CartesianVector::new(
            v.x + self.tx + self.d * x - self.rz * y + self.ry * z,
            v.y + self.ty + self.d * y + self.rz * x - self.rx * z,
            v.z + self.tz + self.d * z - self.ry * x + self.rx * y,
        );

        realigned * MM_PER_M
    }
}

impl Default for HelmertRates {
    fn default() -> Self {
        Self::nkg_rf03_to_etrf2000()
    }
}
