//! Configuration for realignment runs and height-grid sampling.

use std::path::Path;

use geodetic::{HelmertParameters, InverseMethod, ReferenceEllipsoid};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VelocityGridError};
use crate::types::GridExtent;

/// Configuration for a velocity-grid realignment.
///
/// The defaults reproduce the NKG_RF03 to ETRF2000 realignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealignConfig {
    /// Helmert rate parameters (rotations in mas/yr).
    #[serde(default)]
    pub helmert: HelmertParameters,

    /// Ellipsoid for cell positions.
    #[serde(default)]
    pub ellipsoid: ReferenceEllipsoid,

    /// Inverse used to return from XYZ to NEU.
    #[serde(default)]
    pub inverse: InverseMethod,

    /// Process rows on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Largest plausible absolute output rate in mm/yr.
    #[serde(default = "default_max_abs_rate")]
    pub max_abs_rate_mm_yr: f64,
}

fn default_parallel() -> bool {
    true
}

fn default_max_abs_rate() -> f64 {
    50.0
}

impl Default for RealignConfig {
    fn default() -> Self {
        Self {
            helmert: HelmertParameters::default(),
            ellipsoid: ReferenceEllipsoid::default(),
            inverse: InverseMethod::default(),
            parallel: default_parallel(),
            max_abs_rate_mm_yr: default_max_abs_rate(),
        }
    }
}

impl RealignConfig {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `REALIGN_*` environment variables to this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("REALIGN_PARALLEL") {
            self.parallel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("REALIGN_INVERSE") {
            if let Some(method) = InverseMethod::parse(&val) {
                self.inverse = method;
            }
        }

        if let Ok(val) = std::env::var("REALIGN_ELLIPSOID") {
            if let Some(ellipsoid) = ReferenceEllipsoid::parse(&val) {
                self.ellipsoid = ellipsoid;
            }
        }

        if let Ok(val) = std::env::var("REALIGN_MAX_ABS_RATE") {
            if let Ok(limit) = val.parse() {
                self.max_abs_rate_mm_yr = limit;
            }
        }

        self
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.helmert
            .validate()
            .map_err(|e| VelocityGridError::config(e.to_string()))?;

        if !self.max_abs_rate_mm_yr.is_finite() || self.max_abs_rate_mm_yr <= 0.0 {
            return Err(VelocityGridError::config(format!(
                "max_abs_rate_mm_yr must be > 0, got {}",
                self.max_abs_rate_mm_yr
            )));
        }

        Ok(())
    }
}

/// Configuration for sampling a height-shift grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightGridConfig {
    /// Output grid extent.
    #[serde(default = "default_height_extent")]
    pub extent: GridExtent,

    /// Value written where no shift is available.
    #[serde(default = "default_nodata")]
    pub nodata: f32,

    /// Shifts above this value are treated as missing.
    #[serde(default = "default_max_valid")]
    pub max_valid: f64,

    /// Store the negated shift.
    #[serde(default = "default_negate")]
    pub negate: bool,
}

fn default_height_extent() -> GridExtent {
    GridExtent {
        lat_min: 54.5,
        lat_max: 57.8,
        lon_min: 7.9,
        lon_max: 15.3,
        dlat: 0.002,
        dlon: 0.002,
    }
}

fn default_nodata() -> f32 {
    -88.888
}

fn default_max_valid() -> f64 {
    1000.0
}

fn default_negate() -> bool {
    true
}

impl Default for HeightGridConfig {
    fn default() -> Self {
        Self {
            extent: default_height_extent(),
            nodata: default_nodata(),
            max_valid: default_max_valid(),
            negate: default_negate(),
        }
    }
}

impl HeightGridConfig {
    /// Read a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.extent.validate()?;
        if !self.nodata.is_finite() {
            return Err(VelocityGridError::config("nodata must be finite"));
        }
        if self.max_valid.is_nan() {
            return Err(VelocityGridError::config("max_valid must not be NaN"));
        }
        Ok(())
    }
}
