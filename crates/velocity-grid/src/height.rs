//! Height-shift grid sampling.
//!
//! Samples a vertical datum shift over a regular lat/lon mesh. Unlike the
//! velocity realignment this is fail-soft: nodes where the shift source
//! errors, or returns an implausible value, get the NODATA sentinel.

use std::path::Path;

use tracing::{info, warn};

use crate::config::HeightGridConfig;
use crate::error::{Result, VelocityGridError};
use crate::format::gravsoft;
use crate::interpolation::interpolate_at;
use crate::stats::LayerStats;
use crate::types::{GridExtent, GridLayer};

/// Source of vertical shifts (meters) at geographic points.
pub trait VerticalShiftSource {
    /// Shift at (lat, lon) in degrees.
    fn shift(&self, lat: f64, lon: f64) -> Result<f64>;
}

impl<F> VerticalShiftSource for F
where
    F: Fn(f64, f64) -> Result<f64>,
{
    fn shift(&self, lat: f64, lon: f64) -> Result<f64> {
        self(lat, lon)
    }
}

/// Shifts interpolated bilinearly from a scalar grid.
#[derive(Debug, Clone)]
pub struct GridShiftSource {
    extent: GridExtent,
    layer: GridLayer,
}

impl GridShiftSource {
    pub fn new(extent: GridExtent, layer: GridLayer) -> Result<Self> {
        extent.validate()?;
        if layer.shape() != extent.shape() {
            return Err(VelocityGridError::shape_mismatch(
                "shift",
                extent.shape(),
                layer.shape(),
            ));
        }
        Ok(Self { extent, layer })
    }

    /// Load a single-layer Gravsoft grid.
    pub fn from_gravsoft(path: impl AsRef<Path>) -> Result<Self> {
        let (extent, layer) = gravsoft::read_scalar_grid(path)?;
        Self::new(extent, layer)
    }

    pub fn extent(&self) -> &GridExtent {
        &self.extent
    }
}

impl VerticalShiftSource for GridShiftSource {
    fn shift(&self, lat: f64, lon: f64) -> Result<f64> {
        let value = interpolate_at(&self.extent, &self.layer, lat, lon);
        if value.is_nan() {
            return Err(VelocityGridError::invalid_metadata(format!(
                "no shift available at ({}, {})",
                lat, lon
            )));
        }
        Ok(value as f64)
    }
}

/// A sampled height-shift grid.
#[derive(Debug, Clone)]
pub struct HeightGrid {
    pub extent: GridExtent,
    /// Values in meters, row 0 is the northernmost row.
    pub layer: GridLayer,
    pub nodata: f32,
    /// Number of nodes set to `nodata`.
    pub nodata_count: usize,
}

impl HeightGrid {
    /// Statistics over the valid nodes.
    pub fn stats(&self) -> LayerStats {
        LayerStats::from_values_excluding(&self.layer.data, self.nodata)
    }
}

/// Samples a [`VerticalShiftSource`] onto the configured mesh.
#[derive(Debug, Clone)]
pub struct HeightGridSampler {
    config: HeightGridConfig,
}

impl HeightGridSampler {
    pub fn new(config: HeightGridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HeightGridConfig {
        &self.config
    }

    /// Sample every node of the mesh.
    pub fn sample(&self, source: &dyn VerticalShiftSource) -> HeightGrid {
        let extent = self.config.extent;
        let (rows, cols) = extent.shape();
        info!(rows, cols, "Sampling height-shift grid");

        let mut data = Vec::with_capacity(rows * cols);
        let mut nodata_count = 0usize;

        for row in 0..rows {
            for col in 0..cols {
                let (lat, lon) = extent.node_position(row, col);
                let value = match source.shift(lat, lon) {
                    Ok(shift) => {
                        let value = if self.config.negate { -shift } else { shift };
                        if value.is_finite() && value <= self.config.max_valid {
                            Some(value as f32)
                        } else {
                            None
                        }
                    }
                    Err(_) => None,
                };

                data.push(value.unwrap_or_else(|| {
                    nodata_count += 1;
                    self.config.nodata
                }));
            }
        }

        if nodata_count > 0 {
            warn!(nodata_count, "Height-shift nodes without a valid value");
        }

        HeightGrid {
            extent,
            layer: GridLayer {
                data,
                width: cols,
                height: rows,
            },
            nodata: self.config.nodata,
            nodata_count,
        }
    }
}
