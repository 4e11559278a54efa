//! Grid realignment driver.
//!
//! Every cell is processed independently:
//!
//! ```text
//! (row, col) ──► (lat, lon) ──► ellipsoid ──► position XYZ ─────────┐
//!                    │                                               ▼
//! (N, E, U) ──► local frame (R·v) ──► velocity XYZ ──► Helmert rate transform
//!                                                                    │
//! (N', E', U') ◄── local frame inverse ◄─────────────────────────────┘
//! ```
//!
//! Results are written to the same (row, col) of the output grid. Any cell
//! failure aborts the run; no partial grid is returned.

use std::time::Instant;

use geodetic::{
    to_cartesian, Ellipsoid, GeodeticError, HelmertRates, InverseMethod, NeuVector,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::RealignConfig;
use crate::error::{Result, VelocityGridError};
use crate::stats::RealignReport;
use crate::types::{Component, GridExtent, GridLayer, VelocityGrid};

/// Output of a realignment run.
#[derive(Debug, Clone)]
pub struct Realignment {
    /// The realigned grid, same extent and shape as the input.
    pub grid: VelocityGrid,
    /// Per-layer statistics of `grid`.
    pub report: RealignReport,
}

/// Realigns velocity grids with one fixed set of Helmert rates.
#[derive(Debug, Clone)]
pub struct Realigner {
    config: RealignConfig,
    rates: HelmertRates,
    ellipsoid: Ellipsoid,
}

impl Realigner {
    /// Validate `config` and freeze the derived rates.
    pub fn new(config: RealignConfig) -> Result<Self> {
        config.validate()?;
        let rates = config
            .helmert
            .rates()
            .map_err(|e| VelocityGridError::config(e.to_string()))?;
        let ellipsoid = config.ellipsoid.ellipsoid();

        Ok(Self {
            config,
            rates,
            ellipsoid,
        })
    }

    pub fn config(&self) -> &RealignConfig {
        &self.config
    }

    pub fn rates(&self) -> &HelmertRates {
        &self.rates
    }

    /// Realign one (N, E, U) velocity in mm/yr at (lat, lon) in degrees.
    pub fn realign_cell(&self, lat: f64, lon: f64, neu: &NeuVector) -> geodetic::Result<NeuVector> {
        if neu.iter().any(|v| !v.is_finite()) {
            return Err(GeodeticError::NonFinite("input velocity"));
        }

        let position = self.ellipsoid.geodetic_to_cartesian(lat, lon, 0.0)?;
        let (lat_rad, lon_rad) = (lat.to_radians(), lon.to_radians());

        let velocity = to_cartesian(neu, lat_rad, lon_rad);
        let realigned = self.rates.realign(&velocity, &position);

        self.config.inverse.to_local(&realigned, lat_rad, lon_rad)
    }

    /// Realign every cell of `grid`.
    pub fn realign(&self, grid: &VelocityGrid) -> Result<Realignment> {
        let started = Instant::now();
        let extent = *grid.extent();
        let (rows, cols) = grid.shape();

        info!(
            rows,
            cols,
            inverse = %self.config.inverse,
            ellipsoid = %self.config.ellipsoid,
            parallel = self.config.parallel,
            "Realigning velocity grid"
        );

        let mut north = GridLayer::filled(cols, rows, 0.0);
        let mut east = GridLayer::filled(cols, rows, 0.0);
        let mut up = GridLayer::filled(cols, rows, 0.0);

        if cols > 0 {
            if self.config.parallel {
                north
                    .data
                    .par_chunks_mut(cols)
                    .zip(east.data.par_chunks_mut(cols))
                    .zip(up.data.par_chunks_mut(cols))
                    .enumerate()
                    .try_for_each(|(row, ((n, e), u))| self.realign_row(grid, row, n, e, u))?;
            } else {
                north
                    .data
                    .chunks_mut(cols)
                    .zip(east.data.chunks_mut(cols))
                    .zip(up.data.chunks_mut(cols))
                    .enumerate()
                    .try_for_each(|(row, ((n, e), u))| self.realign_row(grid, row, n, e, u))?;
            }
        }

        let output = VelocityGrid::new(extent, north, east, up)?;
        let report = RealignReport::from_grid(&output);

        let limit = self.config.max_abs_rate_mm_yr;
        for component in report.exceeds(limit) {
            warn!(
                component = %component,
                max_abs = report.layer(component).max_abs(),
                limit,
                "Realigned rates exceed plausible magnitude"
            );
        }

        info!(
            cells = report.cells,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Realignment complete"
        );

        Ok(Realignment {
            grid: output,
            report,
        })
    }

    fn realign_row(
        &self,
        grid: &VelocityGrid,
        row: usize,
        north: &mut [f32],
        east: &mut [f32],
        up: &mut [f32],
    ) -> Result<()> {
        let extent: &GridExtent = grid.extent();
        let width = grid.shape().1;
        let offset = row * width;
        let (n_in, e_in, u_in) = (
            &grid.layer(Component::North).data[offset..offset + width],
            &grid.layer(Component::East).data[offset..offset + width],
            &grid.layer(Component::Up).data[offset..offset + width],
        );

        for col in 0..width {
            let (lat, lon) = extent.node_position(row, col);
            let neu = NeuVector::new(n_in[col] as f64, e_in[col] as f64, u_in[col] as f64);
            let out = self
                .realign_cell(lat, lon, &neu)
                .map_err(|source| VelocityGridError::CellFailed { row, col, source })?;

            north[col] = out.x as f32;
            east[col] = out.y as f32;
            up[col] = out.z as f32;
        }

        debug!(row, "Row realigned");
        Ok(())
    }
}

impl Default for Realigner {
    fn default() -> Self {
        Self {
            config: RealignConfig::default(),
            rates: HelmertRates::default(),
            ellipsoid: Ellipsoid::GRS80,
        }
    }
}

/// Realign `grid` with the default NKG_RF03 to ETRF2000 rates.
pub fn realign_grid(grid: &VelocityGrid) -> Result<Realignment> {
    Realigner::default().realign(grid)
}
