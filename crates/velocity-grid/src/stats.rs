//! Summary statistics of realigned layers.

use serde::Serialize;

use crate::types::{Component, VelocityGrid};

/// Minimum, maximum and mean of a layer's finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of values that entered the statistics.
    pub count: usize,
}

impl LayerStats {
    /// Compute statistics over all finite values.
    pub fn from_values(values: &[f32]) -> Self {
        Self::accumulate(values.iter().copied().filter(|v| v.is_finite()))
    }

    /// Compute statistics over finite values that differ from `nodata`.
    pub fn from_values_excluding(values: &[f32], nodata: f32) -> Self {
        Self::accumulate(
            values
                .iter()
                .copied()
                .filter(|v| v.is_finite() && *v != nodata),
        )
    }

    fn accumulate(values: impl Iterator<Item = f32>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut count = 0usize;

        for v in values {
            let v = v as f64;
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            return Self {
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                count,
            };
        }

        Self {
            min,
            max,
            mean: sum / count as f64,
            count,
        }
    }

    /// Largest absolute value.
    pub fn max_abs(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }
}

impl std::fmt::Display for LayerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.min, self.max, self.mean)
    }
}

/// Per-layer statistics of a realigned grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealignReport {
    pub north: LayerStats,
    pub east: LayerStats,
    pub up: LayerStats,
    /// Number of processed cells.
    pub cells: usize,
}

impl RealignReport {
    /// Summarize every layer of `grid`.
    pub fn from_grid(grid: &VelocityGrid) -> Self {
        let (rows, cols) = grid.shape();
        Self {
            north: LayerStats::from_values(&grid.layer(Component::North).data),
            east: LayerStats::from_values(&grid.layer(Component::East).data),
            up: LayerStats::from_values(&grid.layer(Component::Up).data),
            cells: rows * cols,
        }
    }

    pub fn layer(&self, component: Component) -> &LayerStats {
        match component {
            Component::North => &self.north,
            Component::East => &self.east,
            Component::Up => &self.up,
        }
    }

    /// Components whose absolute values exceed `limit` (mm/yr).
    pub fn exceeds(&self, limit: f64) -> Vec<Component> {
        Component::ALL
            .into_iter()
            .filter(|c| self.layer(*c).max_abs() > limit)
            .collect()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One line per layer in north, east, up order: `min max mean`.
impl std::fmt::Display for RealignReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.north)?;
        writeln!(f, "{}", self.east)?;
        write!(f, "{}", self.up)
    }
}
