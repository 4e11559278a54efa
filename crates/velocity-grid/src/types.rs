//! Core types for velocity grids.

use geodetic::NeuVector;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VelocityGridError};

/// Geographic extent and node spacing of a regular lat/lon grid.
///
/// Nodes lie exactly on the extent: row 0 is the northernmost row
/// (`lat_max`) and column 0 the westernmost column (`lon_min`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridExtent {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    /// Latitude step in degrees.
    pub dlat: f64,
    /// Longitude step in degrees.
    pub dlon: f64,
}

impl GridExtent {
    /// Create and validate a new extent.
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
        dlat: f64,
        dlon: f64,
    ) -> Result<Self> {
        let extent = Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            dlat,
            dlon,
        };
        extent.validate()?;
        Ok(extent)
    }

    /// Check that the extent describes a usable grid.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.lat_min,
            self.lat_max,
            self.lon_min,
            self.lon_max,
            self.dlat,
            self.dlon,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(VelocityGridError::invalid_metadata(format!(
                "non-finite extent {:?}",
                self
            )));
        }
        if self.dlat <= 0.0 || self.dlon <= 0.0 {
            return Err(VelocityGridError::invalid_metadata(format!(
                "grid steps must be > 0, got dlat={} dlon={}",
                self.dlat, self.dlon
            )));
        }
        if self.lat_min > self.lat_max || self.lon_min > self.lon_max {
            return Err(VelocityGridError::invalid_metadata(format!(
                "inverted extent: lat {}..{}, lon {}..{}",
                self.lat_min, self.lat_max, self.lon_min, self.lon_max
            )));
        }
        if self.lat_min < -90.0 || self.lat_max > 90.0 {
            return Err(VelocityGridError::invalid_metadata(format!(
                "latitude range {}..{} outside [-90, 90]",
                self.lat_min, self.lat_max
            )));
        }

        let rows = axis_nodes("latitude", self.lat_min, self.lat_max, self.dlat)?;
        let cols = axis_nodes("longitude", self.lon_min, self.lon_max, self.dlon)?;
        match rows.checked_mul(cols) {
            Some(nodes) if nodes <= MAX_NODES => Ok(()),
            _ => Err(VelocityGridError::invalid_metadata(format!(
                "{} x {} nodes exceeds the limit of {}",
                rows, cols, MAX_NODES
            ))),
        }
    }

    /// Number of rows (latitude nodes).
    pub fn rows(&self) -> usize {
        node_count(self.lat_max - self.lat_min, self.dlat)
    }

    /// Number of columns (longitude nodes).
    pub fn cols(&self) -> usize {
        node_count(self.lon_max - self.lon_min, self.dlon)
    }

    /// Grid shape as (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.rows().saturating_mul(self.cols())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Geodetic position (lat, lon) in degrees of the node at (row, col).
    pub fn node_position(&self, row: usize, col: usize) -> (f64, f64) {
        let lat = self.lat_max - row as f64 * self.dlat;
        let lon = self.lon_min + col as f64 * self.dlon;
        (lat, lon)
    }

    /// Check if a point lies inside the extent (inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Fractional (row, col) index of a geographic point.
    ///
    /// Returns None when the point is outside the extent.
    pub fn fractional_index(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if !self.contains(lat, lon) {
            return None;
        }
        Some(((self.lat_max - lat) / self.dlat, (lon - self.lon_min) / self.dlon))
    }
}

/// Largest number of nodes a grid may hold.
pub const MAX_NODES: usize = 100_000_000;

/// How far `span / step` may sit from a whole number of steps.
const STEP_TOLERANCE: f64 = 1e-6;

fn node_count(span: f64, step: f64) -> usize {
    ((span / step).round() as usize).saturating_add(1)
}

/// Number of nodes along one axis. The step has to divide the range so the
/// last node lands on the far edge.
fn axis_nodes(axis: &str, min: f64, max: f64, step: f64) -> Result<usize> {
    let steps = (max - min) / step;
    if !steps.is_finite() || steps >= MAX_NODES as f64 {
        return Err(VelocityGridError::invalid_metadata(format!(
            "{} step {} is too small for range {}..{}",
            axis, step, min, max
        )));
    }

    let whole = steps.round();
    let last = max - whole * step;
    if (steps - whole).abs() > STEP_TOLERANCE || (last - min).abs() > STEP_TOLERANCE * step {
        return Err(VelocityGridError::invalid_metadata(format!(
            "{} step {} does not divide range {}..{}",
            axis, step, min, max
        )));
    }

    Ok(whole as usize + 1)
}

/// One component of a velocity grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    North,
    East,
    Up,
}

impl Component {
    /// All components in storage order.
    pub const ALL: [Component; 3] = [Component::North, Component::East, Component::Up];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::Up => "up",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single 2-D layer of f32 values (row-major, north to south).
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayer {
    /// The values, row 0 first.
    pub data: Vec<f32>,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl GridLayer {
    /// Create a layer from row-major data.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        if data.len() != width * height {
            return Err(VelocityGridError::malformed(format!(
                "layer has {} values, expected {} ({} rows x {} cols)",
                data.len(),
                width * height,
                height,
                width
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a layer filled with a single value.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Layer shape as (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Get the value at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Iterate over rows, north to south.
    pub fn rows(&self) -> std::slice::Chunks<'_, f32> {
        self.data.chunks(self.width.max(1))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A grid node with its position and velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// (North, East, Up) velocity in mm/yr.
    pub velocity: NeuVector,
}

/// A North/East/Up velocity grid in mm/yr.
///
/// All three layers share the shape derived from the extent.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityGrid {
    extent: GridExtent,
    north: GridLayer,
    east: GridLayer,
    up: GridLayer,
}

impl VelocityGrid {
    /// Assemble a grid, checking every layer against the extent.
    pub fn new(extent: GridExtent, north: GridLayer, east: GridLayer, up: GridLayer) -> Result<Self> {
        extent.validate()?;
        let expected = extent.shape();
        for (component, layer) in Component::ALL.iter().zip([&north, &east, &up]) {
            if layer.shape() != expected {
                return Err(VelocityGridError::shape_mismatch(
                    component.as_str(),
                    expected,
                    layer.shape(),
                ));
            }
        }
        Ok(Self {
            extent,
            north,
            east,
            up,
        })
    }

    /// A grid of zero velocities over `extent`.
    pub fn zeros(extent: GridExtent) -> Result<Self> {
        let (rows, cols) = extent.shape();
        let layer = GridLayer::filled(cols, rows, 0.0);
        Self::new(extent, layer.clone(), layer.clone(), layer)
    }

    pub fn extent(&self) -> &GridExtent {
        &self.extent
    }

    /// Grid shape as (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        self.north.shape()
    }

    pub fn layer(&self, component: Component) -> &GridLayer {
        match component {
            Component::North => &self.north,
            Component::East => &self.east,
            Component::Up => &self.up,
        }
    }

    /// The cell at (row, col), or None when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<GridCell> {
        let n = self.north.get(row, col)?;
        let e = self.east.get(row, col)?;
        let u = self.up.get(row, col)?;
        let (lat, lon) = self.extent.node_position(row, col);
        Some(GridCell {
            row,
            col,
            lat,
            lon,
            velocity: NeuVector::new(n as f64, e as f64, u as f64),
        })
    }
}
