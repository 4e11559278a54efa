//! Interpolation on grid layers.

use crate::types::{GridExtent, GridLayer};

/// Bilinear interpolation at fractional (row, col).
///
/// Returns NaN outside the layer or when any of the four corners is NaN.
pub fn bilinear_interpolate(layer: &GridLayer, row: f64, col: f64) -> f32 {
    if layer.is_empty() || row < 0.0 || col < 0.0 {
        return f32::NAN;
    }

    let r0 = row.floor() as usize;
    let c0 = col.floor() as usize;
    if r0 >= layer.height || c0 >= layer.width {
        return f32::NAN;
    }
    let r1 = (r0 + 1).min(layer.height - 1);
    let c1 = (c0 + 1).min(layer.width - 1);

    let cf = (col - c0 as f64) as f32;
    let rf = (row - r0 as f64) as f32;

    let v00 = layer.data[r0 * layer.width + c0];
    let v01 = layer.data[r0 * layer.width + c1];
    let v10 = layer.data[r1 * layer.width + c0];
    let v11 = layer.data[r1 * layer.width + c1];

    if v00.is_nan() || v01.is_nan() || v10.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let upper = v00 * (1.0 - cf) + v01 * cf;
    let lower = v10 * (1.0 - cf) + v11 * cf;
    upper * (1.0 - rf) + lower * rf
}

/// Bilinear interpolation at a geographic point (degrees).
pub fn interpolate_at(extent: &GridExtent, layer: &GridLayer, lat: f64, lon: f64) -> f32 {
    match extent.fractional_index(lat, lon) {
        Some((row, col)) => bilinear_interpolate(layer, row, col),
        None => f32::NAN,
    }
}
