//! GTX vertical grid format.
//!
//! Big-endian layout:
//!
//! | Offset | Type | Field |
//! |--------|------|-------|
//! | 0 | f64 | latitude of lower-left node (degrees) |
//! | 8 | f64 | longitude of lower-left node (degrees) |
//! | 16 | f64 | latitude step (degrees) |
//! | 24 | f64 | longitude step (degrees) |
//! | 32 | i32 | rows |
//! | 36 | i32 | columns |
//! | 40 | f32 × rows × cols | values, south row first, west to east |

use crate::error::{Result, VelocityGridError};
use crate::types::{GridExtent, GridLayer};

/// Header size in bytes.
pub const HEADER_LEN: usize = 40;

/// The NODATA value PROJ recognizes in GTX files.
pub const GTX_NODATA: f32 = -88.8888;

/// Encode a layer. NaN values are written as `nodata`.
pub fn encode(extent: &GridExtent, layer: &GridLayer, nodata: f32) -> Result<Vec<u8>> {
    let (rows, cols) = extent.shape();
    if layer.shape() != (rows, cols) {
        return Err(VelocityGridError::shape_mismatch("gtx", (rows, cols), layer.shape()));
    }

    let mut out = Vec::with_capacity(HEADER_LEN + rows * cols * 4);
    out.extend_from_slice(&extent.lat_min.to_be_bytes());
    out.extend_from_slice(&extent.lon_min.to_be_bytes());
    out.extend_from_slice(&extent.dlat.to_be_bytes());
    out.extend_from_slice(&extent.dlon.to_be_bytes());
    out.extend_from_slice(&dimension(rows)?.to_be_bytes());
    out.extend_from_slice(&dimension(cols)?.to_be_bytes());

    for row in layer.rows().rev() {
        for &value in row {
            let value = if value.is_nan() { nodata } else { value };
            out.extend_from_slice(&value.to_be_bytes());
        }
    }

    Ok(out)
}

/// Decode a GTX file. Values equal to `nodata` become NaN.
pub fn decode(bytes: &[u8], nodata: Option<f32>) -> Result<(GridExtent, GridLayer)> {
    if bytes.len() < HEADER_LEN {
        return Err(VelocityGridError::malformed(format!(
            "GTX file is {} bytes, shorter than its header",
            bytes.len()
        )));
    }

    let lat_min = read_f64(bytes, 0);
    let lon_min = read_f64(bytes, 8);
    let dlat = read_f64(bytes, 16);
    let dlon = read_f64(bytes, 24);
    let rows = read_i32(bytes, 32);
    let cols = read_i32(bytes, 36);
    if rows <= 0 || cols <= 0 {
        return Err(VelocityGridError::invalid_metadata(format!(
            "GTX dimensions {} x {}",
            rows, cols
        )));
    }
    let (rows, cols) = (rows as usize, cols as usize);

    let expected = super::file_len("GTX", HEADER_LEN, rows, cols, 4)?;
    if bytes.len() != expected {
        return Err(VelocityGridError::malformed(format!(
            "GTX file is {} bytes, expected {}",
            bytes.len(),
            expected
        )));
    }

    let extent = GridExtent::new(
        lat_min,
        lat_min + (rows - 1) as f64 * dlat,
        lon_min,
        lon_min + (cols - 1) as f64 * dlon,
        dlat,
        dlon,
    )?;

    let mut data = vec![0.0f32; rows * cols];
    let body = &bytes[HEADER_LEN..];
    for (i, chunk) in body.chunks_exact(4).enumerate() {
        let value = f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let value = match nodata {
            Some(nd) if value == nd => f32::NAN,
            _ => value,
        };
        // file rows run south to north
        let (file_row, col) = (i / cols, i % cols);
        data[(rows - 1 - file_row) * cols + col] = value;
    }

    Ok((extent, GridLayer::new(data, cols, rows)?))
}

fn dimension(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| VelocityGridError::invalid_metadata(format!("dimension {} too large", n)))
}

fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    f64::from_be_bytes(buf)
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_be_bytes(buf)
}
