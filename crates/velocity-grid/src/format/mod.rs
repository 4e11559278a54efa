//! On-disk grid formats.
//!
//! - [`gravsoft`]: text grids, the input format of velocity models
//! - [`gtx`]: vertical shift grids
//! - [`ctable2`]: horizontal shift grids

pub mod ctable2;
pub mod gravsoft;
pub mod gtx;

use crate::error::{Result, VelocityGridError};

/// Byte length of a binary grid file with the given header and node size.
fn file_len(
    format: &str,
    header_len: usize,
    rows: usize,
    cols: usize,
    node_len: usize,
) -> Result<usize> {
    rows.checked_mul(cols)
        .and_then(|nodes| nodes.checked_mul(node_len))
        .and_then(|body| body.checked_add(header_len))
        .ok_or_else(|| {
            VelocityGridError::invalid_metadata(format!(
                "{} dimensions {} x {} overflow",
                format, rows, cols
            ))
        })
}
