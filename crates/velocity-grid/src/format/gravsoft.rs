//! Gravsoft text grids.
//!
//! Each block starts with a six-value header
//!
//! ```text
//! lat_min lat_max lon_min lon_max dlat dlon
//! ```
//!
//! followed by `rows × cols` values, north to south and west to east. Values
//! are whitespace separated; line breaks carry no meaning. A velocity grid is
//! three consecutive blocks in North, East, Up order with identical headers.

use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, VelocityGridError};
use crate::types::{Component, GridExtent, GridLayer, VelocityGrid};

/// Values reserved up front per block; longer blocks grow as they are read.
const PREALLOCATE_LIMIT: usize = 1 << 20;

const VALUES_PER_LINE: usize = 8;

/// Parse every block of a Gravsoft document.
pub fn parse_blocks(text: &str) -> Result<Vec<(GridExtent, GridLayer)>> {
    let mut tokens = text.split_whitespace().enumerate();
    let mut next_value = |what: &str| -> Result<Option<f64>> {
        match tokens.next() {
            None => Ok(None),
            Some((index, token)) => token.parse::<f64>().map(Some).map_err(|e| {
                VelocityGridError::Parse {
                    index,
                    message: format!("{} {:?}: {}", what, token, e),
                }
            }),
        }
    };

    let mut blocks = Vec::new();
    loop {
        let Some(lat_min) = next_value("header value")? else {
            break;
        };
        let mut header = [lat_min, 0.0, 0.0, 0.0, 0.0, 0.0];
        for slot in header.iter_mut().skip(1) {
            *slot = next_value("header value")?.ok_or_else(|| {
                VelocityGridError::malformed(format!("truncated header in block {}", blocks.len()))
            })?;
        }

        let [lat_min, lat_max, lon_min, lon_max, dlat, dlon] = header;
        let extent = GridExtent::new(lat_min, lat_max, lon_min, lon_max, dlat, dlon)?;
        let (rows, cols) = extent.shape();

        let nodes = extent.len();
        let mut data = Vec::with_capacity(nodes.min(PREALLOCATE_LIMIT));
        for _ in 0..nodes {
            let value = next_value("grid value")?.ok_or_else(|| {
                VelocityGridError::malformed(format!(
                    "block {} ends after {} of {} values",
                    blocks.len(),
                    data.len(),
                    nodes
                ))
            })?;
            data.push(value as f32);
        }

        blocks.push((extent, GridLayer::new(data, cols, rows)?));
    }

    Ok(blocks)
}

fn read_text(path: &Path) -> Result<String> {
    let mut text = String::new();
    std::fs::File::open(path)?.read_to_string(&mut text)?;
    Ok(text)
}

/// Parse a three-block North/East/Up velocity grid.
pub fn parse_velocity_grid(text: &str) -> Result<VelocityGrid> {
    let [(extent, north), (east_extent, east), (up_extent, up)]: [(GridExtent, GridLayer); 3] =
        parse_blocks(text)?
            .try_into()
            .map_err(|blocks: Vec<_>| {
                VelocityGridError::malformed(format!(
                    "velocity grid needs 3 blocks (north, east, up), found {}",
                    blocks.len()
                ))
            })?;

    for (component, other) in [(Component::East, east_extent), (Component::Up, up_extent)] {
        if other != extent {
            return Err(VelocityGridError::invalid_metadata(format!(
                "{} block header {:?} differs from north block {:?}",
                component, other, extent
            )));
        }
    }

    VelocityGrid::new(extent, north, east, up)
}

/// Read a three-block North/East/Up velocity grid file.
pub fn read_velocity_grid(path: impl AsRef<Path>) -> Result<VelocityGrid> {
    parse_velocity_grid(&read_text(path.as_ref())?)
}

/// Read a single-block grid file.
pub fn read_scalar_grid(path: impl AsRef<Path>) -> Result<(GridExtent, GridLayer)> {
    let mut blocks = parse_blocks(&read_text(path.as_ref())?)?;
    if blocks.len() != 1 {
        return Err(VelocityGridError::malformed(format!(
            "expected a single grid block, found {}",
            blocks.len()
        )));
    }
    Ok(blocks.remove(0))
}

/// Write one block.
pub fn write_block<W: Write>(writer: &mut W, extent: &GridExtent, layer: &GridLayer) -> Result<()> {
    writeln!(
        writer,
        "{} {} {} {} {} {}",
        extent.lat_min, extent.lat_max, extent.lon_min, extent.lon_max, extent.dlat, extent.dlon
    )?;

    for row in layer.rows() {
        for line in row.chunks(VALUES_PER_LINE) {
            let values: Vec<String> = line.iter().map(|v| v.to_string()).collect();
            writeln!(writer, "{}", values.join(" "))?;
        }
    }

    Ok(())
}

/// Write a velocity grid as three blocks.
pub fn write_velocity_grid<W: Write>(writer: W, grid: &VelocityGrid) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for component in Component::ALL {
        write_block(&mut writer, grid.extent(), grid.layer(component))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
55.0 56.0 10.0 12.0 1.0 1.0
1 2 3
4 5 6
55.0 56.0 10.0 12.0 1.0 1.0
-1 -2 -3 -4 -5 -6
55.0 56.0 10.0 12.0 1.0 1.0
0.5 0.5 0.5
0.5 0.5 0.25
";

    #[test]
    fn test_parse_velocity_grid() {
        let grid = parse_velocity_grid(SMALL).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        let cell = grid.cell(1, 2).unwrap();
        assert_eq!((cell.lat, cell.lon), (55.0, 12.0));
        assert_eq!(cell.velocity.x, 6.0);
        assert_eq!(cell.velocity.y, -6.0);
        assert_eq!(cell.velocity.z, 0.25);
    }

    #[test]
    fn test_mismatched_headers_rejected() {
        let text = SMALL.replacen("55.0 56.0 10.0 12.0 1.0 1.0\n-1", "56.0 57.0 10.0 12.0 1.0 1.0\n-1", 1);
        assert!(matches!(
            parse_velocity_grid(&text),
            Err(VelocityGridError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn test_truncated_block_rejected() {
        let text = "55.0 56.0 10.0 12.0 1.0 1.0\n1 2 3 4 5\n";
        let err = parse_blocks(text).unwrap_err();
        assert!(matches!(err, VelocityGridError::Malformed(_)), "{}", err);
    }

    #[test]
    fn test_bad_token_reports_index() {
        let text = "55.0 56.0 10.0 12.0 1.0 1.0\n1 2 x 4 5 6\n";
        match parse_blocks(text).unwrap_err() {
            VelocityGridError::Parse { index, .. } => assert_eq!(index, 8),
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_huge_header_rejected_before_reading() {
        let err = parse_blocks("0 90 0 360 1e-300 1e-300\n1 2 3\n").unwrap_err();
        assert!(matches!(err, VelocityGridError::InvalidMetadata(_)), "{}", err);
    }

    #[test]
    fn test_uneven_step_rejected() {
        let err = parse_blocks("0.0 1.0 0.0 1.0 0.4 0.4\n1 2 3 4 5 6 7 8 9\n").unwrap_err();
        assert!(matches!(err, VelocityGridError::InvalidMetadata(_)), "{}", err);
    }

    #[test]
    fn test_write_then_parse() {
        let grid = parse_velocity_grid(SMALL).unwrap();
        let mut out = Vec::new();
        write_velocity_grid(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(parse_velocity_grid(&text).unwrap(), grid);
    }

    #[test]
    fn test_two_blocks_is_not_a_velocity_grid() {
        let text: String = SMALL.lines().take(5).map(|l| format!("{}\n", l)).collect();
        assert!(matches!(
            parse_velocity_grid(&text),
            Err(VelocityGridError::Malformed(_))
        ));
    }
}
