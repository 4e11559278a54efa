//! CTable2 horizontal grid format.
//!
//! Little-endian, 160-byte header:
//!
//! | Offset | Type | Field |
//! |--------|------|-------|
//! | 0 | [u8; 16] | `"CTABLE V2.0"`, NUL padded |
//! | 16 | [u8; 80] | description, NUL padded |
//! | 96 | f64 × 2 | lower-left node (lon, lat) in radians |
//! | 112 | f64 × 2 | node spacing (lon, lat) in radians |
//! | 128 | i32 × 2 | columns, rows |
//! | 136 | 24 bytes | zero |
//!
//! Each node stores the pair (East, North) as f32, rows south to north and
//! columns west to east. GDAL exposes the two bands in N, E order, but the
//! physical order on disk is E first.

use crate::error::{Result, VelocityGridError};
use crate::types::{GridExtent, GridLayer};

/// Header size in bytes.
pub const HEADER_LEN: usize = 160;

const MAGIC: &[u8] = b"CTABLE V2.0";
const ID_LEN: usize = 16;
const DESCRIPTION_LEN: usize = 80;

/// Encode a horizontal (North, East) grid.
pub fn encode(
    extent: &GridExtent,
    north: &GridLayer,
    east: &GridLayer,
    description: &str,
) -> Result<Vec<u8>> {
    let (rows, cols) = extent.shape();
    for (name, layer) in [("north", north), ("east", east)] {
        if layer.shape() != (rows, cols) {
            return Err(VelocityGridError::shape_mismatch(name, (rows, cols), layer.shape()));
        }
    }

    let mut out = Vec::with_capacity(HEADER_LEN + rows * cols * 8);
    out.extend_from_slice(&padded(MAGIC, ID_LEN));
    out.extend_from_slice(&padded(description.as_bytes(), DESCRIPTION_LEN));
    out.extend_from_slice(&extent.lon_min.to_radians().to_le_bytes());
    out.extend_from_slice(&extent.lat_min.to_radians().to_le_bytes());
    out.extend_from_slice(&extent.dlon.to_radians().to_le_bytes());
    out.extend_from_slice(&extent.dlat.to_radians().to_le_bytes());
    out.extend_from_slice(&dimension(cols)?.to_le_bytes());
    out.extend_from_slice(&dimension(rows)?.to_le_bytes());
    out.resize(HEADER_LEN, 0);

    for (n_row, e_row) in north.rows().rev().zip(east.rows().rev()) {
        for (n, e) in n_row.iter().zip(e_row) {
            out.extend_from_slice(&e.to_le_bytes());
            out.extend_from_slice(&n.to_le_bytes());
        }
    }

    Ok(out)
}

/// A decoded CTable2 file.
#[derive(Debug, Clone)]
pub struct CTable2Grid {
    pub description: String,
    pub extent: GridExtent,
    pub north: GridLayer,
    pub east: GridLayer,
}

/// Decode a CTable2 file.
pub fn decode(bytes: &[u8]) -> Result<CTable2Grid> {
    if bytes.len() < HEADER_LEN {
        return Err(VelocityGridError::malformed(format!(
            "CTable2 file is {} bytes, shorter than its header",
            bytes.len()
        )));
    }
    if !bytes.starts_with(MAGIC) {
        return Err(VelocityGridError::malformed("missing CTABLE V2.0 signature"));
    }

    let description = trim_nul(&bytes[ID_LEN..ID_LEN + DESCRIPTION_LEN]);
    let lon_min = read_f64(bytes, 96).to_degrees();
    let lat_min = read_f64(bytes, 104).to_degrees();
    let dlon = read_f64(bytes, 112).to_degrees();
    let dlat = read_f64(bytes, 120).to_degrees();
    let cols = read_i32(bytes, 128);
    let rows = read_i32(bytes, 132);
    if rows <= 0 || cols <= 0 {
        return Err(VelocityGridError::invalid_metadata(format!(
            "CTable2 dimensions {} x {}",
            rows, cols
        )));
    }
    let (rows, cols) = (rows as usize, cols as usize);

    let expected = super::file_len("CTable2", HEADER_LEN, rows, cols, 8)?;
    if bytes.len() != expected {
        return Err(VelocityGridError::malformed(format!(
            "CTable2 file is {} bytes, expected {}",
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

    let mut north = vec![0.0f32; rows * cols];
    let mut east = vec![0.0f32; rows * cols];
    for (i, node) in bytes[HEADER_LEN..].chunks_exact(8).enumerate() {
        let (file_row, col) = (i / cols, i % cols);
        let idx = (rows - 1 - file_row) * cols + col;
        east[idx] = f32::from_le_bytes([node[0], node[1], node[2], node[3]]);
        north[idx] = f32::from_le_bytes([node[4], node[5], node[6], node[7]]);
    }

    Ok(CTable2Grid {
        description,
        extent,
        north: GridLayer::new(north, cols, rows)?,
        east: GridLayer::new(east, cols, rows)?,
    })
}

fn padded(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out: Vec<u8> = bytes.iter().copied().take(len).collect();
    out.resize(len, 0);
    out
}

fn trim_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn dimension(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| VelocityGridError::invalid_metadata(format!("dimension {} too large", n)))
}

fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (GridExtent, GridLayer, GridLayer) {
        let extent = GridExtent::new(55.0, 56.0, 10.0, 12.0, 1.0, 1.0).unwrap();
        let north = GridLayer::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        let east = GridLayer::new(vec![-1.0, -2.0, -3.0, -4.0, -5.0, -6.0], 3, 2).unwrap();
        (extent, north, east)
    }

    #[test]
    fn test_header_layout() {
        let (extent, north, east) = sample();
        let bytes = encode(&extent, &north, &east, "nkgrf03vel realigned").unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + 6 * 8);
        assert_eq!(&bytes[..11], b"CTABLE V2.0");
        assert!(bytes[11..16].iter().all(|&b| b == 0));
        assert_eq!(trim_nul(&bytes[16..96]), "nkgrf03vel realigned");
        assert!((read_f64(&bytes, 96) - 10f64.to_radians()).abs() < 1e-15);
        assert!((read_f64(&bytes, 104) - 55f64.to_radians()).abs() < 1e-15);
        assert_eq!(read_i32(&bytes, 128), 3);
        assert_eq!(read_i32(&bytes, 132), 2);
        assert!(bytes[136..160].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_east_stored_before_north() {
        let (extent, north, east) = sample();
        let bytes = encode(&extent, &north, &east, "").unwrap();
        // first node is the south-west corner: row 1, col 0
        let first = f32::from_le_bytes(bytes[160..164].try_into().unwrap());
        let second = f32::from_le_bytes(bytes[164..168].try_into().unwrap());
        assert_eq!(first, -4.0);
        assert_eq!(second, 4.0);
    }

    #[test]
    fn test_decode_restores_layers() {
        let (extent, north, east) = sample();
        let bytes = encode(&extent, &north, &east, "test").unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.description, "test");
        assert_eq!(decoded.north, north);
        assert_eq!(decoded.east, east);
        assert_eq!(decoded.extent.shape(), extent.shape());
        assert!((decoded.extent.lat_max - 56.0).abs() < 1e-9);
        assert!((decoded.extent.lon_min - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_description_truncated() {
        let (extent, north, east) = sample();
        let long = "x".repeat(200);
        let bytes = encode(&extent, &north, &east, &long).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 6 * 8);
        assert_eq!(decode(&bytes).unwrap().description.len(), DESCRIPTION_LEN);
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let (extent, north, east) = sample();
        let mut bytes = encode(&extent, &north, &east, "").unwrap();
        bytes[128..132].copy_from_slice(&i32::MAX.to_le_bytes());
        bytes[132..136].copy_from_slice(&i32::MAX.to_le_bytes());
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, VelocityGridError::InvalidMetadata(_)), "{}", err);
    }

    #[test]
    fn test_bad_signature_rejected() {
        let (extent, north, east) = sample();
        let mut bytes = encode(&extent, &north, &east, "").unwrap();
        bytes[0] = b'X';
        assert!(decode(&bytes).is_err());
    }
}
