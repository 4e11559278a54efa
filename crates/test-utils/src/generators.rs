//! Synthetic velocity data.
//!
//! Grids are returned as row-major `Vec<f32>` with row 0 as the northernmost
//! row, matching the Gravsoft layout.

/// Creates a grid where each value is `col * 1000 + row`.
///
/// Useful for checking that rows and columns survive a read/write cycle in
/// the right orientation.
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_index_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid filled with a single value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a postglacial-uplift-like Up layer in mm/yr.
///
/// A dome peaking at `peak` mm/yr in the grid center, falling off to
/// roughly -1 mm/yr at the corners.
pub fn create_uplift_grid(width: usize, height: usize, peak: f32) -> Vec<f32> {
    let cx = (width.max(1) - 1) as f32 / 2.0;
    let cy = (height.max(1) - 1) as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - cx;
            let dy = row as f32 - cy;
            let r = (dx * dx + dy * dy).sqrt() / max_dist;
            data.push(peak * (1.0 - r * r) - r);
        }
    }
    data
}

/// Creates North and East layers (mm/yr) pointing away from the grid center.
///
/// Speeds grow linearly from 0 at the center to `max_speed` at the corners.
pub fn create_outward_grids(width: usize, height: usize, max_speed: f32) -> (Vec<f32>, Vec<f32>) {
    let cx = (width.max(1) - 1) as f32 / 2.0;
    let cy = (height.max(1) - 1) as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);

    let mut north = Vec::with_capacity(width * height);
    let mut east = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            // rows increase southwards
            north.push(-(row as f32 - cy) / max_dist * max_speed);
            east.push((col as f32 - cx) / max_dist * max_speed);
        }
    }
    (north, east)
}

/// Formats one Gravsoft block: header line then one line per row.
pub fn gravsoft_block(header: [f64; 6], data: &[f32], width: usize) -> String {
    let mut out = format!(
        "{} {} {} {} {} {}\n",
        header[0], header[1], header[2], header[3], header[4], header[5]
    );
    for row in data.chunks(width.max(1)) {
        let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&values.join(" "));
        out.push('\n');
    }
    out
}

/// Formats a three-block North/East/Up Gravsoft velocity grid.
pub fn gravsoft_velocity_text(
    header: [f64; 6],
    north: &[f32],
    east: &[f32],
    up: &[f32],
    width: usize,
) -> String {
    let mut out = gravsoft_block(header, north, width);
    out.push_str(&gravsoft_block(header, east, width));
    out.push_str(&gravsoft_block(header, up, width));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uplift_peaks_in_center() {
        let grid = create_uplift_grid(5, 5, 10.0);
        assert_eq!(grid[12], 10.0);
        assert!((grid[0] - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_outward_grids() {
        let (north, east) = create_outward_grids(3, 3, 2.0);
        // north-west corner moves north and west
        assert!(north[0] > 0.0);
        assert!(east[0] < 0.0);
        assert_eq!(north[4], 0.0);
        assert_eq!(east[4], 0.0);
    }

    #[test]
    fn test_gravsoft_block_layout() {
        let text = gravsoft_block([55.0, 56.0, 10.0, 12.0, 1.0, 1.0], &create_index_grid(3, 2), 3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["55 56 10 12 1 1", "0 1000 2000", "1 1001 2001"]);
    }
}
