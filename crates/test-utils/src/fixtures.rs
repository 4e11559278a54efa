//! Common test fixtures.

/// Grid extents as Gravsoft headers `[lat_min, lat_max, lon_min, lon_max, dlat, dlon]`.
pub mod extent {
    /// Coarse Fennoscandian velocity model extent.
    pub const FENNOSCANDIA: [f64; 6] = [54.0, 72.0, 4.0, 32.0, 0.5, 1.0];

    /// A 3 x 3 grid in southern Scandinavia.
    pub const SMALL_3X3: [f64; 6] = [58.0, 60.0, 10.0, 12.0, 1.0, 1.0];

    /// Denmark height-shift mesh.
    pub const DENMARK: [f64; 6] = [54.5, 57.8, 7.9, 15.3, 0.002, 0.002];

    /// Reaches the north pole in its first row.
    pub const POLE_REACHING: [f64; 6] = [88.0, 90.0, 0.0, 2.0, 1.0, 1.0];

    /// Number of (rows, cols) implied by a header.
    pub fn shape(header: [f64; 6]) -> (usize, usize) {
        let rows = ((header[1] - header[0]) / header[4]).round() as usize + 1;
        let cols = ((header[3] - header[2]) / header[5]).round() as usize + 1;
        (rows, cols)
    }
}

/// Reference realignment results for the default NKG_RF03 to ETRF2000 rates.
pub mod realignment {
    /// A cell at 60 N, 10 E.
    pub const LAT_LON_60N_10E: (f64, f64) = (60.0, 10.0);

    /// (N, E, U) input velocity in mm/yr.
    pub const INPUT_60N_10E: [f64; 3] = [1.0, 2.0, 0.5];

    /// Expected (N, E, U) output velocity in mm/yr.
    pub const EXPECTED_60N_10E: [f64; 3] = [0.777_512_021, 2.126_154_207, -0.267_968_166];

    /// Expected output for zero input velocity at 60 N, 10 E.
    pub const EXPECTED_ZERO_60N_10E: [f64; 3] = [-0.222_487_979, 0.126_154_207, -0.767_968_166];

    /// Norm of the translation rates in mm/yr. Realigned zero velocities
    /// over Fennoscandia stay below this.
    pub const TRANSLATION_NORM_MM_YR: f64 = 2.52;
}
