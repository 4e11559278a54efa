//! Grid export to PROJ-readable files.
//!
//! Files are staged as temporaries next to their destination and only
//! persisted once every file of an export has been written.

mod grid_writer;

pub use grid_writer::{ExportBatch, GridExporter, DEFAULT_HORIZONTAL_FILE, DEFAULT_VERTICAL_FILE};
