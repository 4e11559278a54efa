//! Velocity grid realignment between geodetic reference frames.
//!
//! This crate takes a North/East/Up velocity grid (mm/yr) expressed in one
//! reference frame and re-expresses it in another by applying a Helmert rate
//! transform at every grid node:
//!
//! - **Loading**: Gravsoft text grids with three component blocks
//! - **Realignment**: per-cell NEU → XYZ → Helmert → NEU, optionally on rayon
//! - **Export**: CTable2 for the horizontal pair, GTX for the vertical rate
//!
//! # Architecture
//!
//! ```text
//! gravsoft::read_velocity_grid(path)
//!      │
//!      ▼
//! VelocityGrid ──► Realigner::realign()
//!                       │
//!                       ├─► per row: node position, ellipsoid, local frame,
//!                       │            Helmert rates, local frame inverse
//!                       │
//!                       └─► RealignReport (min / max / mean per layer)
//!                                 │
//!                                 ▼
//!                    GridExporter::export(ct2, gtx)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use velocity_grid::{format::gravsoft, GridExporter, RealignConfig, Realigner};
//!
//! let grid = gravsoft::read_velocity_grid("data/nkgrf03vel.01")?;
//! let realignment = Realigner::new(RealignConfig::default())?.realign(&grid)?;
//! println!("{}", realignment.report);
//! GridExporter::default().export(&realignment.grid, "xy.ct2", "z.gtx")?;
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod height;
pub mod interpolation;
pub mod realign;
pub mod stats;
pub mod types;
pub mod writer;

// Re-export commonly used types at crate root
pub use config::{HeightGridConfig, RealignConfig};
pub use error::{Result, VelocityGridError};
pub use height::{GridShiftSource, HeightGrid, HeightGridSampler, VerticalShiftSource};
pub use interpolation::{bilinear_interpolate, interpolate_at};
pub use realign::{realign_grid, Realigner, Realignment};
pub use stats::{LayerStats, RealignReport};
pub use types::{Component, GridCell, GridExtent, GridLayer, VelocityGrid};
pub use writer::{ExportBatch, GridExporter, DEFAULT_HORIZONTAL_FILE, DEFAULT_VERTICAL_FILE};
