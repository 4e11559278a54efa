use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{Result, VelocityGridError};
use crate::format::{ctable2, gravsoft, gtx};
use crate::height::HeightGrid;
use crate::types::{Component, VelocityGrid};

/// Default name of the horizontal (CTable2) output.
pub const DEFAULT_HORIZONTAL_FILE: &str = "nkgrf03vel_realigned_xy.ct2";

/// Default name of the vertical (GTX) output.
pub const DEFAULT_VERTICAL_FILE: &str = "nkgrf03vel_realigned_z.gtx";

/// Output files staged as temporaries beside their destinations.
///
/// Nothing reaches its final path until [`ExportBatch::commit`]. Dropping an
/// uncommitted batch removes every temporary.
#[derive(Debug, Default)]
pub struct ExportBatch {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl ExportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `bytes` to a temporary file in the directory of `path`.
    pub fn stage(&mut self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        self.staged.push((file, path.to_path_buf()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every staged file to its destination.
    ///
    /// If a move fails, files already moved by this call are removed again
    /// and the remaining temporaries are dropped.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut persisted: Vec<PathBuf> = Vec::with_capacity(self.staged.len());
        for (file, path) in self.staged {
            if let Err(e) = file.persist(&path) {
                for done in &persisted {
                    if let Err(err) = std::fs::remove_file(done) {
                        warn!(path = %done.display(), error = %err, "Failed to roll back output");
                    }
                }
                return Err(VelocityGridError::Io(e.error));
            }
            persisted.push(path);
        }
        Ok(persisted)
    }
}

/// Writes velocity and height grids. Units are passed through unchanged
/// (mm/yr for velocities, meters for heights).
#[derive(Debug, Clone)]
pub struct GridExporter {
    description: String,
}

impl GridExporter {
    /// Create an exporter; `description` goes into the CTable2 header.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// Encode North and East as CTable2 (stored East first).
    pub fn horizontal_bytes(&self, grid: &VelocityGrid) -> Result<Vec<u8>> {
        ctable2::encode(
            grid.extent(),
            grid.layer(Component::North),
            grid.layer(Component::East),
            &self.description,
        )
    }

    /// Encode Up as GTX.
    pub fn vertical_bytes(&self, grid: &VelocityGrid) -> Result<Vec<u8>> {
        gtx::encode(grid.extent(), grid.layer(Component::Up), gtx::GTX_NODATA)
    }

    /// Stage the CTable2 and GTX grids into `batch`.
    pub fn stage(
        &self,
        batch: &mut ExportBatch,
        grid: &VelocityGrid,
        horizontal: impl AsRef<Path>,
        vertical: impl AsRef<Path>,
    ) -> Result<()> {
        batch.stage(horizontal, &self.horizontal_bytes(grid)?)?;
        batch.stage(vertical, &self.vertical_bytes(grid)?)
    }

    /// Stage the grid in Gravsoft text form into `batch`.
    pub fn stage_gravsoft(
        &self,
        batch: &mut ExportBatch,
        grid: &VelocityGrid,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let mut bytes = Vec::new();
        gravsoft::write_velocity_grid(&mut bytes, grid)?;
        batch.stage(path, &bytes)
    }

    /// Write both grids. Either both files end up on disk or neither does.
    pub fn export(
        &self,
        grid: &VelocityGrid,
        horizontal: impl AsRef<Path>,
        vertical: impl AsRef<Path>,
    ) -> Result<()> {
        let (horizontal, vertical) = (horizontal.as_ref(), vertical.as_ref());
        let mut batch = ExportBatch::new();
        self.stage(&mut batch, grid, horizontal, vertical)?;
        batch.commit()?;

        info!(
            horizontal = %horizontal.display(),
            vertical = %vertical.display(),
            "Exported realigned grids"
        );
        Ok(())
    }

    /// Write a sampled height grid as GTX with its NODATA value.
    pub fn export_height(&self, grid: &HeightGrid, path: impl AsRef<Path>) -> Result<()> {
        let bytes = gtx::encode(&grid.extent, &grid.layer, grid.nodata)?;
        let mut batch = ExportBatch::new();
        batch.stage(path.as_ref(), &bytes)?;
        batch.commit()?;
        info!(path = %path.as_ref().display(), "Exported height grid");
        Ok(())
    }
}

impl Default for GridExporter {
    fn default() -> Self {
        Self::new("NKG_RF03vel realigned to ETRF2000 (mm/yr)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GridExtent, GridLayer};

    fn grid() -> VelocityGrid {
        let extent = GridExtent::new(55.0, 56.0, 10.0, 12.0, 1.0, 1.0).unwrap();
        VelocityGrid::new(
            extent,
            GridLayer::filled(3, 2, 1.0),
            GridLayer::filled(3, 2, 2.0),
            GridLayer::filled(3, 2, 3.0),
        )
        .unwrap()
    }

    #[test]
    fn test_export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let h = dir.path().join("out_xy.ct2");
        let v = dir.path().join("out_z.gtx");

        GridExporter::default().export(&grid(), &h, &v).unwrap();

        let decoded = ctable2::decode(&std::fs::read(&h).unwrap()).unwrap();
        assert_eq!(decoded.east.get(0, 0), Some(2.0));
        let (_, up) = gtx::decode(&std::fs::read(&v).unwrap(), None).unwrap();
        assert_eq!(up.get(1, 2), Some(3.0));
    }

    #[test]
    fn test_failed_export_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let h = dir.path().join("out_xy.ct2");
        let v = dir.path().join("missing").join("out_z.gtx");

        assert!(GridExporter::default().export(&grid(), &h, &v).is_err());
        assert!(!h.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_commit_rolls_back_persisted_files() {
        let dir = tempfile::tempdir().unwrap();
        let h = dir.path().join("out_xy.ct2");
        // a directory in the way makes the second persist fail
        let v = dir.path().join("out_z.gtx");
        std::fs::create_dir(&v).unwrap();

        assert!(GridExporter::default().export(&grid(), &h, &v).is_err());
        assert!(!h.exists());
        assert!(v.is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_batch_stages_gravsoft_with_grids() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = GridExporter::default();
        let mut batch = ExportBatch::new();
        exporter
            .stage(&mut batch, &grid(), dir.path().join("a.ct2"), dir.path().join("a.gtx"))
            .unwrap();
        exporter
            .stage_gravsoft(&mut batch, &grid(), dir.path().join("a.txt"))
            .unwrap();
        assert_eq!(batch.len(), 3);
        assert!(!dir.path().join("a.ct2").exists());

        let written = batch.commit().unwrap();
        assert_eq!(written.len(), 3);
        let text = std::fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(gravsoft::parse_velocity_grid(&text).unwrap(), grid());
    }

    #[test]
    fn test_dropped_batch_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut batch = ExportBatch::new();
            batch.stage(dir.path().join("report.json"), b"{}").unwrap();
            assert!(!batch.is_empty());
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
