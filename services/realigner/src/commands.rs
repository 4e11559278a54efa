//! Subcommand implementations.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use geodetic::InverseMethod;
use tracing::{info, warn};

use velocity_grid::format::gravsoft;
use velocity_grid::{
    ExportBatch, GridExporter, GridShiftSource, HeightGridConfig, HeightGridSampler,
    RealignConfig, Realigner,
};

/// Options for the `realign` subcommand.
#[derive(Debug, Clone)]
pub struct RealignOptions {
    pub input: PathBuf,
    pub horizontal: PathBuf,
    pub vertical: PathBuf,
    pub config: Option<PathBuf>,
    pub inverse: Option<String>,
    pub sequential: bool,
    pub strict: bool,
    pub gravsoft_out: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}

/// Options for the `height-grid` subcommand.
#[derive(Debug, Clone)]
pub struct HeightGridOptions {
    pub source: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
}

fn load_realign_config(options: &RealignOptions) -> Result<RealignConfig> {
    let mut config = match &options.config {
        Some(path) => RealignConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .with_env_overrides(),
        None => RealignConfig::from_env(),
    };

    if let Some(inverse) = &options.inverse {
        config.inverse = InverseMethod::parse(inverse)
            .with_context(|| format!("Unknown inverse method: {}", inverse))?;
    }
    if options.sequential {
        config.parallel = false;
    }

    Ok(config)
}

/// Read, realign, report and export a velocity grid.
pub fn realign(options: &RealignOptions) -> Result<()> {
    let config = load_realign_config(options)?;
    let limit = config.max_abs_rate_mm_yr;
    let realigner = Realigner::new(config).context("Invalid realignment configuration")?;

    info!(input = %options.input.display(), "Reading velocity grid");
    let grid = gravsoft::read_velocity_grid(&options.input)
        .with_context(|| format!("Failed to read {}", options.input.display()))?;

    let realignment = realigner.realign(&grid).context("Realignment failed")?;
    let report = &realignment.report;

    println!("{}", report);

    let exceeded = report.exceeds(limit);
    if !exceeded.is_empty() {
        let names: Vec<&str> = exceeded.iter().map(|c| c.as_str()).collect();
        if options.strict {
            bail!(
                "Realigned rates exceed {} mm/yr in: {}",
                limit,
                names.join(", ")
            );
        }
        warn!(components = %names.join(","), "Continuing despite implausible rates");
    }

    // Everything is staged first so a failure leaves no output behind
    let exporter = GridExporter::default();
    let mut batch = ExportBatch::new();
    exporter
        .stage(&mut batch, &realignment.grid, &options.horizontal, &options.vertical)
        .context("Failed to stage realigned grids")?;

    if let Some(path) = &options.gravsoft_out {
        exporter
            .stage_gravsoft(&mut batch, &realignment.grid, path)
            .with_context(|| format!("Failed to stage {}", path.display()))?;
    }

    if let Some(path) = &options.report_json {
        batch
            .stage(path, report.to_json()?.as_bytes())
            .with_context(|| format!("Failed to stage {}", path.display()))?;
    }

    let written = batch.commit().context("Failed to write outputs")?;
    info!(files = written.len(), "Realignment outputs written");

    Ok(())
}

/// Sample a height-shift grid onto the configured mesh and export it as GTX.
pub fn height_grid(options: &HeightGridOptions) -> Result<()> {
    let config = match &options.config {
        Some(path) => HeightGridConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HeightGridConfig::default(),
    };

    let sampler = HeightGridSampler::new(config).context("Invalid height-grid configuration")?;
    let source = GridShiftSource::from_gravsoft(&options.source)
        .with_context(|| format!("Failed to read {}", options.source.display()))?;

    let grid = sampler.sample(&source);
    println!("{}", grid.stats());

    GridExporter::default()
        .export_height(&grid, &options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use test_utils::fixtures::extent;
    use test_utils::{create_constant_grid, gravsoft_block, gravsoft_velocity_text, write_test_file};
    use velocity_grid::format::{ctable2, gtx};

    fn options(dir: &Path, input: PathBuf) -> RealignOptions {
        RealignOptions {
            input,
            horizontal: dir.join("xy.ct2"),
            vertical: dir.join("z.gtx"),
            config: None,
            inverse: None,
            sequential: true,
            strict: true,
            gravsoft_out: Some(dir.join("realigned.txt")),
            report_json: Some(dir.join("report.json")),
        }
    }

    #[test]
    fn test_realign_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let (rows, cols) = extent::shape(extent::SMALL_3X3);
        let zeros = create_constant_grid(cols, rows, 0.0);
        let text = gravsoft_velocity_text(extent::SMALL_3X3, &zeros, &zeros, &zeros, cols);
        let input = write_test_file(dir.path(), "vel.txt", text);

        let opts = options(dir.path(), input);
        realign(&opts).unwrap();

        let ct2 = ctable2::decode(&std::fs::read(&opts.horizontal).unwrap()).unwrap();
        assert_eq!(ct2.north.shape(), (rows, cols));
        let (gtx_extent, _) = gtx::decode(&std::fs::read(&opts.vertical).unwrap(), None).unwrap();
        assert_eq!(gtx_extent.shape(), (rows, cols));

        let report = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
        assert!(report.contains("\"north\""));
        let realigned = gravsoft::read_velocity_grid(dir.path().join("realigned.txt")).unwrap();
        assert_eq!(realigned.shape(), (rows, cols));
    }

    #[test]
    fn test_strict_rejects_implausible_rates() {
        let dir = tempfile::tempdir().unwrap();
        let (rows, cols) = extent::shape(extent::SMALL_3X3);
        let fast = create_constant_grid(cols, rows, 500.0);
        let zeros = create_constant_grid(cols, rows, 0.0);
        let text = gravsoft_velocity_text(extent::SMALL_3X3, &fast, &zeros, &zeros, cols);
        let input = write_test_file(dir.path(), "vel.txt", text);

        let opts = options(dir.path(), input);
        let err = realign(&opts).unwrap_err();
        assert!(err.to_string().contains("north"));
        assert!(!opts.horizontal.exists());
        assert!(!opts.vertical.exists());
        assert!(!dir.path().join("report.json").exists());
        assert!(!dir.path().join("realigned.txt").exists());
    }

    #[test]
    fn test_unwritable_extra_output_leaves_no_grids() {
        let dir = tempfile::tempdir().unwrap();
        let (rows, cols) = extent::shape(extent::SMALL_3X3);
        let zeros = create_constant_grid(cols, rows, 0.0);
        let text = gravsoft_velocity_text(extent::SMALL_3X3, &zeros, &zeros, &zeros, cols);
        let input = write_test_file(dir.path(), "vel.txt", text);

        let mut opts = options(dir.path(), input);
        opts.gravsoft_out = Some(dir.path().join("missing").join("realigned.txt"));
        assert!(realign(&opts).is_err());

        assert!(!opts.horizontal.exists());
        assert!(!opts.vertical.exists());
        assert!(!dir.path().join("report.json").exists());
        // only the input remains
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unknown_inverse_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path(), dir.path().join("missing.txt"));
        opts.inverse = Some("cholesky".to_string());
        assert!(load_realign_config(&opts).is_err());
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), dir.path().join("missing.txt"));
        assert!(realign(&opts).is_err());
    }

    #[test]
    fn test_height_grid_from_gravsoft_source() {
        let dir = tempfile::tempdir().unwrap();
        let header = [55.0, 56.0, 10.0, 12.0, 1.0, 1.0];
        let source = write_test_file(
            dir.path(),
            "shift.txt",
            gravsoft_block(header, &create_constant_grid(3, 2, 0.25), 3),
        );
        let config = write_test_file(
            dir.path(),
            "mesh.yaml",
            "extent:\n  lat_min: 55.0\n  lat_max: 56.0\n  lon_min: 10.0\n  lon_max: 12.0\n  dlat: 0.5\n  dlon: 0.5\n",
        );

        let opts = HeightGridOptions {
            source,
            output: dir.path().join("dnn.gtx"),
            config: Some(config),
        };
        height_grid(&opts).unwrap();

        let (extent, layer) = gtx::decode(&std::fs::read(&opts.output).unwrap(), None).unwrap();
        assert_eq!(extent.shape(), (3, 5));
        assert!(layer.data.iter().all(|v| (*v + 0.25).abs() < 1e-6));
    }
}
