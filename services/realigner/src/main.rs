//! Velocity-grid realignment tool.
//!
//! Realigns the NKG_RF03 velocity model to ETRF2000 and writes PROJ-readable
//! grids:
//! - `realign`: Gravsoft N/E/U grid in, CTable2 (N, E) and GTX (U) out
//! - `height-grid`: sample a height-shift grid onto a regular mesh as GTX

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use velocity_grid::{DEFAULT_HORIZONTAL_FILE, DEFAULT_VERTICAL_FILE};

#[derive(Parser, Debug)]
#[command(name = "realigner")]
#[command(about = "Realign NEU velocity grids between reference frames")]
struct Args {
    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Realign a velocity grid and export CTable2 + GTX grids
    Realign(RealignArgs),
    /// Sample a height-shift grid and export it as GTX
    HeightGrid(HeightGridArgs),
}

#[derive(clap::Args, Debug)]
struct RealignArgs {
    /// Gravsoft velocity grid (North, East, Up blocks)
    #[arg(short, long, env = "REALIGN_INPUT", default_value = "data/nkgrf03vel.01")]
    input: PathBuf,

    /// Directory for the exported grids
    #[arg(short, long, env = "REALIGN_OUTPUT_DIR", default_value = "../resources")]
    output_dir: PathBuf,

    /// File name of the horizontal CTable2 grid
    #[arg(long, default_value = DEFAULT_HORIZONTAL_FILE)]
    horizontal: String,

    /// File name of the vertical GTX grid
    #[arg(long, default_value = DEFAULT_VERTICAL_FILE)]
    vertical: String,

    /// YAML realignment configuration (defaults: NKG_RF03 to ETRF2000)
    #[arg(short, long, env = "REALIGN_CONFIG")]
    config: Option<PathBuf>,

    /// Inverse used from XYZ back to NEU ("transpose" or "solve")
    #[arg(long)]
    inverse: Option<String>,

    /// Process rows on a single thread
    #[arg(long)]
    sequential: bool,

    /// Fail when realigned rates exceed the configured magnitude limit
    #[arg(long)]
    strict: bool,

    /// Also write the realigned grid as Gravsoft text
    #[arg(long)]
    gravsoft_out: Option<PathBuf>,

    /// Write the statistics report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct HeightGridArgs {
    /// Single-block Gravsoft grid with the height shift (meters)
    #[arg(short, long, env = "HEIGHT_SOURCE")]
    source: PathBuf,

    /// Output GTX file
    #[arg(short, long, default_value = "dnn.gtx")]
    output: PathBuf,

    /// YAML mesh configuration (defaults: Denmark, 0.002 degrees)
    #[arg(short, long, env = "HEIGHT_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!("Starting realigner");

    match args.command {
        Command::Realign(realign) => commands::realign(&realign.into()),
        Command::HeightGrid(height) => commands::height_grid(&height.into()),
    }
}

impl From<RealignArgs> for commands::RealignOptions {
    fn from(args: RealignArgs) -> Self {
        Self {
            horizontal: args.output_dir.join(&args.horizontal),
            vertical: args.output_dir.join(&args.vertical),
            input: args.input,
            config: args.config,
            inverse: args.inverse,
            sequential: args.sequential,
            strict: args.strict,
            gravsoft_out: args.gravsoft_out,
            report_json: args.report_json,
        }
    }
}

impl From<HeightGridArgs> for commands::HeightGridOptions {
    fn from(args: HeightGridArgs) -> Self {
        Self {
            source: args.source,
            output: args.output,
            config: args.config,
        }
    }
}
