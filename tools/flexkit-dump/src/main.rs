//! Layout dump tool for the FlexKit layout engine.
//!
//! Provides commands for:
//! - Computing one fixture and printing its layout tree
//! - Running a directory of fixtures and writing a JSON report
//!
//! ## Usage
//!
//! ```bash
//! # Print the layout of a fixture at a given viewport
//! flexkit-dump layout fixtures/wrap_row.json --width 320 --direction rtl
//!
//! # Run a fixture suite
//! flexkit-dump run crates/flexkit-test/fixtures --report report.json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use flexkit_common::{init_logging, LogConfig};
use flexkit_layout::LayoutConfig;
use flexkit_style::Direction;
use flexkit_test::{Fixture, FixtureRunner, LayoutSnapshot};
use std::path::PathBuf;
use tracing::info;

mod dump;

#[derive(Parser)]
#[command(name = "flexkit-dump")]
#[command(about = "Compute and print FlexKit layouts")]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true, default_value = "compact")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Ltr,
    Rtl,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Ltr => Direction::Ltr,
            DirectionArg::Rtl => Direction::Rtl,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a fixture and print its layout tree
    Layout {
        /// Fixture file
        fixture: PathBuf,
        /// Available width (overrides the fixture)
        #[arg(long)]
        width: Option<f32>,
        /// Available height (overrides the fixture)
        #[arg(long)]
        height: Option<f32>,
        /// Root direction (overrides the fixture)
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
        /// Point scale factor; 0 disables rounding
        #[arg(long)]
        scale: Option<f32>,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every fixture in a directory
    Run {
        /// Fixture directory
        dir: PathBuf,
        /// Only run fixtures whose name contains this string
        #[arg(short, long)]
        filter: Option<String>,
        /// Output JSON report path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_names(&cli.log_level, &cli.log_format)?)?;

    match cli.command {
        Commands::Layout {
            fixture,
            width,
            height,
            direction,
            scale,
            json,
        } => {
            let mut fixture = Fixture::from_path(&fixture)?;
            if width.is_some() {
                fixture.available_width = width;
            }
            if height.is_some() {
                fixture.available_height = height;
            }
            if let Some(direction) = direction {
                fixture.direction = direction.into();
            }
            if let Some(scale) = scale {
                fixture.config = LayoutConfig {
                    point_scale_factor: scale,
                };
            }

            let (tree, root) = fixture.compute()?;
            if json {
                let snapshot = LayoutSnapshot::capture(&tree, root)?;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", dump::format_tree(&tree, root)?);
            }
        }

        Commands::Run {
            dir,
            filter,
            report,
        } => {
            let runner = FixtureRunner { filter };
            let summary = runner.run_all(&dir)?;

            for failure in summary.failures() {
                println!("FAIL {}", failure.name);
                if let Some(message) = &failure.message {
                    println!("  {}", message);
                }
                if let Some(diff) = &failure.diff {
                    print!("{}", diff);
                }
            }
            println!(
                "{} passed, {} failed, {} errors, {} skipped ({:.1}%)",
                summary.passed,
                summary.failed,
                summary.errors,
                summary.skipped,
                summary.pass_rate()
            );

            if let Some(report_path) = report {
                let json = serde_json::to_string_pretty(&summary)?;
                std::fs::write(&report_path, json)?;
                info!(path = %report_path.display(), "Report written");
            }

            if !summary.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
