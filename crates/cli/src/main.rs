//! Command-line front end for the Tomasulo out-of-order simulator.
//!
//! Loads a flat program image, runs the core to completion or a cycle
//! watchdog, and reports the simulated program's exit code (and,
//! optionally, performance statistics).

use std::{fs, process};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tomasulo_core::config::{Config, PredictorKind};
use tomasulo_core::Core;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PredictorArg {
    Gshare,
    GsharePlus,
}

#[derive(Parser, Debug)]
#[command(
    name = "tomasulo-sim",
    author,
    version,
    about = "Cycle-accurate out-of-order RISC-V-subset pipeline simulator"
)]
struct Cli {
    /// Flat binary program image (raw instruction words, little-endian,
    /// loaded at address 0).
    image: String,

    /// Optional JSON config file overriding the built-in defaults.
    #[arg(long)]
    config: Option<String>,

    /// Overrides the simulation cycle watchdog.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Prints performance statistics on exit.
    #[arg(long)]
    stats: bool,

    /// Overrides the configured branch predictor selection.
    #[arg(long, value_enum)]
    predictor: Option<PredictorArg>,

    /// Treats the exit code as the RISC-V compliance-test convention
    /// (`1 - ec`) instead of the raw value of `x3`.
    #[arg(long)]
    riscv_test: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("error reading config {path}: {e}");
                process::exit(1);
            });
            Config::from_json(&text).unwrap_or_else(|e| {
                eprintln!("error parsing config {path}: {e}");
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    if let Some(max_cycles) = cli.max_cycles {
        config.max_cycles = max_cycles;
    }
    if let Some(predictor) = cli.predictor {
        config.predictor = match predictor {
            PredictorArg::Gshare => PredictorKind::Gshare,
            PredictorArg::GsharePlus => PredictorKind::GsharePlus,
        };
    }

    let image = fs::read(&cli.image).unwrap_or_else(|e| {
        eprintln!("error reading image {}: {e}", cli.image);
        process::exit(1);
    });

    let mut core = Core::new(&config);
    core.load_image(&image);

    let max_cycles = config.max_cycles;
    if let Err(e) = core.run(max_cycles) {
        tracing::error!("fatal abort: {e}");
        process::exit(1);
    }

    if !core.has_exited() {
        eprintln!("simulation did not exit within {max_cycles} cycles");
        process::exit(1);
    }

    let exit_code = core.check_exit(cli.riscv_test);
    if cli.stats {
        print!("{}", core.stats().report());
    }

    process::exit(exit_code as i32);
}
