//! CLI entry point: `cagra-build <config.json>`.

use std::process::ExitCode;

use cagra_builder::config::{BuildConfig, KnngFormat};
use cagra_builder::graph::FixedDegreeGraph;
use cagra_builder::{Builder, GraphInfo};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cagra-build", about = "Build a CAGRA fixed-degree graph from a precomputed KNNG")]
struct Args {
    /// Path to the JSON build configuration.
    config: std::path::PathBuf,
}

fn run() -> Result<(), cagra_builder::Error> {
    let args = Args::parse();
    let config = BuildConfig::load(&args.config)?;

    let knng = match config.knng_format {
        KnngFormat::Efanna => FixedDegreeGraph::load_knng(&config.knng_path)?,
        KnngFormat::Fbin => FixedDegreeGraph::load_knng_fbin(&config.knng_path)?,
    };

    let info = GraphInfo {
        n: knng.node_count(),
        r: config.r,
        r_init: config.r_init,
        r_knng: knng.degree(),
    };

    let builder = Builder::new(info)?;
    let graph = builder.build(knng)?;
    graph.save_nsg(&config.save_path)?;

    log::info!("saved graph to {}", config.save_path.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cagra-build: {e}");
            ExitCode::FAILURE
        }
    }
}
