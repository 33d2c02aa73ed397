//! ITN Usage Prediction - Main Entry Point

use inference_engine::SimulationRunner;
use itn_pipeline::{init_logging, load_engine, parse_simulation_codes, PipelineConfig};
use std::path::PathBuf;
use storage::{FileRunStore, RunStore};
use tracing::info;
use trend_engine::TrendAggregator;

const USAGE: &str = "usage: itn-pipeline trends | itn-pipeline simulate <edu> <age> <residence> <attitude>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os("ITN_CONFIG").map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;
    init_logging(config.level())?;

    info!("=== ITN Usage Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("trends") => {
            let store = FileRunStore::open(&config.history_dir)?;
            let series = TrendAggregator::compute(&store.list_all()?);
            info!("Trend over {} recorded runs", series.len());
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
        Some("simulate") => {
            let codes = parse_simulation_codes(&args[1..])?;
            let engine = load_engine(&config)?;
            let label = SimulationRunner::new(&engine).simulate(codes)?;
            println!("{}", label);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
