//! # monica_run
//!
//! Runs MONICA once for the documents in the current directory layout:
//! `../sim.json`, `site-soil-profile-from-db.json` and `../crop.json`,
//! patched with the example's output/include/climate paths, and prints the
//! decoded `run` result on stdout. Logs go to stderr.
//!
//! Every path and override can be changed with a flag; with no flags the
//! run matches the Hohenfinow2 example setup.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use monica_core::engine::{EchoEngine, ProcessEngine, SimulationEngine};
use monica_core::file_io::{DEFAULT_CROP_PATH, DEFAULT_SIM_PATH, DEFAULT_SITE_PATH};
use monica_core::output::write_result;
use monica_core::overrides::{
    DEFAULT_CLIMATE_CSV, DEFAULT_INCLUDE_FILE_BASE_PATH, DEFAULT_PATH_TO_OUTPUT, DEFAULT_SOIL_LAYER_ID,
    DEFAULT_SOIL_LAYER_INDEX,
};
use monica_core::{save_result, ConfigOverrides, InputPaths, RunError, RunPlan};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "monica_run", version)]
#[command(about = "Patch the sim/site/crop documents and run MONICA once")]
struct Cli {
    /// Simulation settings
    #[arg(long, default_value = DEFAULT_SIM_PATH)]
    sim: PathBuf,

    /// Site description with the soil profile
    #[arg(long, default_value = DEFAULT_SITE_PATH)]
    site: PathBuf,

    /// Crop rotation
    #[arg(long, default_value = DEFAULT_CROP_PATH)]
    crop: PathBuf,

    /// Value for the simulation's `path-to-output`
    #[arg(long, default_value = DEFAULT_PATH_TO_OUTPUT)]
    path_to_output: String,

    /// Value for the simulation's `include-file-base-path`
    #[arg(long, default_value = DEFAULT_INCLUDE_FILE_BASE_PATH)]
    include_file_base_path: String,

    /// Value for the simulation's `climate.csv`
    #[arg(long, default_value = DEFAULT_CLIMATE_CSV)]
    climate_csv: String,

    /// Zero-based index of the soil layer whose id is replaced
    #[arg(long, default_value_t = DEFAULT_SOIL_LAYER_INDEX)]
    soil_layer_index: usize,

    /// New id for that soil layer
    #[arg(long, default_value_t = DEFAULT_SOIL_LAYER_ID)]
    soil_layer_id: i64,

    /// Engine program; receives the request on stdin, answers on stdout
    #[arg(long, env = "MONICA_ENGINE", default_value = "monica-engine")]
    engine: PathBuf,

    /// Extra argument for the engine program (repeatable)
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Echo the request instead of running the engine
    #[arg(long)]
    dry_run: bool,

    /// Also save the result to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Show debug output
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn plan(&self) -> RunPlan {
        RunPlan::new(
            InputPaths {
                sim: self.sim.clone(),
                site: self.site.clone(),
                crop: self.crop.clone(),
            },
            ConfigOverrides {
                path_to_output: self.path_to_output.clone(),
                include_file_base_path: self.include_file_base_path.clone(),
                climate_csv: self.climate_csv.clone(),
                soil_layer_index: self.soil_layer_index,
                soil_layer_id: self.soil_layer_id,
            },
        )
    }

    fn engine(&self) -> Box<dyn SimulationEngine> {
        if self.dry_run {
            Box::new(EchoEngine)
        } else {
            Box::new(ProcessEngine::new(&self.engine).with_args(self.engine_args.iter().cloned()))
        }
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("monica_core=debug,monica_run=debug")
        } else {
            EnvFilter::new("monica_core=info,monica_run=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let engine = cli.engine();
    let result = cli.plan().execute(engine.as_ref())?;

    let pretty = !cli.compact;
    write_result(io::stdout().lock(), &result, pretty)?;

    if let Some(path) = &cli.output {
        save_result(&result, path, pretty)?;
        info!("Result saved to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.error_code(), e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
