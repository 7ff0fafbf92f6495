//! # Run Pipeline
//!
//! One simulation run, start to finish:
//!
//! 1. load `sim`, `site` and `crop` documents
//! 2. apply [`ConfigOverrides`]
//! 3. serialize into an [`EngineRequest`] and hand it to the engine
//! 4. decode the `run` field of the response
//!
//! Any failure stops the run at that step. The engine is only called once
//! all documents have loaded and patched cleanly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use monica_core::engine::EchoEngine;
//! use monica_core::pipeline::RunPlan;
//!
//! let result = RunPlan::default().execute(&EchoEngine)?;
//! println!("{}", result);
//! # Ok::<(), monica_core::errors::RunError>(())
//! ```

use serde_json::Value;
use tracing::{debug, info};

use crate::engine::{EngineRequest, SimulationEngine};
use crate::errors::RunResult;
use crate::file_io::{load_documents, InputPaths};
use crate::output::decode_run;
use crate::overrides::ConfigOverrides;

/// Inputs and overrides for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    pub paths: InputPaths,
    pub overrides: ConfigOverrides,
}

impl RunPlan {
    pub fn new(paths: InputPaths, overrides: ConfigOverrides) -> Self {
        RunPlan { paths, overrides }
    }

    /// Load and patch the documents and build the engine request.
    pub fn prepare(&self) -> RunResult<EngineRequest> {
        let mut docs = load_documents(&self.paths)?;
        info!(
            start_date = %docs.sim.start_date,
            soil_layers = docs.soil_layer_count(),
            "loaded run documents"
        );

        self.overrides.apply(&mut docs)?;

        let request = EngineRequest::from_documents(&docs)?;
        debug!(bytes = request.payload_len(), "built engine request");
        Ok(request)
    }

    /// Run the whole pipeline against `engine` and return the decoded result.
    pub fn execute<E>(&self, engine: &E) -> RunResult<Value>
    where
        E: SimulationEngine + ?Sized,
    {
        let request = self.prepare()?;

        info!(engine = engine.name(), "running simulation");
        let response = engine.run(&request)?;
        debug!(bytes = response.run.len(), extra_fields = response.extra.len(), "engine responded");

        let result = decode_run(&response)?;
        info!(engine = engine.name(), "simulation finished");
        Ok(result)
    }
}

/// Convenience wrapper around [`RunPlan::execute`].
pub fn run_simulation<E>(paths: &InputPaths, overrides: &ConfigOverrides, engine: &E) -> RunResult<Value>
where
    E: SimulationEngine + ?Sized,
{
    RunPlan::new(paths.clone(), overrides.clone()).execute(engine)
}
