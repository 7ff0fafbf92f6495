use tracing::debug;

use super::{EngineRequest, EngineResponse, SimulationEngine};
use crate::errors::RunResult;

/// Engine that answers every request with the request itself under `run`.
///
/// Useful for checking what would be submitted without running a
/// simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoEngine;

impl SimulationEngine for EchoEngine {
    fn name(&self) -> &str {
        "echo"
    }

    fn run(&self, request: &EngineRequest) -> RunResult<EngineResponse> {
        let run = request.to_json()?;
        debug!(bytes = run.len(), "echoing request");
        Ok(EngineResponse::new(run))
    }
}
