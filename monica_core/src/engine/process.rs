use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use super::{EngineRequest, EngineResponse, SimulationEngine};
use crate::errors::{RunError, RunResult};

/// Engine backed by an external program.
///
/// The request mapping is written to the program's stdin as one JSON
/// document and stdin is closed; the program must print the response mapping
/// to stdout and exit with status 0. Its stderr is captured and reported when
/// it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEngine {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessEngine {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the program in `dir`, so relative paths in the documents resolve
    /// from there.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    fn failed(&self, reason: impl Into<String>) -> RunError {
        RunError::engine_failed(self.program.display().to_string(), reason)
    }
}

impl SimulationEngine for ProcessEngine {
    fn name(&self) -> &str {
        self.program.to_str().unwrap_or("process")
    }

    fn run(&self, request: &EngineRequest) -> RunResult<EngineResponse> {
        let payload = request.to_json()?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        debug!(program = %self.program.display(), args = ?self.args, bytes = payload.len(), "spawning engine");
        let mut child = command
            .spawn()
            .map_err(|e| self.failed(format!("could not start: {}", e)))?;

        // The request is fed from a second thread while this one drains
        // stdout/stderr; an engine that answers before reading all of its
        // input would otherwise block on a full pipe.
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(payload.as_bytes()),
            None => Err(io::Error::other("stdin was not captured")),
        });

        let output = child
            .wait_with_output()
            .map_err(|e| self.failed(format!("could not wait for exit: {}", e)))?;

        let write_result = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("request writer panicked")));

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if !output.status.success() {
            let reason = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}: {}", output.status, stderr)
            };
            return Err(self.failed(reason));
        }

        if let Err(e) = write_result {
            return Err(self.failed(format!("could not write request: {}", e)));
        }

        if !stderr.is_empty() {
            warn!(program = %self.program.display(), "engine stderr: {}", stderr);
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| self.failed(format!("response is not UTF-8: {}", e)))?;

        serde_json::from_str(&stdout)
            .map_err(|e| self.failed(format!("response is not a mapping with a string `run` field: {}", e)))
    }
}
