//! # monica_core - MONICA Run Driver
//!
//! `monica_core` prepares a single run of the MONICA crop growth model: it
//! reads the simulation, site and crop JSON documents, applies a fixed set of
//! path and soil-layer overrides, submits the documents to a simulation
//! engine and decodes the engine's `run` result.
//!
//! The engine is not part of this crate. It is reached through the
//! [`engine::SimulationEngine`] trait, so it can be an external process, a
//! stub, or a closure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use monica_core::engine::ProcessEngine;
//! use monica_core::{ConfigOverrides, InputPaths, run_simulation};
//!
//! let engine = ProcessEngine::new("monica-engine");
//! let result = run_simulation(&InputPaths::default(), &ConfigOverrides::default(), &engine)?;
//! println!("{}", result);
//! # Ok::<(), monica_core::RunError>(())
//! ```
//!
//! ## Modules
//!
//! - [`documents`] - Typed sim/site/crop documents
//! - [`file_io`] - Loading documents, atomic result saves
//! - [`overrides`] - The override policy applied before submission
//! - [`engine`] - Engine trait, request/response mappings, adapters
//! - [`output`] - Decoding and printing the run result
//! - [`pipeline`] - The end-to-end run
//! - [`errors`] - Structured error types

pub mod documents;
pub mod engine;
pub mod errors;
pub mod file_io;
pub mod output;
pub mod overrides;
pub mod pipeline;

// Re-export commonly used types at crate root for convenience
pub use documents::{CropConfig, Documents, SimConfig, SiteConfig};
pub use engine::{EngineRequest, EngineResponse, SimulationEngine};
pub use errors::{RunError, RunResult};
pub use file_io::{load_documents, save_result, InputPaths};
pub use overrides::ConfigOverrides;
pub use pipeline::{run_simulation, RunPlan};
