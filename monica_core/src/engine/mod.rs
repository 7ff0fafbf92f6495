//! # Simulation Engine Boundary
//!
//! The simulation itself runs outside this crate. A run is handed over as one
//! request mapping holding the three documents as JSON strings, and the
//! engine answers with a mapping whose `run` field is again a JSON string.
//!
//! ```text
//! { "sim-json-str": "...", "site-json-str": "...", "crop-json-str": "..." }
//!                          │
//!                  SimulationEngine::run
//!                          ▼
//! { "run": "<json>", ... }
//! ```
//!
//! Implementations:
//! - [`EchoEngine`] - answers with the request itself (dry runs, tests)
//! - [`ProcessEngine`] - pipes the request through an external program
//! - any `Fn(&EngineRequest) -> RunResult<EngineResponse>`

mod echo;
mod process;

pub use echo::EchoEngine;
pub use process::ProcessEngine;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::documents::{DocumentKind, Documents};
use crate::errors::{RunError, RunResult};

/// The request mapping submitted to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRequest {
    #[serde(rename = "sim-json-str")]
    pub sim_json_str: String,
    #[serde(rename = "site-json-str")]
    pub site_json_str: String,
    #[serde(rename = "crop-json-str")]
    pub crop_json_str: String,
}

impl EngineRequest {
    /// Serialize the three documents into a request.
    pub fn from_documents(docs: &Documents) -> RunResult<Self> {
        Ok(EngineRequest {
            sim_json_str: to_json_str(DocumentKind::Sim, &docs.sim)?,
            site_json_str: to_json_str(DocumentKind::Site, &docs.site)?,
            crop_json_str: to_json_str(DocumentKind::Crop, &docs.crop)?,
        })
    }

    pub fn document(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Sim => &self.sim_json_str,
            DocumentKind::Site => &self.site_json_str,
            DocumentKind::Crop => &self.crop_json_str,
        }
    }

    /// The request mapping itself as a JSON string.
    pub fn to_json(&self) -> RunResult<String> {
        serde_json::to_string(self).map_err(|e| RunError::serialization(e.to_string()))
    }

    /// Total size of the three embedded documents in bytes.
    pub fn payload_len(&self) -> usize {
        self.sim_json_str.len() + self.site_json_str.len() + self.crop_json_str.len()
    }
}

fn to_json_str<T: Serialize>(kind: DocumentKind, doc: &T) -> RunResult<String> {
    serde_json::to_string(doc).map_err(|e| RunError::serialization(format!("{} document: {}", kind, e)))
}

/// The response mapping returned by the engine.
///
/// Only `run` is required; anything else the engine sends back is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
    /// Serialized run result
    pub run: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngineResponse {
    pub fn new(run: impl Into<String>) -> Self {
        EngineResponse {
            run: run.into(),
            extra: Map::new(),
        }
    }
}

/// A blocking simulation capability.
///
/// One call per run, no timeout and no retry; whatever goes wrong is
/// reported through the returned error.
pub trait SimulationEngine {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str {
        "engine"
    }

    fn run(&self, request: &EngineRequest) -> RunResult<EngineResponse>;
}

impl<F> SimulationEngine for F
where
    F: Fn(&EngineRequest) -> RunResult<EngineResponse>,
{
    fn name(&self) -> &str {
        "closure"
    }

    fn run(&self, request: &EngineRequest) -> RunResult<EngineResponse> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_documents() -> Documents {
        serde_json::from_value(json!({
            "sim": {
                "start-date": "1991-01-01",
                "path-to-output": ".",
                "include-file-base-path": "../../../",
                "climate.csv": "../climate.csv"
            },
            "site": {"SiteParameters": {"SoilProfileParameters": [{"id": 1}, {"id": 2}]}},
            "crop": {"cropRotation": [{"worksteps": []}]}
        }))
        .unwrap()
    }

    #[test]
    fn test_request_embeds_documents_as_strings() {
        let docs = sample_documents();
        let request = EngineRequest::from_documents(&docs).unwrap();

        let sim: Value = serde_json::from_str(request.document(DocumentKind::Sim)).unwrap();
        assert_eq!(sim, serde_json::to_value(&docs.sim).unwrap());
        let crop: Value = serde_json::from_str(&request.crop_json_str).unwrap();
        assert_eq!(crop, json!({"cropRotation": [{"worksteps": []}]}));
        assert_eq!(
            request.payload_len(),
            request.sim_json_str.len() + request.site_json_str.len() + request.crop_json_str.len()
        );
    }

    #[test]
    fn test_request_wire_keys() {
        let request = EngineRequest::from_documents(&sample_documents()).unwrap();
        let wire: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        let keys: Vec<&str> = wire.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["sim-json-str", "site-json-str", "crop-json-str"]);
        assert!(wire["site-json-str"].is_string());
    }

    #[test]
    fn test_response_keeps_extra_fields() {
        let response: EngineResponse =
            serde_json::from_str(r#"{"run": "[]", "customId": 7, "errors": []}"#).unwrap();
        assert_eq!(response.run, "[]");
        assert_eq!(response.extra["customId"], 7);
    }

    #[test]
    fn test_response_requires_run() {
        assert!(serde_json::from_str::<EngineResponse>(r#"{"errors": ["no climate data"]}"#).is_err());
        assert!(serde_json::from_str::<EngineResponse>(r#"{"run": {"not": "a string"}}"#).is_err());
    }

    #[test]
    fn test_closure_is_an_engine() {
        let engine = |request: &EngineRequest| -> RunResult<EngineResponse> {
            Ok(EngineResponse::new(request.crop_json_str.clone()))
        };
        let request = EngineRequest::from_documents(&sample_documents()).unwrap();
        let response = SimulationEngine::run(&engine, &request).unwrap();
        assert_eq!(response.run, request.crop_json_str);
        assert_eq!(engine.name(), "closure");
    }
}
