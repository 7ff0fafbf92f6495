//! # File I/O Module
//!
//! Reading the three run documents and saving the decoded run result.
//!
//! - **Fail fast**: the first missing or malformed document aborts loading,
//!   so nothing reaches the engine.
//! - **Atomic saves**: results are written to `.tmp`, synced, then renamed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use monica_core::file_io::{load_documents, InputPaths};
//!
//! let docs = load_documents(&InputPaths::default())?;
//! println!("start date: {}", docs.sim.start_date);
//! # Ok::<(), monica_core::errors::RunError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::documents::{DocumentKind, Documents};
use crate::errors::{RunError, RunResult};
use crate::output::render_result;

/// Default location of the simulation settings
pub const DEFAULT_SIM_PATH: &str = "../sim.json";
/// Default location of the site description
pub const DEFAULT_SITE_PATH: &str = "site-soil-profile-from-db.json";
/// Default location of the crop rotation
pub const DEFAULT_CROP_PATH: &str = "../crop.json";

/// Where to read the three run documents from.
///
/// Relative paths resolve against the working directory, as the defaults
/// assume the driver is started from the site's `python/` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub sim: PathBuf,
    pub site: PathBuf,
    pub crop: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        InputPaths {
            sim: PathBuf::from(DEFAULT_SIM_PATH),
            site: PathBuf::from(DEFAULT_SITE_PATH),
            crop: PathBuf::from(DEFAULT_CROP_PATH),
        }
    }
}

impl InputPaths {
    /// Resolve the default relative paths against `dir` instead of the
    /// working directory.
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = InputPaths::default();
        InputPaths {
            sim: dir.join(defaults.sim),
            site: dir.join(defaults.site),
            crop: dir.join(defaults.crop),
        }
    }

    pub fn path_for(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Sim => &self.sim,
            DocumentKind::Site => &self.site,
            DocumentKind::Crop => &self.crop,
        }
    }
}

/// Read and parse one JSON document.
///
/// # Returns
///
/// * `Ok(T)` - Parsed document
/// * `Err(RunError::FileError)` - File missing or unreadable
/// * `Err(RunError::ParseError)` - Invalid JSON (including invalid UTF-8) or
///   a required field is missing
pub fn load_document<T: DeserializeOwned>(kind: DocumentKind, path: &Path) -> RunResult<T> {
    let contents = fs::read(path).map_err(|e| {
        RunError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    debug!(document = %kind, path = %path.display(), bytes = contents.len(), "read document");

    serde_json::from_slice(&contents)
        .map_err(|e| RunError::parse_error(kind.as_str(), path.display().to_string(), e.to_string()))
}

/// Load the simulation, site and crop documents, in that order.
pub fn load_documents(paths: &InputPaths) -> RunResult<Documents> {
    let sim = load_document(DocumentKind::Sim, &paths.sim)?;
    let site = load_document(DocumentKind::Site, &paths.site)?;
    let crop = load_document(DocumentKind::Crop, &paths.crop)?;
    Ok(Documents { sim, site, crop })
}

/// Save a decoded run result to a file with atomic write semantics.
///
/// 1. Render the result as JSON
/// 2. Write to `<path>.tmp` and sync it to disk
/// 3. Rename over `path`
pub fn save_result(result: &Value, path: &Path, pretty: bool) -> RunResult<()> {
    let mut text = render_result(result, pretty)?;
    text.push('\n');

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        RunError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(text.as_bytes()).map_err(|e| {
        RunError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        RunError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        RunError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = text.len(), "saved run result");
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
