//! # Run Overrides
//!
//! The fixed set of edits applied to the loaded documents before they are
//! submitted: three path fields of the simulation settings and the id of one
//! soil layer. The defaults reproduce the Hohenfinow2 example setup, where
//! the driver runs from the site directory two levels below the parameter
//! tree and the climate file sits one level up.

use serde_json::Value;
use tracing::debug;

use crate::documents::Documents;
use crate::errors::{RunError, RunResult};

/// Default output directory handed to the engine
pub const DEFAULT_PATH_TO_OUTPUT: &str = ".";
/// Default base path for parameter includes
pub const DEFAULT_INCLUDE_FILE_BASE_PATH: &str = "../../../";
/// Default climate data file
pub const DEFAULT_CLIMATE_CSV: &str = "../climate.csv";
/// Soil layer whose id is replaced (zero-based, i.e. the second layer)
pub const DEFAULT_SOIL_LAYER_INDEX: usize = 1;
/// Id assigned to that layer
pub const DEFAULT_SOIL_LAYER_ID: i64 = 2;

/// Field overrides applied to the simulation and site documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `sim["path-to-output"]`
    pub path_to_output: String,
    /// Replaces `sim["include-file-base-path"]`
    pub include_file_base_path: String,
    /// Replaces `sim["climate.csv"]`
    pub climate_csv: String,
    /// Zero-based index into `site["SiteParameters"]["SoilProfileParameters"]`
    pub soil_layer_index: usize,
    /// New `id` of that soil layer
    pub soil_layer_id: i64,
}

impl Default for ConfigOverrides {
    fn default() -> Self {
        ConfigOverrides {
            path_to_output: DEFAULT_PATH_TO_OUTPUT.to_string(),
            include_file_base_path: DEFAULT_INCLUDE_FILE_BASE_PATH.to_string(),
            climate_csv: DEFAULT_CLIMATE_CSV.to_string(),
            soil_layer_index: DEFAULT_SOIL_LAYER_INDEX,
            soil_layer_id: DEFAULT_SOIL_LAYER_ID,
        }
    }
}

impl ConfigOverrides {
    /// Apply the overrides in place.
    ///
    /// The soil layer is checked first, so a profile that is too short
    /// leaves the documents untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use monica_core::documents::Documents;
    /// use monica_core::overrides::ConfigOverrides;
    ///
    /// let mut docs: Documents = serde_json::from_value(serde_json::json!({
    ///     "sim": {"start-date": "1991-01-01", "path-to-output": "./",
    ///             "include-file-base-path": "/p/", "climate.csv": "c.csv"},
    ///     "site": {"SiteParameters": {"SoilProfileParameters": [{}, {"id": 9}]}},
    ///     "crop": {}
    /// })).unwrap();
    ///
    /// ConfigOverrides::default().apply(&mut docs)?;
    /// assert_eq!(docs.sim.climate_csv, "../climate.csv");
    /// assert_eq!(docs.site.site_parameters.soil_profile_parameters[1].id, Some(2.into()));
    /// # Ok::<(), monica_core::errors::RunError>(())
    /// ```
    pub fn apply(&self, docs: &mut Documents) -> RunResult<()> {
        let layers = &mut docs.site.site_parameters.soil_profile_parameters;
        let len = layers.len();
        let layer = layers
            .get_mut(self.soil_layer_index)
            .ok_or_else(|| RunError::soil_layer_out_of_range(self.soil_layer_index, len))?;
        layer.id = Some(Value::from(self.soil_layer_id));

        let sim = &mut docs.sim;
        sim.path_to_output = self.path_to_output.clone();
        sim.include_file_base_path = self.include_file_base_path.clone();
        sim.climate_csv = self.climate_csv.clone();

        debug!(
            path_to_output = %sim.path_to_output,
            include_file_base_path = %sim.include_file_base_path,
            climate_csv = %sim.climate_csv,
            soil_layer_index = self.soil_layer_index,
            soil_layer_id = self.soil_layer_id,
            "applied overrides"
        );
        Ok(())
    }
}
