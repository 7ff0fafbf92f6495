//! # Run Documents
//!
//! A MONICA run is described by three JSON documents: the simulation
//! settings, the site (soil profile and site parameters) and the crop
//! rotation. Only the fields the driver overrides are typed here; every other
//! key is kept in an `extra` map and written back unchanged.
//!
//! ```text
//! Documents
//! ├── sim: SimConfig      (start-date, output/include/climate paths, ...)
//! ├── site: SiteConfig
//! │   └── SiteParameters
//! │       └── SoilProfileParameters: [SoilLayer { id?, ... }, ...]
//! └── crop: CropConfig    (opaque, passed through)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use monica_core::documents::SiteConfig;
//!
//! let site: SiteConfig = serde_json::from_str(
//!     r#"{"SiteParameters": {"Latitude": 52.8, "SoilProfileParameters": [{"Thickness": 0.3}]}}"#,
//! ).unwrap();
//! assert_eq!(site.site_parameters.soil_profile_parameters.len(), 1);
//! assert_eq!(site.site_parameters.extra["Latitude"], 52.8);
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format of `start-date`. Zero padding is optional when parsing.
pub const START_DATE_FORMAT: &str = "%Y-%m-%d";

/// Which of the three run documents a value or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Sim,
    Site,
    Crop,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Sim => "sim",
            DocumentKind::Site => "site",
            DocumentKind::Crop => "crop",
        }
    }

    /// Key under which this document travels in the engine request.
    pub fn request_key(&self) -> &'static str {
        match self {
            DocumentKind::Sim => "sim-json-str",
            DocumentKind::Site => "site-json-str",
            DocumentKind::Crop => "crop-json-str",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulation settings (`sim.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// First simulated day, kept as written (`1991-1-1` stays `1991-1-1`)
    #[serde(rename = "start-date", deserialize_with = "iso_date_string")]
    pub start_date: String,

    /// Directory the engine writes its output files to
    #[serde(rename = "path-to-output")]
    pub path_to_output: String,

    /// Base directory for `include-from-file` references
    #[serde(rename = "include-file-base-path")]
    pub include_file_base_path: String,

    /// Climate data CSV file
    #[serde(rename = "climate.csv")]
    pub climate_csv: String,

    /// All remaining simulation keys, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SimConfig {
    /// `start-date` as a calendar date. Validated on load.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, START_DATE_FORMAT).ok()
    }
}

fn iso_date_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&text, START_DATE_FORMAT)
        .map_err(|e| de::Error::custom(format!("invalid start-date '{}': {}", text, e)))?;
    Ok(text)
}

/// Site description (`site-soil-profile-from-db.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(rename = "SiteParameters")]
    pub site_parameters: SiteParameters,

    /// Environment, soil moisture/organic/transport parameter blocks etc.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteParameters {
    /// Soil layers, topmost first
    #[serde(rename = "SoilProfileParameters")]
    pub soil_profile_parameters: Vec<SoilLayer>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One layer of the soil profile.
///
/// The `id` is whatever JSON the layer carries. `None` means the key is
/// absent, `Some(Value::Null)` an explicit `null`; both are written back
/// as they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Only called when the key exists, so `null` becomes `Some(Value::Null)`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Crop rotation and crop parameters (`crop.json`), passed through as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropConfig(pub Map<String, Value>);

/// The three documents of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documents {
    pub sim: SimConfig,
    pub site: SiteConfig,
    pub crop: CropConfig,
}

impl Documents {
    /// Number of layers in the site's soil profile.
    pub fn soil_layer_count(&self) -> usize {
        self.site.site_parameters.soil_profile_parameters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_sim() -> Value {
        json!({
            "start-date": "1991-01-01",
            "end-date": "1997-12-31",
            "use-leap-years": true,
            "path-to-output": "./",
            "include-file-base-path": "C:/monica-parameters/",
            "climate.csv": "climate.csv",
            "climate.csv-options": {"csv-separator": ",", "no-of-climate-file-header-lines": 2},
            "output": {"events": ["daily", ["Date", "Crop", "Yield"]]}
        })
    }

    #[test]
    fn test_sim_typed_fields() {
        let sim: SimConfig = serde_json::from_value(sample_sim()).unwrap();
        assert_eq!(sim.start_date, "1991-01-01");
        assert_eq!(sim.start_date(), NaiveDate::from_ymd_opt(1991, 1, 1));
        assert_eq!(sim.path_to_output, "./");
        assert_eq!(sim.climate_csv, "climate.csv");
        assert!(sim.extra.contains_key("climate.csv-options"));
        assert!(!sim.extra.contains_key("climate.csv"));
    }

    #[test]
    fn test_sim_is_written_back_unchanged() {
        let original = sample_sim();
        let sim: SimConfig = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&sim).unwrap(), original);
    }

    #[test]
    fn test_sim_requires_start_date() {
        let mut value = sample_sim();
        value.as_object_mut().unwrap().remove("start-date");
        assert!(serde_json::from_value::<SimConfig>(value).is_err());
    }

    #[test]
    fn test_sim_rejects_bad_start_date() {
        let mut value = sample_sim();
        value["start-date"] = json!("1991-13-45");
        assert!(serde_json::from_value::<SimConfig>(value).is_err());
    }

    #[test]
    fn test_soil_layer_without_id_stays_without_id() {
        let original = json!({
            "SiteParameters": {
                "Latitude": 52.80,
                "Slope": 0,
                "SoilProfileParameters": [
                    {"Thickness": [0.3, "m"], "KA5TextureClass": "Sl2"},
                    {"id": 7, "Thickness": 0.1, "SoilOrganicCarbon": [0.8, "%"]}
                ]
            },
            "SoilMoistureParameters": {}
        });
        let site: SiteConfig = serde_json::from_value(original.clone()).unwrap();
        let layers = &site.site_parameters.soil_profile_parameters;
        assert_eq!(layers[0].id, None);
        assert_eq!(layers[1].id, Some(json!(7)));
        assert_eq!(serde_json::to_value(&site).unwrap(), original);
    }

    #[test]
    fn test_site_requires_soil_profile() {
        let value = json!({"SiteParameters": {"Latitude": 52.8}});
        assert!(serde_json::from_value::<SiteConfig>(value).is_err());
    }

    #[test]
    fn test_crop_passthrough() {
        let original = json!({"crops": {"WW": {"is-winter-crop": true}}, "cropRotation": []});
        let crop: CropConfig = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&crop).unwrap(), original);
    }

    #[test]
    fn test_document_kind_keys() {
        assert_eq!(DocumentKind::Sim.request_key(), "sim-json-str");
        assert_eq!(DocumentKind::Site.request_key(), "site-json-str");
        assert_eq!(DocumentKind::Crop.request_key(), "crop-json-str");
        assert_eq!(DocumentKind::Crop.to_string(), "crop");
    }

    fn round_trip_site(text: &str) -> Value {
        let site: SiteConfig = serde_json::from_str(text).unwrap();
        serde_json::from_str(&serde_json::to_string(&site).unwrap()).unwrap()
    }

    #[test]
    fn test_null_layer_id_is_kept() {
        let text = r#"{"SiteParameters": {"SoilProfileParameters": [{"id": null, "Thickness": 0.3}, {"Thickness": 0.1}]}}"#;
        let site: SiteConfig = serde_json::from_str(text).unwrap();
        let layers = &site.site_parameters.soil_profile_parameters;
        assert_eq!(layers[0].id, Some(Value::Null));
        assert_eq!(layers[1].id, None);
        assert_eq!(round_trip_site(text), serde_json::from_str::<Value>(text).unwrap());
    }

    #[test]
    fn test_non_integer_layer_ids_load_and_round_trip() {
        let text = r#"{"SiteParameters": {"SoilProfileParameters": [
            {"id": "top", "Thickness": 0.3},
            {"id": 1.0},
            {"id": 18446744073709551615},
            {"id": [1, "a"]},
            {"id": {"profile": 7, "layer": 2}}
        ]}}"#;
        let site: SiteConfig = serde_json::from_str(text).unwrap();
        let layers = &site.site_parameters.soil_profile_parameters;
        assert_eq!(layers[0].id, Some(json!("top")));
        assert_eq!(layers[2].id, Some(json!(u64::MAX)));
        assert_eq!(round_trip_site(text), serde_json::from_str::<Value>(text).unwrap());
    }

    #[test]
    fn test_unpadded_start_date_is_written_back_as_is() {
        let mut value = sample_sim();
        value["start-date"] = json!("1991-1-1");
        let sim: SimConfig = serde_json::from_value(value).unwrap();
        assert_eq!(sim.start_date(), NaiveDate::from_ymd_opt(1991, 1, 1));

        let text = serde_json::to_string(&sim).unwrap();
        assert!(text.contains(r#""start-date":"1991-1-1""#));
    }

    #[test]
    fn test_extreme_numbers_round_trip() {
        let text = r#"{
            "SiteParameters": {
                "Latitude": 52.80000000000001,
                "Tiny": 5e-324,
                "Huge": 1.7976931348623157e308,
                "Sum": 0.30000000000000004,
                "MinInt": -9223372036854775808,
                "MaxUint": 18446744073709551615,
                "SoilProfileParameters": [{"Thickness": 0.1}, {"SoilOrganicCarbon": 2.2250738585072014e-308}]
            },
            "NDeposition": [30, "kg N ha-1 y-1"]
        }"#;
        let original: Value = serde_json::from_str(text).unwrap();
        let round_tripped = round_trip_site(text);
        assert_eq!(round_tripped, original);
        assert_eq!(round_tripped["SiteParameters"]["MinInt"], i64::MIN);
        assert_eq!(round_tripped["SiteParameters"]["Sum"], 0.30000000000000004);
    }
}
