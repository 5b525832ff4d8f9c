use crate::error::{Result, UploaderError};
use crate::utils::constants::{DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_RECORDS};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Validation rules for a single data type.
///
/// Every field is optional in the manifest document; missing fields fall
/// back to the documented defaults (10MB, 50,000 records, no required
/// variables, no unit mapping).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRules {
    pub max_file_size: String,
    pub max_records: usize,
    pub required_variables: HashSet<String>,
    pub unit_mapping: HashMap<String, String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE.to_string(),
            max_records: DEFAULT_MAX_RECORDS,
            required_variables: HashSet::new(),
            unit_mapping: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilenameSpec {
    #[serde(default)]
    pub pattern: String,
}

/// Manifest entry describing one data type: where it uploads, what shape
/// it must have, and which validation rules apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeSpec {
    pub endpoint: String,

    /// JSON schema for structural validation. Absent means the structural
    /// check is skipped (logged as a warning, never a failure).
    #[serde(default)]
    pub schema: Option<Value>,

    #[serde(default)]
    pub validation: ValidationRules,

    #[serde(default)]
    pub filename: FilenameSpec,
}

/// The data manifest: an ordered mapping from data-type name to spec.
///
/// Loaded once per invocation and immutable thereafter. Validators and the
/// upload client borrow it; nothing holds a global reference.
#[derive(Debug, Clone)]
pub struct Manifest {
    version: String,
    types: Vec<(String, DataTypeSpec)>,
}

impl Manifest {
    /// Load and parse the manifest document from disk.
    ///
    /// A missing file or unparseable document is fatal to the invocation;
    /// there is no partial-manifest mode.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a manifest from its JSON text. `origin` names the source in
    /// error messages (a file path in production, a label in tests).
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let doc: Value =
            serde_json::from_str(content).map_err(|e| UploaderError::MalformedManifest {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;

        let version = doc
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let mut types = Vec::new();
        if let Some(data_types) = doc.get("dataTypes") {
            let map = data_types
                .as_object()
                .ok_or_else(|| UploaderError::MalformedManifest {
                    path: origin.to_string(),
                    reason: "dataTypes must be an object".to_string(),
                })?;

            // serde_json is built with preserve_order, so iteration here
            // follows declaration order in the document.
            for (name, spec) in map {
                let spec: DataTypeSpec = serde_json::from_value(spec.clone()).map_err(|e| {
                    UploaderError::MalformedManifest {
                        path: origin.to_string(),
                        reason: format!("dataTypes.{name}: {e}"),
                    }
                })?;
                types.push((name.clone(), spec));
            }
        }

        Ok(Self { version, types })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up the spec for a data type. `None` is a lookup miss, not an
    /// error; callers turn it into `UnknownDataType` where appropriate.
    pub fn spec_for(&self, data_type: &str) -> Option<&DataTypeSpec> {
        self.types
            .iter()
            .find(|(name, _)| name == data_type)
            .map(|(_, spec)| spec)
    }

    /// All known data-type names, in manifest declaration order.
    pub fn known_data_types(&self) -> Vec<&str> {
        self.types.iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "1.2",
        "dataTypes": {
            "observations": {
                "endpoint": "/api/upload/observations",
                "validation": {
                    "maxFileSize": "5MB",
                    "maxRecords": 1000,
                    "requiredVariables": ["air_temp"],
                    "unitMapping": {"air_temp": "Celsius"}
                },
                "filename": {"pattern": "obs_YYYYMMDD_HHmmZ.json"}
            },
            "images": {
                "endpoint": "/api/upload/images"
            }
        }
    }"#;

    #[test]
    fn test_parse_sample_manifest() {
        let manifest = Manifest::parse(SAMPLE, "test").unwrap();
        assert_eq!(manifest.version(), "1.2");

        let spec = manifest.spec_for("observations").unwrap();
        assert_eq!(spec.endpoint, "/api/upload/observations");
        assert_eq!(spec.validation.max_file_size, "5MB");
        assert_eq!(spec.validation.max_records, 1000);
        assert!(spec.validation.required_variables.contains("air_temp"));
        assert_eq!(spec.filename.pattern, "obs_YYYYMMDD_HHmmZ.json");
    }

    #[test]
    fn test_defaults_applied_when_validation_absent() {
        let manifest = Manifest::parse(SAMPLE, "test").unwrap();
        let spec = manifest.spec_for("images").unwrap();
        assert_eq!(spec.validation.max_file_size, "10MB");
        assert_eq!(spec.validation.max_records, 50_000);
        assert!(spec.validation.required_variables.is_empty());
        assert!(spec.schema.is_none());
        assert_eq!(spec.filename.pattern, "");
    }

    #[test]
    fn test_unknown_data_type_is_lookup_miss() {
        let manifest = Manifest::parse(SAMPLE, "test").unwrap();
        assert!(manifest.spec_for("forecasts").is_none());
    }

    #[test]
    fn test_declaration_order_preserved() {
        let manifest = Manifest::parse(SAMPLE, "test").unwrap();
        assert_eq!(manifest.known_data_types(), vec!["observations", "images"]);
    }

    #[test]
    fn test_malformed_manifest_is_fatal() {
        let err = Manifest::parse("{not json", "test").unwrap_err();
        assert!(matches!(err, UploaderError::MalformedManifest { .. }));
    }

    #[test]
    fn test_data_types_must_be_object() {
        let err = Manifest::parse(r#"{"dataTypes": []}"#, "test").unwrap_err();
        assert!(matches!(err, UploaderError::MalformedManifest { .. }));
    }
}
