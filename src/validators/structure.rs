use crate::error::{Result, UploaderError};
use crate::manifest::Manifest;
use serde_json::Value;
use tracing::{info, warn};

/// Validates a decoded document against the JSON schema declared for its
/// data type in the manifest.
pub struct StructuralValidator<'a> {
    manifest: &'a Manifest,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(manifest: &'a Manifest) -> Self {
        Self { manifest }
    }

    /// Check `document` against the data type's declared schema.
    ///
    /// A data type with no schema passes with a warning; skipping the
    /// structural check is deliberate policy, not a failure. On mismatch
    /// the error carries the instance path of the first violation so the
    /// failure can be located without re-running.
    pub fn check(&self, document: &Value, data_type: &str) -> Result<()> {
        let spec =
            self.manifest
                .spec_for(data_type)
                .ok_or_else(|| UploaderError::UnknownDataType {
                    data_type: data_type.to_string(),
                })?;

        let Some(schema) = &spec.schema else {
            warn!("No schema defined for {data_type}, skipping structure validation");
            return Ok(());
        };

        let validator =
            jsonschema::validator_for(schema).map_err(|e| UploaderError::MalformedManifest {
                path: format!("dataTypes.{data_type}.schema"),
                reason: e.to_string(),
            })?;

        if let Some(violation) = validator.iter_errors(document).next() {
            let path = violation.instance_path.to_string();
            let message = violation.to_string();
            return Err(UploaderError::SchemaMismatch { message, path });
        }

        info!("Structure validation passed for {data_type}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest_with_schema() -> Manifest {
        let doc = json!({
            "dataTypes": {
                "observations": {
                    "endpoint": "/api/upload/observations",
                    "schema": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "stid": {"type": "string"},
                                "variable": {"type": "string"}
                            },
                            "required": ["stid", "variable"]
                        }
                    }
                },
                "outlooks": {
                    "endpoint": "/api/upload/outlooks"
                }
            }
        });
        Manifest::parse(&doc.to_string(), "test").unwrap()
    }

    #[test]
    fn test_conforming_document_passes() {
        let manifest = manifest_with_schema();
        let validator = StructuralValidator::new(&manifest);
        let doc = json!([{"stid": "KSLC", "variable": "air_temp"}]);
        assert!(validator.check(&doc, "observations").is_ok());
    }

    #[test]
    fn test_missing_required_field_fails_with_path() {
        let manifest = manifest_with_schema();
        let validator = StructuralValidator::new(&manifest);
        let doc = json!([{"stid": "KSLC", "variable": "air_temp"}, {"stid": "KPVU"}]);
        match validator.check(&doc, "observations").unwrap_err() {
            UploaderError::SchemaMismatch { message, path } => {
                assert!(!path.is_empty());
                assert!(path.contains('1'), "path should point at the bad entry: {path}");
                assert!(!message.is_empty());
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_schema_passes() {
        let manifest = manifest_with_schema();
        let validator = StructuralValidator::new(&manifest);
        let doc = json!({"anything": "goes"});
        assert!(validator.check(&doc, "outlooks").is_ok());
    }

    #[test]
    fn test_unknown_data_type_fails() {
        let manifest = manifest_with_schema();
        let validator = StructuralValidator::new(&manifest);
        let err = validator.check(&json!([]), "forecasts").unwrap_err();
        assert!(matches!(err, UploaderError::UnknownDataType { .. }));
    }
}
