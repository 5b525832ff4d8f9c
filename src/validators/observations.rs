use crate::error::{Result, UploaderError};
use crate::manifest::ValidationRules;
use crate::utils::constants::MISSING_VARS_LOG_CAP;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

/// Lenient view of one observation record. Only these three fields are
/// semantically inspected; everything else passes through untouched.
#[derive(Debug, Deserialize)]
struct ObservationRecord {
    #[serde(default)]
    stid: Option<String>,
    #[serde(default)]
    variable: Option<String>,
    #[serde(default)]
    units: Option<String>,
}

/// Advisory finding from the domain check. Warnings are reported but never
/// block an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationWarning {
    UnitMismatch {
        stid: String,
        variable: String,
        expected: String,
        actual: String,
    },
    MissingVariables {
        station: String,
        missing: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ObservationReport {
    pub total_records: usize,
    pub station_count: usize,
    pub warnings: Vec<ObservationWarning>,
}

impl ObservationReport {
    pub fn summary(&self) -> String {
        format!(
            "Validated {} observations for {} stations ({} warnings)",
            self.total_records,
            self.station_count,
            self.warnings.len()
        )
    }
}

/// Domain checks for observation payloads: record-count ceiling, unit
/// consistency, and per-station required-variable coverage.
pub struct ObservationChecker;

impl ObservationChecker {
    pub fn new() -> Self {
        Self
    }

    /// Run the domain check against a decoded observations payload.
    ///
    /// Hard failures are a non-array payload and a record count over the
    /// ceiling. Unit mismatches and incomplete station coverage are
    /// warnings only; partial station reporting is expected operationally
    /// and must not block upload.
    pub fn check(&self, document: &Value, rules: &ValidationRules) -> Result<ObservationReport> {
        let records = document.as_array().ok_or(UploaderError::NotAnArray)?;

        if records.len() > rules.max_records {
            return Err(UploaderError::TooManyRecords {
                count: records.len(),
                limit: rules.max_records,
            });
        }

        let mut warnings = Vec::new();

        // Variables observed per station. BTreeMap keeps warning order
        // stable across runs.
        let mut stations: BTreeMap<String, HashSet<String>> = BTreeMap::new();

        for record in records {
            let Ok(obs) = serde_json::from_value::<ObservationRecord>(record.clone()) else {
                continue;
            };

            // Records without a station id or variable name are excluded
            // from coverage analysis, not rejected.
            let (Some(stid), Some(variable)) = (non_empty(obs.stid), non_empty(obs.variable))
            else {
                continue;
            };

            stations
                .entry(stid.clone())
                .or_default()
                .insert(variable.clone());

            if let (Some(expected), Some(actual)) =
                (rules.unit_mapping.get(&variable), non_empty(obs.units))
            {
                if &actual != expected {
                    warn!("Unit mismatch for {variable}: expected {expected}, got {actual}");
                    warnings.push(ObservationWarning::UnitMismatch {
                        stid,
                        variable,
                        expected: expected.clone(),
                        actual,
                    });
                }
            }
        }

        let mut incomplete = Vec::new();
        for (station, observed) in &stations {
            let mut missing: Vec<String> = rules
                .required_variables
                .difference(observed)
                .cloned()
                .collect();
            if !missing.is_empty() {
                missing.sort();
                incomplete.push(format!("{station}: {missing:?}"));
                warnings.push(ObservationWarning::MissingVariables {
                    station: station.clone(),
                    missing,
                });
            }
        }

        if !incomplete.is_empty() {
            warn!(
                "Stations missing required variables:\n{}",
                incomplete
                    .iter()
                    .take(MISSING_VARS_LOG_CAP)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }

        let report = ObservationReport {
            total_records: records.len(),
            station_count: stations.len(),
            warnings,
        };
        info!("{}", report.summary());
        Ok(report)
    }
}

impl Default for ObservationChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules() -> ValidationRules {
        let doc = json!({
            "maxFileSize": "10MB",
            "maxRecords": 5,
            "requiredVariables": ["air_temp", "wind_speed"],
            "unitMapping": {"air_temp": "Celsius", "wind_speed": "m/s"}
        });
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn test_non_array_payload_fails() {
        let checker = ObservationChecker::new();
        let err = checker.check(&json!({"a": 1}), &rules()).unwrap_err();
        assert!(matches!(err, UploaderError::NotAnArray));
    }

    #[test]
    fn test_too_many_records_fails() {
        let checker = ObservationChecker::new();
        let records = json!([{}, {}, {}, {}, {}, {}]);
        let err = checker.check(&records, &rules()).unwrap_err();
        assert!(matches!(
            err,
            UploaderError::TooManyRecords { count: 6, limit: 5 }
        ));
    }

    #[test]
    fn test_full_coverage_passes_with_no_warnings() {
        let checker = ObservationChecker::new();
        let records = json!([
            {"stid": "KSLC", "variable": "air_temp", "units": "Celsius", "value": 21.5},
            {"stid": "KSLC", "variable": "wind_speed", "units": "m/s", "value": 3.2}
        ]);
        let report = checker.check(&records, &rules()).unwrap();
        assert_eq!(report.total_records, 2);
        assert_eq!(report.station_count, 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_variable_warns_but_passes() {
        let checker = ObservationChecker::new();
        let records = json!([
            {"stid": "KSLC", "variable": "air_temp", "units": "Celsius"},
            {"stid": "KSLC", "variable": "wind_speed", "units": "m/s"},
            {"stid": "KPVU", "variable": "air_temp", "units": "Celsius"}
        ]);
        let report = checker.check(&records, &rules()).unwrap();
        assert_eq!(
            report.warnings,
            vec![ObservationWarning::MissingVariables {
                station: "KPVU".to_string(),
                missing: vec!["wind_speed".to_string()],
            }]
        );
    }

    #[test]
    fn test_unit_mismatch_warns_but_passes() {
        let checker = ObservationChecker::new();
        let records = json!([
            {"stid": "KSLC", "variable": "air_temp", "units": "Fahrenheit"},
            {"stid": "KSLC", "variable": "wind_speed", "units": "m/s"}
        ]);
        let report = checker.check(&records, &rules()).unwrap();
        assert_eq!(
            report.warnings,
            vec![ObservationWarning::UnitMismatch {
                stid: "KSLC".to_string(),
                variable: "air_temp".to_string(),
                expected: "Celsius".to_string(),
                actual: "Fahrenheit".to_string(),
            }]
        );
    }

    #[test]
    fn test_records_without_stid_or_variable_are_skipped() {
        let checker = ObservationChecker::new();
        let records = json!([
            {"variable": "air_temp", "units": "Celsius"},
            {"stid": "KSLC"},
            {"stid": "", "variable": "air_temp"},
            42
        ]);
        let report = checker.check(&records, &rules()).unwrap();
        assert_eq!(report.total_records, 4);
        assert_eq!(report.station_count, 0);
        assert!(report.warnings.is_empty());
    }
}
