// datacheck-core/src/domain/quality/threshold.rs

use serde_json::Value;
use tracing::warn;

use crate::domain::check::Parameters;

/// Outcome tier of a measured check, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Passed,
    Warning,
    Failed,
}

/// Warning and failure limits, both expressed as percentages of rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning_pct: f64,
    pub failure_pct: f64,
}

impl Thresholds {
    pub const fn new(warning_pct: f64, failure_pct: f64) -> Self {
        Self {
            warning_pct,
            failure_pct,
        }
    }

    /// Reads `warningThreshold` and `threshold` from check parameters.
    ///
    /// Absent keys take the per-kind default. Present but unusable values
    /// (non-numeric, negative, NaN) also fall back, with a warning. A pair where
    /// failure < warning is kept as configured.
    pub fn from_parameters(parameters: &Parameters, defaults: Thresholds) -> Self {
        Self {
            warning_pct: read_pct(parameters, "warningThreshold", defaults.warning_pct),
            failure_pct: read_pct(parameters, "threshold", defaults.failure_pct),
        }
    }

    /// `rate > failure` fails, else `rate > warning` warns, else passes.
    pub fn classify(&self, violation_rate: f64) -> Severity {
        if violation_rate > self.failure_pct {
            Severity::Failed
        } else if violation_rate > self.warning_pct {
            Severity::Warning
        } else {
            Severity::Passed
        }
    }
}

/// Percentage of violating rows, 0 for an empty dataset.
pub fn violation_rate(violations: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    violations as f64 * 100.0 / total as f64
}

fn read_pct(parameters: &Parameters, key: &str, default: f64) -> f64 {
    let Some(raw) = parameters.get(key) else {
        return default;
    };

    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(pct) if pct.is_finite() && pct >= 0.0 => pct,
        _ => {
            warn!(
                parameter = key,
                value = %raw,
                fallback = default,
                "Invalid threshold parameter, using default"
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => Parameters::new(),
        }
    }

    #[test]
    fn test_classify_tiers() {
        let t = Thresholds::new(5.0, 10.0);
        assert_eq!(t.classify(0.0), Severity::Passed);
        assert_eq!(t.classify(5.0), Severity::Passed);
        assert_eq!(t.classify(5.1), Severity::Warning);
        assert_eq!(t.classify(10.0), Severity::Warning);
        assert_eq!(t.classify(12.0), Severity::Failed);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let t = Thresholds::new(1.0, 5.0);
        let mut previous = Severity::Passed;
        for step in 0..=1000 {
            let rate = step as f64 / 10.0;
            let current = t.classify(rate);
            assert!(current >= previous, "severity dropped at rate {rate}");
            previous = current;
        }
    }

    #[test]
    fn test_inverted_thresholds_skip_warning() {
        // failure < warning is accepted; warning becomes unreachable
        let t = Thresholds::new(10.0, 5.0);
        assert_eq!(t.classify(4.0), Severity::Passed);
        assert_eq!(t.classify(7.0), Severity::Failed);
        assert_eq!(t.classify(11.0), Severity::Failed);
    }

    #[test]
    fn test_violation_rate_empty_dataset() {
        assert_eq!(violation_rate(0, 0), 0.0);
        assert_eq!(violation_rate(5, 0), 0.0);
        assert_eq!(Thresholds::new(0.0, 0.0).classify(violation_rate(0, 0)), Severity::Passed);
    }

    #[test]
    fn test_violation_rate_percentage() {
        assert_eq!(violation_rate(12, 100), 12.0);
        assert_eq!(violation_rate(100, 1000), 10.0);
    }

    #[test]
    fn test_parameters_override_defaults() {
        let p = params(json!({"threshold": 20, "warningThreshold": "2.5"}));
        let t = Thresholds::from_parameters(&p, Thresholds::new(5.0, 10.0));
        assert_eq!(t, Thresholds::new(2.5, 20.0));
    }

    #[test]
    fn test_missing_or_invalid_parameters_use_defaults() {
        let defaults = Thresholds::new(1.0, 5.0);
        assert_eq!(Thresholds::from_parameters(&Parameters::new(), defaults), defaults);

        let p = params(json!({"threshold": "lots", "warningThreshold": -3}));
        assert_eq!(Thresholds::from_parameters(&p, defaults), defaults);

        let p = params(json!({"threshold": null, "warningThreshold": [1]}));
        assert_eq!(Thresholds::from_parameters(&p, defaults), defaults);
    }
}
