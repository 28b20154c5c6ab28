//! Threshold gate — decides whether evaluation scores clear an application's
//! configured minimums.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::config::ParametersConfig;
use crate::error::StoreError;
use crate::evaluation::ScoreRow;
use crate::store::{get_json_parameter, parameter_name, ParameterStore, THRESHOLD_PARAMETER};

/// Minimum acceptable score per metric, in configured order. Numbers keep
/// their parameter text so messages print `1.0` as written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Thresholds(Vec<(String, Number)>);

impl Thresholds {
    pub fn new(entries: impl IntoIterator<Item = (String, Number)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Every value of `map` must be a number.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, String> {
        map.into_iter()
            .map(|(metric, value)| match value {
                Value::Number(threshold) => Ok((metric, threshold)),
                other => Err(format!("threshold for '{metric}' is not a number: {other}")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries().map(|(metric, threshold)| (metric, as_score(threshold)))
    }

    /// Metric names with thresholds as written.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Number)> {
        self.0.iter().map(|(metric, threshold)| (metric.as_str(), threshold))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// NaN compares false, so a threshold that is not representable never passes.
fn as_score(number: &Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}

/// The gate's input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRequest {
    pub application_name: String,
    #[serde(default)]
    pub eval_results: Vec<ScoreRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Yes,
    No,
}

/// The gate's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub all_metrics_within_thresholds: Verdict,
    pub result_messages: Vec<String>,
}

impl ThresholdReport {
    pub fn passed(&self) -> bool {
        self.all_metrics_within_thresholds == Verdict::Yes
    }
}

/// Compare every result row against every threshold.
///
/// A metric missing from a row, a non-numeric score, or a score below its
/// threshold each fail the gate and add one message.
pub fn check_thresholds(results: &[ScoreRow], thresholds: &Thresholds) -> ThresholdReport {
    let mut messages = Vec::new();

    for result in results {
        let gt_id = result.gt_id_label();
        for (metric, threshold) in thresholds.entries() {
            let message = match result.scores.get(metric) {
                None => Some(format!(
                    "Warning: Metric '{metric}' not found in evaluation result (gt_id: {gt_id})"
                )),
                Some(score) => match score.as_f64() {
                    Some(value) if value >= as_score(threshold) => None,
                    _ => Some(format!(
                        "Metric '{metric}' failed: {score} < {threshold} (gt_id: {gt_id})"
                    )),
                },
            };
            if let Some(message) = message {
                tracing::warn!(%gt_id, metric, "{message}");
                messages.push(message);
            }
        }
    }

    ThresholdReport {
        all_metrics_within_thresholds: if messages.is_empty() { Verdict::Yes } else { Verdict::No },
        result_messages: messages,
    }
}

/// Fetch `application`'s thresholds. Lookup and decode failures are logged
/// and answered with `None`.
pub fn load_thresholds(
    application: &str,
    params: &dyn ParameterStore,
    parameters: &ParametersConfig,
) -> Option<Thresholds> {
    let name = parameter_name(&parameters.prefix, application, THRESHOLD_PARAMETER);
    let loaded = get_json_parameter::<Map<String, Value>>(params, &name)
        .and_then(|map| Thresholds::from_map(map).map_err(|e| StoreError::decode(&name, e)));

    match loaded {
        Ok(thresholds) => Some(thresholds),
        Err(StoreError::ParameterNotFound(_)) => {
            tracing::error!(parameter = %name, "threshold parameter not found");
            None
        }
        Err(e) => {
            tracing::error!(parameter = %name, error = %e, "could not load thresholds");
            None
        }
    }
}

/// The threshold-check handler.
pub struct ThresholdGate<'a> {
    params: &'a dyn ParameterStore,
    parameters: &'a ParametersConfig,
}

impl<'a> ThresholdGate<'a> {
    pub fn new(params: &'a dyn ParameterStore, parameters: &'a ParametersConfig) -> Self {
        Self { params, parameters }
    }

    /// Without thresholds the gate fails closed.
    pub fn run(&self, request: &ThresholdRequest) -> ThresholdReport {
        let application = request.application_name.as_str();
        let Some(thresholds) = load_thresholds(application, self.params, self.parameters) else {
            return ThresholdReport {
                all_metrics_within_thresholds: Verdict::No,
                result_messages: vec![format!(
                    "No thresholds configured for application '{application}'"
                )],
            };
        };

        let report = check_thresholds(&request.eval_results, &thresholds);
        if report.passed() {
            tracing::info!(application, "all metrics passed their thresholds");
        } else {
            tracing::info!(
                application,
                failures = report.result_messages.len(),
                "some metrics failed to meet their thresholds"
            );
        }
        report
    }
}
