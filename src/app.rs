//! One function per CLI command. Each takes the raw JSON event and returns
//! the JSON response text.

use anyhow::Context;
use serde::Serialize;

use evalframe_core::evaluation::{EvalRequest, EvaluationDriver};
use evalframe_core::normalizer::Normalizer;
use evalframe_core::observability::{LogSink, NullSink};
use evalframe_core::threshold::{ThresholdGate, ThresholdRequest};
use evalframe_core::{Config, RecordBatch};
use evalframe_stores::{CommandEvaluator, FsBlobStore, FsParameterStore, JsonLinesSink};

/// Flatten, deduplicate and partition a record batch.
pub fn transform(config: &Config, input: &str) -> anyhow::Result<String> {
    let batch: RecordBatch = serde_json::from_str(input).context("invalid record batch")?;
    let output = Normalizer::new(config.normalizer.clone()).process_batch(&batch);
    render(&output)
}

/// Score the application's ground truth with the configured scorer. The
/// event is validated before the scorer configuration is consulted.
pub fn evaluate(config: &Config, input: &str) -> anyhow::Result<String> {
    let event: serde_json::Value = serde_json::from_str(input).context("invalid evaluation event")?;
    let request = EvalRequest::from_value(event)?;
    let evaluator = CommandEvaluator::from_command_line(&config.evaluation.evaluator_command)
        .context("evaluation.evaluator_command is not configured")?;
    let params = FsParameterStore::new(&config.stores.parameter_root);
    let blobs = FsBlobStore::new(&config.stores.blob_root);
    let sink: Box<dyn LogSink> = match &config.evaluation.invocation_log {
        Some(path) => Box::new(JsonLinesSink::new(path)),
        None => Box::new(NullSink),
    };

    let response = EvaluationDriver::new(config, &params, &blobs, &evaluator)
        .with_log_sink(sink.as_ref())
        .run(&request)?;
    render(&response)
}

/// Compare evaluation results against the application's thresholds.
pub fn check_thresholds(config: &Config, input: &str) -> anyhow::Result<String> {
    let request: ThresholdRequest =
        serde_json::from_str(input).context("invalid threshold request")?;
    let params = FsParameterStore::new(&config.stores.parameter_root);
    let report = ThresholdGate::new(&params, &config.parameters).run(&request);
    render(&report)
}

fn render<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string(value).context("could not encode response")
}
