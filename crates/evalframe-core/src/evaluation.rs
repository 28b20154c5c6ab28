//! Evaluation driver — scores a knowledge-base-backed generation system
//! against an application's ground truth.
//!
//! The driver reads the application's ground truth, asks an [`Evaluator`] to
//! score each question separately, tags each score row with its `gt_id`, and
//! answers according to the request's [`RunMode`]. Metric computation itself
//! is the evaluator's business.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::EvalError;
use crate::ground_truth::{read_ground_truth, GroundTruth};
use crate::observability::{watch, LogSink, NullSink};
use crate::store::{BlobStore, ParameterStore};

/// `call_type` stamped on every evaluation invocation log.
pub const EVALUATION_CALL_TYPE: &str = "RAG-Evaluation";

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// The quality metrics an evaluator is asked to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Faithfulness,
    AnswerRelevancy,
    ContextRecall,
    ContextPrecision,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Faithfulness,
        Metric::AnswerRelevancy,
        Metric::ContextRecall,
        Metric::ContextPrecision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Faithfulness => "faithfulness",
            Metric::AnswerRelevancy => "answer_relevancy",
            Metric::ContextRecall => "context_recall",
            Metric::ContextPrecision => "context_precision",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Score and report completion only.
    Benchmark,
    /// Score and return every score row.
    Validation,
}

impl std::str::FromStr for RunMode {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "benchmark" => Ok(RunMode::Benchmark),
            "validation" => Ok(RunMode::Validation),
            other => Err(EvalError::InvalidRunMode(other.to_string())),
        }
    }
}

/// An evaluation event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvalRequest {
    #[serde(rename = "runMode")]
    pub run_mode: RunMode,
    pub execution_name: String,
    pub application_name: String,
    /// A knowledge base id, or a list of which the first is used.
    #[serde(default, deserialize_with = "one_or_first")]
    pub kb_id: Option<String>,
    pub gen_model_id: String,
    pub judge_model_id: String,
    pub embed_model_id: String,
    pub max_token: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub num_retriever_results: u32,
    #[serde(default)]
    pub custom_tag: Value,
    #[serde(default)]
    pub experiment_param: Value,
}

impl EvalRequest {
    /// Decode an event, checking `runMode` before anything else.
    pub fn from_value(event: Value) -> Result<Self, EvalError> {
        match event.get("runMode") {
            None => return Err(EvalError::MissingRunMode),
            Some(Value::String(mode)) => {
                mode.parse::<RunMode>()?;
            }
            Some(other) => return Err(EvalError::InvalidRunMode(other.to_string())),
        }
        Ok(serde_json::from_value(event)?)
    }
}

fn one_or_first<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => Some(id),
        OneOrMany::Many(ids) => ids.into_iter().next(),
        OneOrMany::Null(()) => None,
    })
}

/// Scores for one ground-truth item, plus its `gt_id`.
///
/// Metric names map to whatever the evaluator reported (usually a number,
/// `null` when a metric could not be computed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    #[serde(flatten)]
    pub scores: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt_id: Option<Value>,
}

impl ScoreRow {
    /// `gt_id` as text, `"Unknown"` when absent.
    pub fn gt_id_label(&self) -> String {
        match &self.gt_id {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => "Unknown".to_string(),
        }
    }
}

/// What the driver answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvalResponse {
    Validation(Vec<ScoreRow>),
    Benchmark {
        #[serde(rename = "statusCode")]
        status_code: u16,
        body: String,
    },
}

impl EvalResponse {
    fn completed() -> Self {
        EvalResponse::Benchmark {
            status_code: 200,
            body: "Completed evaluating...".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluator collaborator
// ---------------------------------------------------------------------------

/// Everything an evaluator needs to score one ground-truth item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub questions: Vec<String>,
    pub ground_truths: Vec<String>,
    pub kb_id: Option<String>,
    pub generation_model_id: String,
    pub judge_model_id: String,
    pub embedding_model_id: String,
    pub num_retriever_results: u32,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub metrics: Vec<Metric>,
    pub application_name: String,
    pub experiment_description: String,
    pub custom_tag: Value,
}

impl EvaluationInput {
    pub fn for_item(request: &EvalRequest, item: &GroundTruth, metrics: &[Metric]) -> Self {
        Self {
            questions: vec![item.question.clone()],
            ground_truths: vec![item.ground_truth.clone()],
            kb_id: request.kb_id.clone(),
            generation_model_id: request.gen_model_id.clone(),
            judge_model_id: request.judge_model_id.clone(),
            embedding_model_id: request.embed_model_id.clone(),
            num_retriever_results: request.num_retriever_results,
            max_tokens: request.max_token,
            temperature: request.temperature,
            top_p: request.top_p,
            metrics: metrics.to_vec(),
            application_name: request.application_name.clone(),
            experiment_description: request.execution_name.clone(),
            custom_tag: request.custom_tag.clone(),
        }
    }
}

/// What an evaluator reports: one score row per question, plus the
/// generation artefacts it scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutput {
    pub scores: Vec<Map<String, Value>>,
    #[serde(default)]
    pub generated_answers: Vec<String>,
    #[serde(default)]
    pub contexts: Vec<Vec<String>>,
}

/// The external metrics library.
pub trait Evaluator {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EvaluationOutput, EvalError>;
}

/// Returns the same scores for every question and remembers what it was
/// asked.
#[derive(Debug, Default)]
pub struct StaticEvaluator {
    scores: Map<String, Value>,
    seen: std::sync::Mutex<Vec<EvaluationInput>>,
}

impl StaticEvaluator {
    pub fn new(scores: Map<String, Value>) -> Self {
        Self {
            scores,
            seen: Default::default(),
        }
    }

    pub fn inputs(&self) -> Vec<EvaluationInput> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Evaluator for StaticEvaluator {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EvaluationOutput, EvalError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(input.clone());
        }
        Ok(EvaluationOutput {
            scores: input.questions.iter().map(|_| self.scores.clone()).collect(),
            generated_answers: Vec::new(),
            contexts: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct EvaluationDriver<'a> {
    settings: &'a Config,
    params: &'a dyn ParameterStore,
    blobs: &'a dyn BlobStore,
    evaluator: &'a dyn Evaluator,
    sink: &'a dyn LogSink,
    clock: &'a dyn Clock,
}

impl<'a> EvaluationDriver<'a> {
    pub fn new(
        settings: &'a Config,
        params: &'a dyn ParameterStore,
        blobs: &'a dyn BlobStore,
        evaluator: &'a dyn Evaluator,
    ) -> Self {
        Self {
            settings,
            params,
            blobs,
            evaluator,
            sink: &NullSink,
            clock: &SystemClock,
        }
    }

    pub fn with_log_sink(mut self, sink: &'a dyn LogSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Handle a raw evaluation event.
    pub fn handle(&self, event: Value) -> Result<EvalResponse, EvalError> {
        let request = EvalRequest::from_value(event)?;
        self.run(&request)
    }

    /// Score every ground-truth item of the request's application.
    pub fn run(&self, request: &EvalRequest) -> Result<EvalResponse, EvalError> {
        let application = request.application_name.as_str();
        let items = read_ground_truth(
            application,
            self.params,
            self.blobs,
            &self.settings.parameters,
            &self.settings.ground_truth,
        );
        if items.is_empty() {
            tracing::error!(application, "failed to retrieve ground truth data");
        } else {
            tracing::info!(application, count = items.len(), "retrieved ground truth entries");
        }

        let mut rows = Vec::with_capacity(items.len());
        for item in &items {
            rows.push(self.score(request, item)?);
        }
        tracing::info!(
            application,
            experiment = %request.execution_name,
            rows = rows.len(),
            "evaluation finished"
        );

        Ok(match request.run_mode {
            RunMode::Validation => EvalResponse::Validation(rows),
            RunMode::Benchmark => EvalResponse::completed(),
        })
    }

    fn score(&self, request: &EvalRequest, item: &GroundTruth) -> Result<ScoreRow, EvalError> {
        tracing::debug!(gt_id = %item.gt_id, question = %item.question, "scoring ground truth item");
        let input = EvaluationInput::for_item(request, item, &self.settings.evaluation.metrics);
        let output = watch(self.sink, self.clock, EVALUATION_CALL_TYPE, &input, || {
            self.evaluator.evaluate(&input)
        })?;

        let scores = output
            .scores
            .into_iter()
            .next()
            .ok_or_else(|| EvalError::EmptyScores(item.gt_id.clone()))?;
        let scored = Value::Object(scores.clone());
        tracing::info!(gt_id = %item.gt_id, scores = %scored, "item scored");

        Ok(ScoreRow {
            scores,
            gt_id: Some(Value::String(item.gt_id.clone())),
        })
    }
}
