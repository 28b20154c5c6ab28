//! Configuration types for evalframe.
//!
//! [`Config::load`] layers, in order: the embedded defaults below, an optional
//! TOML file (`$XDG_CONFIG_HOME/evalframe/config.toml` unless a path is given),
//! and `EVALFRAME__SECTION__KEY` environment variables. [`Config::defaults`]
//! returns the embedded defaults alone (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::evaluation::Metric;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[normalizer]
call_type_field = "call_type"
missing_dataset = "fail"
default_dataset = "unknown"

[parameters]
prefix = "/AppGenAIEvalThresholdMetrics"

[ground_truth]
file_name = "ground_truth.csv"

[evaluation]
metrics = ["faithfulness", "answer_relevancy", "context_recall", "context_precision"]

[stores]
parameter_root = "parameters"
blob_root = "blobs"
"#;

const ENV_PREFIX: &str = "EVALFRAME";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration shared by all three handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub ground_truth: GroundTruthConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub stores: StoresConfig,
}

/// What to do with a record whose transformed payload lacks a call type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDatasetPolicy {
    /// Emit the record as `ProcessingFailed` with its original payload.
    Fail,
    /// Emit the record normally, partitioned under `default_dataset`.
    Default,
}

/// `[normalizer]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default = "default_call_type_field")]
    pub call_type_field: String,
    #[serde(default = "default_missing_dataset")]
    pub missing_dataset: MissingDatasetPolicy,
    #[serde(default = "default_default_dataset")]
    pub default_dataset: String,
}

fn default_call_type_field() -> String { "call_type".to_string() }
fn default_missing_dataset() -> MissingDatasetPolicy { MissingDatasetPolicy::Fail }
fn default_default_dataset() -> String { "unknown".to_string() }

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            call_type_field: default_call_type_field(),
            missing_dataset: default_missing_dataset(),
            default_dataset: default_default_dataset(),
        }
    }
}

/// `[parameters]` section. Parameter names are `{prefix}/{application}/{leaf}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParametersConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String { "/AppGenAIEvalThresholdMetrics".to_string() }

impl Default for ParametersConfig {
    fn default() -> Self {
        Self { prefix: default_prefix() }
    }
}

/// `[ground_truth]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruthConfig {
    /// Appended to the location prefix to form the object key.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String { "ground_truth.csv".to_string() }

impl Default for GroundTruthConfig {
    fn default() -> Self {
        Self { file_name: default_file_name() }
    }
}

/// `[evaluation]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
    /// Program and arguments of the external scorer. Empty means unset.
    #[serde(default)]
    pub evaluator_command: Vec<String>,
    /// JSON-lines file receiving one invocation log per evaluated item.
    #[serde(default)]
    pub invocation_log: Option<PathBuf>,
}

fn default_metrics() -> Vec<Metric> { Metric::ALL.to_vec() }

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            evaluator_command: Vec::new(),
            invocation_log: None,
        }
    }
}

/// `[stores]` section: roots of the filesystem-backed collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct StoresConfig {
    #[serde(default = "default_parameter_root")]
    pub parameter_root: PathBuf,
    #[serde(default = "default_blob_root")]
    pub blob_root: PathBuf,
}

fn default_parameter_root() -> PathBuf { PathBuf::from("parameters") }
fn default_blob_root() -> PathBuf { PathBuf::from("blobs") }

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            parameter_root: default_parameter_root(),
            blob_root: default_blob_root(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the layered configuration. An explicit `path` must exist; the
    /// default location is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(config_path().as_path()).required(false),
        };

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("evalframe")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
