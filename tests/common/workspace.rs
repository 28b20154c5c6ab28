//! On-disk fixtures for harnesses that exercise the filesystem adapters or
//! the compiled binary.

use std::path::{Path, PathBuf};

use evalframe_core::Config;
use tempfile::TempDir;

use super::fixtures::{GROUND_TRUTH_CSV, THRESHOLDS_JSON};

/// A temp directory laid out as parameter and blob roots, seeded with the
/// `kb-chat` ground truth and thresholds. Removed on drop.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            dir: tempfile::tempdir().expect("temp dir"),
        };
        workspace.write(
            "parameters/AppGenAIEvalThresholdMetrics/kb-chat/groundtruth",
            r#"{"bucket": "eval-data", "prefix": "kb-chat/"}"#,
        );
        workspace.write(
            "parameters/AppGenAIEvalThresholdMetrics/kb-chat/threshold",
            THRESHOLDS_JSON,
        );
        workspace.write("blobs/eval-data/kb-chat/ground_truth.csv", GROUND_TRUTH_CSV);
        workspace
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Defaults with the store roots pointed into this workspace.
    pub fn config(&self) -> Config {
        let mut config = Config::defaults();
        config.stores.parameter_root = self.path().join("parameters");
        config.stores.blob_root = self.path().join("blobs");
        config
    }

    /// A TOML config file equivalent to [`Workspace::config`], plus `extra`.
    pub fn config_file(&self, extra: &str) -> PathBuf {
        let text = format!(
            "[stores]\nparameter_root = {:?}\nblob_root = {:?}\n\n{extra}",
            self.path().join("parameters").display().to_string(),
            self.path().join("blobs").display().to_string(),
        );
        self.write("config.toml", &text)
    }

    /// A shell scorer printing the same scores for every question. Run it
    /// as `sh <path>`.
    pub fn scorer_script(&self, scores: &str) -> PathBuf {
        let script = format!("cat > /dev/null\nprintf '%s' '{{\"scores\": [{scores}]}}'\n");
        self.write("scorer.sh", &script)
    }
}
