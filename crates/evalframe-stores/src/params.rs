//! Parameter store backed by a directory tree.
//!
//! The parameter `/AppGenAIEvalThresholdMetrics/kb-chat/threshold` lives in
//! the file `<root>/AppGenAIEvalThresholdMetrics/kb-chat/threshold`. Values
//! are read as UTF-8 with surrounding whitespace trimmed.

use std::io::ErrorKind;
use std::path::PathBuf;

use evalframe_core::error::StoreError;
use evalframe_core::store::ParameterStore;

use crate::resolve_under;

#[derive(Debug, Clone)]
pub struct FsParameterStore {
    root: PathBuf,
}

impl FsParameterStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ParameterStore for FsParameterStore {
    fn get_parameter(&self, name: &str) -> Result<String, StoreError> {
        let path = resolve_under(&self.root, name)
            .ok_or_else(|| StoreError::InvalidName(name.to_string()))?;
        tracing::debug!(parameter = name, path = %path.display(), "reading parameter");

        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(value.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::ParameterNotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
