//! Invocation log sink appending one JSON document per line to a file.
//!
//! The resulting file is a stream of telemetry records carrying `call_type`,
//! ready to be batched into the normalizer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use evalframe_core::observability::{InvocationLog, LogSink};

#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, log: &InvocationLog) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(log)?;
        line.push(b'\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?
            .write_all(&line)
    }
}

impl LogSink for JsonLinesSink {
    fn emit(&self, log: &InvocationLog) {
        if let Err(e) = self.append(log) {
            tracing::warn!(path = %self.path.display(), error = %e, "dropping invocation log");
        }
    }
}
