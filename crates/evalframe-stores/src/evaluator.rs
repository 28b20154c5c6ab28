//! Evaluator that delegates scoring to an external program.
//!
//! The program receives one [`EvaluationInput`] as JSON on stdin and must
//! print one [`EvaluationOutput`] as JSON on stdout. A non-zero exit status is
//! an evaluator failure; stderr is included in the error.

use std::io::{self, Write};
use std::process::{ChildStdin, Command, Stdio};

use evalframe_core::error::EvalError;
use evalframe_core::evaluation::{EvaluationInput, EvaluationOutput, Evaluator};

#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
}

impl CommandEvaluator {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a `[program, args...]` command line. `None` when empty.
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }
}

impl Evaluator for CommandEvaluator {
    fn evaluate(&self, input: &EvaluationInput) -> Result<EvaluationOutput, EvalError> {
        let request = serde_json::to_vec(input)
            .map_err(|e| EvalError::evaluator(format!("could not encode request: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EvalError::evaluator(format!("could not start {}: {e}", self.program)))?;

        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || write_request(stdin, &request));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("request writer panicked")));
            (output, written)
        });

        let output = output
            .map_err(|e| EvalError::evaluator(format!("{} did not finish: {e}", self.program)))?;
        if !output.status.success() {
            return Err(EvalError::evaluator(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        written.map_err(|e| EvalError::evaluator(format!("could not write request: {e}")))?;

        serde_json::from_slice(&output.stdout)
            .map_err(|e| EvalError::evaluator(format!("unreadable scores from {}: {e}", self.program)))
    }
}

/// Stream the request into the child's stdin, closing it afterwards. A
/// scorer may answer without reading all of its input.
fn write_request(stdin: Option<ChildStdin>, request: &[u8]) -> io::Result<()> {
    let Some(mut pipe) = stdin else {
        return Ok(());
    };
    match pipe.write_all(request) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
