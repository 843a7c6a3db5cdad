//! Mock process runner.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::exec::{CommandRunner, ExecError, ExecOutput};

/// A recorded process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Command runner returning queued results.
///
/// Results are consumed in order; once the queue is empty every run succeeds
/// with empty output, unless spawning is set to fail.
#[derive(Default)]
pub struct MockCommandRunner {
    responses: Arc<Mutex<VecDeque<ExecOutput>>>,
    fail_spawn: bool,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, output: ExecOutput) -> Self {
        self.responses.lock().unwrap().push_back(output);
        self
    }

    /// Fail every run as if the program could not be started.
    pub fn failing_spawn(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> Result<ExecOutput, ExecError> {
        self.invocations.lock().unwrap().push(Invocation {
            program: program.to_path_buf(),
            args: args.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        });

        if self.fail_spawn {
            return Err(ExecError::Spawn {
                program: program.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            });
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ExecOutput::success("")))
    }
}
