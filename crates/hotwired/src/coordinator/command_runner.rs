//! [`TestRunner`] backed by an external program speaking JSON lines.
//!
//! Each collaborator call spawns the configured program, writes one JSON
//! request line to its stdin, and reads one JSON response line from its
//! stdout:
//!
//! ```text
//! > {"action":"ensure_module","database":"odoo_dev","module":"sale"}
//! < {"status":"ok","result":"installed"}
//! ```

use std::io::Write;
use std::process::{Child, Command, Stdio};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::COORDINATOR_TARGET;
use super::errors::RunnerError;
use super::runner::{ModuleState, SuiteReport, TestPhase, TestRunner, TestSuite};

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum RunnerRequest<'a> {
    EnsureModule {
        database: &'a str,
        module: &'a str,
    },
    InvalidateTestDefinitions {
        convention: &'a str,
    },
    BuildSuite {
        database: &'a str,
        module: &'a str,
        test_tags: &'a str,
        phase: TestPhase,
    },
    RunSuite {
        database: &'a str,
        suite: &'a TestSuite,
    },
}

impl RunnerRequest<'_> {
    const fn action(&self) -> &'static str {
        match self {
            Self::EnsureModule { .. } => "ensure_module",
            Self::InvalidateTestDefinitions { .. } => "invalidate_test_definitions",
            Self::BuildSuite { .. } => "build_suite",
            Self::RunSuite { .. } => "run_suite",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RunnerResponse<T> {
    Ok { result: T },
    Error { message: String },
}

/// Runs each collaborator call through an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTestRunner {
    program: String,
    args: Vec<String>,
}

impl CommandTestRunner {
    /// Builds a runner for `program` invoked with `args`.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a runner from a whitespace separated command line.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::EmptyCommand`] when the line holds no program.
    pub fn from_command_line(command_line: &str) -> Result<Self, RunnerError> {
        let mut words = command_line.split_whitespace();
        let program = words.next().ok_or(RunnerError::EmptyCommand)?;
        Ok(Self::new(program, words))
    }

    fn call<T>(&self, request: &RunnerRequest<'_>) -> Result<T, RunnerError>
    where
        T: DeserializeOwned,
    {
        let action = request.action();
        let line = serde_json::to_string(request)
            .map_err(|source| RunnerError::Encode { action, source })?;

        debug!(
            target: COORDINATOR_TARGET,
            program = %self.program,
            action,
            request_bytes = line.len(),
            "calling test runner"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let written = stdin
                .write_all(line.as_bytes())
                .and_then(|()| stdin.write_all(b"\n"))
                .and_then(|()| stdin.flush());
            if let Err(source) = written {
                drop(stdin);
                reap(&mut child, action);
                return Err(RunnerError::Io { action, source });
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|source| RunnerError::Io { action, source })?;
        if !output.status.success() {
            return Err(RunnerError::Exit {
                action,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let response = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or(RunnerError::EmptyResponse { action })?;
        match serde_json::from_str::<RunnerResponse<T>>(response)
            .map_err(|source| RunnerError::Decode { action, source })?
        {
            RunnerResponse::Ok { result } => Ok(result),
            RunnerResponse::Error { message } => Err(RunnerError::Reported { action, message }),
        }
    }
}

/// Kills and waits for a runner that stopped reading its request.
fn reap(child: &mut Child, action: &'static str) {
    if let Err(error) = child.kill() {
        debug!(
            target: COORDINATOR_TARGET,
            action,
            %error,
            "test runner exited before it could be killed"
        );
    }
    if let Err(error) = child.wait() {
        warn!(
            target: COORDINATOR_TARGET,
            action,
            %error,
            "failed to reap test runner"
        );
    }
}

impl TestRunner for CommandTestRunner {
    fn ensure_module(&self, database: &str, module: &str) -> Result<ModuleState, RunnerError> {
        self.call(&RunnerRequest::EnsureModule { database, module })
    }

    fn invalidate_test_definitions(&self, convention: &str) -> Result<usize, RunnerError> {
        self.call(&RunnerRequest::InvalidateTestDefinitions { convention })
    }

    fn build_suite(
        &self,
        database: &str,
        module: &str,
        test_tags: &str,
        phase: TestPhase,
    ) -> Result<TestSuite, RunnerError> {
        self.call(&RunnerRequest::BuildSuite {
            database,
            module,
            test_tags,
            phase,
        })
    }

    fn run_suite(&self, database: &str, suite: &TestSuite) -> Result<SuiteReport, RunnerError> {
        self.call(&RunnerRequest::RunSuite { database, suite })
    }
}
