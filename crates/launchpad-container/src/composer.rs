use colored::Colorize;
use launchpad_core::BuildConfig;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::args::{self, BuildTarget, PublishFlags};
use crate::classify::{
    BuildFailure, NO_REGISTRY_ACCESS_SIGNATURE, UNKNOWN_REGISTRY_ADDRESS_SIGNATURE, classify,
};
use crate::executor::{CommandEvent, ProcessRunner, TokioProcessRunner};
use crate::process::ProcessError;
use crate::prompt::{Prompter, RegistryCredentials, TerminalPrompter};

pub const EXIT_NO_REGISTRY_ACCESS: i32 = 1000;
pub const EXIT_UNKNOWN_REGISTRY_ADDRESS: i32 = 1013;
pub const EXIT_UNCLASSIFIED_FAILURE: i32 = 9999;

const DUPLICATE_FILES_QUESTION: &str = "The publish step does not allow duplicate file names in the output directory.\n\
     Would you like to retry the build explicitly allowing them?";
const LOGIN_QUESTION: &str =
    "We could not access the container registry during build. Do you want to login to the registry and retry?";

/// Builds and pushes project containers, driving recovery from known failures.
///
/// Parameterized over the process runner and prompter for testability.
pub struct ContainerComposer<R: ProcessRunner = TokioProcessRunner, P: Prompter = TerminalPrompter>
{
    runner: R,
    prompter: P,
    build_program: String,
    login_program: String,
}

impl ContainerComposer<TokioProcessRunner, TerminalPrompter> {
    pub fn new(config: &BuildConfig) -> Self {
        Self::with_parts(TokioProcessRunner, TerminalPrompter, config)
    }
}

impl<R: ProcessRunner, P: Prompter> ContainerComposer<R, P> {
    pub fn with_parts(runner: R, prompter: P, config: &BuildConfig) -> Self {
        Self {
            runner,
            prompter,
            build_program: config.program.clone(),
            login_program: config.login_program.clone(),
        }
    }

    /// Publish `target` as a container image and push it to its registry.
    pub async fn build_and_push(
        &self,
        target: &BuildTarget,
        interactive: bool,
    ) -> Result<BuildOutcome, BuildError> {
        let flags = self.query_publish_flags(&target.project_path).await?;
        let args = args::build_args(&target.project_path, &flags, target);
        self.run_build(args, interactive).await
    }

    /// Read the project's single-file and trimming settings.
    pub async fn query_publish_flags(&self, project_path: &Path) -> Result<PublishFlags, BuildError> {
        let output = self
            .runner
            .capture(&self.build_program, &args::property_query_args(project_path))
            .await
            .map_err(|e| BuildError::PropertyQuery {
                path: project_path.to_path_buf(),
                source: e,
            })?;

        PublishFlags::from_properties_json(&output)
            .map_err(|e| BuildError::InvalidProperties { source: e })
    }

    /// Run the build, recovering from classified failures.
    ///
    /// Each failure kind gets at most one recovery; a kind that recurs after
    /// its recovery is handled as unclassified.
    pub async fn run_build(
        &self,
        args: Vec<String>,
        interactive: bool,
    ) -> Result<BuildOutcome, BuildError> {
        let mut args = args;
        let mut recovered: HashSet<BuildFailure> = HashSet::new();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let attempt = self.execute_attempt(&args).await?;
            let Some(output) = attempt.failure_output() else {
                tracing::info!(attempts, "build succeeded");
                return Ok(BuildOutcome::Succeeded { attempts });
            };
            let exit_code = attempt.exit_code;
            drop(attempt);

            let mut failure = classify(&output);
            if recovered.contains(&failure) {
                tracing::debug!(?failure, "recovery already attempted");
                failure = BuildFailure::Unclassified;
            }
            tracing::warn!(?failure, exit_code, attempt = attempts, "build failed");

            let decision = self.decide(failure, &args, interactive).await?;
            tracing::debug!(?decision, "recovery decision");

            match decision {
                RecoveryDecision::RetryWithArgs(next) => {
                    recovered.insert(failure);
                    args = next;
                }
                RecoveryDecision::RetryAfterLogin => {
                    recovered.insert(failure);
                }
                RecoveryDecision::AbortSilently => return Ok(BuildOutcome::LoginDeclined),
                RecoveryDecision::Abort(reason) => return Err(BuildError::Abort(reason)),
            }
        }
    }

    /// Run the build program once, echoing its output.
    pub async fn execute_attempt(&self, args: &[String]) -> Result<ExecutionAttempt, BuildError> {
        let mut events = self
            .runner
            .spawn(&self.build_program, args)
            .await
            .map_err(|e| BuildError::Process { source: e })?;

        let mut attempt = ExecutionAttempt {
            args: args.to_vec(),
            ..ExecutionAttempt::default()
        };

        while let Some(event) = events.recv().await {
            match event {
                CommandEvent::Started => {
                    let command = format!("Executing: {} {}", self.build_program, args.join(" "));
                    println!();
                    println!("{}", command.cyan());
                }
                CommandEvent::StdoutLine(line) => {
                    println!("{line}");
                    attempt.stdout.push_str(&line);
                    attempt.stdout.push('\n');
                }
                CommandEvent::StderrLine(line) => {
                    eprintln!("{}", line.red());
                    attempt.stderr.push_str(&line);
                    attempt.stderr.push('\n');
                }
                CommandEvent::Exited(code) => {
                    attempt.exit_code = code;
                    return Ok(attempt);
                }
                CommandEvent::Failed(reason) => {
                    return Err(BuildError::Process {
                        source: ProcessError::Interrupted {
                            program: self.build_program.clone(),
                            reason,
                        },
                    });
                }
            }
        }

        Err(BuildError::Process {
            source: ProcessError::StreamClosed {
                program: self.build_program.clone(),
            },
        })
    }

    async fn decide(
        &self,
        failure: BuildFailure,
        args: &[String],
        interactive: bool,
    ) -> Result<RecoveryDecision, BuildError> {
        match failure {
            BuildFailure::DuplicateOutputFiles => {
                let retry = !interactive || self.confirm(DUPLICATE_FILES_QUESTION)?;
                if retry {
                    Ok(RecoveryDecision::RetryWithArgs(args::allow_duplicate_output(args)))
                } else {
                    Ok(RecoveryDecision::Abort(AbortReason::DuplicateFilesRetryDeclined))
                }
            }
            BuildFailure::NoRegistryAccess => {
                if !interactive {
                    eprintln!(
                        "\n{}",
                        format!(
                            "{NO_REGISTRY_ACCESS_SIGNATURE}: No access to container registry. \
                             Cannot attempt login in non interactive mode."
                        )
                        .red()
                        .bold()
                    );
                    return Ok(RecoveryDecision::Abort(AbortReason::NoRegistryAccess));
                }

                if !self.confirm(LOGIN_QUESTION)? {
                    return Ok(RecoveryDecision::AbortSilently);
                }

                let credentials = RegistryCredentials::gather(&self.prompter)
                    .map_err(|e| BuildError::Prompt { source: e })?;
                let login_failed = self
                    .runner
                    .run_quiet(
                        &self.login_program,
                        &["login".to_owned()],
                        &credentials.login_env(),
                    )
                    .await
                    .map_err(|e| BuildError::Process { source: e })?;

                if login_failed {
                    Ok(RecoveryDecision::Abort(AbortReason::RegistryLoginFailed))
                } else {
                    Ok(RecoveryDecision::RetryAfterLogin)
                }
            }
            BuildFailure::UnknownRegistryAddress => {
                eprintln!(
                    "\n{}",
                    format!(
                        "{UNKNOWN_REGISTRY_ADDRESS_SIGNATURE}: Unknown container registry address, \
                         or container registry address not accessible."
                    )
                    .red()
                    .bold()
                );
                Ok(RecoveryDecision::Abort(AbortReason::UnknownRegistryAddress))
            }
            BuildFailure::Unclassified => Ok(RecoveryDecision::Abort(AbortReason::Unclassified)),
        }
    }

    fn confirm(&self, message: &str) -> Result<bool, BuildError> {
        println!();
        self.prompter
            .confirm(message)
            .map_err(|e| BuildError::Prompt { source: e })
    }
}

/// One run of the build program. Buffers belong to this attempt only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionAttempt {
    pub args: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecutionAttempt {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr followed by stdout, for a failed attempt.
    pub fn failure_output(&self) -> Option<String> {
        (!self.succeeded()).then(|| format!("{}{}", self.stderr, self.stdout))
    }
}

/// How to proceed after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryDecision {
    RetryWithArgs(Vec<String>),
    RetryAfterLogin,
    /// The user declined to log in; stop without raising an error.
    AbortSilently,
    Abort(AbortReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded { attempts: u32 },
    /// Registry access was denied and the user chose not to log in.
    /// Nothing was pushed.
    LoginDeclined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    DuplicateFilesRetryDeclined,
    NoRegistryAccess,
    RegistryLoginFailed,
    UnknownRegistryAddress,
    Unclassified,
}

impl AbortReason {
    /// Process exit code this abort maps to.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::NoRegistryAccess | Self::RegistryLoginFailed => EXIT_NO_REGISTRY_ACCESS,
            Self::UnknownRegistryAddress => EXIT_UNKNOWN_REGISTRY_ADDRESS,
            Self::DuplicateFilesRetryDeclined | Self::Unclassified => EXIT_UNCLASSIFIED_FAILURE,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::DuplicateFilesRetryDeclined => "duplicate publish output files, retry declined",
            Self::NoRegistryAccess => "no access to the container registry",
            Self::RegistryLoginFailed => "container registry login failed",
            Self::UnknownRegistryAddress => "unknown container registry address",
            Self::Unclassified => "unrecognized build failure",
        };
        write!(f, "{reason} (exit code {})", self.exit_code())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("build aborted: {0}")]
    Abort(AbortReason),

    #[error("build process failed")]
    Process { source: ProcessError },

    #[error("failed to read interactive input")]
    Prompt { source: std::io::Error },

    #[error("failed to query publish properties of {path}")]
    PropertyQuery { path: PathBuf, source: ProcessError },

    #[error("publish properties were not valid JSON")]
    InvalidProperties { source: serde_json::Error },
}

impl BuildError {
    /// Exit code for aborts; `None` for infrastructure errors.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Abort(reason) => Some(reason.exit_code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_reasons_map_to_exit_codes() {
        assert_eq!(AbortReason::NoRegistryAccess.exit_code(), 1000);
        assert_eq!(AbortReason::RegistryLoginFailed.exit_code(), 1000);
        assert_eq!(AbortReason::UnknownRegistryAddress.exit_code(), 1013);
        assert_eq!(AbortReason::Unclassified.exit_code(), 9999);
        assert_eq!(AbortReason::DuplicateFilesRetryDeclined.exit_code(), 9999);
    }

    #[test]
    fn failure_output_is_stderr_then_stdout() {
        let attempt = ExecutionAttempt {
            args: vec![],
            stdout: "out\n".to_owned(),
            stderr: "err\n".to_owned(),
            exit_code: 1,
        };
        assert_eq!(attempt.failure_output().as_deref(), Some("err\nout\n"));
    }

    #[test]
    fn successful_attempt_has_no_failure_output() {
        let attempt = ExecutionAttempt {
            stdout: "done\n".to_owned(),
            ..ExecutionAttempt::default()
        };
        assert!(attempt.succeeded());
        assert!(attempt.failure_output().is_none());
    }

    #[test]
    fn only_aborts_carry_exit_codes() {
        assert_eq!(
            BuildError::Abort(AbortReason::UnknownRegistryAddress).exit_code(),
            Some(1013)
        );
        let err = BuildError::Process {
            source: ProcessError::StreamClosed {
                program: "dotnet".to_owned(),
            },
        };
        assert_eq!(err.exit_code(), None);
    }
}
