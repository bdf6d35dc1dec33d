//! Containerize and push projects with the native build tool, recovering
//! from the build failures launchpad knows how to fix.
//!
//! ```text
//! ContainerComposer::build_and_push
//!   1. Properties ── <build> msbuild <project> -getProperty:...
//!   2. Arguments  ── build_args()
//!   3. Attempt    ── ProcessRunner::spawn() → CommandEvent stream
//!   4. Classify   ── classify(stderr + stdout) on non-zero exit
//!   5. Recover    ── retry once per failure kind, or abort with an exit code
//! ```

pub mod args;
pub mod classify;
pub mod composer;
pub mod executor;
pub mod process;
pub mod prompt;

pub use args::{ArgumentsBuilder, BuildTarget, PublishFlags, build_args};
pub use classify::{BuildFailure, classify};
pub use composer::{
    AbortReason, BuildError, BuildOutcome, ContainerComposer, ExecutionAttempt, RecoveryDecision,
};
pub use executor::{CommandEvent, ProcessRunner, TokioProcessRunner};
pub use process::ProcessError;
pub use prompt::{Prompter, RegistryCredentials, TerminalPrompter};
