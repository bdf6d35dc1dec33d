#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to launch {program}; is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} command failed: {args:?}\n{stderr}")]
    CommandFailed {
        program: String,
        args: Vec<String>,
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },

    #[error("lost track of {program}: {reason}")]
    Interrupted { program: String, reason: String },

    #[error("{program} event stream ended before the process exited")]
    StreamClosed { program: String },
}
