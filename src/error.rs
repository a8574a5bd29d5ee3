pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("error authenticating: {0}")]
    Authentication(String),

    #[error("command failed: {command}{}", exit_suffix(*.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("environment variable missing: {0}")]
    EnvMissing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// Process exit code to report for this error. Failed docker
    /// commands propagate their own code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn exit_suffix(code: Option<i32>) -> String {
    code.map_or_else(
        || " (terminated by signal)".to_string(),
        |c| format!(" (exit code {c})"),
    )
}
