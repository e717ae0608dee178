//! Error taxonomy for the CLI.
//!
//! Every failure that reaches the dispatch boundary is one of these kinds.
//! `main` prints the short message (never a backtrace) and exits with
//! [`CliError::exit_code`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Unknown command, unknown sub-command or a missing remote resource.
    #[error("{0}")]
    NotFound(String),

    /// Required input missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The transport collaborator failed; carries the remote message.
    #[error("{0}")]
    RemoteOperation(String),

    /// Catalog registration or collection construction failed.
    #[error("command discovery failed: {0}")]
    Discovery(String),

    /// Declared sub-command without an implementation on this client.
    #[error("'{0}' is not implemented yet")]
    Unsupported(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// Help, usage and argument errors rendered by clap.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        CliError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CliError::Validation(msg.into())
    }

    /// Flatten an `anyhow` chain into a remote error (`a: b: c`).
    pub fn remote(err: anyhow::Error) -> Self {
        CliError::RemoteOperation(format!("{err:#}"))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound(_) => 3,
            CliError::Validation(_) => 4,
            CliError::RemoteOperation(_) => 5,
            CliError::Usage(e) => e.exit_code(),
            _ => 1,
        }
    }
}
