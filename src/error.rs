use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole batch.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("cannot read source directory {}: {source}", .path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create destination directory {}: {source}", .path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("converter `{tool}` not found; is it installed and on PATH?")]
    ConverterNotFound { tool: String },

    #[error("cannot start worker pool: {message}")]
    WorkerPool { message: String },
}

/// Errors scoped to a single file. The batch reports these and moves on.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("`{tool}` not found")]
    ToolNotFound { tool: String },

    #[error("failed to run `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("`{tool}` produced output that is not valid UTF-8")]
    InvalidUtf8 { tool: String },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{message}")]
    Other { message: String },
}

impl ConversionError {
    pub fn other(message: impl Into<String>) -> Self {
        ConversionError::Other {
            message: message.into(),
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}
