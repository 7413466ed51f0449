//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ToolError: git / go invocations and working-tree reads that failed
//! - ManifestError: go.mod content that is not well-formed
//! - PathError: paths that cannot be made absolute or escape the repository root
//! - Task: a spawned worker panicked or was cancelled
//!
//! Every variant is fatal for a detection run; nothing here is retried.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// External tool related errors
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Manifest parsing errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Path resolution errors
    #[error(transparent)]
    Path(#[from] PathError),

    /// A background task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors raised while talking to git, the go toolchain, or the filesystem
#[derive(Error, Debug)]
pub enum ToolError {
    /// The executable could not be started at all
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The executable ran but exited unsuccessfully
    #[error("{program} {args} exited with {status}: {stderr}")]
    Failed {
        program: String,
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The executable produced output we could not interpret
    #[error("unexpected output from {program}: {message}")]
    InvalidOutput { program: String, message: String },

    /// Reading a file from the working tree failed
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to go.mod content
#[derive(Error, Debug)]
pub enum ManifestError {
    /// go.mod parsing error
    #[error("failed to parse {path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Errors related to path handling
#[derive(Error, Debug)]
pub enum PathError {
    /// A manifest that has to be read from history lives outside the repository
    #[error("{path} is not inside the repository root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// The path could not be made absolute
    #[error("failed to resolve absolute path for {path}: {source}")]
    Absolutize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Creates a new Spawn error
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        ToolError::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates a new Failed error from the invocation and its captured stderr
    pub fn failed(
        program: impl Into<String>,
        args: &[&str],
        status: ExitStatus,
        stderr: &[u8],
    ) -> Self {
        ToolError::Failed {
            program: program.into(),
            args: args.join(" "),
            status,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Creates a new InvalidOutput error
    pub fn invalid_output(program: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::InvalidOutput {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Creates a new ReadFile error
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ToolError::ReadFile {
            path: path.into(),
            source,
        }
    }
}

impl ManifestError {
    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        ManifestError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

impl PathError {
    /// Creates a new OutsideRoot error
    pub fn outside_root(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        PathError::OutsideRoot {
            path: path.into(),
            root: root.into(),
        }
    }

    /// Creates a new Absolutize error
    pub fn absolutize(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PathError::Absolutize {
            path: path.into(),
            source,
        }
    }
}
