use std::path::PathBuf;

use code_object::Mode;
use thiserror::Error;

/// Every way a generation run can fail. None of them are recoverable.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("snippet #{index} ({mode}) `{snippet}` failed to compile: {message}")]
    Compile {
        index: usize,
        snippet: String,
        mode: Mode,
        message: String,
    },
    #[error("snippet `{snippet}` holds a constant with no literal form: {repr}")]
    UnsupportedConstant { snippet: String, repr: String },
    #[error("{what} has no Go literal form: {value}")]
    NoLiteral { what: &'static str, value: String },
    #[error("reference compiler sent a malformed reply for `{snippet}`: {message}")]
    Protocol { snippet: String, message: String },
    #[error("program '{program}' not found on PATH")]
    ProgramNotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("failed to run '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("formatter '{program}' failed on {}: {message}", path.display())]
    Format {
        program: String,
        path: PathBuf,
        message: String,
    },
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Attach the catalogue position to an error raised while compiling a
    /// snippet. Other errors pass through.
    pub fn at_index(self, index: usize) -> Self {
        match self {
            GenError::Compile {
                snippet,
                mode,
                message,
                ..
            } => GenError::Compile {
                index,
                snippet,
                mode,
                message,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
