use std::io;

use thiserror::Error;

/// Why a format request produced no edit
#[derive(Debug, Error)]
pub enum FormatError {
    /// The temporary copy of the document could not be created or written
    #[error("Unable to create temporary file: {0}")]
    Staging(#[source] io::Error),

    /// The formatter could not be started or exited unsuccessfully
    #[error("{0}")]
    Invocation(String),

    /// The formatted file could not be read back
    #[error("Unable to read formatter output: {0}")]
    Output(#[source] io::Error),
}
