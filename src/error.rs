//! Error types for morse-ime

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Symbols did not match any code table entry. Recoverable: the decoder
    /// drops the pattern and carries on.
    #[error("Unknown pattern \"{0}\"")]
    UnknownPattern(String),

    /// Character has no code table entry
    #[error("Unknown character {0:?}")]
    UnknownCharacter(char),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings format error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
