use std::path::PathBuf;
use thiserror::Error;

pub type RecodeResult<T> = std::result::Result<T, RecodeError>;

#[derive(Debug, Error)]
pub enum RecodeError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Htslib(#[from] rust_htslib::errors::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("No input given to recode")]
    MissingInput,
    #[error("Unknown field '{field}', expected one of: {valid}")]
    UnknownField { field: String, valid: String },
    #[error("Failed to parse annotation on line {line}: {message}")]
    EngineParse { line: usize, message: String },
    #[error("Invalid index type '{value}', expected tbi or csi")]
    InvalidIndexType { value: String },
    #[error("Either an output prefix or the original input file must be given to name the merged VCF")]
    MissingOutputName,
    #[error("File {} is not BGZF (bgzip) compressed", path.display())]
    NotBgzf { path: PathBuf },
}

impl RecodeError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[macro_export]
macro_rules! recode_error {
    ($($arg:tt)*) => {
        $crate::error::RecodeError::message(format!($($arg)*))
    };
}
