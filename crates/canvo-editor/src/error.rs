use canvo_core::{ColorParseError, ConfigError, SnapshotError, UnknownFilter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// A history restore is in flight; commands are rejected until it ends.
    #[error("editor is busy restoring history")]
    Busy,
    /// A numeric style or size argument was NaN or infinite.
    #[error("`{what}` must be a finite number, got {value}")]
    NonFinite { what: &'static str, value: f64 },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    UnknownFilter(#[from] UnknownFilter),
    #[error(transparent)]
    Color(#[from] ColorParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type EditorResult<T> = Result<T, EditorError>;
