use thiserror::Error;

/// Every failure the editing core can report to the UI.
///
/// Construction-time problems (dimensions, transform parameters) are caught
/// before anything reaches the apply path, so steady-state editing only ever
/// yields the coordination variants (`EngineBusy`, `EmptyHistory`,
/// `NoActiveSession`).
#[derive(Debug, Error)]
pub enum EditError {
    #[error("invalid dimensions {width}x{height} for {len} bytes of pixel data")]
    InvalidDimensions { width: u32, height: u32, len: usize },

    #[error("pixel ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("invalid transform parameters: {0}")]
    InvalidParameters(String),

    #[error("no image is loaded")]
    NoActiveSession,

    #[error("nothing to undo or redo")]
    EmptyHistory,

    #[error("history position {target} is outside 0..={len}")]
    HistoryOutOfRange { target: usize, len: usize },

    #[error("another edit is still running")]
    EngineBusy,

    #[error("edit worker stopped before finishing")]
    WorkerDisconnected,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported export format '{0}'")]
    UnsupportedFormat(String),

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

impl EditError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

pub type EditResult<T> = Result<T, EditError>;
