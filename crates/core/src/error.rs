/// Result alias that carries the custom [`DoodleError`] type.
pub type Result<T> = std::result::Result<T, DoodleError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum DoodleError {
    /// Free-form failure that does not fit a more specific variant.
    #[error("{0}")]
    Message(String),
    /// A caller handed in a value outside the accepted domain, e.g. a brush
    /// index past the end of the palette or a zero-sized canvas.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The audio backend could not be opened or driven.
    #[error("audio: {0}")]
    Audio(String),
    /// The host window could not be created or updated.
    #[error("window: {0}")]
    Window(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that fail to parse.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl DoodleError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn audio<T: ToString>(err: T) -> Self {
        Self::Audio(err.to_string())
    }
}

impl From<&str> for DoodleError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for DoodleError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
