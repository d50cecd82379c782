//! Error types for mediabridge
//!
//! This module defines the error type shared by the adapter, the native
//! boundary and the configuration layer. We use thiserror for the library
//! error type and leave anyhow to the binary edge.

use thiserror::Error;

/// Main error type for mediabridge
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Locator could not be parsed as a URI
    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Local media could not be resolved
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Render target cannot host native video output
    #[error("Not a valid video surface: {0}")]
    InvalidSurface(String),

    /// Native engine reported a state value outside the known set
    #[error("Invalid native playback state: {0}")]
    InvalidState(i32),

    /// Failure reported by the native engine
    #[error("Native player error: {message} (code {code})")]
    Native { message: String, code: i32 },

    /// A newer load replaced the one being awaited
    #[error("Load was superseded by a newer play request")]
    LoadSuperseded,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdapterError {
    /// Create a native error from a message and extended code
    pub fn native<S: Into<String>>(msg: S, code: i32) -> Self {
        AdapterError::Native { message: msg.into(), code }
    }

    /// Extended code carried by failure events raised from this error.
    ///
    /// Native errors keep the platform code; invalid states report the raw
    /// state value; everything else maps to a small negative code.
    pub fn code(&self) -> i32 {
        match self {
            AdapterError::Native { code, .. } => *code,
            AdapterError::InvalidState(raw) => *raw,
            AdapterError::InvalidUri { .. } => -1,
            AdapterError::NotFound(_) => -2,
            AdapterError::InvalidSurface(_) => -3,
            AdapterError::LoadSuperseded => -4,
            AdapterError::Config(_) => -5,
            AdapterError::FileIO(_) => -6,
            AdapterError::Internal(_) => -7,
        }
    }
}

/// Convenience type alias for Results in mediabridge
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Extension trait for converting other errors to AdapterError
pub trait IntoAdapterError<T> {
    /// Convert this error into a configuration error with the given context
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoAdapterError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| AdapterError::Config(format!("{}: {}", context, e)))
    }
}

/// Helper macro for creating internal errors with file and line information
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::utils::error::AdapterError::Internal(
            format!("{} at {}:{}", $msg, file!(), line!())
        )
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::utils::error::AdapterError::Internal(
            format!("{} at {}:{}", format!($fmt, $($arg)*), file!(), line!())
        )
    };
}
