//! NDR error types

use thiserror::Error;

/// Upper bound on elements in any single decoded array
pub const MAX_NDR_ARRAY_ELEMENTS: usize = 1 << 20;

/// NDR encoding/decoding errors
#[derive(Debug, Error)]
pub enum NdrError {
    /// Buffer underflow - not enough data
    #[error("buffer underflow: needed {needed} bytes, have {have}")]
    BufferUnderflow { needed: usize, have: usize },

    /// Invalid string - bad length fields or encoding
    #[error("invalid string: {0}")]
    InvalidString(String),

    /// Invalid pointer - unexpected or repeated referent ID
    #[error("invalid pointer: referent ID 0x{0:08x}")]
    InvalidPointer(u32),

    /// Array size mismatch between a structure count and its array
    #[error("array size mismatch: expected {expected}, got {got}")]
    ArraySizeMismatch { expected: usize, got: usize },

    /// Invalid enum value
    #[error("invalid enum value: {0}")]
    InvalidEnumValue(i32),

    /// Conformance mismatch
    #[error("conformance mismatch: max_count={max_count}, actual_count={actual_count}")]
    ConformanceMismatch { max_count: u32, actual_count: u32 },

    /// Declared size exceeds the decoder's allocation limit
    #[error("allocation limit exceeded: requested {requested}, limit {limit}")]
    AllocationLimitExceeded { requested: usize, limit: usize },

    /// Arithmetic overflow while computing a wire size
    #[error("integer overflow in size computation")]
    IntegerOverflow,

    /// UTF-16 decoding error
    #[error("UTF-16 error: {0}")]
    Utf16Error(#[from] std::char::DecodeUtf16Error),

    /// Failure raised by a type-specific codec layered on this runtime
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl NdrError {
    /// Wrap a higher-level codec error
    pub fn custom<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Custom(Box::new(err))
    }
}

/// Result type for NDR operations
pub type Result<T> = std::result::Result<T, NdrError>;
