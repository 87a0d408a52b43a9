//! Error types for LSAD lookups

use crate::sid::SidError;
use crate::status::NtStatus;
use crate::transport::TransportError;
use midl_ndr::NdrError;
use thiserror::Error;

/// LSAD client error types
#[derive(Debug, Error)]
pub enum LsaError {
    #[error("NDR decode error: {0}")]
    Decode(NdrError),

    #[error("malformed SID: {0}")]
    MalformedSid(#[from] SidError),

    #[error(transparent)]
    Transport(TransportError),

    #[error("server returned {0}")]
    Status(NtStatus),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<NdrError> for LsaError {
    fn from(err: NdrError) -> Self {
        match err {
            NdrError::Custom(source) => match source.downcast::<SidError>() {
                Ok(sid_err) => Self::MalformedSid(*sid_err),
                Err(source) => Self::Decode(NdrError::Custom(source)),
            },
            other => Self::Decode(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, LsaError>;
