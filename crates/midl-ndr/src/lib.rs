//! NDR (Network Data Representation) runtime library
//!
//! This crate provides the marshalling runtime for MS-RPC interface codecs,
//! implementing the NDR wire format as specified in DCE RPC and MS-RPCE.
//!
//! # NDR Wire Format
//!
//! NDR is the standard encoding for DCE RPC data. Key characteristics:
//! - Primitives align to their natural size (1, 2, 4, or 8 bytes)
//! - Structures align to their largest member
//! - Conformant data (arrays with runtime-determined size) is preceded by
//!   its counts
//! - Embedded pointers are a referent ID inline, with the pointee deferred
//!   until after the enclosing structure
//!
//! Every encode or decode of a message runs against one [`NdrCursor`], which
//! owns the stub offset and the referent bookkeeping for that message.

mod arrays;
mod context;
mod decode;
mod encode;
mod error;
mod pointers;
mod primitives;
mod strings;

pub use arrays::{decode_conformance, decode_elements, encode_conformance, ConformantArray, ConformantVaryingArray, FixedArray};
pub use context::{ensure_remaining, NdrContext, NdrCursor};
pub use decode::NdrDecode;
pub use encode::NdrEncode;
pub use error::{NdrError, Result, MAX_NDR_ARRAY_ELEMENTS};
pub use pointers::{FullPtr, ReferentTable, UniquePtr};
pub use strings::UnicodeString;

/// Re-export bytes for convenience
pub use bytes::{Buf, BufMut, Bytes, BytesMut};
