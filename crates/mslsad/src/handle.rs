//! Policy context handles

use midl_ndr::{Buf, BufMut, FixedArray, NdrContext, NdrCursor, NdrDecode, NdrEncode};
use std::fmt;
use std::str::FromStr;

/// Opaque 20-byte policy handle obtained from a prior open call
///
/// Marshalled verbatim, never interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle([u8; ContextHandle::LEN]);

impl ContextHandle {
    pub const LEN: usize = 20;

    pub const fn new(bytes: [u8; ContextHandle::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ContextHandle::LEN] {
        &self.0
    }
}

impl From<[u8; ContextHandle::LEN]> for ContextHandle {
    fn from(bytes: [u8; ContextHandle::LEN]) -> Self {
        Self(bytes)
    }
}

/// Parses the 40 hex digit form produced by `Display`
impl FromStr for ContextHandle {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; ContextHandle::LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextHandle({self})")
    }
}

impl NdrEncode for ContextHandle {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> midl_ndr::Result<()> {
        cursor.write_align(buf, 4);
        FixedArray::new(self.0).ndr_encode(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for ContextHandle {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> midl_ndr::Result<Self> {
        cursor.read_align(buf, 4, Self::LEN)?;
        let bytes = FixedArray::<u8, { ContextHandle::LEN }>::ndr_decode(buf, ctx, cursor)?;
        Ok(Self(bytes.into_inner()))
    }

    fn ndr_align() -> usize {
        4
    }
}
