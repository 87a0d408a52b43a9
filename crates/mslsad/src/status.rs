//! NTSTATUS return codes

use midl_ndr::{Buf, BufMut, NdrContext, NdrCursor, NdrDecode, NdrEncode};
use std::fmt;

/// NTSTATUS value returned by an LSA operation
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NtStatus(pub u32);

impl NtStatus {
    pub const SUCCESS: Self = Self(0x0000_0000);
    pub const SOME_NOT_MAPPED: Self = Self(0x0000_0107);
    pub const NONE_MAPPED: Self = Self(0xC000_0073);
    pub const ACCESS_DENIED: Self = Self(0xC000_0022);
    pub const INVALID_PARAMETER: Self = Self(0xC000_000D);
    pub const INVALID_HANDLE: Self = Self(0xC000_0008);
    pub const TOO_MANY_NAMES: Self = Self(0xC000_0125);

    pub fn code(self) -> u32 {
        self.0
    }

    /// Severity bits say error
    pub fn is_error(self) -> bool {
        self.0 >> 30 == 0b11
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "STATUS_SUCCESS",
            Self::SOME_NOT_MAPPED => "STATUS_SOME_NOT_MAPPED",
            Self::NONE_MAPPED => "STATUS_NONE_MAPPED",
            Self::ACCESS_DENIED => "STATUS_ACCESS_DENIED",
            Self::INVALID_PARAMETER => "STATUS_INVALID_PARAMETER",
            Self::INVALID_HANDLE => "STATUS_INVALID_HANDLE",
            Self::TOO_MANY_NAMES => "STATUS_TOO_MANY_NAMES",
            _ => return None,
        })
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:08x})", self.0),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

impl fmt::Debug for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NtStatus({self})")
    }
}

impl NdrEncode for NtStatus {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> midl_ndr::Result<()> {
        self.0.ndr_encode(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for NtStatus {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> midl_ndr::Result<Self> {
        u32::ndr_decode(buf, ctx, cursor).map(Self)
    }

    fn ndr_align() -> usize {
        4
    }
}
