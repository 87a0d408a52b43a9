//! Security identifiers
//!
//! [`Sid`] is both the service-level value handed back to callers and the
//! `RPC_SID` wire structure:
//!
//! ```text
//! max_count: u32             # conformance, must equal SubAuthorityCount
//! Revision: u8
//! SubAuthorityCount: u8      # 0..=15
//! IdentifierAuthority: [u8; 6]  # 48-bit big-endian value
//! SubAuthority: [u32; SubAuthorityCount]
//! ```

use midl_ndr::{
    decode_conformance, decode_elements, encode_conformance, Buf, BufMut, FixedArray, NdrContext, NdrCursor,
    NdrDecode, NdrEncode, NdrError,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of sub-authorities a SID may carry
pub const MAX_SUB_AUTHORITIES: usize = 15;

/// Largest identifier authority representable in 48 bits
const MAX_AUTHORITY: u64 = (1 << 48) - 1;

/// SID construction and decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SidError {
    #[error("SID has {0} sub-authorities, maximum is 15")]
    TooManySubAuthorities(usize),

    #[error("SID sub-authority count {count} does not match array conformance {conformance}")]
    ConformanceMismatch { count: u8, conformance: u32 },

    #[error("invalid SID string {0:?}")]
    InvalidFormat(String),
}

/// A Windows security identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sid {
    revision: u8,
    identifier_authority: [u8; 6],
    sub_authorities: Vec<u32>,
}

impl Sid {
    /// Current SID revision
    pub const REVISION: u8 = 1;

    pub fn new(revision: u8, identifier_authority: [u8; 6], sub_authorities: Vec<u32>) -> Result<Self, SidError> {
        if sub_authorities.len() > MAX_SUB_AUTHORITIES {
            return Err(SidError::TooManySubAuthorities(sub_authorities.len()));
        }
        Ok(Self {
            revision,
            identifier_authority,
            sub_authorities,
        })
    }

    /// Build a SID from a numeric authority (truncated to 48 bits)
    pub fn from_authority(revision: u8, authority: u64, sub_authorities: Vec<u32>) -> Result<Self, SidError> {
        let bytes = authority.to_be_bytes();
        let mut identifier_authority = [0u8; 6];
        identifier_authority.copy_from_slice(&bytes[2..]);
        Self::new(revision, identifier_authority, sub_authorities)
    }

    pub fn revision(&self) -> u8 {
        self.revision
    }

    pub fn identifier_authority(&self) -> [u8; 6] {
        self.identifier_authority
    }

    /// The identifier authority as a 48-bit big-endian value
    pub fn authority(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes[2..].copy_from_slice(&self.identifier_authority);
        u64::from_be_bytes(bytes)
    }

    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }

    /// Derive the SID of a principal in this domain. `self` is unchanged.
    pub fn add_relative_id(&self, rid: u32) -> Result<Self, SidError> {
        if self.sub_authorities.len() >= MAX_SUB_AUTHORITIES {
            return Err(SidError::TooManySubAuthorities(self.sub_authorities.len() + 1));
        }
        let mut sub_authorities = Vec::with_capacity(self.sub_authorities.len() + 1);
        sub_authorities.extend_from_slice(&self.sub_authorities);
        sub_authorities.push(rid);
        Ok(Self {
            revision: self.revision,
            identifier_authority: self.identifier_authority,
            sub_authorities,
        })
    }

    /// The last sub-authority, if any
    pub fn rid(&self) -> Option<u32> {
        self.sub_authorities.last().copied()
    }

    /// This SID with its last sub-authority removed
    pub fn domain_sid(&self) -> Option<Self> {
        let (_, domain) = self.sub_authorities.split_last()?;
        Some(Self {
            revision: self.revision,
            identifier_authority: self.identifier_authority,
            sub_authorities: domain.to_vec(),
        })
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.revision)?;

        let authority = self.authority();
        if authority <= u64::from(u32::MAX) {
            write!(f, "-{authority}")?;
        } else {
            write!(f, "-0x{authority:012X}")?;
        }

        for sub_authority in &self.sub_authorities {
            write!(f, "-{sub_authority}")?;
        }
        Ok(())
    }
}

impl FromStr for Sid {
    type Err = SidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SidError::InvalidFormat(s.to_string());

        let mut parts = s.split('-');
        if !parts.next().is_some_and(|p| p.eq_ignore_ascii_case("s")) {
            return Err(invalid());
        }

        let revision: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;

        let authority_str = parts.next().ok_or_else(invalid)?;
        let authority = match authority_str
            .strip_prefix("0x")
            .or_else(|| authority_str.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => authority_str.parse(),
        }
        .ok()
        .filter(|value| *value <= MAX_AUTHORITY)
        .ok_or_else(invalid)?;

        let sub_authorities = parts
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_authority(revision, authority, sub_authorities)
    }
}

impl NdrEncode for Sid {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> midl_ndr::Result<()> {
        // Bounded by MAX_SUB_AUTHORITIES at construction
        let count = u8::try_from(self.sub_authorities.len()).map_err(|_| NdrError::IntegerOverflow)?;

        encode_conformance(buf, ctx, cursor, u32::from(count));
        self.revision.ndr_encode(buf, ctx, cursor)?;
        count.ndr_encode(buf, ctx, cursor)?;
        FixedArray::new(self.identifier_authority).ndr_encode(buf, ctx, cursor)?;
        for sub_authority in &self.sub_authorities {
            sub_authority.ndr_encode(buf, ctx, cursor)?;
        }
        Ok(())
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for Sid {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> midl_ndr::Result<Self> {
        let conformance = decode_conformance(buf, ctx, cursor)?;
        let revision = u8::ndr_decode(buf, ctx, cursor)?;
        let count = u8::ndr_decode(buf, ctx, cursor)?;

        if usize::from(count) > MAX_SUB_AUTHORITIES {
            return Err(NdrError::custom(SidError::TooManySubAuthorities(count.into())));
        }
        if conformance != u32::from(count) {
            return Err(NdrError::custom(SidError::ConformanceMismatch { count, conformance }));
        }

        let identifier_authority = FixedArray::<u8, 6>::ndr_decode(buf, ctx, cursor)?.into_inner();
        let sub_authorities = decode_elements(buf, ctx, cursor, count.into(), u32::ndr_decode)?;

        Ok(Self {
            revision,
            identifier_authority,
            sub_authorities,
        })
    }

    fn ndr_align() -> usize {
        4
    }
}
