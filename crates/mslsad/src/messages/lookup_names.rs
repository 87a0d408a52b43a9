//! `LsarLookupNames` (opnum 14)
//!
//! ```text
//! [in]      LSAPR_HANDLE PolicyHandle
//! [in, range(0,1000)] unsigned long Count
//! [in, size_is(Count)] PRPC_UNICODE_STRING Names
//! [out]     PLSAPR_REFERENCED_DOMAIN_LIST* ReferencedDomains
//! [in, out] PLSAPR_TRANSLATED_SIDS TranslatedSids
//! [in]      LSAP_LOOKUP_LEVEL LookupLevel
//! [in, out] unsigned long* MappedCount
//! ```

use super::{decode_stub, encode_stub};
use crate::error::{LsaError, Result};
use crate::handle::ContextHandle;
use crate::objects::{LookupLevel, ReferencedDomainList, TranslatedSid, TranslatedSids};
use crate::status::NtStatus;
use midl_ndr::{
    decode_elements, decode_conformance, encode_conformance, Bytes, NdrDecode, NdrEncode, NdrError, UniquePtr,
    UnicodeString,
};

/// Request stub for `LsarLookupNames`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupNamesRequest {
    pub policy_handle: ContextHandle,
    pub names: Vec<UnicodeString>,
    pub lookup_level: LookupLevel,
}

impl LookupNamesRequest {
    pub const OPNUM: u16 = 14;

    /// Upper bound the server places on `Count`
    pub const MAX_NAMES: usize = 1000;

    pub fn new<I, S>(policy_handle: ContextHandle, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UnicodeString>,
    {
        Self {
            policy_handle,
            names: names.into_iter().map(Into::into).collect(),
            lookup_level: LookupLevel::default(),
        }
    }

    pub fn with_lookup_level(mut self, lookup_level: LookupLevel) -> Self {
        self.lookup_level = lookup_level;
        self
    }

    fn validate(&self) -> Result<u32> {
        if self.names.len() > Self::MAX_NAMES {
            return Err(LsaError::InvalidArgument(format!(
                "{} names exceeds the limit of {}",
                self.names.len(),
                Self::MAX_NAMES
            )));
        }
        for name in &self.names {
            name.byte_len()
                .map_err(|err| LsaError::InvalidArgument(err.to_string()))?;
        }
        // Bounded by MAX_NAMES
        Ok(self.names.len() as u32)
    }

    /// Marshal the request stub
    pub fn encode(&self) -> Result<Bytes> {
        let count = self.validate()?;
        let stub = encode_stub(|buf, ctx, cursor| {
            self.policy_handle.ndr_encode(buf, ctx, cursor)?;
            count.ndr_encode(buf, ctx, cursor)?;

            encode_conformance(buf, ctx, cursor, count);
            for name in &self.names {
                name.ndr_encode(buf, ctx, cursor)?;
            }
            for name in &self.names {
                name.ndr_encode_deferred(buf, ctx, cursor)?;
            }

            // Nothing translated yet: Entries = 0, null buffer
            TranslatedSids::default().ndr_encode_complete(buf, ctx, cursor)?;
            self.lookup_level.ndr_encode(buf, ctx, cursor)?;
            // MappedCount
            0u32.ndr_encode(buf, ctx, cursor)
        })?;
        Ok(stub)
    }

    /// Unmarshal a request stub, as a server sees it
    pub fn decode(stub: &[u8]) -> Result<Self> {
        let request = decode_stub(stub, |buf, ctx, cursor| {
            let policy_handle = ContextHandle::ndr_decode(buf, ctx, cursor)?;
            let count = u32::ndr_decode(buf, ctx, cursor)?;

            let max_count = decode_conformance(buf, ctx, cursor)?;
            if max_count != count {
                return Err(NdrError::ArraySizeMismatch {
                    expected: count as usize,
                    got: max_count as usize,
                });
            }
            let mut names = decode_elements(buf, ctx, cursor, count as usize, UnicodeString::ndr_decode)?;
            for name in &mut names {
                name.ndr_decode_deferred(buf, ctx, cursor)?;
            }

            let _translated = TranslatedSids::ndr_decode_complete(buf, ctx, cursor)?;
            let lookup_level = LookupLevel::ndr_decode(buf, ctx, cursor)?;
            let _mapped_count = u32::ndr_decode(buf, ctx, cursor)?;

            Ok(Self {
                policy_handle,
                names,
                lookup_level,
            })
        })?;
        Ok(request)
    }
}

/// Response stub for `LsarLookupNames`
///
/// A non-success `status` is carried as data; deciding what it means is up
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupNamesResponse {
    pub referenced_domains: UniquePtr<ReferencedDomainList>,
    pub translated_sids: TranslatedSids,
    pub mapped_count: u32,
    pub status: NtStatus,
}

impl LookupNamesResponse {
    pub fn new(
        referenced_domains: Option<ReferencedDomainList>,
        translated_sids: Vec<TranslatedSid>,
        mapped_count: u32,
        status: NtStatus,
    ) -> Self {
        Self {
            referenced_domains: UniquePtr::from_option(referenced_domains),
            translated_sids: TranslatedSids::new(translated_sids),
            mapped_count,
            status,
        }
    }

    pub fn referenced_domains(&self) -> Option<&ReferencedDomainList> {
        self.referenced_domains.as_ref()
    }

    pub fn translated_sids(&self) -> &[TranslatedSid] {
        self.translated_sids.as_slice()
    }

    /// Unmarshal the response stub
    pub fn decode(stub: &[u8]) -> Result<Self> {
        let response = decode_stub(stub, |buf, ctx, cursor| {
            let referenced_domains = UniquePtr::ndr_decode_complete(buf, ctx, cursor)?;
            let translated_sids = TranslatedSids::ndr_decode_complete(buf, ctx, cursor)?;
            let mapped_count = u32::ndr_decode(buf, ctx, cursor)?;
            let status = NtStatus::ndr_decode(buf, ctx, cursor)?;
            Ok(Self {
                referenced_domains,
                translated_sids,
                mapped_count,
                status,
            })
        })?;
        Ok(response)
    }

    /// Marshal the response stub, as a server sends it
    pub fn encode(&self) -> Result<Bytes> {
        let stub = encode_stub(|buf, ctx, cursor| {
            self.referenced_domains.ndr_encode_complete(buf, ctx, cursor)?;
            self.translated_sids.ndr_encode_complete(buf, ctx, cursor)?;
            self.mapped_count.ndr_encode(buf, ctx, cursor)?;
            self.status.ndr_encode(buf, ctx, cursor)
        })?;
        Ok(stub)
    }
}
