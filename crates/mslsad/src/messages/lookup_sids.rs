//! `LsarLookupSids` (opnum 15)
//!
//! ```text
//! [in]      LSAPR_HANDLE PolicyHandle
//! [in]      PLSAPR_SID_ENUM_BUFFER SidEnumBuffer
//! [out]     PLSAPR_REFERENCED_DOMAIN_LIST* ReferencedDomains
//! [in, out] PLSAPR_TRANSLATED_NAMES TranslatedNames
//! [in]      LSAP_LOOKUP_LEVEL LookupLevel
//! [in, out] unsigned long* MappedCount
//! ```

use super::{decode_stub, encode_stub};
use crate::error::{LsaError, Result};
use crate::handle::ContextHandle;
use crate::objects::{
    LookupLevel, ReferencedDomainList, SidEnumBuffer, SidInformation, TranslatedName, TranslatedNames,
};
use crate::sid::Sid;
use crate::status::NtStatus;
use midl_ndr::{Bytes, NdrDecode, NdrEncode, UniquePtr};

/// Request stub for `LsarLookupSids`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSidsRequest {
    pub policy_handle: ContextHandle,
    pub sids: Vec<Sid>,
    pub lookup_level: LookupLevel,
}

impl LookupSidsRequest {
    pub const OPNUM: u16 = 15;

    /// Upper bound the server places on `SidEnumBuffer.Entries`
    pub const MAX_SIDS: usize = 20480;

    pub fn new(policy_handle: ContextHandle, sids: impl IntoIterator<Item = Sid>) -> Self {
        Self {
            policy_handle,
            sids: sids.into_iter().collect(),
            lookup_level: LookupLevel::default(),
        }
    }

    pub fn with_lookup_level(mut self, lookup_level: LookupLevel) -> Self {
        self.lookup_level = lookup_level;
        self
    }

    /// Marshal the request stub
    pub fn encode(&self) -> Result<Bytes> {
        if self.sids.len() > Self::MAX_SIDS {
            return Err(LsaError::InvalidArgument(format!(
                "{} SIDs exceeds the limit of {}",
                self.sids.len(),
                Self::MAX_SIDS
            )));
        }

        let buffer = SidEnumBuffer::new(self.sids.iter().cloned().map(SidInformation::new).collect());
        let stub = encode_stub(|buf, ctx, cursor| {
            self.policy_handle.ndr_encode(buf, ctx, cursor)?;
            buffer.ndr_encode_complete(buf, ctx, cursor)?;
            TranslatedNames::default().ndr_encode_complete(buf, ctx, cursor)?;
            self.lookup_level.ndr_encode(buf, ctx, cursor)?;
            // MappedCount
            0u32.ndr_encode(buf, ctx, cursor)
        })?;
        Ok(stub)
    }

    /// Unmarshal a request stub, as a server sees it
    ///
    /// Null SID pointers in the enum buffer are dropped.
    pub fn decode(stub: &[u8]) -> Result<Self> {
        let request = decode_stub(stub, |buf, ctx, cursor| {
            let policy_handle = ContextHandle::ndr_decode(buf, ctx, cursor)?;
            let buffer = SidEnumBuffer::ndr_decode_complete(buf, ctx, cursor)?;
            let _translated = TranslatedNames::ndr_decode_complete(buf, ctx, cursor)?;
            let lookup_level = LookupLevel::ndr_decode(buf, ctx, cursor)?;
            let _mapped_count = u32::ndr_decode(buf, ctx, cursor)?;

            Ok(Self {
                policy_handle,
                sids: buffer.into_vec().into_iter().filter_map(|info| info.sid.into_option()).collect(),
                lookup_level,
            })
        })?;
        Ok(request)
    }
}

/// Response stub for `LsarLookupSids`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSidsResponse {
    pub referenced_domains: UniquePtr<ReferencedDomainList>,
    pub translated_names: TranslatedNames,
    pub mapped_count: u32,
    pub status: NtStatus,
}

impl LookupSidsResponse {
    pub fn new(
        referenced_domains: Option<ReferencedDomainList>,
        translated_names: Vec<TranslatedName>,
        mapped_count: u32,
        status: NtStatus,
    ) -> Self {
        Self {
            referenced_domains: UniquePtr::from_option(referenced_domains),
            translated_names: TranslatedNames::new(translated_names),
            mapped_count,
            status,
        }
    }

    pub fn referenced_domains(&self) -> Option<&ReferencedDomainList> {
        self.referenced_domains.as_ref()
    }

    pub fn translated_names(&self) -> &[TranslatedName] {
        self.translated_names.as_slice()
    }

    pub fn decode(stub: &[u8]) -> Result<Self> {
        let response = decode_stub(stub, |buf, ctx, cursor| {
            let referenced_domains = UniquePtr::ndr_decode_complete(buf, ctx, cursor)?;
            let translated_names = TranslatedNames::ndr_decode_complete(buf, ctx, cursor)?;
            let mapped_count = u32::ndr_decode(buf, ctx, cursor)?;
            let status = NtStatus::ndr_decode(buf, ctx, cursor)?;
            Ok(Self {
                referenced_domains,
                translated_names,
                mapped_count,
                status,
            })
        })?;
        Ok(response)
    }

    pub fn encode(&self) -> Result<Bytes> {
        let stub = encode_stub(|buf, ctx, cursor| {
            self.referenced_domains.ndr_encode_complete(buf, ctx, cursor)?;
            self.translated_names.ndr_encode_complete(buf, ctx, cursor)?;
            self.mapped_count.ndr_encode(buf, ctx, cursor)?;
            self.status.ndr_encode(buf, ctx, cursor)
        })?;
        Ok(stub)
    }
}
