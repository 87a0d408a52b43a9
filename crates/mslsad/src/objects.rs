//! LSAD structures carried by the lookup operations
//!
//! Every list in these messages has the same shape: a 32-bit `Entries` count
//! followed by a unique pointer to a conformant array. [`CountedArray`]
//! captures it once.

use crate::sid::Sid;
use midl_ndr::{
    Buf, BufMut, ConformantArray, NdrContext, NdrCursor, NdrDecode, NdrEncode, NdrError, Result, UniquePtr,
    UnicodeString,
};
use std::fmt;
use tracing::warn;

/// `SID_NAME_USE`
///
/// Codes outside the documented range are kept as [`SidNameUse::Unrecognized`]
/// so one odd entry does not spoil the rest of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidNameUse {
    User,
    Group,
    Domain,
    Alias,
    WellKnownGroup,
    DeletedAccount,
    Invalid,
    Unknown,
    Computer,
    Label,
    Unrecognized(u16),
}

impl SidNameUse {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::User,
            2 => Self::Group,
            3 => Self::Domain,
            4 => Self::Alias,
            5 => Self::WellKnownGroup,
            6 => Self::DeletedAccount,
            7 => Self::Invalid,
            8 => Self::Unknown,
            9 => Self::Computer,
            10 => Self::Label,
            other => Self::Unrecognized(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Self::User => 1,
            Self::Group => 2,
            Self::Domain => 3,
            Self::Alias => 4,
            Self::WellKnownGroup => 5,
            Self::DeletedAccount => 6,
            Self::Invalid => 7,
            Self::Unknown => 8,
            Self::Computer => 9,
            Self::Label => 10,
            Self::Unrecognized(value) => value,
        }
    }

    /// Whether the server resolved the entry
    pub fn is_mapped(self) -> bool {
        !matches!(self, Self::Invalid | Self::Unknown | Self::Unrecognized(_))
    }
}

impl fmt::Display for SidNameUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "SidTypeUser",
            Self::Group => "SidTypeGroup",
            Self::Domain => "SidTypeDomain",
            Self::Alias => "SidTypeAlias",
            Self::WellKnownGroup => "SidTypeWellKnownGroup",
            Self::DeletedAccount => "SidTypeDeletedAccount",
            Self::Invalid => "SidTypeInvalid",
            Self::Unknown => "SidTypeUnknown",
            Self::Computer => "SidTypeComputer",
            Self::Label => "SidTypeLabel",
            Self::Unrecognized(value) => return write!(f, "SidType({})", value),
        };
        f.write_str(name)
    }
}

// NDR transmits enums as 16-bit values
impl NdrEncode for SidNameUse {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.as_u16().ndr_encode(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        2
    }
}

impl NdrDecode for SidNameUse {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        u16::ndr_decode(buf, ctx, cursor).map(Self::from_u16)
    }

    fn ndr_align() -> usize {
        2
    }
}

/// `LSAP_LOOKUP_LEVEL`: which databases the server consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum LookupLevel {
    #[default]
    Workstation = 1,
    Preferred = 2,
    Gc = 3,
    Xforest = 4,
    XforestReferral = 5,
    XforestResolve = 6,
    RodcReferral = 7,
}

impl LookupLevel {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Workstation),
            2 => Some(Self::Preferred),
            3 => Some(Self::Gc),
            4 => Some(Self::Xforest),
            5 => Some(Self::XforestReferral),
            6 => Some(Self::XforestResolve),
            7 => Some(Self::RodcReferral),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl NdrEncode for LookupLevel {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.as_u16().ndr_encode(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        2
    }
}

impl NdrDecode for LookupLevel {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let value = u16::ndr_decode(buf, ctx, cursor)?;
        Self::from_u16(value).ok_or(NdrError::InvalidEnumValue(i32::from(value)))
    }

    fn ndr_align() -> usize {
        2
    }
}

/// `Entries` plus a unique pointer to `[size_is(Entries)]` elements
///
/// ```text
/// inline:   Entries: u32
///           Buffer: u32       # referent ID (0 = null)
/// deferred: max_count: u32
///           elements[max_count]
/// ```
///
/// The decoded elements are authoritative. A server `Entries` value that
/// disagrees with them is kept in [`CountedArray::entries`] and logged.
/// Equality compares the elements only.
#[derive(Debug, Clone)]
pub struct CountedArray<T> {
    array: UniquePtr<ConformantArray<T>>,
    /// `Entries` as received; `None` for locally built lists
    entries: Option<u32>,
}

impl<T> CountedArray<T> {
    /// An empty list is sent as `Entries = 0` with a null buffer.
    pub fn new(elements: Vec<T>) -> Self {
        let array = if elements.is_empty() {
            UniquePtr::null()
        } else {
            UniquePtr::new(ConformantArray::new(elements))
        };
        Self { array, entries: None }
    }

    /// The `Entries` field a decoded list arrived with
    pub fn entries(&self) -> Option<u32> {
        self.entries
    }

    pub fn as_slice(&self) -> &[T] {
        self.array.as_ref().map_or(&[], |array| array.elements.as_slice())
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.array.into_option().map(ConformantArray::into_vec).unwrap_or_default()
    }
}

impl<T: PartialEq> PartialEq for CountedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for CountedArray<T> {}

impl<T> Default for CountedArray<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> From<Vec<T>> for CountedArray<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::new(elements)
    }
}

impl<'a, T> IntoIterator for &'a CountedArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: NdrEncode> NdrEncode for CountedArray<T> {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        let entries = u32::try_from(self.len()).map_err(|_| NdrError::IntegerOverflow)?;
        entries.ndr_encode(buf, ctx, cursor)?;
        self.array.ndr_encode(buf, ctx, cursor)
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.array.ndr_encode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl<T: NdrDecode> NdrDecode for CountedArray<T> {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let entries = u32::ndr_decode(buf, ctx, cursor)?;
        let array = UniquePtr::ndr_decode(buf, ctx, cursor)?;
        Ok(Self {
            array,
            entries: Some(entries),
        })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.array.ndr_decode_deferred(buf, ctx, cursor)?;
        if let Some(entries) = self.entries {
            if entries as usize != self.len() {
                warn!("Entries = {} but {} elements were sent", entries, self.len());
            }
        }
        Ok(())
    }

    fn ndr_align() -> usize {
        4
    }
}

/// `LSAPR_TRUST_INFORMATION`: one referenced domain
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrustInformation {
    pub name: UnicodeString,
    pub sid: UniquePtr<Sid>,
}

impl TrustInformation {
    pub fn new(name: impl Into<UnicodeString>, sid: Option<Sid>) -> Self {
        Self {
            name: name.into(),
            sid: UniquePtr::from_option(sid),
        }
    }

    pub fn sid(&self) -> Option<&Sid> {
        self.sid.as_ref()
    }
}

impl NdrEncode for TrustInformation {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.name.ndr_encode(buf, ctx, cursor)?;
        self.sid.ndr_encode(buf, ctx, cursor)
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.name.ndr_encode_deferred(buf, ctx, cursor)?;
        self.sid.ndr_encode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for TrustInformation {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let name = UnicodeString::ndr_decode(buf, ctx, cursor)?;
        let sid = UniquePtr::ndr_decode(buf, ctx, cursor)?;
        Ok(Self { name, sid })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.name.ndr_decode_deferred(buf, ctx, cursor)?;
        self.sid.ndr_decode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

/// `LSAPR_REFERENCED_DOMAIN_LIST`
///
/// Translated entries point into this list by index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferencedDomainList {
    pub domains: CountedArray<TrustInformation>,
    /// Advisory only; never used to bound indexing
    pub max_entries: u32,
}

impl ReferencedDomainList {
    pub fn new(domains: Vec<TrustInformation>) -> Self {
        let max_entries = u32::try_from(domains.len()).unwrap_or(u32::MAX);
        Self::with_max_entries(domains, max_entries)
    }

    pub fn with_max_entries(domains: Vec<TrustInformation>, max_entries: u32) -> Self {
        Self {
            domains: CountedArray::new(domains),
            max_entries,
        }
    }

    /// Entry for a translated `DomainIndex`; `None` for negative or
    /// out-of-range indices
    pub fn get(&self, index: i32) -> Option<&TrustInformation> {
        usize::try_from(index).ok().and_then(|i| self.domains.get(i))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrustInformation> {
        self.domains.iter()
    }
}

impl NdrEncode for ReferencedDomainList {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.domains.ndr_encode(buf, ctx, cursor)?;
        self.max_entries.ndr_encode(buf, ctx, cursor)
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.domains.ndr_encode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for ReferencedDomainList {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let domains = CountedArray::ndr_decode(buf, ctx, cursor)?;
        let max_entries = u32::ndr_decode(buf, ctx, cursor)?;
        Ok(Self { domains, max_entries })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.domains.ndr_decode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

/// `LSAPR_TRANSLATED_SID`
///
/// ```text
/// Use: u16          # SID_NAME_USE, then 2 bytes padding
/// RelativeId: u32
/// DomainIndex: i32  # -1 when no domain applies
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatedSid {
    pub sid_use: SidNameUse,
    pub relative_id: u32,
    pub domain_index: i32,
}

impl TranslatedSid {
    pub fn new(sid_use: SidNameUse, relative_id: u32, domain_index: i32) -> Self {
        Self {
            sid_use,
            relative_id,
            domain_index,
        }
    }

    /// Entry the server could not translate
    pub fn unmapped() -> Self {
        Self::new(SidNameUse::Unknown, 0, -1)
    }
}

impl NdrEncode for TranslatedSid {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        cursor.write_align(buf, 4);
        self.sid_use.ndr_encode(buf, ctx, cursor)?;
        self.relative_id.ndr_encode(buf, ctx, cursor)?;
        self.domain_index.ndr_encode(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for TranslatedSid {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        cursor.read_align(buf, 4, 12)?;
        let sid_use = SidNameUse::ndr_decode(buf, ctx, cursor)?;
        let relative_id = u32::ndr_decode(buf, ctx, cursor)?;
        let domain_index = i32::ndr_decode(buf, ctx, cursor)?;
        Ok(Self {
            sid_use,
            relative_id,
            domain_index,
        })
    }

    fn ndr_align() -> usize {
        4
    }
}

/// `LSAPR_TRANSLATED_SIDS`
pub type TranslatedSids = CountedArray<TranslatedSid>;

/// `LSAPR_SID_INFORMATION`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SidInformation {
    pub sid: UniquePtr<Sid>,
}

impl SidInformation {
    pub fn new(sid: Sid) -> Self {
        Self {
            sid: UniquePtr::new(sid),
        }
    }
}

impl NdrEncode for SidInformation {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.sid.ndr_encode(buf, ctx, cursor)
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.sid.ndr_encode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for SidInformation {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        Ok(Self {
            sid: UniquePtr::ndr_decode(buf, ctx, cursor)?,
        })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.sid.ndr_decode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

/// `LSAPR_SID_ENUM_BUFFER`
pub type SidEnumBuffer = CountedArray<SidInformation>;

/// `LSAPR_TRANSLATED_NAME`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedName {
    pub sid_use: SidNameUse,
    pub name: UnicodeString,
    pub domain_index: i32,
}

impl TranslatedName {
    pub fn new(sid_use: SidNameUse, name: impl Into<UnicodeString>, domain_index: i32) -> Self {
        Self {
            sid_use,
            name: name.into(),
            domain_index,
        }
    }
}

impl NdrEncode for TranslatedName {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        cursor.write_align(buf, 4);
        self.sid_use.ndr_encode(buf, ctx, cursor)?;
        self.name.ndr_encode(buf, ctx, cursor)?;
        self.domain_index.ndr_encode(buf, ctx, cursor)
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.name.ndr_encode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for TranslatedName {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        cursor.read_align(buf, 4, 16)?;
        let sid_use = SidNameUse::ndr_decode(buf, ctx, cursor)?;
        let name = UnicodeString::ndr_decode(buf, ctx, cursor)?;
        let domain_index = i32::ndr_decode(buf, ctx, cursor)?;
        Ok(Self {
            sid_use,
            name,
            domain_index,
        })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.name.ndr_decode_deferred(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

/// `LSAPR_TRANSLATED_NAMES`
pub type TranslatedNames = CountedArray<TranslatedName>;

#[cfg(test)]
mod tests {
    use super::*;
    use midl_ndr::BytesMut;

    fn encode<T: NdrEncode>(value: &T) -> BytesMut {
        let ctx = NdrContext::new();
        let mut buf = BytesMut::new();
        let mut cursor = NdrCursor::new();
        value.ndr_encode_complete(&mut buf, &ctx, &mut cursor).unwrap();
        buf
    }

    fn decode<T: NdrDecode>(bytes: &[u8]) -> Result<T> {
        let ctx = NdrContext::new();
        let mut reader = bytes;
        let mut cursor = NdrCursor::new();
        T::ndr_decode_complete(&mut reader, &ctx, &mut cursor)
    }

    // Referenced domain list from a workstation answering for "Administrator"
    const DOMAIN_LIST: &str = "010000000400020020000000010000001a001c00080002000c0002000e00000000000000\
                               0d0000005700310030002d0045004e0054002d005800360034002d0055000000\
                               04000000010400000000000515000000a43cb4affe0503bd73de0f35";

    #[test]
    fn test_sid_name_use_codes() {
        assert_eq!(SidNameUse::from_u16(1), SidNameUse::User);
        assert_eq!(SidNameUse::from_u16(8), SidNameUse::Unknown);
        assert_eq!(SidNameUse::from_u16(10), SidNameUse::Label);
        assert_eq!(SidNameUse::from_u16(0), SidNameUse::Unrecognized(0));
        assert_eq!(SidNameUse::from_u16(11), SidNameUse::Unrecognized(11));
        for code in 0..=12 {
            assert_eq!(SidNameUse::from_u16(code).as_u16(), code);
        }

        assert!(SidNameUse::User.is_mapped());
        assert!(SidNameUse::WellKnownGroup.is_mapped());
        assert!(!SidNameUse::Invalid.is_mapped());
        assert!(!SidNameUse::Unknown.is_mapped());
        assert!(!SidNameUse::Unrecognized(11).is_mapped());
        assert_eq!(SidNameUse::Unrecognized(11).to_string(), "SidType(11)");
    }

    #[test]
    fn test_unrecognized_sid_name_use_kept() {
        assert_eq!(decode::<SidNameUse>(&[42, 0]).unwrap(), SidNameUse::Unrecognized(42));
        assert_eq!(&encode(&SidNameUse::Unrecognized(42))[..], &[42, 0]);

        let entry: TranslatedSid = decode(&hex::decode("0b000000f401000000000000").unwrap()).unwrap();
        assert_eq!(entry.sid_use, SidNameUse::Unrecognized(11));
        assert_eq!(entry.relative_id, 500);
    }

    #[test]
    fn test_lookup_level_default() {
        assert_eq!(LookupLevel::default(), LookupLevel::Workstation);
        assert_eq!(&encode(&LookupLevel::default())[..], &[1, 0]);
        assert_eq!(LookupLevel::from_u16(7), Some(LookupLevel::RodcReferral));
        assert_eq!(LookupLevel::from_u16(8), None);
    }

    #[test]
    fn test_translated_sid_layout() {
        let buf = encode(&TranslatedSid::new(SidNameUse::User, 500, 0));
        assert_eq!(hex::encode(&buf), "01000000f401000000000000");

        let buf = encode(&TranslatedSid::unmapped());
        assert_eq!(hex::encode(&buf), "0800000000000000ffffffff");
        assert_eq!(decode::<TranslatedSid>(&buf).unwrap(), TranslatedSid::unmapped());
    }

    #[test]
    fn test_empty_counted_array_is_null() {
        let buf = encode(&TranslatedSids::default());
        assert_eq!(&buf[..], &[0u8; 8]);

        let decoded: TranslatedSids = decode(&buf).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_counted_array_layout() {
        let sids = TranslatedSids::new(vec![
            TranslatedSid::new(SidNameUse::User, 500, 0),
            TranslatedSid::new(SidNameUse::Alias, 544, 1),
        ]);
        let buf = encode(&sids);
        assert_eq!(
            hex::encode(&buf),
            "0200000000000200\
             02000000\
             01000000f401000000000000\
             040000002002000001000000"
        );
        assert_eq!(decode::<TranslatedSids>(&buf).unwrap().into_vec(), sids.into_vec());
    }

    #[test]
    fn test_entries_mismatch_follows_elements() {
        // Entries = 2, array carries one element
        let bytes = hex::decode("02000000000002000100000001000000f401000000000000").unwrap();
        let decoded: TranslatedSids = decode(&bytes).unwrap();
        assert_eq!(decoded.entries(), Some(2));
        assert_eq!(decoded.into_vec(), vec![TranslatedSid::new(SidNameUse::User, 500, 0)]);
    }

    #[test]
    fn test_null_array_with_entries_is_empty() {
        let bytes = hex::decode("0100000000000000").unwrap();
        let decoded: TranslatedSids = decode(&bytes).unwrap();
        assert_eq!(decoded.entries(), Some(1));
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_truncated_counted_array_still_fails() {
        // Entries = 2, max_count = 2, only one element present
        let bytes = hex::decode("02000000000002000200000001000000f401000000000000").unwrap();
        assert!(matches!(
            decode::<TranslatedSids>(&bytes).unwrap_err(),
            NdrError::BufferUnderflow { .. }
        ));
    }

    #[test]
    fn test_decode_referenced_domain_list() {
        let bytes = hex::decode(DOMAIN_LIST).unwrap();
        let list: ReferencedDomainList = decode(&bytes).unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.max_entries, 32);

        let domain = list.get(0).unwrap();
        assert_eq!(domain.name.as_str(), "W10-ENT-X64-U");
        assert_eq!(
            domain.sid().unwrap().to_string(),
            "S-1-5-21-2947824804-3171091966-890232435"
        );
    }

    #[test]
    fn test_domain_index_bounds() {
        let bytes = hex::decode(DOMAIN_LIST).unwrap();
        let list: ReferencedDomainList = decode(&bytes).unwrap();
        assert!(list.get(-1).is_none());
        assert!(list.get(1).is_none());
        assert!(list.get(i32::MAX).is_none());

        let empty = ReferencedDomainList::default();
        assert!(empty.get(0).is_none());
    }

    #[test]
    fn test_truncated_domain_list() {
        let bytes = hex::decode(DOMAIN_LIST).unwrap();
        for len in [4, 12, 40, bytes.len() - 1] {
            assert!(decode::<ReferencedDomainList>(&bytes[..len]).is_err(), "length {len}");
        }
    }

    #[test]
    fn test_domain_with_null_sid() {
        let list = ReferencedDomainList::new(vec![TrustInformation::new("BUILTIN", None)]);
        let decoded: ReferencedDomainList = decode(&encode(&list)).unwrap();
        assert_eq!(decoded.get(0).unwrap().name.as_str(), "BUILTIN");
        assert!(decoded.get(0).unwrap().sid().is_none());
    }

    #[test]
    fn test_translated_name_roundtrip() {
        let names = TranslatedNames::new(vec![
            TranslatedName::new(SidNameUse::User, "Administrator", 0),
            TranslatedName::new(SidNameUse::Unknown, "", -1),
        ]);
        let buf = encode(&names);
        assert_eq!(decode::<TranslatedNames>(&buf).unwrap().into_vec(), names.into_vec());
    }

    #[test]
    fn test_sid_enum_buffer_layout() {
        let sid: Sid = "S-1-5-32-544".parse().unwrap();
        let buffer = SidEnumBuffer::new(vec![SidInformation::new(sid.clone())]);
        let buf = encode(&buffer);
        assert_eq!(
            hex::encode(&buf),
            "01000000000002000100000004000200\
             02000000010200000000000520000000\
             20020000"
        );
        let decoded: SidEnumBuffer = decode(&buf).unwrap();
        assert_eq!(decoded.get(0).and_then(|info| info.sid.as_ref()), Some(&sid));
    }
}
