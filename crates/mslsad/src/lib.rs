//! MS-LSAD name and SID lookup client
//!
//! Implements the client side of `LsarLookupNames` (opnum 14) and
//! `LsarLookupSids` (opnum 15) from the Local Security Authority (Domain
//! Policy) Remote Protocol, on top of the [`midl_ndr`] runtime.
//!
//! The RPC connection itself is not managed here. Callers supply an
//! [`RpcTransport`] that is already bound to the `lsarpc` interface, and a
//! policy [`ContextHandle`] obtained from `LsarOpenPolicy2`.
//!
//! # Example
//!
//! ```no_run
//! # async fn example(transport: impl mslsad::RpcTransport, handle: mslsad::ContextHandle) -> mslsad::Result<()> {
//! use mslsad::LocalSecurityAuthorityService;
//!
//! let service = LocalSecurityAuthorityService::new(transport);
//! let sids = service.lookup_names(&handle, &["Administrator", "Guest"]).await?;
//! for sid in sids.iter().flatten() {
//!     println!("{sid}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod messages;
pub mod objects;
pub mod service;
pub mod sid;
pub mod status;
pub mod transport;

pub use config::LsaServiceConfig;
pub use error::{LsaError, Result};
pub use handle::ContextHandle;
pub use messages::{LookupNamesRequest, LookupNamesResponse, LookupSidsRequest, LookupSidsResponse};
pub use objects::{
    CountedArray, LookupLevel, ReferencedDomainList, SidEnumBuffer, SidInformation, SidNameUse, TranslatedName,
    TranslatedNames, TranslatedSid, TranslatedSids, TrustInformation,
};
pub use service::{resolve_names, resolve_sids, AccountName, LocalSecurityAuthorityService};
pub use sid::{Sid, SidError, MAX_SUB_AUTHORITIES};
pub use status::NtStatus;
pub use transport::{RpcTransport, TransportError};
