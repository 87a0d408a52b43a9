//! Name and SID resolution over an `lsarpc` connection
//!
//! [`LocalSecurityAuthorityService`] sends one lookup request per call and
//! turns the translated entries into results aligned with the request:
//! slot `i` of the output answers entry `i` of the server's translation, and
//! anything the server could not resolve is `None`.

use crate::config::LsaServiceConfig;
use crate::error::{LsaError, Result};
use crate::handle::ContextHandle;
use crate::messages::{LookupNamesRequest, LookupNamesResponse, LookupSidsRequest, LookupSidsResponse};
use crate::objects::{ReferencedDomainList, SidNameUse};
use crate::sid::Sid;
use crate::status::NtStatus;
use crate::transport::RpcTransport;
use std::fmt;
use tracing::{debug, trace, warn};

/// An account name resolved from a SID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountName {
    /// Name of the referenced domain, when the server supplied one
    pub domain: Option<String>,
    pub name: String,
    pub sid_use: SidNameUse,
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) if !domain.is_empty() => write!(f, "{}\\{}", domain, self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// Client for the LSAD lookup operations
///
/// The policy handle passed to each call must come from an `LsarOpenPolicy2`
/// made on the same connection.
pub struct LocalSecurityAuthorityService<T> {
    transport: T,
    config: LsaServiceConfig,
}

impl<T: RpcTransport> LocalSecurityAuthorityService<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, LsaServiceConfig::default())
    }

    pub fn with_config(transport: T, config: LsaServiceConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &LsaServiceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve account names to SIDs
    ///
    /// Returns one slot per translated entry; unresolved names are `None`.
    pub async fn lookup_names<S: AsRef<str>>(
        &self,
        policy_handle: &ContextHandle,
        names: &[S],
    ) -> Result<Vec<Option<Sid>>> {
        let response = self.lookup_names_raw(policy_handle, names).await?;
        check_status(response.status)?;
        if response.translated_sids().len() != names.len() {
            warn!(
                "LookupNames: server translated {} entries for {} names",
                response.translated_sids().len(),
                names.len()
            );
        }
        resolve_sids(&response)
    }

    /// Send `LsarLookupNames` and return the decoded response as is
    pub async fn lookup_names_raw<S: AsRef<str>>(
        &self,
        policy_handle: &ContextHandle,
        names: &[S],
    ) -> Result<LookupNamesResponse> {
        let request = LookupNamesRequest::new(*policy_handle, names.iter().map(|name| name.as_ref()))
            .with_lookup_level(self.config.lookup_level);
        let stub = request.encode()?;

        debug!(
            "LookupNames: opnum={}, names={}, stub_len={}",
            LookupNamesRequest::OPNUM,
            names.len(),
            stub.len()
        );

        let reply = self
            .transport
            .call(LookupNamesRequest::OPNUM, stub)
            .await
            .map_err(LsaError::Transport)?;
        let response = LookupNamesResponse::decode(&reply)?;

        debug!(
            "LookupNames: status={}, mapped={}, domains={}, translated={}",
            response.status,
            response.mapped_count,
            response.referenced_domains().map_or(0, ReferencedDomainList::len),
            response.translated_sids().len()
        );
        Ok(response)
    }

    /// Resolve SIDs to account names
    ///
    /// Returns one slot per translated entry; unresolved SIDs are `None`.
    pub async fn lookup_sids(&self, policy_handle: &ContextHandle, sids: &[Sid]) -> Result<Vec<Option<AccountName>>> {
        let response = self.lookup_sids_raw(policy_handle, sids).await?;
        check_status(response.status)?;
        if response.translated_names().len() != sids.len() {
            warn!(
                "LookupSids: server translated {} entries for {} SIDs",
                response.translated_names().len(),
                sids.len()
            );
        }
        Ok(resolve_names(&response))
    }

    /// Send `LsarLookupSids` and return the decoded response as is
    pub async fn lookup_sids_raw(&self, policy_handle: &ContextHandle, sids: &[Sid]) -> Result<LookupSidsResponse> {
        let request = LookupSidsRequest::new(*policy_handle, sids.iter().cloned())
            .with_lookup_level(self.config.lookup_level);
        let stub = request.encode()?;

        debug!(
            "LookupSids: opnum={}, sids={}, stub_len={}",
            LookupSidsRequest::OPNUM,
            sids.len(),
            stub.len()
        );

        let reply = self
            .transport
            .call(LookupSidsRequest::OPNUM, stub)
            .await
            .map_err(LsaError::Transport)?;
        let response = LookupSidsResponse::decode(&reply)?;

        debug!(
            "LookupSids: status={}, mapped={}, domains={}, translated={}",
            response.status,
            response.mapped_count,
            response.referenced_domains().map_or(0, ReferencedDomainList::len),
            response.translated_names().len()
        );
        Ok(response)
    }
}

impl<T> fmt::Debug for LocalSecurityAuthorityService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSecurityAuthorityService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Partial and empty translations still carry usable entries; every other
/// error severity status fails the call.
fn check_status(status: NtStatus) -> Result<()> {
    if status == NtStatus::SOME_NOT_MAPPED || status == NtStatus::NONE_MAPPED || !status.is_error() {
        return Ok(());
    }
    Err(LsaError::Status(status))
}

/// Build the SID for each translated entry of a `LsarLookupNames` response
///
/// An entry resolves when its use is mapped and its domain index selects a
/// referenced domain that carries a SID. Fails only when appending the RID
/// would make a malformed SID.
pub fn resolve_sids(response: &LookupNamesResponse) -> Result<Vec<Option<Sid>>> {
    let domains = response.referenced_domains();
    response
        .translated_sids()
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Result<Option<Sid>> {
            if !entry.sid_use.is_mapped() {
                trace!("LookupNames: entry {} not mapped ({})", i, entry.sid_use);
                return Ok(None);
            }
            let Some(domain) = domains.and_then(|list| list.get(entry.domain_index)) else {
                warn!(
                    "LookupNames: entry {} has domain index {} outside {} referenced domains",
                    i,
                    entry.domain_index,
                    domains.map_or(0, ReferencedDomainList::len)
                );
                return Ok(None);
            };
            let Some(domain_sid) = domain.sid() else {
                trace!("LookupNames: entry {} references domain {} without a SID", i, domain.name);
                return Ok(None);
            };

            let sid = domain_sid.add_relative_id(entry.relative_id)?;
            trace!("LookupNames: entry {} -> {}", i, sid);
            Ok(Some(sid))
        })
        .collect()
}

/// Build the account name for each translated entry of a `LsarLookupSids`
/// response
///
/// Unmapped entries are `None`. A mapped entry whose domain index is out of
/// range keeps its name without a domain.
pub fn resolve_names(response: &LookupSidsResponse) -> Vec<Option<AccountName>> {
    let domains = response.referenced_domains();
    response
        .translated_names()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            if !entry.sid_use.is_mapped() {
                trace!("LookupSids: entry {} not mapped ({})", i, entry.sid_use);
                return None;
            }
            let domain = domains.and_then(|list| list.get(entry.domain_index));
            if domain.is_none() && entry.domain_index >= 0 {
                warn!(
                    "LookupSids: entry {} has domain index {} outside {} referenced domains",
                    i,
                    entry.domain_index,
                    domains.map_or(0, ReferencedDomainList::len)
                );
            }
            let account = AccountName {
                domain: domain.map(|d| d.name.to_string()),
                name: entry.name.to_string(),
                sid_use: entry.sid_use,
            };
            trace!("LookupSids: entry {} -> {}", i, account);
            Some(account)
        })
        .collect()
}
