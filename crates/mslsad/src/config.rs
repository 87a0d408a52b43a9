//! Service configuration

use crate::objects::LookupLevel;

/// Settings applied to every request a
/// [`LocalSecurityAuthorityService`](crate::LocalSecurityAuthorityService) sends
#[derive(Debug, Clone, Default)]
pub struct LsaServiceConfig {
    /// Lookup level sent with every request
    pub lookup_level: LookupLevel,
}

impl LsaServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookup_level(mut self, lookup_level: LookupLevel) -> Self {
        self.lookup_level = lookup_level;
        self
    }
}
