use crate::domain::{ProxyChain, ProxyDirective, Result};
use async_trait::async_trait;
use url::Url;

/// Port for resolving which proxy to use for a given URL
#[async_trait]
pub trait ProxyResolverPort: Send + Sync {
    /// Resolve the preferred proxy directive for a given target URL
    async fn resolve_route(&self, target_url: &Url) -> Result<ProxyDirective>;

    /// Get the whole proxy chain for a URL (for failover)
    async fn resolve_all_routes(&self, target_url: &Url) -> Result<ProxyChain>;

    /// Replace the PAC script, or unload it with None
    async fn update_script(&self, source: Option<String>) -> Result<()>;
}
