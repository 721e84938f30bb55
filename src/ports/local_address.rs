use std::net::Ipv4Addr;

/// Port for discovering the address of the primary outbound interface
pub trait LocalAddressPort: Send + Sync {
    /// Returns None when no interface is usable. Must not block indefinitely.
    fn primary_ipv4(&self) -> Option<Ipv4Addr>;
}
