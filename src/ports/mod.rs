pub mod clock;
pub mod dns;
pub mod local_address;
pub mod resolver;
pub mod script;

pub use clock::ClockPort;
pub use dns::DnsPort;
pub use local_address::LocalAddressPort;
pub use resolver::ProxyResolverPort;
pub use script::{PreparedScript, ScriptRuntimePort};
