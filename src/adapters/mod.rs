pub mod boa_runtime;
pub mod clock;
pub mod dns;
pub mod local_address;
pub mod pac_resolver;
pub mod source_loader;

pub use boa_runtime::{BoaPreparedScript, BoaScriptRuntime, ExecutionLimits};
pub use clock::{FixedClock, SystemClock};
pub use dns::{StaticDnsResolver, SystemDnsResolver};
pub use local_address::{StaticLocalAddress, UdpLocalAddress};
pub use pac_resolver::PacProxyResolver;
pub use source_loader::load_pac_source;
