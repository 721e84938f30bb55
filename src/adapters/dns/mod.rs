mod fixed;
mod system;

pub use fixed::StaticDnsResolver;
pub use system::SystemDnsResolver;
