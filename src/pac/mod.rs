//! The PAC helper library: the functions a script can call and the
//! per-evaluation state they share.

pub mod calendar;
mod dns_cache;
pub mod glob;
mod helpers;
pub mod net;
mod scope;

pub use calendar::EvaluationClock;
pub use dns_cache::ResolutionCache;
pub use glob::{sh_exp_match, ShellPattern};
pub use helpers::{HelperFunction, HelperValue};
pub use scope::{EvaluationScope, HelperEnvironment};
