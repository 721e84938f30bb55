use crate::domain::{EvaluationRequest, Result};
use crate::pac::EvaluationScope;
use std::rc::Rc;
use std::sync::Arc;

/// Port for the embedded script language
///
/// The runtime only has to run `FindProxyForURL(url, host)` with the PAC helper
/// table callable from script code, and hand back the string it returns.
pub trait ScriptRuntimePort: Send + Sync {
    /// Validate and prepare a PAC source
    ///
    /// Fails with `ScriptLoadError` when the source does not parse, when its
    /// top-level code throws, or when it does not define `FindProxyForURL`.
    /// Top-level code runs against `scope`.
    fn prepare(&self, source: &str, scope: Rc<EvaluationScope>) -> Result<Arc<dyn PreparedScript>>;
}

/// A loaded PAC script, shared read-only by concurrent evaluations
pub trait PreparedScript: Send + Sync {
    /// Run `FindProxyForURL` for one request
    ///
    /// `scope` holds everything mutable for this evaluation (DNS cache, the
    /// sampled clock) and is dropped when the call returns.
    fn find_proxy_for_url(&self, request: &EvaluationRequest, scope: Rc<EvaluationScope>) -> Result<String>;
}
