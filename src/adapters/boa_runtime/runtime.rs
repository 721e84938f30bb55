use super::bindings::{register_helpers, type_name};
use crate::config::EngineConfig;
use crate::domain::{EvaluationError, EvaluationRequest, PacError, Result, ScriptLoadError};
use crate::pac::EvaluationScope;
use crate::ports::{PreparedScript, ScriptRuntimePort};
use boa_engine::vm::RuntimeLimits;
use boa_engine::{js_string, Context, JsError, JsObject, JsResult, JsString, JsValue, Script, Source};
use log::debug;
use std::rc::Rc;
use std::sync::Arc;

/// Execution budget applied to every script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub loop_iterations: u64,
    pub recursion: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            loop_iterations: config.loop_iteration_limit,
            recursion: config.recursion_limit,
        }
    }
}

impl From<&EngineConfig> for ExecutionLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            loop_iterations: config.loop_iteration_limit,
            recursion: config.recursion_limit,
        }
    }
}

/// PAC scripts on the Boa JavaScript engine.
///
/// Every evaluation gets a fresh context: script globals never survive from one
/// call to the next, and a context (which is not `Send`) never leaves the
/// thread that created it.
#[derive(Debug, Clone, Default)]
pub struct BoaScriptRuntime {
    limits: ExecutionLimits,
}

impl BoaScriptRuntime {
    pub fn new(limits: ExecutionLimits) -> Self {
        Self { limits }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(ExecutionLimits::from(config))
    }
}

impl ScriptRuntimePort for BoaScriptRuntime {
    fn prepare(&self, source: &str, scope: Rc<EvaluationScope>) -> Result<Arc<dyn PreparedScript>> {
        let mut context = new_context(self.limits, &scope)
            .map_err(|e| ScriptLoadError::Initialization(e.to_string()))?;

        let script = Script::parse(Source::from_bytes(source.as_bytes()), None, &mut context)
            .map_err(|e| ScriptLoadError::Syntax(e.to_string()))?;
        script
            .evaluate(&mut context)
            .map_err(|e| ScriptLoadError::Initialization(e.to_string()))?;
        if entry_point(&mut context).is_none() {
            return Err(ScriptLoadError::MissingEntryPoint.into());
        }

        debug!("PAC script validated ({} bytes, {} DNS lookups at top level)", source.len(), scope.dns_round_trips());
        Ok(Arc::new(BoaPreparedScript {
            source: source.to_string(),
            limits: self.limits,
        }))
    }
}

/// A validated PAC source, re-run in its own context for each evaluation.
///
/// Only the source text is kept. A Boa `Script` belongs to the context that
/// parsed it, so every call pays for a fresh context, a parse and the
/// script's top-level code (helper calls included) before `FindProxyForURL`
/// runs. That cost buys isolation: nothing a call leaves in the globals is
/// seen by the next one.
#[derive(Debug)]
pub struct BoaPreparedScript {
    source: String,
    limits: ExecutionLimits,
}

impl PreparedScript for BoaPreparedScript {
    fn find_proxy_for_url(&self, request: &EvaluationRequest, scope: Rc<EvaluationScope>) -> Result<String> {
        let mut context = new_context(self.limits, &scope).map_err(runtime_error)?;
        context
            .eval(Source::from_bytes(self.source.as_bytes()))
            .map_err(runtime_error)?;

        let entry = entry_point(&mut context)
            .ok_or_else(|| EvaluationError::Runtime("FindProxyForURL is not a function".into()))?;
        let args = [
            JsValue::from(JsString::from(request.url.as_str())),
            JsValue::from(JsString::from(request.host.as_str())),
        ];
        let result = entry
            .call(&JsValue::undefined(), &args, &mut context)
            .map_err(runtime_error)?;

        match result.as_string() {
            Some(answer) => Ok(answer.to_std_string_escaped()),
            None => Err(EvaluationError::NonStringResult(type_name(&result).to_string()).into()),
        }
    }
}

fn new_context(limits: ExecutionLimits, scope: &Rc<EvaluationScope>) -> JsResult<Context> {
    let mut context = Context::default();
    let mut runtime_limits = RuntimeLimits::default();
    runtime_limits.set_loop_iteration_limit(limits.loop_iterations);
    runtime_limits.set_recursion_limit(limits.recursion);
    context.set_runtime_limits(runtime_limits);
    register_helpers(&mut context, scope)?;
    Ok(context)
}

fn entry_point(context: &mut Context) -> Option<JsObject> {
    let global = context.global_object();
    let value = global.get(js_string!("FindProxyForURL"), context).ok()?;
    value.as_callable().cloned()
}

fn runtime_error(e: JsError) -> PacError {
    EvaluationError::Runtime(e.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, StaticDnsResolver, StaticLocalAddress};
    use crate::pac::HelperEnvironment;
    use chrono::DateTime;
    use std::net::Ipv4Addr;
    use uuid::Uuid;

    fn helpers(dns: Arc<StaticDnsResolver>) -> HelperEnvironment {
        let now = DateTime::parse_from_rfc3339("2022-05-23T14:34:56+02:00").unwrap();
        HelperEnvironment::new(
            dns,
            Arc::new(FixedClock::new(now)),
            Arc::new(StaticLocalAddress::new(Some(Ipv4Addr::new(192, 168, 1, 20)))),
        )
    }

    fn scope() -> Rc<EvaluationScope> {
        let dns = StaticDnsResolver::new().with_host("intranet.corp", Ipv4Addr::new(10, 1, 2, 3));
        Rc::new(helpers(Arc::new(dns)).begin(Uuid::new_v4()))
    }

    fn prepare(source: &str) -> Result<Arc<dyn PreparedScript>> {
        BoaScriptRuntime::default().prepare(source, scope())
    }

    fn run(source: &str, url: &str, host: &str) -> Result<String> {
        prepare(source)?.find_proxy_for_url(&EvaluationRequest::new(url, host), scope())
    }

    #[test]
    fn test_returns_the_script_answer() {
        let source = r#"function FindProxyForURL(url, host) { return "PROXY " + host + ":8080"; }"#;
        assert_eq!(run(source, "http://a.example/", "a.example").unwrap(), "PROXY a.example:8080");
    }

    #[test]
    fn test_receives_url_and_host() {
        let source = r#"function FindProxyForURL(url, host) { return url + "|" + host; }"#;
        assert_eq!(run(source, "http://a.example/x?y=1", "a.example").unwrap(), "http://a.example/x?y=1|a.example");
    }

    #[test]
    fn test_syntax_error() {
        let err = prepare("function FindProxyForURL(url, host) { return \"DIRECT\"; ").err().unwrap();
        assert!(matches!(err, PacError::ScriptLoad(ScriptLoadError::Syntax(_))));
    }

    #[test]
    fn test_missing_entry_point() {
        for source in ["function findProxyForURL(url, host) { return \"DIRECT\"; }", "var FindProxyForURL = 1;", ""] {
            let err = prepare(source).err().unwrap();
            assert_eq!(err, PacError::ScriptLoad(ScriptLoadError::MissingEntryPoint), "{:?}", source);
        }
    }

    #[test]
    fn test_top_level_failure() {
        let err = prepare("throw new Error('nope'); function FindProxyForURL(u, h) { return 'DIRECT'; }").err().unwrap();
        assert!(matches!(err, PacError::ScriptLoad(ScriptLoadError::Initialization(_))));
    }

    #[test]
    fn test_top_level_code_may_call_helpers() {
        let source = r#"
            var me = myIpAddress();
            function FindProxyForURL(url, host) { return "PROXY " + me + ":3128"; }
        "#;
        assert_eq!(run(source, "http://a/", "a").unwrap(), "PROXY 192.168.1.20:3128");
    }

    #[test]
    fn test_runtime_error() {
        let source = "function FindProxyForURL(url, host) { return undefinedFunction(host); }";
        let err = run(source, "http://a/", "a").unwrap_err();
        assert!(matches!(err, PacError::Evaluation(EvaluationError::Runtime(_))));
    }

    #[test]
    fn test_non_string_results() {
        for (body, kind) in [
            ("return undefined;", "undefined"),
            ("return null;", "null"),
            ("return 42;", "number"),
            ("return {};", "object"),
        ] {
            let source = format!("function FindProxyForURL(url, host) {{ {} }}", body);
            let err = run(&source, "http://a/", "a").unwrap_err();
            assert_eq!(err, PacError::Evaluation(EvaluationError::NonStringResult(kind.into())));
        }
    }

    #[test]
    fn test_endless_loop_is_stopped() {
        let runtime = BoaScriptRuntime::new(ExecutionLimits {
            loop_iterations: 10_000,
            recursion: 64,
        });
        let source = "function FindProxyForURL(url, host) { while (true) {} }";
        let prepared = runtime.prepare(source, scope()).unwrap();
        let err = prepared
            .find_proxy_for_url(&EvaluationRequest::new("http://a/", "a"), scope())
            .unwrap_err();
        assert!(err.is_evaluation_error());
    }

    #[test]
    fn test_runaway_recursion_is_stopped() {
        let source = "function f(n) { return f(n + 1); } function FindProxyForURL(url, host) { return f(0); }";
        assert!(run(source, "http://a/", "a").unwrap_err().is_evaluation_error());
    }

    #[test]
    fn test_globals_do_not_leak_between_evaluations() {
        let source = r#"
            var calls = 0;
            function FindProxyForURL(url, host) { calls++; return calls == 1 ? "DIRECT" : "PROXY leak:1"; }
        "#;
        let prepared = prepare(source).unwrap();
        for _ in 0..3 {
            let answer = prepared
                .find_proxy_for_url(&EvaluationRequest::new("http://a/", "a"), scope())
                .unwrap();
            assert_eq!(answer, "DIRECT");
        }
    }

    #[test]
    fn test_top_level_code_runs_once_per_evaluation() {
        let dns = Arc::new(StaticDnsResolver::new().with_host("intranet.corp", Ipv4Addr::new(10, 1, 2, 3)));
        let source = r#"
            var gateway = dnsResolve("intranet.corp");
            function FindProxyForURL(url, host) { return "PROXY " + gateway + ":3128"; }
        "#;
        let prepared = BoaScriptRuntime::default()
            .prepare(source, Rc::new(helpers(Arc::clone(&dns)).begin(Uuid::new_v4())))
            .unwrap();
        assert_eq!(dns.lookups(), 1);

        for round in 1..=3 {
            let scope = Rc::new(helpers(Arc::clone(&dns)).begin(Uuid::new_v4()));
            let answer = prepared
                .find_proxy_for_url(&EvaluationRequest::new("http://a/", "a"), scope)
                .unwrap();
            assert_eq!(answer, "PROXY 10.1.2.3:3128");
            assert_eq!(dns.lookups(), 1 + round);
        }
    }

    #[test]
    fn test_helpers_are_callable_from_script() {
        let source = r#"
            function FindProxyForURL(url, host) {
                if (typeof dnsDomainLevels(host) !== "number") return "bad levels";
                if (dnsDomainLevels(host) + 1 !== 2) return "bad arithmetic";
                if (!isInNet(dnsResolve(host), "10.0.0.0", "255.0.0.0")) return "bad net";
                if (!shExpMatch(url, "*/wiki/*")) return "bad glob";
                if (!weekdayRange("MON")) return "bad weekday";
                if (alert("checked " + host) !== undefined) return "bad alert";
                return "DIRECT";
            }
        "#;
        assert_eq!(run(source, "http://intranet.corp/wiki/home", "intranet.corp").unwrap(), "DIRECT");
    }

    #[test]
    fn test_helper_names_are_case_sensitive() {
        let source = "function FindProxyForURL(url, host) { return IsPlainHostName(host) ? 'DIRECT' : 'PROXY a:1'; }";
        assert!(run(source, "http://a/", "a").unwrap_err().is_evaluation_error());
    }
}
