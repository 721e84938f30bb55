use std::rc::Rc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Span};
use uuid::Uuid;

use super::{
    parse_directives, EvaluationError, EvaluationRequest, EvaluatorState, PacError, ProxyChain, Result, ScriptLoadError,
};
use crate::config::EngineConfig;
use crate::pac::HelperEnvironment;
use crate::ports::{PreparedScript, ScriptRuntimePort};
use crate::worker::DeadlineRunner;

struct LoadedScript {
    version: u64,
    prepared: Arc<dyn PreparedScript>,
}

/// Counts an evaluation as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Loads PAC scripts and answers `FindProxyForURL` queries.
///
/// Evaluations work on a snapshot of the script taken when they start: a
/// concurrent reload never affects an evaluation already running, and a failed
/// reload leaves the current script in place.
///
/// Script code runs on a worker thread under a wall-clock budget. A script
/// that overruns it is reported as failed and left to finish on its own; such
/// leftovers count against the worker limit until they do.
pub struct PacEvaluator {
    runtime: Arc<dyn ScriptRuntimePort>,
    helpers: HelperEnvironment,
    current: RwLock<Option<Arc<LoadedScript>>>,
    versions: AtomicU64,
    in_flight: AtomicUsize,
    time_budget: Duration,
    workers: DeadlineRunner,
}

impl PacEvaluator {
    pub fn new(runtime: Arc<dyn ScriptRuntimePort>, helpers: HelperEnvironment) -> Self {
        let config = EngineConfig::default();
        Self {
            runtime,
            helpers,
            current: RwLock::new(None),
            versions: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            time_budget: config.evaluation_timeout(),
            workers: DeadlineRunner::new("nanopac-eval", config.evaluation_thread_limit),
        }
    }

    pub fn with_time_budget(mut self, budget: Duration, max_threads: usize) -> Self {
        self.time_budget = budget;
        self.workers = DeadlineRunner::new("nanopac-eval", max_threads);
        self
    }

    /// Worker threads still running script code, overrunning ones included.
    pub fn running_workers(&self) -> usize {
        self.workers.running()
    }

    /// Validates `source` and makes it the active script. Returns the new version.
    pub fn load_script(&self, source: &str) -> Result<u64> {
        let runtime = Arc::clone(&self.runtime);
        let helpers = self.helpers.clone();
        let owned = source.to_string();
        let prepared = self
            .workers
            .run(self.time_budget, move || {
                let probe = Rc::new(helpers.begin(Uuid::new_v4()));
                runtime.prepare(&owned, probe)
            })
            .map_err(|e| PacError::from(ScriptLoadError::Initialization(e.to_string())))
            .and_then(|prepared| prepared)
            .map_err(|e| {
                warn!(error = %e, "PAC script rejected, keeping version {:?}", self.script_version());
                e
            })?;

        let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
        let replaced = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::new(LoadedScript { version, prepared }));

        match replaced {
            Some(previous) => info!(
                "Replaced PAC script version {} with version {} ({} bytes)",
                previous.version,
                version,
                source.len()
            ),
            None => info!("Loaded PAC script version {} ({} bytes)", version, source.len()),
        }
        Ok(version)
    }

    /// Drops the active script. Running evaluations finish on their snapshot.
    pub fn unload(&self) {
        if let Some(previous) = self.current.write().unwrap_or_else(PoisonError::into_inner).take() {
            info!("Unloaded PAC script version {}", previous.version);
        }
    }

    pub fn state(&self) -> EvaluatorState {
        if self.snapshot().is_none() {
            EvaluatorState::Uninitialized
        } else if self.in_flight.load(Ordering::SeqCst) > 0 {
            EvaluatorState::Evaluating
        } else {
            EvaluatorState::Ready
        }
    }

    pub fn script_version(&self) -> Option<u64> {
        self.snapshot().map(|script| script.version)
    }

    /// Runs `FindProxyForURL(url, host)` and parses its answer.
    pub fn evaluate(&self, url: &str, host: &str) -> Result<ProxyChain> {
        self.evaluate_request(&EvaluationRequest::new(url, host))
    }

    pub fn evaluate_request(&self, request: &EvaluationRequest) -> Result<ProxyChain> {
        let span = info_span!("pac_evaluation", id = %request.id, host = %request.host);
        let _entered = span.enter();

        let raw = self.find_proxy_for_url(request)?;
        let chain = parse_directives(&raw).map_err(|e| {
            warn!(error = %e, "PAC script returned an unusable answer");
            e
        })?;
        debug!("Resolved {} to {}", request.url, chain);
        Ok(chain)
    }

    /// Runs the script and returns its raw answer, without parsing it.
    pub fn find_proxy_for_url(&self, request: &EvaluationRequest) -> Result<String> {
        let script = self.snapshot().ok_or(EvaluationError::NotLoaded)?;
        let _in_flight = InFlight::enter(&self.in_flight);

        let helpers = self.helpers.clone();
        let running = Arc::clone(&script);
        let owned = request.clone();
        let span = Span::current();
        let (raw, dns_round_trips) = self
            .workers
            .run(self.time_budget, move || {
                span.in_scope(|| {
                    let scope = Rc::new(helpers.begin(owned.id));
                    let raw = running.prepared.find_proxy_for_url(&owned, Rc::clone(&scope));
                    (raw, scope.dns_round_trips())
                })
            })
            .map_err(|e| PacError::from(EvaluationError::Runtime(e.to_string())))
            .and_then(|(raw, round_trips)| raw.map(|raw| (raw, round_trips)))
            .map_err(|e| {
                warn!(version = script.version, error = %e, "PAC evaluation failed");
                e
            })?;
        debug!(
            version = script.version,
            dns_round_trips,
            "FindProxyForURL returned {:?}",
            raw
        );
        Ok(raw)
    }

    fn snapshot(&self) -> Option<Arc<LoadedScript>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
