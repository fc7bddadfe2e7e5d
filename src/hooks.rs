//! Host runner lifecycle hooks
//!
//! Handlers are dispatched in ascending [`HookPriority`]; ties keep
//! registration order. Contracts:
//!
//! - the collector runs before everything else ([`HookPriority::FIRST`]),
//!   so it sees every outcome before other handlers act on it;
//! - report writers run at [`HookPriority::DEFAULT`];
//! - enrichment runs after everything else ([`HookPriority::LAST`]), so the
//!   report it rewrites is already on disk.

use crate::collector::{FailureCollector, PhaseOutcome};
use crate::pipeline::{EnrichmentPipeline, PipelineOutcome};
use crate::report::{FsReportWriter, ReportWriter};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Dispatch priority, lower runs first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookPriority(pub i32);

impl HookPriority {
    pub const FIRST: HookPriority = HookPriority(i32::MIN);
    pub const DEFAULT: HookPriority = HookPriority(0);
    pub const LAST: HookPriority = HookPriority(i32::MAX);
}

impl Default for HookPriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One test session
#[derive(Debug, Clone, Default)]
pub struct Session {
    report_path: Option<PathBuf>,
}

impl Session {
    pub fn new(report_path: Option<PathBuf>) -> Self {
        Self { report_path }
    }

    /// Report file configured for this run, if any
    pub fn report_path(&self) -> Option<&Path> {
        self.report_path.as_deref()
    }
}

/// Lifecycle handler
///
/// `on_phase_outcome` may be called concurrently when the host runs tests
/// in parallel.
pub trait LifecycleHook: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> HookPriority {
        HookPriority::DEFAULT
    }

    fn on_session_start(&self, _session: &Session) {}

    fn on_phase_outcome(&self, _outcome: &dyn PhaseOutcome) {}

    fn on_session_finish(&self, _session: &Session) {}
}

/// Priority-ordered hook list
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn LifecycleHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Arc<dyn LifecycleHook>) {
        debug!(hook = hook.name(), priority = hook.priority().0, "Registering lifecycle hook");
        // Stable insert: after every hook with priority <= the new one
        let position = self
            .hooks
            .iter()
            .position(|h| h.priority() > hook.priority())
            .unwrap_or(self.hooks.len());
        self.hooks.insert(position, hook);
    }

    /// Hook names in dispatch order
    pub fn order(&self) -> Vec<String> {
        self.hooks.iter().map(|h| h.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn session_start(&self, session: &Session) {
        for hook in &self.hooks {
            hook.on_session_start(session);
        }
    }

    pub fn phase_outcome(&self, outcome: &dyn PhaseOutcome) {
        for hook in &self.hooks {
            hook.on_phase_outcome(outcome);
        }
    }

    pub fn session_finish(&self, session: &Session) {
        for hook in &self.hooks {
            hook.on_session_finish(session);
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("order", &self.order())
            .finish()
    }
}

/// Feeds the collector: reset on start, record every outcome
#[derive(Debug)]
pub struct CollectorHook {
    collector: Arc<FailureCollector>,
}

impl CollectorHook {
    pub fn new(collector: Arc<FailureCollector>) -> Self {
        Self { collector }
    }
}

impl LifecycleHook for CollectorHook {
    fn name(&self) -> &str {
        "failure-collector"
    }

    fn priority(&self) -> HookPriority {
        HookPriority::FIRST
    }

    fn on_session_start(&self, _session: &Session) {
        self.collector.reset();
    }

    fn on_phase_outcome(&self, outcome: &dyn PhaseOutcome) {
        self.collector.record(outcome);
    }
}

/// Runs the enrichment pipeline at session end
#[derive(Debug)]
pub struct EnrichmentHook<W = FsReportWriter> {
    collector: Arc<FailureCollector>,
    pipeline: EnrichmentPipeline<W>,
    last_outcome: Mutex<Option<PipelineOutcome>>,
}

impl<W: ReportWriter> EnrichmentHook<W> {
    pub fn new(collector: Arc<FailureCollector>, pipeline: EnrichmentPipeline<W>) -> Self {
        Self {
            collector,
            pipeline,
            last_outcome: Mutex::new(None),
        }
    }

    /// Outcome of the most recent session finish
    pub fn take_last_outcome(&self) -> Option<PipelineOutcome> {
        self.last_outcome.lock().take()
    }
}

impl<W: ReportWriter + Send + Sync> LifecycleHook for EnrichmentHook<W> {
    fn name(&self) -> &str {
        "ai-enrichment"
    }

    fn priority(&self) -> HookPriority {
        HookPriority::LAST
    }

    fn on_session_finish(&self, session: &Session) {
        let failures = self.collector.snapshot();
        let outcome = self.pipeline.run(&failures, session.report_path());
        *self.last_outcome.lock() = Some(outcome);
    }
}

/// Registry with the collector and enrichment hooks sharing one collector
pub fn standard_registry<W>(
    pipeline: EnrichmentPipeline<W>,
) -> (HookRegistry, Arc<FailureCollector>, Arc<EnrichmentHook<W>>)
where
    W: ReportWriter + Send + Sync + 'static,
{
    let collector = Arc::new(FailureCollector::new());
    let enrichment = Arc::new(EnrichmentHook::new(collector.clone(), pipeline));
    let mut registry = HookRegistry::new();
    registry.register(Arc::new(CollectorHook::new(collector.clone())));
    registry.register(enrichment.clone());
    (registry, collector, enrichment)
}
