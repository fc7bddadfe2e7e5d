// Integration tests for lifecycle hook ordering

use junit_insight::{
    standard_registry, AnalysisClient, EnrichmentPipeline, FakeTransport, HookPriority,
    InsightConfig, LifecycleHook, Phase, PhaseOutcome, PhaseReport, ReportDocument,
    ReportMutator, Session, SkipReason, Transport,
};
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const RESPONSE: &str = r#"{"failures": [{"test_name": "tests/test_foo.py::test_bad",
    "analysis": {"classification": "CODE ISSUE", "details": "typo"}}]}"#;

/// Stands in for the runner's own JUnit writer
struct JunitWriterHook {
    outcomes: Mutex<Vec<(String, bool)>>,
}

impl JunitWriterHook {
    fn new() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
        }
    }
}

impl LifecycleHook for JunitWriterHook {
    fn name(&self) -> &str {
        "junit-writer"
    }

    fn on_session_start(&self, _session: &Session) {
        self.outcomes.lock().clear();
    }

    fn on_phase_outcome(&self, outcome: &dyn PhaseOutcome) {
        if outcome.phase() == Phase::Call {
            let failed = outcome.status() == junit_insight::PhaseStatus::Failed;
            self.outcomes
                .lock()
                .push((outcome.test_identifier().to_string(), failed));
        }
    }

    fn on_session_finish(&self, session: &Session) {
        let Some(path) = session.report_path() else {
            return;
        };
        let mut xml = String::from("<testsuites><testsuite name=\"pytest\">");
        for (id, failed) in self.outcomes.lock().iter() {
            let key = junit_insight::to_report_key(id);
            xml.push_str(&format!(
                "<testcase classname=\"{}\" name=\"{}\">",
                key.group, key.name
            ));
            if *failed {
                xml.push_str("<failure message=\"fail\"/>");
            }
            xml.push_str("</testcase>");
        }
        xml.push_str("</testsuite></testsuites>");
        fs::write(path, xml).unwrap();
    }
}

fn pipeline(transport: FakeTransport) -> EnrichmentPipeline {
    let config = InsightConfig::default()
        .with_server_url("http://jji")
        .with_ai("claude", "test-model");
    let client = AnalysisClient::with_transport(config.server_url.clone(), Transport::Fake(transport));
    EnrichmentPipeline::new(client, ReportMutator::new(), &config)
}

#[test]
fn test_enrichment_runs_after_report_written() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("junit.xml");
    let (mut registry, collector, enrichment) = standard_registry(pipeline(FakeTransport::new(RESPONSE)));
    // Registered last but must still finish before enrichment
    registry.register(Arc::new(JunitWriterHook::new()));
    assert_eq!(
        registry.order(),
        vec!["failure-collector", "junit-writer", "ai-enrichment"]
    );

    let session = Session::new(Some(report.clone()));
    registry.session_start(&session);
    registry.phase_outcome(&PhaseReport::passed("tests/test_foo.py::test_ok", Phase::Call, 0.1));
    registry.phase_outcome(&PhaseReport::failed(
        "tests/test_foo.py::test_bad",
        Phase::Call,
        0.2,
        "NameError",
        "trace",
    ));
    registry.session_finish(&session);

    assert_eq!(collector.len(), 1);
    let outcome = enrichment.take_last_outcome().expect("pipeline ran");
    assert_eq!(outcome.success().map(|s| s.matched), Some(1));

    let doc = ReportDocument::parse(&fs::read_to_string(&report).unwrap()).unwrap();
    let testcase = doc.find_testcase("tests.test_foo", "test_bad").unwrap();
    assert!(testcase.child("properties").is_some());
    assert!(doc
        .find_testcase("tests.test_foo", "test_ok")
        .unwrap()
        .child("properties")
        .is_none());
}

#[test]
fn test_session_start_resets_collector() {
    let (registry, collector, enrichment) = standard_registry(pipeline(FakeTransport::new(RESPONSE)));
    let session = Session::default();

    registry.session_start(&session);
    registry.phase_outcome(&PhaseReport::failed("t.py::a", Phase::Call, 0.0, "e", "s"));
    registry.session_finish(&session);
    assert_eq!(collector.len(), 1);

    registry.session_start(&session);
    assert!(collector.is_empty());
    registry.session_finish(&session);
    assert_eq!(
        enrichment.take_last_outcome().unwrap().skip_reason(),
        Some(&SkipReason::NoFailures)
    );
}

#[test]
fn test_no_report_configured_is_a_skip() {
    let (registry, _collector, enrichment) = standard_registry(pipeline(FakeTransport::new(RESPONSE)));
    let session = Session::default();

    registry.session_start(&session);
    registry.phase_outcome(&PhaseReport::failed("t.py::a", Phase::Setup, 0.0, "e", "s"));
    registry.session_finish(&session);

    assert_eq!(
        enrichment.take_last_outcome().unwrap().skip_reason(),
        Some(&SkipReason::ReportMissing(None))
    );
}

#[test]
fn test_custom_priorities_interleave() {
    struct Probe(&'static str, HookPriority);

    impl LifecycleHook for Probe {
        fn name(&self) -> &str {
            self.0
        }

        fn priority(&self) -> HookPriority {
            self.1
        }
    }

    let (mut registry, _collector, _enrichment) = standard_registry(pipeline(FakeTransport::new(RESPONSE)));
    registry.register(Arc::new(Probe("late", HookPriority(100))));
    registry.register(Arc::new(Probe("early", HookPriority(-100))));
    assert_eq!(
        registry.order(),
        vec!["failure-collector", "early", "late", "ai-enrichment"]
    );
}
