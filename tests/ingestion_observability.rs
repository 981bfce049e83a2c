use std::sync::{Arc, Mutex};

use tabular_prep::ingestion::{
    parse_with_options, CompositeObserver, FileObserver, FormatHint, IngestionContext, IngestionObserver,
    IngestionSeverity, IngestionStats, ParseOptions,
};
use tabular_prep::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options(obs: Arc<RecordingObserver>, alert_at_or_above: IngestionSeverity) -> ParseOptions {
    ParseOptions {
        hint: FormatHint::extension("csv"),
        observer: Some(obs),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_success_stats() {
    let obs = Arc::new(RecordingObserver::default());
    let bytes = std::fs::read("tests/fixtures/people.csv").unwrap();
    parse_with_options(&bytes, &options(obs.clone(), IngestionSeverity::Critical)).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![IngestionStats {
            rows: 5,
            columns: 4,
            used_fallback: false
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn empty_upload_is_a_warning_without_alert_by_default() {
    let obs = Arc::new(RecordingObserver::default());
    let _ = parse_with_options(b"", &options(obs.clone(), IngestionSeverity::Critical)).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Warning]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn unreadable_upload_alerts_when_threshold_is_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ParseOptions {
        hint: FormatHint::default(),
        ..options(obs.clone(), IngestionSeverity::Error)
    };
    let _ = parse_with_options(&[0u8, 1, 2, 3], &opts).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn composite_fans_out_to_every_observer() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let fan_out: Vec<Arc<dyn IngestionObserver>> = vec![a.clone(), b.clone()];
    let composite = Arc::new(CompositeObserver::new(fan_out));
    let opts = ParseOptions {
        hint: FormatHint::extension("csv"),
        observer: Some(composite),
        ..Default::default()
    };
    parse_with_options(b"x\n1\n", &opts).unwrap();

    assert_eq!(a.successes.lock().unwrap().len(), 1);
    assert_eq!(b.successes.lock().unwrap().len(), 1);
}

#[test]
fn file_observer_appends_lines() {
    let path = std::env::temp_dir().join(format!("tabular-prep-observer-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let opts = ParseOptions {
        hint: FormatHint::extension("csv"),
        observer: Some(Arc::new(FileObserver::new(&path))),
        alert_at_or_above: IngestionSeverity::Warning,
        ..Default::default()
    };
    parse_with_options(b"x\n1\n", &opts).unwrap();
    let _ = parse_with_options(b"", &opts).unwrap_err();

    let log = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("ok format=Some(Csv)"));
    assert!(lines[1].contains("fail severity=Warning"));
    assert!(lines[2].contains("ALERT severity=Warning"));
    let _ = std::fs::remove_file(&path);
}
