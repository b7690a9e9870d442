//! Unit tests for engine.rs
//!
//! These tests swap the process-wide logger, so they run serially.

use super::*;
use std::sync::{Arc, Mutex};
use serial_test::serial;

const SOURCE: &str = "galaxy3d::EngineTests";

/// Logger that keeps entries from the test source only
#[derive(Clone, Default)]
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == SOURCE {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

fn install_capture() -> CaptureLogger {
    let capture = CaptureLogger::default();
    Engine::set_logger(capture.clone());
    Engine::set_min_severity(LogSeverity::Trace);
    capture
}

fn restore() {
    Engine::reset_logger();
    Engine::reset_min_severity();
}

// ============================================================================
// LOGGER SLOT
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_entries() {
    let capture = install_capture();

    crate::engine_info!(SOURCE, "collection created with {} reserved ids", 1);

    let entries = capture.entries.lock().unwrap().clone();
    restore();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Info);
    assert_eq!(entries[0].message, "collection created with 1 reserved ids");
    assert!(entries[0].file.is_none());
}

#[test]
#[serial]
fn test_error_macro_records_location() {
    let capture = install_capture();

    crate::engine_error!(SOURCE, "allocator exhausted");

    let entries = capture.entries.lock().unwrap().clone();
    restore();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Error);
    assert!(entries[0].file.is_some());
    assert!(entries[0].line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let capture = install_capture();
    Engine::reset_logger();

    crate::engine_warn!(SOURCE, "not captured");

    let count = capture.entries.lock().unwrap().len();
    restore();
    assert_eq!(count, 0);
}

// ============================================================================
// SEVERITY FILTER
// ============================================================================

#[test]
#[serial]
fn test_min_severity_filters_lower_levels() {
    let capture = install_capture();
    Engine::set_min_severity(LogSeverity::Warn);

    crate::engine_trace!(SOURCE, "dropped");
    crate::engine_debug!(SOURCE, "dropped");
    crate::engine_info!(SOURCE, "dropped");
    crate::engine_warn!(SOURCE, "kept");
    crate::engine_error!(SOURCE, "kept");

    let entries = capture.entries.lock().unwrap().clone();
    restore();

    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.message == "kept"));
}

#[test]
#[serial]
fn test_min_severity_round_trips() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        Engine::set_min_severity(severity);
        assert_eq!(Engine::min_severity(), severity);
    }
    restore();
    assert_eq!(Engine::min_severity(), default_min_severity());
}
