//! Shared helpers for runtime integration tests.
#![allow(dead_code)]

use sessionlog_runtime::{DebugLog, DebugLogBuilder, ProviderFailure};
use std::sync::{Arc, Mutex};

/// Failures captured by a test error sink
#[derive(Clone, Default)]
pub struct Failures(Arc<Mutex<Vec<ProviderFailure>>>);

impl Failures {
    pub fn all(&self) -> Vec<ProviderFailure> {
        self.0.lock().unwrap().clone()
    }

    pub fn providers(&self) -> Vec<String> {
        self.all().into_iter().map(|f| f.provider).collect()
    }
}

/// Build a log whose provider failures are captured instead of traced.
pub fn recording(builder: DebugLogBuilder) -> (DebugLog, Failures) {
    let failures = Failures::default();
    let sink = failures.clone();
    let log = builder
        .error_sink(move |failure| sink.0.lock().unwrap().push(failure.clone()))
        .build();
    (log, failures)
}
