//! Violation reporting seam.
//!
//! Guard violations, absent-stack recoveries and refused operations are not
//! surfaced as errors to the caller (see the crate-level docs on the fail-open
//! policy). Instead they are reported through a [`ReportSink`], which collaborators
//! such as a UI console can implement. The message string is the whole payload;
//! there are no structured fields.

use std::fmt::Debug;

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// How serious a reported event is.
///
/// `Severe` covers guard protocol violations and internal-state recoveries;
/// `Warning` covers refused operations such as changing the sort order of a
/// populated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Severe,
}

/// Receiver for human-readable diagnostics emitted by a guarded list.
///
/// The default implementation is [`TracingSink`]. Tests can swap in the
/// recording sink from the `testing` feature to assert that a specific
/// message was reported.
pub trait ReportSink: Send + Sync + Debug {
    /// Deliver one diagnostic message.
    fn report(&self, severity: Severity, message: &str);
}

/// Production sink forwarding reports to the `tracing` ecosystem.
///
/// `Severe` maps to `tracing::error!`, `Warning` to `tracing::warn!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Warning => tracing::warn!(target: "guardlist", "{message}"),
            Severity::Severe => tracing::error!(target: "guardlist", "{message}"),
        }
    }
}

/// Sink that stores every report in memory, for assertions in tests.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(Severity, String)>>,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports received so far, in delivery order.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().expect("sink lock poisoned").clone()
    }

    /// Number of reports received so far.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("sink lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any received message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .expect("sink lock poisoned")
            .iter()
            .any(|(_, message)| message.contains(needle))
    }

    /// Drop all recorded reports.
    pub fn clear(&self) {
        self.entries.lock().expect("sink lock poisoned").clear();
    }
}

#[cfg(any(test, feature = "testing"))]
impl ReportSink for RecordingSink {
    fn report(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .expect("sink lock poisoned")
            .push((severity, message.to_string()));
    }
}
