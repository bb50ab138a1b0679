//! Mock input injector for unit testing.
//!
//! Records every submitted [`InputRecord`] instead of touching the OS, so
//! tests can assert exactly what would have been injected and in what order.
//!
//! # Failure injection
//!
//! [`MockInputInjector::failing`] rejects every submission;
//! [`MockInputInjector::failing_after`] accepts a number of records first,
//! which exercises the "stop at the first failure" path of callers.

use std::sync::Mutex;

use super::{InjectionError, InputInjector, InputRecord};

/// A mock injector that records all submissions.
#[derive(Debug, Default)]
pub struct MockInputInjector {
    /// Records accepted so far, in submission order.
    pub submitted: Mutex<Vec<InputRecord>>,
    /// Number of records accepted before every further submission fails.
    /// `None` never fails.
    pub fail_after: Option<usize>,
}

impl MockInputInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector that rejects everything.
    pub fn failing() -> Self {
        Self::failing_after(0)
    }

    pub fn failing_after(accepted: usize) -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            fail_after: Some(accepted),
        }
    }

    /// Snapshot of the accepted records.
    pub fn records(&self) -> Vec<InputRecord> {
        self.submitted
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl InputInjector for MockInputInjector {
    fn submit(&self, record: &InputRecord) -> Result<(), InjectionError> {
        let mut submitted = self
            .submitted
            .lock()
            .map_err(|e| InjectionError::Rejected(e.to_string()))?;
        if self.fail_after.is_some_and(|limit| submitted.len() >= limit) {
            return Err(InjectionError::Rejected("mock failure".into()));
        }
        submitted.push(*record);
        Ok(())
    }
}
