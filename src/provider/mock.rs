//! Mock display provider for testing without a desktop session.
//!
//! Records every operation for later assertion and supports scripted apply
//! failures to exercise the engine's retry path.
//!
//! # Example
//!
//! ```rust,ignore
//! use wsh::provider::mock::MockProvider;
//! use wsh::provider::DisplayProvider;
//!
//! let mock = MockProvider::with_displays(2);
//! let displays = mock.list_displays().unwrap();
//! mock.apply(std::path::Path::new("/tmp/a.jpg"), &displays[0]).unwrap();
//! assert_eq!(mock.applied(&displays[0]).unwrap(), std::path::PathBuf::from("/tmp/a.jpg"));
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::trace;

use super::{Display, DisplayProvider};
use crate::error::{Result, WshError};

/// Recorded operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListDisplays,
    Apply { display: String, path: PathBuf },
    QueryCurrent { display: String },
}

/// Mock provider with scripted failures.
pub struct MockProvider {
    displays: Vec<Display>,
    operations: Mutex<Vec<Operation>>,
    applied: Mutex<HashMap<String, PathBuf>>,
    // Remaining apply failures per display key; u32::MAX fails forever.
    failures: Mutex<HashMap<String, u32>>,
}

impl MockProvider {
    /// Create a mock with `count` displays named `MOCK-0`, `MOCK-1`, ...
    pub fn with_displays(count: usize) -> Self {
        let displays = (0..count)
            .map(|i| Display {
                id: i.to_string(),
                index: i,
                name: format!("MOCK-{i}"),
                label: String::new(),
                current: None,
            })
            .collect();

        Self {
            displays,
            operations: Mutex::new(Vec::new()),
            applied: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Make the next `count` apply calls fail for a display.
    pub fn fail_applies(&self, display: &Display, count: u32) {
        self.failures
            .lock()
            .expect("mock failures lock poisoned")
            .insert(display.key().to_string(), count);
    }

    /// Make every apply call fail for a display.
    pub fn fail_applies_forever(&self, display: &Display) {
        self.fail_applies(display, u32::MAX);
    }

    /// The path last successfully applied to a display, if any.
    pub fn applied(&self, display: &Display) -> Option<PathBuf> {
        self.applied
            .lock()
            .expect("mock applied lock poisoned")
            .get(display.key())
            .cloned()
    }

    /// Snapshot of all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.operations
            .lock()
            .expect("mock operations lock poisoned")
            .clone()
    }

    /// Number of apply calls recorded for a display.
    pub fn apply_count(&self, display: &Display) -> usize {
        let key = display.key();
        self.operations()
            .iter()
            .filter(|op| matches!(op, Operation::Apply { display, .. } if display == key))
            .count()
    }

    fn record(&self, op: Operation) {
        trace!(?op, "mock operation");
        self.operations
            .lock()
            .expect("mock operations lock poisoned")
            .push(op);
    }
}

impl DisplayProvider for MockProvider {
    fn list_displays(&self) -> Result<Vec<Display>> {
        self.record(Operation::ListDisplays);
        Ok(self.displays.clone())
    }

    fn apply(&self, path: &Path, display: &Display) -> Result<()> {
        self.record(Operation::Apply {
            display: display.key().to_string(),
            path: path.to_path_buf(),
        });

        let mut failures = self.failures.lock().expect("mock failures lock poisoned");
        if let Some(remaining) = failures.get_mut(display.key()) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(WshError::Provider {
                    command: format!("mock apply {}", display.key()),
                    output: "injected failure".to_string(),
                });
            }
        }
        drop(failures);

        self.applied
            .lock()
            .expect("mock applied lock poisoned")
            .insert(display.key().to_string(), path.to_path_buf());
        Ok(())
    }

    fn current_wallpaper(&self, display: &Display) -> Result<PathBuf> {
        self.record(Operation::QueryCurrent {
            display: display.key().to_string(),
        });

        self.applied(display).ok_or_else(|| WshError::Provider {
            command: format!("mock query {}", display.key()),
            output: "nothing applied".to_string(),
        })
    }
}
