use std::sync::{Arc, Mutex, PoisonError};

use crate::page_object::Page;
use crate::snapshot::{capture_snapshot, Snapshotter};

/// Session state handed to every scenario: the page plus the snapshot service.
pub struct ScenarioContext {
    page: Page,
    snapshotter: Arc<dyn Snapshotter>,
    steps: Mutex<Vec<String>>,
}

impl ScenarioContext {
    pub fn new(page: Page, snapshotter: Arc<dyn Snapshotter>) -> Self {
        Self {
            page,
            snapshotter,
            steps: Mutex::new(Vec::new()),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Record the step about to run. The last recorded step is blamed on failure.
    pub fn step(&self, description: impl Into<String>) {
        let description = description.into();
        tracing::debug!("Step: {}", description);
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(description);
    }

    /// Capture a labelled checkpoint, bounded by the condition timeout. Never fails the scenario.
    pub async fn snapshot(&self, label: &str) -> bool {
        self.step(format!("snapshot '{}'", label));
        let limit = self.page.waits().condition_timeout;
        capture_snapshot(self.snapshotter.as_ref(), self.page.driver(), label, limit).await
    }

    /// Steps recorded since the last call.
    pub fn take_steps(&self) -> Vec<String> {
        std::mem::take(&mut *self.steps.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
