use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub status: ScenarioStatus,
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: String,
    pub scenarios: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.scenarios.len() - self.passed_count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Human-readable summary, one line per scenario.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}: {} passed, {} failed\n",
            self.suite,
            self.passed_count(),
            self.failed_count()
        );
        for scenario in &self.scenarios {
            let _ = match scenario.status {
                ScenarioStatus::Passed => writeln!(
                    out,
                    "  ok    {} ({}ms)",
                    scenario.name, scenario.duration_ms
                ),
                ScenarioStatus::Failed => writeln!(
                    out,
                    "  FAIL  {} ({}ms) at {}: {}",
                    scenario.name,
                    scenario.duration_ms,
                    scenario.failed_step.as_deref().unwrap_or("setup"),
                    scenario.message.as_deref().unwrap_or("unknown error")
                ),
            };
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub async fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}
