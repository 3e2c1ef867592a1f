use futures::future::BoxFuture;
use tokio::time::Instant;

use super::context::ScenarioContext;
use super::report::{ScenarioOutcome, ScenarioStatus, SuiteReport};
use crate::error::HarnessError;

/// Body of a scenario (or of a per-scenario setup hook).
pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, Result<(), HarnessError>>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub run: ScenarioFn,
}

impl Scenario {
    pub const fn new(name: &'static str, run: ScenarioFn) -> Self {
        Self { name, run }
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

/// Ordered scenarios sharing one session.
///
/// Scenarios run strictly one after another. A failing step ends its own
/// scenario; the suite carries on with the next one.
#[derive(Clone)]
pub struct Suite {
    name: String,
    scenarios: Vec<Scenario>,
    before_each: Option<ScenarioFn>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
            before_each: None,
        }
    }

    pub fn scenario(mut self, name: &'static str, run: ScenarioFn) -> Self {
        self.scenarios.push(Scenario::new(name, run));
        self
    }

    /// Runs before every scenario; its failure fails that scenario.
    pub fn before_each(mut self, hook: ScenarioFn) -> Self {
        self.before_each = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Keep only the named scenarios, in suite order. Empty `names` keeps all.
    pub fn select(&self, names: &[String]) -> Result<Suite, HarnessError> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.scenarios.iter().any(|s| s.name == name.as_str()))
        {
            return Err(HarnessError::UnknownScenario(unknown.clone()));
        }
        let scenarios = self
            .scenarios
            .iter()
            .filter(|s| names.is_empty() || names.iter().any(|n| n == s.name))
            .copied()
            .collect();
        Ok(Suite {
            name: self.name.clone(),
            scenarios,
            before_each: self.before_each,
        })
    }

    pub async fn run(&self, ctx: &ScenarioContext) -> SuiteReport {
        let mut outcomes = Vec::with_capacity(self.scenarios.len());
        for scenario in &self.scenarios {
            outcomes.push(self.run_one(scenario, ctx).await);
        }
        let report = SuiteReport {
            suite: self.name.clone(),
            scenarios: outcomes,
        };
        tracing::info!(
            "{} finished: {} passed, {} failed",
            self.name,
            report.passed_count(),
            report.failed_count()
        );
        report
    }

    async fn run_one(&self, scenario: &Scenario, ctx: &ScenarioContext) -> ScenarioOutcome {
        tracing::info!("Running '{}'", scenario.name);
        ctx.take_steps();
        let start = Instant::now();

        let result = match self.before_each {
            Some(hook) => match hook(ctx).await {
                Ok(()) => (scenario.run)(ctx).await,
                Err(err) => Err(err),
            },
            None => (scenario.run)(ctx).await,
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let steps = ctx.take_steps();
        match result {
            Ok(()) => {
                tracing::info!("'{}' passed in {}ms", scenario.name, duration_ms);
                ScenarioOutcome {
                    name: scenario.name.to_string(),
                    status: ScenarioStatus::Passed,
                    steps,
                    failed_step: None,
                    error_kind: None,
                    message: None,
                    duration_ms,
                }
            }
            Err(err) => {
                let failed_step = steps.last().cloned();
                tracing::error!(
                    "'{}' failed at {}: {}",
                    scenario.name,
                    failed_step.as_deref().unwrap_or("setup"),
                    err
                );
                ScenarioOutcome {
                    name: scenario.name.to_string(),
                    status: ScenarioStatus::Failed,
                    steps,
                    failed_step,
                    error_kind: Some(err.kind()),
                    message: Some(err.to_string()),
                    duration_ms,
                }
            }
        }
    }
}
