//! Scenario sequencing: setup hook, ordered steps, per-scenario outcomes.

pub mod context;
pub mod report;
pub mod runner;

pub use context::ScenarioContext;
pub use report::{ScenarioOutcome, ScenarioStatus, SuiteReport};
pub use runner::{Scenario, ScenarioFn, Suite};
