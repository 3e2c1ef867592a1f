use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Problems in a page definition, caught when sections are built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("invalid {kind} name '{name}'")]
    InvalidName { kind: &'static str, name: String },
    #[error("duplicate {kind} '{name}' in {scope}")]
    Duplicate {
        kind: &'static str,
        scope: String,
        name: String,
    },
    #[error("ready condition '{token}' of {page} is not a registered alias")]
    UnknownReadyAlias { page: String, token: String },
}

/// Every failure a scenario step can surface.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unknown alias '@{alias}' in {scope}")]
    UnknownAlias { scope: String, alias: String },

    #[error("unknown section '{section}' in {scope}")]
    UnknownSection { scope: String, section: String },

    #[error("missing or mistyped property '{property}' in {scope}")]
    UnknownProperty { scope: String, property: String },

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("timed out after {}ms waiting for {condition}", .elapsed.as_millis())]
    Timeout { condition: String, elapsed: Duration },

    #[error("{target} was not actionable after {}ms", .elapsed.as_millis())]
    ElementNotActionable { target: String, elapsed: Duration },

    #[error("expected {subject} {expected}, but {actual}")]
    AssertionMismatch {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error("check #{index} ({alias}) failed: {source}")]
    ExpectationFailed {
        index: usize,
        alias: String,
        #[source]
        source: Box<HarnessError>,
    },

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

/// Coarse classification used in suite reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownAlias,
    Definition,
    Timeout,
    ElementNotActionable,
    AssertionMismatch,
    Driver,
}

impl HarnessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAlias { .. } => ErrorKind::UnknownAlias,
            Self::UnknownSection { .. }
            | Self::UnknownProperty { .. }
            | Self::UnknownScenario(_)
            | Self::Definition(_) => ErrorKind::Definition,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ElementNotActionable { .. } => ErrorKind::ElementNotActionable,
            Self::AssertionMismatch { .. } => ErrorKind::AssertionMismatch,
            Self::ExpectationFailed { source, .. } => source.kind(),
            Self::Driver(_) => ErrorKind::Driver,
        }
    }

    /// Whether a bounded wait ran out. Non-actionable elements count as timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Timeout | ErrorKind::ElementNotActionable
        )
    }

    pub(crate) fn mismatch(
        subject: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionMismatch {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_actionable_is_a_timeout() {
        let err = HarnessError::ElementNotActionable {
            target: "@splashClose".into(),
            elapsed: Duration::from_millis(30_000),
        };
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::ElementNotActionable);
        assert_eq!(err.to_string(), "@splashClose was not actionable after 30000ms");
    }

    #[test]
    fn test_expectation_failed_reports_index_and_inner_kind() {
        let err = HarnessError::ExpectationFailed {
            index: 2,
            alias: "@slider".into(),
            source: Box::new(HarnessError::mismatch("@slider", "to be visible", "it was not present")),
        };
        assert_eq!(err.kind(), ErrorKind::AssertionMismatch);
        assert!(!err.is_timeout());
        assert_eq!(
            err.to_string(),
            "check #2 (@slider) failed: expected @slider to be visible, but it was not present"
        );
    }

    #[test]
    fn test_timeout_message_includes_elapsed() {
        let err = HarnessError::Timeout {
            condition: "@userExperience to be visible".into(),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            err.to_string(),
            "timed out after 1500ms waiting for @userExperience to be visible"
        );
    }
}
