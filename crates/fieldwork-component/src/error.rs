//! Component error taxonomy.
//!
//! Defines [`ComponentError`], the unified error type for factory
//! validation, component construction, capability operations, and
//! module calls. Thin HTTP adapters map variants to status codes via
//! [`ComponentError::status`].

use thiserror::Error;

use crate::properties::PropertyError;
use crate::validation::{ConfigurationValidationReport, ValidationIssue};

/// Errors produced by component and capability operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComponentError {
    /// A submitted property bag failed validation. Carries the full report;
    /// recoverable by the caller correcting its input.
    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(ConfigurationValidationReport),

    /// Unknown component kind/id, or a module call hit an unknown route.
    #[error("not found: {0}")]
    NotFound(String),

    /// An external dependency of a module call or capability operation
    /// failed. Carries the upstream message, never a raw error chain.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// A capability was used outside its bound scope. This is a
    /// programming-contract breach, not a user error.
    #[error("capability scope violation: {0}")]
    ScopeViolation(String),

    /// Payload serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ComponentError {
    /// HTTP-equivalent status code for thin transport adapters.
    pub fn status(&self) -> u16 {
        match self {
            ComponentError::ConfigurationInvalid(_) => 400,
            ComponentError::NotFound(_) => 404,
            ComponentError::Upstream(_)
            | ComponentError::ScopeViolation(_)
            | ComponentError::Serialization(_) => 500,
        }
    }
}

/// A property extraction failure outside the validation engine (e.g. a
/// component reading its own bag at runtime) funnels into the same
/// single-issue report shape the engine produces.
impl From<PropertyError> for ComponentError {
    fn from(err: PropertyError) -> Self {
        ComponentError::ConfigurationInvalid(ConfigurationValidationReport::of(vec![
            ValidationIssue::error(err.property().to_string(), err.to_string()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_not_found() {
        let err = ComponentError::NotFound("no observation 'gps'".into());
        assert_eq!(err.to_string(), "not found: no observation 'gps'");
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn error_display_upstream() {
        let err = ComponentError::Upstream("survey service timed out".into());
        assert_eq!(err.to_string(), "upstream failure: survey service timed out");
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn error_display_scope_violation() {
        let err = ComponentError::ScopeViolation("participant 9 not in study 1".into());
        assert!(err.to_string().starts_with("capability scope violation"));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn configuration_invalid_maps_to_400() {
        let report = ConfigurationValidationReport::of(vec![ValidationIssue::error(
            "title",
            "required property missing",
        )]);
        let err = ComponentError::ConfigurationInvalid(report);
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ComponentError::from(json_err);
        assert!(matches!(err, ComponentError::Serialization(_)));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn property_error_becomes_single_issue_report() {
        let err: ComponentError = PropertyError::RequiredMissing("title".into()).into();
        match err {
            ComponentError::ConfigurationInvalid(report) => {
                assert!(!report.is_valid());
                assert_eq!(report.errors().count(), 1);
                assert_eq!(report.errors().next().unwrap().property(), "title");
            }
            other => panic!("expected ConfigurationInvalid, got: {other}"),
        }
    }
}
