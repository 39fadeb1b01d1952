//! Property validation engine.
//!
//! Runs a factory's descriptor list against a raw property bag and
//! aggregates everything it finds into one
//! [`ConfigurationValidationReport`]. The engine is total: for any
//! descriptor set and any input it returns a report, never an error and
//! never a panic. Cast failures, missing required values and rule
//! failures all share the same issue shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::PropertyDescriptor;
use crate::properties::ComponentProperties;

/// Issue severity. `None` marks a passing rule and is filtered out of
/// reports; only `Error` blocks construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    None,
}

/// One problem (or pass) produced while validating a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    property: String,
    message: String,
    severity: Severity,
}

impl ValidationIssue {
    pub fn error(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// A passing rule. Filtered out when a report is assembled.
    pub fn none() -> Self {
        Self {
            property: String::new(),
            message: String::new(),
            severity: Severity::None,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    fn non_none(&self) -> bool {
        self.severity != Severity::None
    }
}

/// Aggregated validation outcome for one property bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ConfigurationValidationReport {
    /// Assemble a report, dropping `Severity::None` entries.
    pub fn of(issues: Vec<ValidationIssue>) -> Self {
        Self {
            issues: issues.into_iter().filter(ValidationIssue::non_none).collect(),
        }
    }

    /// Valid iff no issue has error severity. Warnings are advisory.
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }
}

impl fmt::Display for ConfigurationValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "no issues");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", issue.property, issue.message)?;
        }
        Ok(())
    }
}

/// Validate a raw property bag against an ordered descriptor list.
///
/// Per descriptor: a failed extraction (wrong type, missing required)
/// becomes an error issue tagged with that property's name and the pass
/// continues; otherwise the descriptor's rule runs, if any. Optional
/// absent values skip their rule.
pub fn validate(
    descriptors: &[PropertyDescriptor],
    properties: &ComponentProperties,
) -> ConfigurationValidationReport {
    let mut issues = Vec::new();
    for descriptor in descriptors {
        match descriptor.extract(properties) {
            Err(err) => issues.push(ValidationIssue::error(descriptor.name(), err.to_string())),
            Ok(None) => {}
            Ok(Some(value)) => {
                if let Some(validator) = descriptor.validator() {
                    issues.push(validator(value));
                }
            }
        }
    }
    ConfigurationValidationReport::of(issues)
}
