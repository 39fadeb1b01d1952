//! Raw component configuration bags.
//!
//! [`ComponentProperties`] is the name→value mapping a study operator
//! submits when configuring a component instance. It is deliberately
//! untyped; shape is declared by a factory's [`PropertyDescriptor`] list
//! and enforced by the validation engine before construction.
//!
//! [`PropertyDescriptor`]: crate::descriptor::PropertyDescriptor

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single property could not be extracted from a bag.
///
/// Both shapes funnel into the same `ValidationIssue` report form; the
/// engine never lets them escape as errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropertyError {
    /// A required property is absent (or JSON `null`).
    #[error("required property is missing")]
    RequiredMissing(String),

    /// A property is present but has the wrong JSON type.
    #[error("value is not a valid {expected}")]
    Cast {
        property: String,
        expected: &'static str,
    },
}

impl PropertyError {
    /// Name of the property the failure is about.
    pub fn property(&self) -> &str {
        match self {
            PropertyError::RequiredMissing(name) => name,
            PropertyError::Cast { property, .. } => property,
        }
    }
}

/// An untyped name→value configuration bag.
///
/// Transparent over a JSON object so bags round-trip unchanged through
/// the (external) study configuration store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentProperties(Map<String, Value>);

impl ComponentProperties {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Interpret an arbitrary JSON value as a property bag.
    ///
    /// Anything but an object is a cast failure on the bag itself, tagged
    /// `"properties"` so it can surface as a single-issue report.
    pub fn from_value(value: Value) -> Result<Self, PropertyError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(PropertyError::Cast {
                property: "properties".into(),
                expected: "object",
            }),
        }
    }

    /// Raw value for `name`, if present and non-null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// String value for `name`; `RequiredMissing` if absent, `Cast` if
    /// present with another type.
    pub fn string_value(&self, name: &str) -> Result<&str, PropertyError> {
        match self.get(name) {
            None => Err(PropertyError::RequiredMissing(name.into())),
            Some(v) => v.as_str().ok_or_else(|| PropertyError::Cast {
                property: name.into(),
                expected: "string",
            }),
        }
    }

    /// Integer value for `name`.
    pub fn integer_value(&self, name: &str) -> Result<i64, PropertyError> {
        match self.get(name) {
            None => Err(PropertyError::RequiredMissing(name.into())),
            Some(v) => v.as_i64().ok_or_else(|| PropertyError::Cast {
                property: name.into(),
                expected: "integer",
            }),
        }
    }

    /// Boolean value for `name`.
    pub fn boolean_value(&self, name: &str) -> Result<bool, PropertyError> {
        match self.get(name) {
            None => Err(PropertyError::RequiredMissing(name.into())),
            Some(v) => v.as_bool().ok_or_else(|| PropertyError::Cast {
                property: name.into(),
                expected: "boolean",
            }),
        }
    }

    /// Consume the bag, yielding the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl FromIterator<(String, Value)> for ComponentProperties {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Map<String, Value>> for ComponentProperties {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
