//! Declarative property descriptors.
//!
//! A factory declares each configurable field as a [`PropertyDescriptor`]:
//! its JSON type, required-ness, default value, editor visibility, and an
//! optional validation rule. Descriptors are data plus one closure -- there
//! is no descriptor type hierarchy; factories own a flat ordered list.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::properties::{ComponentProperties, PropertyError};
use crate::validation::ValidationIssue;

/// Validation rule run against a present, type-correct value.
pub type Validator = Arc<dyn Fn(&Value) -> ValidationIssue + Send + Sync>;

/// JSON type a property value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Single-line string.
    String,
    /// Multi-line string, rendered as a text area.
    Text,
    Integer,
    Number,
    Boolean,
    Object,
}

impl ValueType {
    fn expected(self) -> &'static str {
        match self {
            ValueType::String | ValueType::Text => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::String | ValueType::Text => value.is_string(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::Number => value.is_number(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Object => value.is_object(),
        }
    }
}

/// How a property is presented in a configuration editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    /// Whether operators may change the value after initial setup.
    pub changeable: bool,
    /// Whether the field starts out hidden in the editor.
    pub hidden_by_default: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            changeable: true,
            hidden_by_default: false,
        }
    }
}

/// Declarative specification of one configuration field.
///
/// Name must be unique within a factory's descriptor list.
#[derive(Clone, Serialize)]
pub struct PropertyDescriptor {
    name: String,
    #[serde(rename = "type")]
    value_type: ValueType,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<Value>,
    visibility: Visibility,
    #[serde(skip)]
    validator: Option<Validator>,
}

impl PropertyDescriptor {
    fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: false,
            default_value: None,
            visibility: Visibility::default(),
            validator: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Object)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attach a validation rule. The rule only runs on values that are
    /// present and type-correct; emit [`ValidationIssue::none`] to pass.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&Value) -> ValidationIssue + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Extract this property's value from a bag.
    ///
    /// `Ok(None)` means "absent but optional"; a missing required value or
    /// a type mismatch is a [`PropertyError`] for the engine to record.
    pub fn extract<'a>(
        &self,
        properties: &'a ComponentProperties,
    ) -> Result<Option<&'a Value>, PropertyError> {
        match properties.get(&self.name) {
            None if self.required => Err(PropertyError::RequiredMissing(self.name.clone())),
            None => Ok(None),
            Some(value) if self.value_type.matches(value) => Ok(Some(value)),
            Some(_) => Err(PropertyError::Cast {
                property: self.name.clone(),
                expected: self.value_type.expected(),
            }),
        }
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("visibility", &self.visibility)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
