//! Optional configuration-UI widgets.

use serde::{Deserialize, Serialize};

/// A custom-element widget a factory may ship for its configuration UI.
///
/// The host serves the script and appends the `customElements` registration
/// line; the class name must be unique across factories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    /// JavaScript class name registered as the custom element.
    pub class_name: String,
    /// Element implementation source.
    pub script: String,
}

impl Widget {
    pub fn new(class_name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            script: script.into(),
        }
    }
}
