//! Logger action.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use fieldwork_component::{
    Action, ActionFactory, ActionParameter, ActionSdk, Component, ComponentError,
    ComponentFactory, ComponentProperties,
};

/// Writes each action parameter to the log at info level.
pub struct LoggerAction {
    sdk: Arc<dyn ActionSdk>,
}

#[async_trait]
impl Component for LoggerAction {}

#[async_trait]
impl Action for LoggerAction {
    async fn execute(&self, parameter: &ActionParameter) -> Result<(), ComponentError> {
        info!(issuer = %self.sdk.issuer(), %parameter, "logger action fired");
        Ok(())
    }
}

pub struct LoggerActionFactory;

#[async_trait]
impl ComponentFactory for LoggerActionFactory {
    fn id(&self) -> &str {
        "logger-action"
    }

    fn title(&self) -> &str {
        "Logger Action"
    }

    fn description(&self) -> &str {
        "Logs to info level"
    }
}

impl ActionFactory for LoggerActionFactory {
    fn create(
        &self,
        sdk: Arc<dyn ActionSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Action>, ComponentError> {
        self.validate(properties)?;
        Ok(Box::new(LoggerAction { sdk }))
    }
}
