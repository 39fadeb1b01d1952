//! Push-notification action.
//!
//! Sends a configured title and message to the participant's device
//! through the capability's push operation. A participant without a
//! registered device is skipped with a warning; delivery failures beyond
//! that are the push sender's concern.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use fieldwork_component::{
    Action, ActionFactory, ActionParameter, ActionSdk, Component, ComponentError,
    ComponentFactory, ComponentProperties, PropertyDescriptor,
};

const TITLE_PROPERTY: &str = "title";
const MESSAGE_PROPERTY: &str = "message";

pub struct PushNotificationAction {
    sdk: Arc<dyn ActionSdk>,
    properties: ComponentProperties,
}

#[async_trait]
impl Component for PushNotificationAction {}

#[async_trait]
impl Action for PushNotificationAction {
    async fn execute(&self, parameter: &ActionParameter) -> Result<(), ComponentError> {
        let title = self.properties.string_value(TITLE_PROPERTY)?;
        let message = self.properties.string_value(MESSAGE_PROPERTY)?;
        let data = (!parameter.data.is_empty()).then(|| parameter.data.clone());
        let delivered = self
            .sdk
            .send_push_notification(parameter.participant_id, title, message, data)
            .await?;
        if !delivered {
            warn!(
                issuer = %self.sdk.issuer(),
                participant_id = parameter.participant_id,
                "participant has no registered device, notification skipped"
            );
        }
        Ok(())
    }
}

pub struct PushNotificationActionFactory;

#[async_trait]
impl ComponentFactory for PushNotificationActionFactory {
    fn id(&self) -> &str {
        "push-notification-action"
    }

    fn title(&self) -> &str {
        "Push Notification"
    }

    fn description(&self) -> &str {
        "Sends a push notification to the participant's device"
    }

    fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::string(TITLE_PROPERTY).required(true),
            PropertyDescriptor::text(MESSAGE_PROPERTY).required(true),
        ]
    }
}

impl ActionFactory for PushNotificationActionFactory {
    fn create(
        &self,
        sdk: Arc<dyn ActionSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Action>, ComponentError> {
        let properties = self.validate(properties)?;
        Ok(Box::new(PushNotificationAction { sdk, properties }))
    }
}
