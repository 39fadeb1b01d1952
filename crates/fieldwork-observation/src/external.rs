//! External-data observation.
//!
//! Third-party systems (wearables, lab equipment) push records for a
//! participant through the platform's ingress, authenticating with a
//! per-participant API token. This observation mints the tokens into each
//! participant's property bag on activation and withdraws them on
//! deactivation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use fieldwork_component::{
    Component, ComponentError, ComponentFactory, ComponentProperties, Observation,
    ObservationFactory, ObservationSdk, PropertyDescriptor,
};

pub(crate) const TOKEN_PROPERTY: &str = "token";

pub struct ExternalObservation {
    sdk: Arc<dyn ObservationSdk>,
}

#[async_trait]
impl Component for ExternalObservation {
    async fn activate(&self) -> Result<(), ComponentError> {
        for participant in self.sdk.active_participants().await? {
            // Existing tokens stay valid across re-activations.
            if self
                .sdk
                .properties_for_participant(participant.participant_id)
                .await?
                .is_some_and(|bag| bag.contains_key(TOKEN_PROPERTY))
            {
                continue;
            }
            let mut bag = ComponentProperties::new();
            bag.insert(TOKEN_PROPERTY, json!(Uuid::new_v4().to_string()));
            self.sdk
                .set_properties_for_participant(participant.participant_id, bag)
                .await?;
            debug!(
                issuer = %self.sdk.issuer(),
                participant_id = participant.participant_id,
                "issued external data token"
            );
        }
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), ComponentError> {
        for participant in self.sdk.active_participants().await? {
            self.sdk
                .remove_properties_for_participant(participant.participant_id)
                .await?;
        }
        Ok(())
    }
}

impl Observation for ExternalObservation {}

pub struct ExternalObservationFactory;

#[async_trait]
impl ComponentFactory for ExternalObservationFactory {
    fn id(&self) -> &str {
        "external-observation"
    }

    fn title(&self) -> &str {
        "External Observation"
    }

    fn description(&self) -> &str {
        "Receives data pushed by an external system, authenticated with \
         per-participant tokens"
    }

    fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
        vec![PropertyDescriptor::string("externalId").required(true)]
    }
}

impl ObservationFactory for ExternalObservationFactory {
    fn create(
        &self,
        sdk: Arc<dyn ObservationSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Observation>, ComponentError> {
        self.validate(properties)?;
        Ok(Box::new(ExternalObservation { sdk }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwork_component::{Participant, ParticipantStatus};
    use fieldwork_host::{ComponentScope, InMemoryPlatform, PlatformHarness};
    use serde_json::json;

    fn enrolled(platform: &InMemoryPlatform, participant_id: i32) {
        platform.add_participant(Participant {
            study_id: 1,
            participant_id,
            alias: format!("P-{participant_id:03}"),
            study_group_id: None,
            status: ParticipantStatus::Active,
            registration_token: None,
            created: None,
            modified: None,
        });
    }

    fn component(harness: &Arc<PlatformHarness>) -> Box<dyn Observation> {
        let properties =
            ComponentProperties::from_value(json!({ "externalId": "wearable-7" })).unwrap();
        ExternalObservationFactory
            .create(harness.observation_sdk(ComponentScope::new(1, None, 3)), properties)
            .unwrap()
    }

    #[test]
    fn requires_external_id() {
        let factory = ExternalObservationFactory;
        let err = factory.validate(ComponentProperties::new()).unwrap_err();
        assert!(matches!(err, ComponentError::ConfigurationInvalid(_)));
    }

    #[tokio::test]
    async fn activation_mints_one_token_per_participant() {
        let platform = Arc::new(InMemoryPlatform::new());
        enrolled(&platform, 7);
        enrolled(&platform, 8);
        let harness = Arc::new(PlatformHarness::in_memory(platform.clone()));

        component(&harness).activate().await.unwrap();

        let sdk = harness.observation_sdk(ComponentScope::new(1, None, 3));
        let first = sdk.properties_for_participant(7).await.unwrap().unwrap();
        let second = sdk.properties_for_participant(8).await.unwrap().unwrap();
        assert_ne!(
            first.string_value(TOKEN_PROPERTY).unwrap(),
            second.string_value(TOKEN_PROPERTY).unwrap()
        );
    }

    #[tokio::test]
    async fn reactivation_keeps_existing_tokens() {
        let platform = Arc::new(InMemoryPlatform::new());
        enrolled(&platform, 7);
        let harness = Arc::new(PlatformHarness::in_memory(platform.clone()));
        let observation = component(&harness);

        observation.activate().await.unwrap();
        let sdk = harness.observation_sdk(ComponentScope::new(1, None, 3));
        let token = sdk
            .properties_for_participant(7)
            .await
            .unwrap()
            .unwrap()
            .string_value(TOKEN_PROPERTY)
            .unwrap()
            .to_string();

        observation.activate().await.unwrap();
        let unchanged = sdk.properties_for_participant(7).await.unwrap().unwrap();
        assert_eq!(unchanged.string_value(TOKEN_PROPERTY).unwrap(), token);
    }

    #[tokio::test]
    async fn deactivation_withdraws_tokens() {
        let platform = Arc::new(InMemoryPlatform::new());
        enrolled(&platform, 7);
        let harness = Arc::new(PlatformHarness::in_memory(platform.clone()));
        let observation = component(&harness);

        observation.activate().await.unwrap();
        observation.deactivate().await.unwrap();

        let sdk = harness.observation_sdk(ComponentScope::new(1, None, 3));
        assert!(sdk.properties_for_participant(7).await.unwrap().is_none());
    }
}
