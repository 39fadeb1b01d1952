//! Web-survey observation.
//!
//! Integrates questionnaires hosted on a remote survey service. The
//! factory exposes a `surveys` module route (listing the caller's surveys
//! with filtering and paging) and a configuration widget for picking one;
//! the observation assigns the configured survey to each participant's
//! property bag so the mobile app knows what to load.

pub mod client;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use fieldwork_component::{
    Component, ComponentError, ComponentFactory, ComponentProperties, Identity, Observation,
    ObservationFactory, ObservationSdk, PropertyDescriptor, Widget,
};

pub use client::{SurveyClient, SurveyServiceConfig, SurveySummary};

const SURVEY_ID_PROPERTY: &str = "surveyId";

const WIDGET_SCRIPT: &str = r#"class SurveyPickerElement extends HTMLElement {
  async connectedCallback() {
    const response = await fetch(this.dataset.routeUrl, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ filter: null, start: 0, size: 25 }),
    });
    const { surveys } = await response.json();
    const select = document.createElement('select');
    for (const survey of surveys) {
      const option = document.createElement('option');
      option.value = survey.id;
      option.textContent = survey.title;
      select.appendChild(option);
    }
    select.addEventListener('change', () => {
      this.dispatchEvent(new CustomEvent('survey-selected', { detail: select.value }));
    });
    this.appendChild(select);
  }
}"#;

/// Platform-side instance of a configured survey.
pub struct SurveyObservation {
    sdk: Arc<dyn ObservationSdk>,
    survey_id: String,
}

#[async_trait]
impl Component for SurveyObservation {
    async fn activate(&self) -> Result<(), ComponentError> {
        for participant in self.sdk.active_participants().await? {
            let mut bag = ComponentProperties::new();
            bag.insert(SURVEY_ID_PROPERTY, json!(self.survey_id));
            self.sdk
                .set_properties_for_participant(participant.participant_id, bag)
                .await?;
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

impl Observation for SurveyObservation {}

/// Factory for the web-survey observation. Holds the shared service
/// client; safe under concurrent module calls.
pub struct SurveyObservationFactory {
    client: Arc<SurveyClient>,
}

impl SurveyObservationFactory {
    pub fn new(client: Arc<SurveyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ComponentFactory for SurveyObservationFactory {
    fn id(&self) -> &str {
        "web-survey-observation"
    }

    fn title(&self) -> &str {
        "Web Survey Observation"
    }

    fn description(&self) -> &str {
        "Presents a questionnaire hosted on the remote survey service"
    }

    fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
        vec![PropertyDescriptor::string(SURVEY_ID_PROPERTY).required(true)]
    }

    fn default_properties(&self) -> ComponentProperties {
        let mut properties = ComponentProperties::new();
        properties.insert(SURVEY_ID_PROPERTY, json!(""));
        properties
    }

    fn widget(&self) -> Option<Widget> {
        Some(Widget::new("SurveyPickerElement", WIDGET_SCRIPT))
    }

    async fn handle_module_call(
        &self,
        route: &str,
        identity: &Identity,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, ComponentError> {
        match route {
            "surveys" => {
                let filter = payload
                    .get("filter")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string);
                let start = payload
                    .get("start")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(0) as usize;
                let size = payload
                    .get("size")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(10) as usize;
                let username = identity.email.clone().unwrap_or_default();
                let page = self
                    .client
                    .list_surveys_by_user(&username, filter.as_deref(), start, size)
                    .await?;
                Ok(serde_json::to_value(page)?)
            }
            _ => Err(ComponentError::NotFound(format!("module route '{route}'"))),
        }
    }
}

impl ObservationFactory for SurveyObservationFactory {
    fn create(
        &self,
        sdk: Arc<dyn ObservationSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Observation>, ComponentError> {
        let properties = self.validate(properties)?;
        let survey_id = properties.string_value(SURVEY_ID_PROPERTY)?.to_string();
        Ok(Box::new(SurveyObservation { sdk, survey_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwork_component::{Participant, ParticipantStatus};
    use fieldwork_host::{ComponentScope, InMemoryPlatform, PlatformHarness};

    fn factory() -> SurveyObservationFactory {
        let client = SurveyClient::new(SurveyServiceConfig::default()).unwrap();
        SurveyObservationFactory::new(Arc::new(client))
    }

    #[test]
    fn metadata_and_defaults() {
        let factory = factory();
        assert_eq!(factory.id(), "web-survey-observation");
        assert!(factory.has_widget());
        assert_eq!(factory.property_descriptors().len(), 1);
        assert!(factory.default_properties().contains_key(SURVEY_ID_PROPERTY));
    }

    #[test]
    fn survey_id_is_required() {
        let factory = factory();
        match factory.validate(ComponentProperties::new()).unwrap_err() {
            ComponentError::ConfigurationInvalid(report) => {
                assert_eq!(report.errors().count(), 1);
                assert_eq!(report.errors().next().unwrap().property(), SURVEY_ID_PROPERTY);
            }
            other => panic!("expected ConfigurationInvalid, got: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let factory = factory();
        let err = factory
            .handle_module_call("export", &Identity::anonymous(), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ComponentError::NotFound(_)));
    }

    #[tokio::test]
    async fn activation_assigns_survey_to_participants() {
        let platform = Arc::new(InMemoryPlatform::new());
        platform.add_participant(Participant {
            study_id: 1,
            participant_id: 7,
            alias: "P-007".into(),
            study_group_id: None,
            status: ParticipantStatus::Active,
            registration_token: None,
            created: None,
            modified: None,
        });
        let harness = Arc::new(PlatformHarness::in_memory(platform));

        let properties =
            ComponentProperties::from_value(json!({ "surveyId": "sv-42" })).unwrap();
        let observation = factory()
            .create(harness.observation_sdk(ComponentScope::new(1, None, 3)), properties)
            .unwrap();
        observation.activate().await.unwrap();

        let sdk = harness.observation_sdk(ComponentScope::new(1, None, 3));
        let bag = sdk.properties_for_participant(7).await.unwrap().unwrap();
        assert_eq!(bag.string_value(SURVEY_ID_PROPERTY).unwrap(), "sv-42");

        observation.deactivate().await.unwrap();
        assert!(sdk.properties_for_participant(7).await.unwrap().is_none());
    }

    #[test]
    fn widget_script_defines_the_custom_element_class() {
        let widget = factory().widget().unwrap();
        assert_eq!(widget.class_name, "SurveyPickerElement");
        assert!(widget.script.starts_with("class SurveyPickerElement"));
    }
}
