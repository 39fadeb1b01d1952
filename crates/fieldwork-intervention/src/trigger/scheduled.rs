//! Cron-scheduled trigger.
//!
//! Declares a `cronSchedule` property validated at configuration time; the
//! external scheduler fires [`Trigger::execute`] at the scheduled
//! instants. Evaluation matches every active participant in the bound
//! scope -- narrowing to a study group happens through the capability, not
//! the trigger.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use tracing::debug;

use fieldwork_component::{
    Component, ComponentError, ComponentFactory, ComponentProperties,
    ConfigurationValidationReport, PropertyDescriptor, Trigger, TriggerFactory, TriggerResult,
    TriggerSdk, ValidationIssue,
};

const SCHEDULE_PROPERTY: &str = "cronSchedule";

pub struct ScheduledTrigger {
    sdk: Arc<dyn TriggerSdk>,
    schedule: Schedule,
}

impl ScheduledTrigger {
    /// Next scheduled instant strictly after `instant`; the external
    /// scheduler uses this to plan the following invocation.
    pub fn next_fire_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&instant).next()
    }
}

#[async_trait]
impl Component for ScheduledTrigger {}

#[async_trait]
impl Trigger for ScheduledTrigger {
    async fn execute(&self, now: DateTime<Utc>) -> Result<TriggerResult, ComponentError> {
        let participants = self.sdk.active_participants().await?;
        debug!(
            issuer = %self.sdk.issuer(),
            matched = participants.len(),
            next = ?self.next_fire_after(now),
            "scheduled trigger evaluated"
        );
        Ok(TriggerResult::matched(
            participants
                .into_iter()
                .map(|participant| participant.participant_id)
                .collect(),
        ))
    }
}

pub struct ScheduledTriggerFactory;

#[async_trait]
impl ComponentFactory for ScheduledTriggerFactory {
    fn id(&self) -> &str {
        "scheduled-trigger"
    }

    fn title(&self) -> &str {
        "Scheduled Trigger"
    }

    fn description(&self) -> &str {
        "Fires on a cron schedule (seconds resolution, e.g. '0 0 12 * * *')"
    }

    fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::string(SCHEDULE_PROPERTY)
                .required(true)
                .with_validator(|value| {
                    let expression = value.as_str().unwrap_or_default();
                    match Schedule::from_str(expression) {
                        Ok(_) => ValidationIssue::none(),
                        Err(err) => ValidationIssue::error(
                            SCHEDULE_PROPERTY,
                            format!("invalid cron expression: {err}"),
                        ),
                    }
                }),
        ]
    }
}

impl TriggerFactory for ScheduledTriggerFactory {
    fn create(
        &self,
        sdk: Arc<dyn TriggerSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Trigger>, ComponentError> {
        let properties = self.validate(properties)?;
        let schedule =
            Schedule::from_str(properties.string_value(SCHEDULE_PROPERTY)?).map_err(|err| {
                ComponentError::ConfigurationInvalid(ConfigurationValidationReport::of(vec![
                    ValidationIssue::error(
                        SCHEDULE_PROPERTY,
                        format!("invalid cron expression: {err}"),
                    ),
                ]))
            })?;
        Ok(Box::new(ScheduledTrigger { sdk, schedule }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fieldwork_component::{Participant, ParticipantStatus};
    use fieldwork_host::{ComponentScope, InMemoryPlatform, PlatformHarness};
    use serde_json::json;

    fn enrolled(platform: &InMemoryPlatform, participant_id: i32, group: Option<i32>) {
        platform.add_participant(Participant {
            study_id: 1,
            participant_id,
            alias: format!("P-{participant_id:03}"),
            study_group_id: group,
            status: ParticipantStatus::Active,
            registration_token: None,
            created: None,
            modified: None,
        });
    }

    #[test]
    fn rejects_malformed_cron_expressions() {
        let factory = ScheduledTriggerFactory;
        let properties =
            ComponentProperties::from_value(json!({ "cronSchedule": "every tuesday" })).unwrap();
        match factory.validate(properties).unwrap_err() {
            ComponentError::ConfigurationInvalid(report) => {
                assert_eq!(report.errors().count(), 1);
                let issue = report.errors().next().unwrap();
                assert_eq!(issue.property(), SCHEDULE_PROPERTY);
                assert!(issue.message().contains("invalid cron expression"));
            }
            other => panic!("expected ConfigurationInvalid, got: {other}"),
        }
    }

    #[test]
    fn accepts_daily_noon_schedule() {
        let factory = ScheduledTriggerFactory;
        let properties =
            ComponentProperties::from_value(json!({ "cronSchedule": "0 0 12 * * *" })).unwrap();
        assert!(factory.validate(properties).is_ok());
    }

    #[test]
    fn schedule_is_required() {
        let factory = ScheduledTriggerFactory;
        assert!(factory.validate(ComponentProperties::new()).is_err());
    }

    #[tokio::test]
    async fn execute_matches_active_participants_in_scope() {
        let platform = Arc::new(InMemoryPlatform::new());
        enrolled(&platform, 1, Some(2));
        enrolled(&platform, 2, Some(2));
        enrolled(&platform, 3, Some(9));
        let harness = Arc::new(PlatformHarness::in_memory(platform));

        let properties =
            ComponentProperties::from_value(json!({ "cronSchedule": "0 0 12 * * *" })).unwrap();
        let trigger = ScheduledTriggerFactory
            .create(harness.trigger_sdk(ComponentScope::new(1, Some(2), 6)), properties)
            .unwrap();

        let result = trigger.execute(Utc::now()).await.unwrap();
        assert_eq!(result.participant_ids, vec![1, 2]);
    }

    #[test]
    fn next_fire_follows_the_expression() {
        let platform = Arc::new(InMemoryPlatform::new());
        let harness = Arc::new(PlatformHarness::in_memory(platform));
        let trigger = ScheduledTrigger {
            sdk: harness.trigger_sdk(ComponentScope::new(1, None, 6)),
            schedule: Schedule::from_str("0 0 12 * * *").unwrap(),
        };

        let from = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let next = trigger.next_fire_after(from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    }
}
