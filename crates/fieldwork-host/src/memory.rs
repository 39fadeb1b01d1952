//! In-memory collaborator implementations.
//!
//! One struct implements all four collaborator contracts, backed by
//! concurrent maps. Used by the test suites and by embeddings that do not
//! need durable storage; production deployments bring their own
//! repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use fieldwork_component::{ComponentError, ComponentProperties, Participant};

use crate::platform::{
    DataPoint, DataPointSink, ParticipantPropertyStore, ParticipantRepository,
    PushNotificationSender,
};

/// A push notification captured instead of delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub study_id: i64,
    pub participant_id: i32,
    pub title: String,
    pub message: String,
    pub data: Option<HashMap<String, String>>,
}

/// In-memory platform: data sink, property store, participant repository
/// and push sender in one.
#[derive(Default)]
pub struct InMemoryPlatform {
    data_points: Mutex<Vec<DataPoint>>,
    properties: DashMap<(i64, i32, i32), ComponentProperties>,
    participants: DashMap<(i64, i32), Participant>,
    notifications: Mutex<Vec<SentNotification>>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll a participant.
    pub fn add_participant(&self, participant: Participant) {
        self.participants.insert(
            (participant.study_id, participant.participant_id),
            participant,
        );
    }

    /// Snapshot of everything stored through the sink so far.
    pub fn data_points(&self) -> Vec<DataPoint> {
        self.data_points.lock().clone()
    }

    /// Snapshot of captured push notifications.
    pub fn notifications(&self) -> Vec<SentNotification> {
        self.notifications.lock().clone()
    }
}

#[async_trait]
impl DataPointSink for InMemoryPlatform {
    async fn store_data_point(&self, data_point: DataPoint) -> Result<(), ComponentError> {
        self.data_points.lock().push(data_point);
        Ok(())
    }
}

#[async_trait]
impl ParticipantPropertyStore for InMemoryPlatform {
    async fn set_properties(
        &self,
        study_id: i64,
        participant_id: i32,
        component_id: i32,
        properties: ComponentProperties,
    ) -> Result<(), ComponentError> {
        self.properties
            .insert((study_id, participant_id, component_id), properties);
        Ok(())
    }

    async fn properties(
        &self,
        study_id: i64,
        participant_id: i32,
        component_id: i32,
    ) -> Result<Option<ComponentProperties>, ComponentError> {
        Ok(self
            .properties
            .get(&(study_id, participant_id, component_id))
            .map(|entry| entry.value().clone()))
    }

    async fn remove_properties(
        &self,
        study_id: i64,
        participant_id: i32,
        component_id: i32,
    ) -> Result<(), ComponentError> {
        self.properties
            .remove(&(study_id, participant_id, component_id));
        Ok(())
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryPlatform {
    async fn participant(
        &self,
        study_id: i64,
        participant_id: i32,
    ) -> Result<Option<Participant>, ComponentError> {
        Ok(self
            .participants
            .get(&(study_id, participant_id))
            .map(|entry| entry.value().clone()))
    }

    async fn active_participants(
        &self,
        study_id: i64,
        study_group_id: Option<i32>,
    ) -> Result<Vec<Participant>, ComponentError> {
        let mut matched: Vec<Participant> = self
            .participants
            .iter()
            .filter(|entry| {
                let participant = entry.value();
                participant.study_id == study_id
                    && participant.is_active()
                    && study_group_id.is_none_or(|group| participant.study_group_id == Some(group))
            })
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by_key(|participant| participant.participant_id);
        Ok(matched)
    }
}

#[async_trait]
impl PushNotificationSender for InMemoryPlatform {
    async fn send(
        &self,
        study_id: i64,
        participant_id: i32,
        title: &str,
        message: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<bool, ComponentError> {
        // No registered device, no delivery attempt.
        let registered = self
            .participants
            .get(&(study_id, participant_id))
            .is_some_and(|entry| entry.value().registration_token.is_some());
        if !registered {
            return Ok(false);
        }
        self.notifications.lock().push(SentNotification {
            study_id,
            participant_id,
            title: title.into(),
            message: message.into(),
            data,
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fieldwork_component::ParticipantStatus;

    fn participant(study_id: i64, participant_id: i32, group: Option<i32>) -> Participant {
        Participant {
            study_id,
            participant_id,
            alias: format!("P-{participant_id:03}"),
            study_group_id: group,
            status: ParticipantStatus::Active,
            registration_token: Some(format!("token-{participant_id}")),
            created: None,
            modified: None,
        }
    }

    #[tokio::test]
    async fn data_points_accumulate() {
        let platform = InMemoryPlatform::new();
        platform
            .store_data_point(DataPoint {
                study_id: 1,
                study_group_id: None,
                participant_id: 7,
                source: "observation_3".into(),
                record_type: "gps".into(),
                recorded_at: Utc::now(),
                payload: serde_json::json!({}),
            })
            .await
            .unwrap();
        assert_eq!(platform.data_points().len(), 1);
    }

    #[tokio::test]
    async fn property_bags_round_trip() {
        let platform = InMemoryPlatform::new();
        let mut bag = ComponentProperties::new();
        bag.insert("token", serde_json::json!("abc"));
        platform.set_properties(1, 7, 3, bag.clone()).await.unwrap();
        assert_eq!(platform.properties(1, 7, 3).await.unwrap(), Some(bag));
        platform.remove_properties(1, 7, 3).await.unwrap();
        assert_eq!(platform.properties(1, 7, 3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn active_participants_filters_by_study_group_and_status() {
        let platform = InMemoryPlatform::new();
        platform.add_participant(participant(1, 1, Some(2)));
        platform.add_participant(participant(1, 2, Some(3)));
        platform.add_participant(participant(2, 3, Some(2)));
        let mut locked = participant(1, 4, Some(2));
        locked.status = ParticipantStatus::Locked;
        platform.add_participant(locked);

        let all = platform.active_participants(1, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let group = platform.active_participants(1, Some(2)).await.unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].participant_id, 1);
    }

    #[tokio::test]
    async fn push_requires_registered_device() {
        let platform = InMemoryPlatform::new();
        platform.add_participant(participant(1, 1, None));
        let mut unregistered = participant(1, 2, None);
        unregistered.registration_token = None;
        platform.add_participant(unregistered);

        assert!(platform.send(1, 1, "hi", "msg", None).await.unwrap());
        assert!(!platform.send(1, 2, "hi", "msg", None).await.unwrap());
        assert_eq!(platform.notifications().len(), 1);
    }
}
