//! Contracts for the host's external collaborators.
//!
//! The component core never talks to storage, push transports or identity
//! providers directly; it consumes these traits. Production deployments
//! implement them over their own infrastructure, the in-memory versions in
//! [`crate::memory`] serve tests and embedding.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldwork_component::{ComponentError, ComponentProperties, Participant};

/// One stored measurement or event, fully scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub study_id: i64,
    pub study_group_id: Option<i32>,
    pub participant_id: i32,
    /// Which component instance produced the value (e.g. `"observation_3"`).
    pub source: String,
    /// Component-defined record type (e.g. `"gps"`, `"acc"`).
    pub record_type: String,
    pub recorded_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Sink for participant data. Fire-and-forget from the component's point
/// of view; durability and retries are the sink's responsibility.
#[async_trait]
pub trait DataPointSink: Send + Sync {
    async fn store_data_point(&self, data_point: DataPoint) -> Result<(), ComponentError>;
}

/// Opaque per-participant property bags, keyed by
/// (study, participant, component-instance). The host never interprets
/// the stored shape beyond name→value.
#[async_trait]
pub trait ParticipantPropertyStore: Send + Sync {
    async fn set_properties(
        &self,
        study_id: i64,
        participant_id: i32,
        component_id: i32,
        properties: ComponentProperties,
    ) -> Result<(), ComponentError>;

    async fn properties(
        &self,
        study_id: i64,
        participant_id: i32,
        component_id: i32,
    ) -> Result<Option<ComponentProperties>, ComponentError>;

    async fn remove_properties(
        &self,
        study_id: i64,
        participant_id: i32,
        component_id: i32,
    ) -> Result<(), ComponentError>;
}

/// Read access to study enrollment.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn participant(
        &self,
        study_id: i64,
        participant_id: i32,
    ) -> Result<Option<Participant>, ComponentError>;

    /// Active participants of a study, optionally restricted to one group.
    async fn active_participants(
        &self,
        study_id: i64,
        study_group_id: Option<i32>,
    ) -> Result<Vec<Participant>, ComponentError>;
}

/// Push-notification delivery. Returns whether a delivery was attempted;
/// a participant without a registered device is `false`, not an error.
#[async_trait]
pub trait PushNotificationSender: Send + Sync {
    async fn send(
        &self,
        study_id: i64,
        participant_id: i32,
        title: &str,
        message: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<bool, ComponentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync + ?Sized>() {}

    #[test]
    fn collaborator_traits_are_send_sync() {
        assert_send_sync::<dyn DataPointSink>();
        assert_send_sync::<dyn ParticipantPropertyStore>();
        assert_send_sync::<dyn ParticipantRepository>();
        assert_send_sync::<dyn PushNotificationSender>();
    }

    #[test]
    fn data_point_serde_round_trip() {
        let data_point = DataPoint {
            study_id: 1,
            study_group_id: Some(2),
            participant_id: 7,
            source: "observation_3".into(),
            record_type: "gps".into(),
            recorded_at: Utc::now(),
            payload: serde_json::json!({ "lat": 48.2, "lon": 16.4 }),
        };
        let encoded = serde_json::to_string(&data_point).unwrap();
        let decoded: DataPoint = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, data_point);
    }
}
