//! Scoped capability (SDK) traits.
//!
//! A capability is the only window a component instance has into the
//! platform. The host mints one per component activation, pre-bound to an
//! immutable (study, group, component) scope; every operation it exposes
//! stamps those identifiers itself, so plugin code cannot address another
//! study or participant. If a scope changes, the host destroys the
//! component/capability pair and constructs a new one -- capabilities are
//! never mutated in place.
//!
//! The traits live in this crate so plugin crates depend only on the
//! contract; implementations live in the host.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ComponentError;
use crate::properties::ComponentProperties;

/// Enrollment state of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    New,
    Active,
    Abandoned,
    KickedOut,
    Locked,
}

/// A study participant as visible to components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub study_id: i64,
    pub participant_id: i32,
    pub alias: String,
    pub study_group_id: Option<i32>,
    pub status: ParticipantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }
}

/// Base capability surface shared by all component kinds.
#[async_trait]
pub trait PlatformSdk: Send + Sync {
    /// Deterministic identity string for the bound scope, used for token
    /// issuing and log correlation. Equal scope tuples yield equal issuers.
    fn issuer(&self) -> String;

    fn study_id(&self) -> i64;

    fn study_group_id(&self) -> Option<i32>;

    /// Look up one participant within the bound scope.
    async fn participant(
        &self,
        participant_id: i32,
    ) -> Result<Option<Participant>, ComponentError>;

    /// Active participants within the bound scope (all groups if the
    /// capability is study-wide, otherwise the bound group only).
    async fn active_participants(&self) -> Result<Vec<Participant>, ComponentError>;

    /// Store one data point for a participant. The scope identifiers and
    /// the source tag are stamped by the capability, not the caller.
    async fn store_data_point(
        &self,
        participant_id: i32,
        record_type: &str,
        payload: serde_json::Value,
    ) -> Result<(), ComponentError>;
}

/// Capability surface for observations.
#[async_trait]
pub trait ObservationSdk: PlatformSdk {
    fn observation_id(&self) -> i32;

    /// Replace the per-participant property bag for this observation.
    async fn set_properties_for_participant(
        &self,
        participant_id: i32,
        properties: ComponentProperties,
    ) -> Result<(), ComponentError>;

    async fn properties_for_participant(
        &self,
        participant_id: i32,
    ) -> Result<Option<ComponentProperties>, ComponentError>;

    async fn remove_properties_for_participant(
        &self,
        participant_id: i32,
    ) -> Result<(), ComponentError>;
}

/// Capability surface for triggers.
#[async_trait]
pub trait TriggerSdk: PlatformSdk {
    fn trigger_id(&self) -> i32;
}

/// Capability surface for actions.
#[async_trait]
pub trait ActionSdk: PlatformSdk {
    fn action_id(&self) -> i32;

    /// Send a push notification to one participant. Returns whether a
    /// delivery was attempted (a participant without a registered device
    /// yields `false`, not an error).
    async fn send_push_notification(
        &self,
        participant_id: i32,
        title: &str,
        message: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<bool, ComponentError>;
}
