//! Scoped capability minting.
//!
//! [`PlatformHarness`] owns the collaborator handles and manufactures, per
//! component activation, a capability object bound to one immutable
//! (study, group, component) scope. Every write the capability performs
//! stamps the bound identifiers itself -- this is the enforcement point
//! that keeps plugin code from addressing another study or participant.
//! A write outside the bound scope fails with
//! [`ComponentError::ScopeViolation`] and is logged as an error.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::error;

use fieldwork_component::{
    ActionSdk, ComponentError, ComponentKind, ComponentProperties, ObservationSdk, Participant,
    PlatformSdk, TriggerSdk,
};

use crate::memory::InMemoryPlatform;
use crate::platform::{
    DataPoint, DataPointSink, ParticipantPropertyStore, ParticipantRepository,
    PushNotificationSender,
};

/// The immutable identifier tuple a capability is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentScope {
    pub study_id: i64,
    pub study_group_id: Option<i32>,
    /// The component-instance id within the study.
    pub component_id: i32,
}

impl ComponentScope {
    pub fn new(study_id: i64, study_group_id: Option<i32>, component_id: i32) -> Self {
        Self {
            study_id,
            study_group_id,
            component_id,
        }
    }
}

/// Collaborator handles plus the capability mint. Cheap to clone; each
/// minted capability keeps its own handle set.
#[derive(Clone)]
pub struct PlatformHarness {
    data: Arc<dyn DataPointSink>,
    properties: Arc<dyn ParticipantPropertyStore>,
    participants: Arc<dyn ParticipantRepository>,
    push: Arc<dyn PushNotificationSender>,
}

impl PlatformHarness {
    pub fn new(
        data: Arc<dyn DataPointSink>,
        properties: Arc<dyn ParticipantPropertyStore>,
        participants: Arc<dyn ParticipantRepository>,
        push: Arc<dyn PushNotificationSender>,
    ) -> Self {
        Self {
            data,
            properties,
            participants,
            push,
        }
    }

    /// Harness backed entirely by one [`InMemoryPlatform`].
    pub fn in_memory(platform: Arc<InMemoryPlatform>) -> Self {
        Self::new(
            platform.clone(),
            platform.clone(),
            platform.clone(),
            platform,
        )
    }

    /// Mint the capability for an observation activation.
    pub fn observation_sdk(&self, scope: ComponentScope) -> Arc<dyn ObservationSdk> {
        Arc::new(ScopedObservationSdk {
            base: ScopedSdk::new(self.clone(), scope, ComponentKind::Observation),
        })
    }

    /// Mint the capability for a trigger activation.
    pub fn trigger_sdk(&self, scope: ComponentScope) -> Arc<dyn TriggerSdk> {
        Arc::new(ScopedTriggerSdk {
            base: ScopedSdk::new(self.clone(), scope, ComponentKind::Trigger),
        })
    }

    /// Mint the capability for an action activation.
    pub fn action_sdk(&self, scope: ComponentScope) -> Arc<dyn ActionSdk> {
        Arc::new(ScopedActionSdk {
            base: ScopedSdk::new(self.clone(), scope, ComponentKind::Action),
        })
    }
}

/// Shared scope binding behind each kind-specific capability.
struct ScopedSdk {
    harness: PlatformHarness,
    scope: ComponentScope,
    kind: ComponentKind,
}

impl ScopedSdk {
    fn new(harness: PlatformHarness, scope: ComponentScope, kind: ComponentKind) -> Self {
        Self {
            harness,
            scope,
            kind,
        }
    }

    /// `{study}-{group}-{component}-{kind}`; an unbound group renders as
    /// the literal `null` segment.
    fn issuer(&self) -> String {
        let group = match self.scope.study_group_id {
            Some(group) => group.to_string(),
            None => "null".to_string(),
        };
        format!(
            "{}-{}-{}-{}",
            self.scope.study_id, group, self.scope.component_id, self.kind
        )
    }

    fn source_tag(&self) -> String {
        format!("{}_{}", self.kind, self.scope.component_id)
    }

    fn in_scope(&self, participant: &Participant) -> bool {
        match self.scope.study_group_id {
            None => true,
            Some(group) => participant.study_group_id == Some(group),
        }
    }

    async fn participant(
        &self,
        participant_id: i32,
    ) -> Result<Option<Participant>, ComponentError> {
        let found = self
            .harness
            .participants
            .participant(self.scope.study_id, participant_id)
            .await?;
        Ok(found.filter(|participant| self.in_scope(participant)))
    }

    async fn active_participants(&self) -> Result<Vec<Participant>, ComponentError> {
        self.harness
            .participants
            .active_participants(self.scope.study_id, self.scope.study_group_id)
            .await
    }

    /// Resolve a participant for a write, failing the call if it is not
    /// within the bound scope.
    async fn checked_participant(
        &self,
        participant_id: i32,
    ) -> Result<Participant, ComponentError> {
        match self.participant(participant_id).await? {
            Some(participant) => Ok(participant),
            None => {
                error!(
                    issuer = %self.issuer(),
                    participant_id,
                    "capability addressed a participant outside its scope"
                );
                Err(ComponentError::ScopeViolation(format!(
                    "participant {participant_id} is not within scope {}",
                    self.issuer()
                )))
            }
        }
    }

    async fn store_data_point(
        &self,
        participant_id: i32,
        record_type: &str,
        payload: serde_json::Value,
    ) -> Result<(), ComponentError> {
        self.checked_participant(participant_id).await?;
        self.harness
            .data
            .store_data_point(DataPoint {
                study_id: self.scope.study_id,
                study_group_id: self.scope.study_group_id,
                participant_id,
                source: self.source_tag(),
                record_type: record_type.into(),
                recorded_at: Utc::now(),
                payload,
            })
            .await
    }
}

macro_rules! delegate_platform_sdk {
    ($wrapper:ty) => {
        #[async_trait]
        impl PlatformSdk for $wrapper {
            fn issuer(&self) -> String {
                self.base.issuer()
            }
            fn study_id(&self) -> i64 {
                self.base.scope.study_id
            }
            fn study_group_id(&self) -> Option<i32> {
                self.base.scope.study_group_id
            }
            async fn participant(
                &self,
                participant_id: i32,
            ) -> Result<Option<Participant>, ComponentError> {
                self.base.participant(participant_id).await
            }
            async fn active_participants(&self) -> Result<Vec<Participant>, ComponentError> {
                self.base.active_participants().await
            }
            async fn store_data_point(
                &self,
                participant_id: i32,
                record_type: &str,
                payload: serde_json::Value,
            ) -> Result<(), ComponentError> {
                self.base
                    .store_data_point(participant_id, record_type, payload)
                    .await
            }
        }
    };
}

struct ScopedObservationSdk {
    base: ScopedSdk,
}

delegate_platform_sdk!(ScopedObservationSdk);

#[async_trait]
impl ObservationSdk for ScopedObservationSdk {
    fn observation_id(&self) -> i32 {
        self.base.scope.component_id
    }

    async fn set_properties_for_participant(
        &self,
        participant_id: i32,
        properties: ComponentProperties,
    ) -> Result<(), ComponentError> {
        self.base.checked_participant(participant_id).await?;
        self.base
            .harness
            .properties
            .set_properties(
                self.base.scope.study_id,
                participant_id,
                self.base.scope.component_id,
                properties,
            )
            .await
    }

    async fn properties_for_participant(
        &self,
        participant_id: i32,
    ) -> Result<Option<ComponentProperties>, ComponentError> {
        self.base
            .harness
            .properties
            .properties(
                self.base.scope.study_id,
                participant_id,
                self.base.scope.component_id,
            )
            .await
    }

    async fn remove_properties_for_participant(
        &self,
        participant_id: i32,
    ) -> Result<(), ComponentError> {
        self.base
            .harness
            .properties
            .remove_properties(
                self.base.scope.study_id,
                participant_id,
                self.base.scope.component_id,
            )
            .await
    }
}

struct ScopedTriggerSdk {
    base: ScopedSdk,
}

delegate_platform_sdk!(ScopedTriggerSdk);

#[async_trait]
impl TriggerSdk for ScopedTriggerSdk {
    fn trigger_id(&self) -> i32 {
        self.base.scope.component_id
    }
}

struct ScopedActionSdk {
    base: ScopedSdk,
}

delegate_platform_sdk!(ScopedActionSdk);

#[async_trait]
impl ActionSdk for ScopedActionSdk {
    fn action_id(&self) -> i32 {
        self.base.scope.component_id
    }

    async fn send_push_notification(
        &self,
        participant_id: i32,
        title: &str,
        message: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<bool, ComponentError> {
        self.base.checked_participant(participant_id).await?;
        self.base
            .harness
            .push
            .send(
                self.base.scope.study_id,
                participant_id,
                title,
                message,
                data,
            )
            .await
    }
}
