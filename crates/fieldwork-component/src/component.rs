//! Component runtime traits.
//!
//! A component instance is created by its factory when the host activates
//! it for a (study, group) scope, handed a scoped capability at
//! construction, and destroyed when the scope is torn down. The host owns
//! this lifecycle; components only react to it through
//! [`Component::activate`] / [`Component::deactivate`].

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ComponentError;

/// The three component families the platform hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Observation,
    Trigger,
    Action,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Observation,
        ComponentKind::Trigger,
        ComponentKind::Action,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Observation => "observation",
            ComponentKind::Trigger => "trigger",
            ComponentKind::Action => "action",
        }
    }

    /// Parse the lowercase wire form used on the HTTP surface.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "observation" => Some(ComponentKind::Observation),
            "trigger" => Some(ComponentKind::Trigger),
            "action" => Some(ComponentKind::Action),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle shared by all component instances.
///
/// Both hooks default to no-ops; implementations override them to
/// provision or tear down per-scope state (tokens, schedules).
#[async_trait]
pub trait Component: Send + Sync {
    /// Called once after construction, when the scope goes live.
    async fn activate(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called once before the instance is dropped.
    async fn deactivate(&self) -> Result<(), ComponentError> {
        Ok(())
    }
}

/// A data source. Observations are mostly passive on the platform side;
/// the data itself arrives through the platform data sink.
pub trait Observation: Component {}

/// Participants matched by one trigger evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResult {
    pub participant_ids: Vec<i32>,
}

impl TriggerResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn matched(participant_ids: Vec<i32>) -> Self {
        Self { participant_ids }
    }

    pub fn has_matches(&self) -> bool {
        !self.participant_ids.is_empty()
    }
}

/// An event condition. The external scheduler invokes [`Trigger::execute`]
/// on its clock; the trigger decides which participants match.
#[async_trait]
pub trait Trigger: Component {
    async fn execute(&self, now: DateTime<Utc>) -> Result<TriggerResult, ComponentError>;
}

/// Input to one action execution, addressed to a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub participant_id: i32,
    /// Opaque context forwarded from the trigger that fired.
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl ActionParameter {
    pub fn for_participant(participant_id: i32) -> Self {
        Self {
            participant_id,
            data: HashMap::new(),
        }
    }
}

impl fmt::Display for ActionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant={}", self.participant_id)?;
        // Sorted for stable log output.
        let mut entries: Vec<_> = self.data.iter().collect();
        entries.sort();
        for (key, value) in entries {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Something done to a participant when a trigger fires.
#[async_trait]
pub trait Action: Component {
    async fn execute(&self, parameter: &ActionParameter) -> Result<(), ComponentError>;
}
