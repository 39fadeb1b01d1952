//! Study activation lifecycle.
//!
//! The host -- not the component -- owns component lifetimes: when a study
//! goes live, every configured component instance is constructed through
//! its factory with a freshly minted scoped capability and activated; when
//! the study is torn down (or a scope changes), the instances are
//! deactivated and dropped. A scope change never mutates a capability in
//! place; it is always teardown plus re-activation.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use fieldwork_component::{
    Action, Component, ComponentError, ComponentKind, ComponentProperties, Observation, Trigger,
};

use crate::registry::ComponentRegistry;
use crate::sdk::{ComponentScope, PlatformHarness};

/// One configured component instance of a study, as persisted by the
/// (external) study configuration store.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentInstance {
    pub kind: ComponentKind,
    /// Instance id, unique within the study.
    pub instance_id: i32,
    /// Factory id within the kind (e.g. `"gps-mobile-observation"`).
    pub component_type: String,
    #[serde(default)]
    pub study_group_id: Option<i32>,
    #[serde(default)]
    pub properties: ComponentProperties,
}

/// The live components of one activated study.
pub struct ActiveStudy {
    study_id: i64,
    observations: Vec<(i32, Box<dyn Observation>)>,
    triggers: Vec<(i32, Box<dyn Trigger>)>,
    actions: Vec<(i32, Box<dyn Action>)>,
}

impl ActiveStudy {
    pub fn study_id(&self) -> i64 {
        self.study_id
    }

    pub fn observation(&self, instance_id: i32) -> Option<&dyn Observation> {
        self.observations
            .iter()
            .find(|(id, _)| *id == instance_id)
            .map(|(_, component)| component.as_ref())
    }

    pub fn trigger(&self, instance_id: i32) -> Option<&dyn Trigger> {
        self.triggers
            .iter()
            .find(|(id, _)| *id == instance_id)
            .map(|(_, component)| component.as_ref())
    }

    pub fn action(&self, instance_id: i32) -> Option<&dyn Action> {
        self.actions
            .iter()
            .find(|(id, _)| *id == instance_id)
            .map(|(_, component)| component.as_ref())
    }

    pub fn component_count(&self) -> usize {
        self.observations.len() + self.triggers.len() + self.actions.len()
    }

    fn components(&self) -> impl Iterator<Item = (i32, &dyn Component)> {
        let observations = self
            .observations
            .iter()
            .map(|(id, c)| (*id, c.as_ref() as &dyn Component));
        let triggers = self
            .triggers
            .iter()
            .map(|(id, c)| (*id, c.as_ref() as &dyn Component));
        let actions = self
            .actions
            .iter()
            .map(|(id, c)| (*id, c.as_ref() as &dyn Component));
        observations.chain(triggers).chain(actions)
    }

    /// Deactivate every component. Individual failures are logged and do
    /// not stop the teardown of the remaining instances.
    pub async fn deactivate(self) {
        for (instance_id, component) in self.components() {
            if let Err(err) = component.deactivate().await {
                warn!(study_id = self.study_id, instance_id, %err, "component deactivation failed");
            }
        }
    }
}

/// Construct and activate every configured component of a study.
///
/// Construction validates each instance's properties through its factory;
/// any failure aborts the whole activation (the study stays down) so a
/// study never runs with a partial component set.
pub async fn activate_study(
    registry: &ComponentRegistry,
    harness: &Arc<PlatformHarness>,
    study_id: i64,
    instances: Vec<ComponentInstance>,
) -> Result<ActiveStudy, ComponentError> {
    let mut study = ActiveStudy {
        study_id,
        observations: Vec::new(),
        triggers: Vec::new(),
        actions: Vec::new(),
    };

    for instance in instances {
        let scope = ComponentScope::new(study_id, instance.study_group_id, instance.instance_id);
        debug!(
            study_id,
            instance_id = instance.instance_id,
            component_type = %instance.component_type,
            kind = %instance.kind,
            "constructing component"
        );
        match instance.kind {
            ComponentKind::Observation => {
                let factory = registry.observation(&instance.component_type).ok_or_else(|| {
                    ComponentError::NotFound(format!(
                        "no observation component '{}'",
                        instance.component_type
                    ))
                })?;
                let component =
                    factory.create(harness.observation_sdk(scope), instance.properties)?;
                study.observations.push((instance.instance_id, component));
            }
            ComponentKind::Trigger => {
                let factory = registry.trigger(&instance.component_type).ok_or_else(|| {
                    ComponentError::NotFound(format!(
                        "no trigger component '{}'",
                        instance.component_type
                    ))
                })?;
                let component = factory.create(harness.trigger_sdk(scope), instance.properties)?;
                study.triggers.push((instance.instance_id, component));
            }
            ComponentKind::Action => {
                let factory = registry.action(&instance.component_type).ok_or_else(|| {
                    ComponentError::NotFound(format!(
                        "no action component '{}'",
                        instance.component_type
                    ))
                })?;
                let component = factory.create(harness.action_sdk(scope), instance.properties)?;
                study.actions.push((instance.instance_id, component));
            }
        }
    }

    for (instance_id, component) in study.components() {
        debug!(study_id, instance_id, "activating component");
        component.activate().await?;
    }

    Ok(study)
}
