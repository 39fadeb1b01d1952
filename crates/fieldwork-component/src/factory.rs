//! Component factory traits.
//!
//! A factory is the stable, process-wide descriptor and constructor for one
//! component type. It owns the property-descriptor list, validates
//! submitted configuration, constructs component instances from validated
//! properties plus a scoped capability, and may expose a UI widget and a
//! module-specific sub-API. Factories are `Send + Sync` and are invoked
//! concurrently by independent requests with no ordering guarantee; any
//! internal mutable state is the factory's own to synchronize.

use std::sync::Arc;

use async_trait::async_trait;

use crate::component::{Action, Observation, Trigger};
use crate::descriptor::PropertyDescriptor;
use crate::error::ComponentError;
use crate::identity::Identity;
use crate::properties::ComponentProperties;
use crate::sdk::{ActionSdk, ObservationSdk, TriggerSdk};
use crate::validation;
use crate::widget::Widget;

/// Metadata, validation and dispatch surface shared by all factories.
#[async_trait]
pub trait ComponentFactory: Send + Sync {
    /// Unique component-type id within its kind (e.g. `"gps-mobile-observation"`).
    fn id(&self) -> &str;

    /// Human-readable title.
    fn title(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Ordered configuration field declarations. Default: none.
    fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
        Vec::new()
    }

    /// Seed values for a not-yet-configured instance. Default: empty.
    fn default_properties(&self) -> ComponentProperties {
        ComponentProperties::new()
    }

    /// Run the validation engine over [`property_descriptors`] and hand the
    /// bag back unchanged on success. Validation is pass-through, never
    /// transforming.
    ///
    /// [`property_descriptors`]: ComponentFactory::property_descriptors
    fn validate(
        &self,
        properties: ComponentProperties,
    ) -> Result<ComponentProperties, ComponentError> {
        let report = validation::validate(&self.property_descriptors(), &properties);
        if report.is_valid() {
            Ok(properties)
        } else {
            Err(ComponentError::ConfigurationInvalid(report))
        }
    }

    /// Optional configuration-UI widget. Default: none.
    fn widget(&self) -> Option<Widget> {
        None
    }

    fn has_widget(&self) -> bool {
        self.widget().is_some()
    }

    /// Module-specific sub-API. A factory may service arbitrary extra
    /// routes here (remote listings, paging) without the host defining a
    /// protocol for them. Default: every route is unknown.
    async fn handle_module_call(
        &self,
        route: &str,
        identity: &Identity,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, ComponentError> {
        let _ = (identity, payload);
        Err(ComponentError::NotFound(format!("module route '{route}'")))
    }
}

/// Constructor for observation components.
///
/// `create` MUST validate before constructing; a factory never builds a
/// component from an unvalidated bag.
pub trait ObservationFactory: ComponentFactory {
    fn create(
        &self,
        sdk: Arc<dyn ObservationSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Observation>, ComponentError>;
}

/// Constructor for trigger components.
pub trait TriggerFactory: ComponentFactory {
    fn create(
        &self,
        sdk: Arc<dyn TriggerSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Trigger>, ComponentError>;
}

/// Constructor for action components.
pub trait ActionFactory: ComponentFactory {
    fn create(
        &self,
        sdk: Arc<dyn ActionSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Action>, ComponentError>;
}
