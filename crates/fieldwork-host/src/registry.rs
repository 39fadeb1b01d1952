//! Component registry and dynamic dispatch.
//!
//! The registry is the process-wide directory mapping (kind, id) to a
//! factory. It is assembled once at startup through
//! [`ComponentRegistryBuilder`] and read-only afterwards, so concurrent
//! request handlers share it without locking. Dispatch adds no business
//! logic of its own: it resolves the factory and delegates, with unknown
//! (kind, id) pairs resolving to `NotFound` rather than failing the
//! caller.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use fieldwork_component::{
    ActionFactory, ComponentError, ComponentFactory, ComponentKind, ComponentProperties, Identity,
    ObservationFactory, PropertyDescriptor, TriggerFactory, ValidationIssue,
};

/// Presentation metadata for one registered factory.
#[derive(Debug, Clone, Serialize)]
pub struct FactoryMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub properties: Vec<PropertyDescriptor>,
    pub default_properties: ComponentProperties,
    pub has_widget: bool,
}

impl FactoryMetadata {
    fn of(factory: &dyn ComponentFactory) -> Self {
        Self {
            id: factory.id().into(),
            title: factory.title().into(),
            description: factory.description().into(),
            properties: factory.property_descriptors(),
            default_properties: factory.default_properties(),
            has_widget: factory.has_widget(),
        }
    }
}

/// One reported problem in a [`ValidationOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationItem {
    pub property: String,
    pub message: String,
}

impl From<&ValidationIssue> for ValidationItem {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            property: issue.property().into(),
            message: issue.message().into(),
        }
    }
}

/// Wire-shaped validation result for the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationItem>,
    pub warnings: Vec<ValidationItem>,
}

impl ValidationOutcome {
    fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn of(report: &fieldwork_component::ConfigurationValidationReport) -> Self {
        Self {
            valid: report.is_valid(),
            errors: report.errors().map(ValidationItem::from).collect(),
            warnings: report.warnings().map(ValidationItem::from).collect(),
        }
    }
}

/// Ordered factory table for one kind: registration order for listings,
/// hashed index for O(1) lookup.
struct FactoryTable<F: ?Sized> {
    order: Vec<Arc<F>>,
    index: HashMap<String, usize>,
}

impl<F: ?Sized> Default for FactoryTable<F> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<F: ?Sized> FactoryTable<F> {
    /// Insert, replacing an existing entry with the same id in place.
    fn insert(&mut self, id: String, factory: Arc<F>) {
        match self.index.get(&id) {
            Some(&position) => self.order[position] = factory,
            None => {
                self.index.insert(id, self.order.len());
                self.order.push(factory);
            }
        }
    }

    fn get(&self, id: &str) -> Option<&Arc<F>> {
        self.index.get(id).map(|&position| &self.order[position])
    }

    fn iter(&self) -> impl Iterator<Item = &Arc<F>> {
        self.order.iter()
    }
}

/// Builder for the immutable registry. Registering an id twice within a
/// kind replaces the earlier factory; ids are unique per kind by the
/// startup contract.
#[derive(Default)]
pub struct ComponentRegistryBuilder {
    observations: FactoryTable<dyn ObservationFactory>,
    triggers: FactoryTable<dyn TriggerFactory>,
    actions: FactoryTable<dyn ActionFactory>,
}

impl ComponentRegistryBuilder {
    pub fn observation(mut self, factory: Arc<dyn ObservationFactory>) -> Self {
        debug!(component = %factory.id(), kind = %ComponentKind::Observation, "registering factory");
        self.observations.insert(factory.id().into(), factory);
        self
    }

    pub fn trigger(mut self, factory: Arc<dyn TriggerFactory>) -> Self {
        debug!(component = %factory.id(), kind = %ComponentKind::Trigger, "registering factory");
        self.triggers.insert(factory.id().into(), factory);
        self
    }

    pub fn action(mut self, factory: Arc<dyn ActionFactory>) -> Self {
        debug!(component = %factory.id(), kind = %ComponentKind::Action, "registering factory");
        self.actions.insert(factory.id().into(), factory);
        self
    }

    pub fn build(self) -> ComponentRegistry {
        ComponentRegistry {
            observations: self.observations,
            triggers: self.triggers,
            actions: self.actions,
        }
    }
}

/// Process-wide directory of component factories, immutable after build.
pub struct ComponentRegistry {
    observations: FactoryTable<dyn ObservationFactory>,
    triggers: FactoryTable<dyn TriggerFactory>,
    actions: FactoryTable<dyn ActionFactory>,
}

impl ComponentRegistry {
    pub fn builder() -> ComponentRegistryBuilder {
        ComponentRegistryBuilder::default()
    }

    /// Resolve an observation factory for component activation.
    pub fn observation(&self, id: &str) -> Option<Arc<dyn ObservationFactory>> {
        self.observations.get(id).cloned()
    }

    pub fn trigger(&self, id: &str) -> Option<Arc<dyn TriggerFactory>> {
        self.triggers.get(id).cloned()
    }

    pub fn action(&self, id: &str) -> Option<Arc<dyn ActionFactory>> {
        self.actions.get(id).cloned()
    }

    /// Kind-generic resolution to the shared factory contract.
    fn base(&self, kind: ComponentKind, id: &str) -> Result<&dyn ComponentFactory, ComponentError> {
        let factory: Option<&dyn ComponentFactory> = match kind {
            ComponentKind::Observation => {
                self.observations.get(id).map(|f| f.as_ref() as &dyn ComponentFactory)
            }
            ComponentKind::Trigger => {
                self.triggers.get(id).map(|f| f.as_ref() as &dyn ComponentFactory)
            }
            ComponentKind::Action => {
                self.actions.get(id).map(|f| f.as_ref() as &dyn ComponentFactory)
            }
        };
        factory.ok_or_else(|| ComponentError::NotFound(format!("no {kind} component '{id}'")))
    }

    /// Metadata for every factory of `kind`, in registration order.
    pub fn list(&self, kind: ComponentKind) -> Vec<FactoryMetadata> {
        match kind {
            ComponentKind::Observation => self
                .observations
                .iter()
                .map(|f| FactoryMetadata::of(f.as_ref()))
                .collect(),
            ComponentKind::Trigger => self
                .triggers
                .iter()
                .map(|f| FactoryMetadata::of(f.as_ref()))
                .collect(),
            ComponentKind::Action => self
                .actions
                .iter()
                .map(|f| FactoryMetadata::of(f.as_ref()))
                .collect(),
        }
    }

    /// Validate a raw property payload against a factory's descriptors.
    ///
    /// Always yields an outcome for a resolved factory -- a malformed
    /// payload becomes a single-issue invalid outcome, never an error.
    pub fn dispatch_validate(
        &self,
        kind: ComponentKind,
        id: &str,
        raw: serde_json::Value,
    ) -> Result<ValidationOutcome, ComponentError> {
        let factory = self.base(kind, id)?;
        let properties = match ComponentProperties::from_value(raw) {
            Ok(properties) => properties,
            Err(err) => {
                let report = fieldwork_component::ConfigurationValidationReport::of(vec![
                    ValidationIssue::error(err.property(), err.to_string()),
                ]);
                return Ok(ValidationOutcome::of(&report));
            }
        };
        match factory.validate(properties) {
            Ok(_) => Ok(ValidationOutcome::valid()),
            Err(ComponentError::ConfigurationInvalid(report)) => Ok(ValidationOutcome::of(&report)),
            Err(other) => Err(other),
        }
    }

    /// Forward a module-specific call to the factory's own handler.
    pub async fn dispatch_module_call(
        &self,
        kind: ComponentKind,
        id: &str,
        route: &str,
        identity: &Identity,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, ComponentError> {
        let factory = self.base(kind, id)?;
        debug!(component = %id, %kind, %route, "dispatching module call");
        factory.handle_module_call(route, identity, payload).await
    }

    /// Deliver a factory's widget script, with the custom-element
    /// registration line appended.
    pub fn dispatch_widget(
        &self,
        kind: ComponentKind,
        id: &str,
    ) -> Result<String, ComponentError> {
        let factory = self.base(kind, id)?;
        let widget = factory
            .widget()
            .ok_or_else(|| ComponentError::NotFound(format!("component '{id}' has no widget")))?;
        Ok(format!(
            "{}\ncustomElements.define( 'webcomponent-{}', {} );",
            widget.script, id, widget.class_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fieldwork_component::{
        Action, ActionSdk, Component, ComponentFactory, Observation, ObservationSdk, Trigger,
        TriggerResult, TriggerSdk, Widget,
    };
    use serde_json::json;

    // -----------------------------------------------------------------------
    // Minimal factories spanning all three kinds
    // -----------------------------------------------------------------------

    struct NoopObservation;

    #[async_trait]
    impl Component for NoopObservation {}
    impl Observation for NoopObservation {}

    struct TitledObservationFactory {
        id: &'static str,
    }

    #[async_trait]
    impl ComponentFactory for TitledObservationFactory {
        fn id(&self) -> &str {
            self.id
        }
        fn title(&self) -> &str {
            "Titled Observation"
        }
        fn description(&self) -> &str {
            "Observation requiring a title"
        }
        fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
            vec![PropertyDescriptor::string("title").required(true)]
        }
        fn widget(&self) -> Option<Widget> {
            Some(Widget::new("TitledPicker", "class TitledPicker extends HTMLElement {}"))
        }
    }

    impl ObservationFactory for TitledObservationFactory {
        fn create(
            &self,
            _sdk: Arc<dyn ObservationSdk>,
            properties: ComponentProperties,
        ) -> Result<Box<dyn Observation>, ComponentError> {
            self.validate(properties)?;
            Ok(Box::new(NoopObservation))
        }
    }

    struct NoopTrigger;

    #[async_trait]
    impl Component for NoopTrigger {}

    #[async_trait]
    impl Trigger for NoopTrigger {
        async fn execute(
            &self,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> Result<TriggerResult, ComponentError> {
            Ok(TriggerResult::empty())
        }
    }

    struct PlainTriggerFactory;

    #[async_trait]
    impl ComponentFactory for PlainTriggerFactory {
        fn id(&self) -> &str {
            "plain-trigger"
        }
        fn title(&self) -> &str {
            "Plain Trigger"
        }
        fn description(&self) -> &str {
            "Trigger with no configuration"
        }
    }

    impl TriggerFactory for PlainTriggerFactory {
        fn create(
            &self,
            _sdk: Arc<dyn TriggerSdk>,
            properties: ComponentProperties,
        ) -> Result<Box<dyn Trigger>, ComponentError> {
            self.validate(properties)?;
            Ok(Box::new(NoopTrigger))
        }
    }

    struct NoopAction;

    #[async_trait]
    impl Component for NoopAction {}

    #[async_trait]
    impl Action for NoopAction {
        async fn execute(
            &self,
            _parameter: &fieldwork_component::ActionParameter,
        ) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    struct EchoActionFactory;

    #[async_trait]
    impl ComponentFactory for EchoActionFactory {
        fn id(&self) -> &str {
            "echo-action"
        }
        fn title(&self) -> &str {
            "Echo Action"
        }
        fn description(&self) -> &str {
            "Action whose module route echoes its payload"
        }

        async fn handle_module_call(
            &self,
            route: &str,
            identity: &Identity,
            payload: serde_json::Value,
        ) -> Result<serde_json::Value, ComponentError> {
            match route {
                "echo" => Ok(json!({
                    "caller": identity.email,
                    "payload": payload,
                })),
                _ => Err(ComponentError::NotFound(format!("module route '{route}'"))),
            }
        }
    }

    impl ActionFactory for EchoActionFactory {
        fn create(
            &self,
            _sdk: Arc<dyn ActionSdk>,
            properties: ComponentProperties,
        ) -> Result<Box<dyn Action>, ComponentError> {
            self.validate(properties)?;
            Ok(Box::new(NoopAction))
        }
    }

    fn registry() -> ComponentRegistry {
        ComponentRegistry::builder()
            .observation(Arc::new(TitledObservationFactory { id: "titled-observation" }))
            .observation(Arc::new(TitledObservationFactory { id: "second-observation" }))
            .trigger(Arc::new(PlainTriggerFactory))
            .action(Arc::new(EchoActionFactory))
            .build()
    }

    #[test]
    fn list_preserves_registration_order() {
        let registry = registry();
        let listed = registry.list(ComponentKind::Observation);
        let ids: Vec<&str> = listed.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["titled-observation", "second-observation"]);
        assert!(listed[0].has_widget);
        assert_eq!(listed[0].properties.len(), 1);
    }

    #[test]
    fn list_is_per_kind() {
        let registry = registry();
        assert_eq!(registry.list(ComponentKind::Trigger).len(), 1);
        assert_eq!(registry.list(ComponentKind::Action).len(), 1);
    }

    #[test]
    fn unknown_lookup_is_not_found_never_a_panic() {
        let registry = registry();
        assert!(registry.observation("missing").is_none());
        let err = registry
            .dispatch_validate(ComponentKind::Trigger, "missing", json!({}))
            .unwrap_err();
        match err {
            ComponentError::NotFound(message) => {
                assert!(message.contains("trigger"));
                assert!(message.contains("missing"));
            }
            other => panic!("expected NotFound, got: {other}"),
        }
    }

    #[test]
    fn kind_and_id_must_both_match() {
        let registry = registry();
        // Right id, wrong kind.
        assert!(
            registry
                .dispatch_validate(ComponentKind::Action, "titled-observation", json!({}))
                .is_err()
        );
    }

    #[test]
    fn dispatch_validate_reports_missing_required() {
        let registry = registry();
        let outcome = registry
            .dispatch_validate(ComponentKind::Observation, "titled-observation", json!({}))
            .unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].property, "title");
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn dispatch_validate_accepts_good_payloads() {
        let registry = registry();
        let outcome = registry
            .dispatch_validate(
                ComponentKind::Observation,
                "titled-observation",
                json!({ "title": "Sleep quality" }),
            )
            .unwrap();
        assert!(outcome.valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn dispatch_validate_converts_malformed_payloads_into_reports() {
        let registry = registry();
        for malformed in [json!([1, 2, 3]), json!("text"), json!(17)] {
            let outcome = registry
                .dispatch_validate(ComponentKind::Observation, "titled-observation", malformed)
                .unwrap();
            assert!(!outcome.valid);
            assert_eq!(outcome.errors.len(), 1);
            assert_eq!(outcome.errors[0].property, "properties");
        }
    }

    #[tokio::test]
    async fn dispatch_module_call_reaches_the_factory() {
        let registry = registry();
        let result = registry
            .dispatch_module_call(
                ComponentKind::Action,
                "echo-action",
                "echo",
                &Identity::from_email("ops@example.org"),
                json!({ "ping": true }),
            )
            .await
            .unwrap();
        assert_eq!(result["caller"], "ops@example.org");
        assert_eq!(result["payload"]["ping"], true);
    }

    #[tokio::test]
    async fn dispatch_module_call_unknown_route_is_not_found() {
        let registry = registry();
        let err = registry
            .dispatch_module_call(
                ComponentKind::Trigger,
                "plain-trigger",
                "surveys",
                &Identity::anonymous(),
                json!({}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ComponentError::NotFound(_)));
    }

    #[test]
    fn dispatch_widget_appends_registration_line() {
        let registry = registry();
        let script = registry
            .dispatch_widget(ComponentKind::Observation, "titled-observation")
            .unwrap();
        assert!(script.starts_with("class TitledPicker"));
        assert!(script.ends_with(
            "customElements.define( 'webcomponent-titled-observation', TitledPicker );"
        ));
    }

    #[test]
    fn dispatch_widget_without_widget_is_not_found() {
        let registry = registry();
        let err = registry
            .dispatch_widget(ComponentKind::Trigger, "plain-trigger")
            .unwrap_err();
        assert!(matches!(err, ComponentError::NotFound(_)));
    }

    #[test]
    fn registering_same_id_replaces_in_place() {
        let registry = ComponentRegistry::builder()
            .observation(Arc::new(TitledObservationFactory { id: "titled-observation" }))
            .observation(Arc::new(TitledObservationFactory { id: "titled-observation" }))
            .build();
        assert_eq!(registry.list(ComponentKind::Observation).len(), 1);
    }
}
