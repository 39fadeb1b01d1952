//! Accelerometer observation.

use std::sync::Arc;

use async_trait::async_trait;

use fieldwork_component::{
    Component, ComponentError, ComponentFactory, ComponentProperties, Observation,
    ObservationFactory, ObservationSdk,
};

/// Platform-side handle for an accelerometer observation.
pub struct AccMobileObservation;

#[async_trait]
impl Component for AccMobileObservation {}

impl Observation for AccMobileObservation {}

pub struct AccMobileObservationFactory;

#[async_trait]
impl ComponentFactory for AccMobileObservationFactory {
    fn id(&self) -> &str {
        "acc-mobile-observation"
    }

    fn title(&self) -> &str {
        "Accelerometer Mobile"
    }

    fn description(&self) -> &str {
        "Collects accelerometer data from mobile phones.\n\
         The data is represented as: {x:number, y:number, z:number}"
    }
}

impl ObservationFactory for AccMobileObservationFactory {
    fn create(
        &self,
        _sdk: Arc<dyn ObservationSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Observation>, ComponentError> {
        self.validate(properties)?;
        Ok(Box::new(AccMobileObservation))
    }
}
