//! GPS observation.
//!
//! The mobile app samples the position sensor and delivers records through
//! the platform data sink; the platform-side instance is passive.

use std::sync::Arc;

use async_trait::async_trait;

use fieldwork_component::{
    Component, ComponentError, ComponentFactory, ComponentProperties, Observation,
    ObservationFactory, ObservationSdk,
};

/// Platform-side handle for a GPS observation. Carries no state; the data
/// arrives from the device.
pub struct GpsMobileObservation;

#[async_trait]
impl Component for GpsMobileObservation {}

impl Observation for GpsMobileObservation {}

pub struct GpsMobileObservationFactory;

#[async_trait]
impl ComponentFactory for GpsMobileObservationFactory {
    fn id(&self) -> &str {
        "gps-mobile-observation"
    }

    fn title(&self) -> &str {
        "GPS Mobile"
    }

    fn description(&self) -> &str {
        "Collects positional data from mobile phones.\n\
         The data is represented as: {lat:number, lon:number, alt:number}"
    }
}

impl ObservationFactory for GpsMobileObservationFactory {
    fn create(
        &self,
        _sdk: Arc<dyn ObservationSdk>,
        properties: ComponentProperties,
    ) -> Result<Box<dyn Observation>, ComponentError> {
        self.validate(properties)?;
        Ok(Box::new(GpsMobileObservation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata() {
        let factory = GpsMobileObservationFactory;
        assert_eq!(factory.id(), "gps-mobile-observation");
        assert!(factory.property_descriptors().is_empty());
        assert!(factory.default_properties().is_empty());
        assert!(!factory.has_widget());
    }

    #[test]
    fn accepts_any_properties() {
        let factory = GpsMobileObservationFactory;
        assert!(factory.validate(ComponentProperties::new()).is_ok());
    }
}
