//! Built-in observation components.
//!
//! # Observations
//!
//! - **GPS** ([`gps`]): positional data collected by the mobile app
//! - **Accelerometer** ([`accelerometer`]): motion data collected by the
//!   mobile app
//! - **External data** ([`external`]): third-party systems pushing data
//!   with per-participant API tokens
//! - **Web survey** ([`survey`]): questionnaires hosted on a remote survey
//!   service, with a module sub-API and a configuration widget
//!
//! All factories implement the contract from `fieldwork-component` and are
//! registered into a host registry via [`register_all`].

pub mod accelerometer;
pub mod external;
pub mod gps;
pub mod survey;

use std::sync::Arc;

use fieldwork_component::ComponentError;
use fieldwork_host::ComponentRegistryBuilder;

use survey::{SurveyClient, SurveyObservationFactory, SurveyServiceConfig};

pub use accelerometer::AccMobileObservationFactory;
pub use external::ExternalObservationFactory;
pub use gps::GpsMobileObservationFactory;

/// Register all built-in observation factories with the given builder.
///
/// The survey integration needs its service endpoint and credentials; the
/// other observations are configuration-free.
pub fn register_all(
    builder: ComponentRegistryBuilder,
    survey_config: SurveyServiceConfig,
) -> Result<ComponentRegistryBuilder, ComponentError> {
    let survey_client = Arc::new(SurveyClient::new(survey_config)?);
    Ok(builder
        .observation(Arc::new(GpsMobileObservationFactory))
        .observation(Arc::new(AccMobileObservationFactory))
        .observation(Arc::new(ExternalObservationFactory))
        .observation(Arc::new(SurveyObservationFactory::new(survey_client))))
}
