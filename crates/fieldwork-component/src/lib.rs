//! Study-component contract for the fieldwork platform.
//!
//! This crate defines the plugin contract between the fieldwork host and
//! third-party study components. A study component is an [`Observation`]
//! (a data source), a [`Trigger`] (an event condition evaluated by an
//! external scheduler), or an [`Action`] (something done to a participant).
//! The host never knows concrete component types; it only sees the traits
//! defined here.
//!
//! # Trait Overview
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`ComponentFactory`] | Metadata, property validation, widget and module-call surface of one component type |
//! | [`ObservationFactory`] / [`TriggerFactory`] / [`ActionFactory`] | Kind-specific constructors |
//! | [`Component`] | Activation lifecycle shared by all component instances |
//! | [`Observation`] / [`Trigger`] / [`Action`] | Kind-specific runtime behavior |
//! | [`PlatformSdk`] | Base capability handle bound to a (study, group, component) scope |
//! | [`ObservationSdk`] / [`TriggerSdk`] / [`ActionSdk`] | Kind-specific capability surfaces |
//!
//! # Configuration model
//!
//! A factory declares its configuration shape as an ordered list of
//! [`PropertyDescriptor`]s. Raw [`ComponentProperties`] submitted by a study
//! operator are checked by the validation engine ([`validation::validate`])
//! before any component is constructed; construction from unvalidated
//! properties is a contract violation.

pub mod component;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod identity;
pub mod properties;
pub mod sdk;
pub mod validation;
pub mod widget;

// Re-export core types at crate root for convenience.
pub use component::{
    Action, ActionParameter, Component, ComponentKind, Observation, Trigger, TriggerResult,
};
pub use descriptor::{PropertyDescriptor, ValueType, Visibility};
pub use error::ComponentError;
pub use factory::{ActionFactory, ComponentFactory, ObservationFactory, TriggerFactory};
pub use identity::Identity;
pub use properties::{ComponentProperties, PropertyError};
pub use sdk::{ActionSdk, ObservationSdk, Participant, ParticipantStatus, PlatformSdk, TriggerSdk};
pub use validation::{ConfigurationValidationReport, Severity, ValidationIssue};
pub use widget::Widget;
