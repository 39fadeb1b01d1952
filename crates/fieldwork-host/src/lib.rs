//! Host runtime for fieldwork study components.
//!
//! The host side of the plugin contract defined in `fieldwork-component`:
//!
//! - [`registry`] -- the process-wide factory directory and the dynamic
//!   dispatch surface a thin HTTP layer consumes (listing, validation,
//!   module calls, widget delivery).
//! - [`platform`] -- abstract contracts for the external collaborators
//!   (data sink, property store, participant repository, push sender).
//! - [`memory`] -- in-memory collaborator implementations for tests and
//!   embedding.
//! - [`sdk`] -- the [`PlatformHarness`] that mints immutable, scoped
//!   capability objects per component activation.
//! - [`auth`] -- claim-to-identity mapping for module calls.
//! - [`config`] -- TOML host configuration, including opaque per-factory
//!   sections.
//! - [`activation`] -- the component lifecycle the host owns: constructing
//!   validated components with fresh capabilities when a study goes live
//!   and tearing them down again.
//!
//! The registry is built once at startup and never mutated afterwards, so
//! the whole read path is lock-free.

pub mod activation;
pub mod auth;
pub mod config;
pub mod memory;
pub mod platform;
pub mod registry;
pub mod sdk;

pub use activation::{ActiveStudy, ComponentInstance, activate_study};
pub use auth::{AuthenticatedUser, AuthenticationService, Claims, PlatformRole};
pub use config::{AuthConfig, ConfigError, HostConfig};
pub use memory::{InMemoryPlatform, SentNotification};
pub use platform::{
    DataPoint, DataPointSink, ParticipantPropertyStore, ParticipantRepository,
    PushNotificationSender,
};
pub use registry::{
    ComponentRegistry, ComponentRegistryBuilder, FactoryMetadata, ValidationItem,
    ValidationOutcome,
};
pub use sdk::{ComponentScope, PlatformHarness};
