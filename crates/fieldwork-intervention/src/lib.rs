//! Built-in trigger and action components.
//!
//! Interventions pair a trigger (when) with actions (what):
//!
//! - **Scheduled trigger** ([`trigger::scheduled`]): fires on a cron
//!   schedule evaluated by the external scheduler
//! - **Logger action** ([`action::logger`]): writes the action parameter
//!   to the log, useful for wiring checks
//! - **Push-notification action** ([`action::push`]): sends a configured
//!   title/message to the participant's device

pub mod action;
pub mod trigger;

use std::sync::Arc;

use fieldwork_host::ComponentRegistryBuilder;

pub use action::logger::LoggerActionFactory;
pub use action::push::PushNotificationActionFactory;
pub use trigger::scheduled::ScheduledTriggerFactory;

/// Register all built-in trigger and action factories.
pub fn register_all(builder: ComponentRegistryBuilder) -> ComponentRegistryBuilder {
    builder
        .trigger(Arc::new(ScheduledTriggerFactory))
        .action(Arc::new(LoggerActionFactory))
        .action(Arc::new(PushNotificationActionFactory))
}
