//! Caller identity stamped on module calls.

use serde::{Deserialize, Serialize};

/// The user behind a module-specific call, as resolved by the host's
/// authentication layer. Components receive this read-only; they never
/// see raw credentials or claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Identity known only by email, the common case for module calls.
    pub fn from_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}
