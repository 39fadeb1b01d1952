//! Claim-to-identity mapping.
//!
//! The platform trusts an external OpenID provider; this module only maps
//! verified token claims onto platform roles and the [`Identity`] stamped
//! on module calls. The role mapping is configured as platform-role →
//! provider-role-names and inverted once at startup.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use fieldwork_component::Identity;

/// Platform-wide roles a user can hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlatformRole {
    Administrator,
    Operator,
    Viewer,
}

/// Claims extracted from a verified access token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A resolved platform user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub subject: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub organization: Option<String>,
    pub roles: BTreeSet<PlatformRole>,
}

impl AuthenticatedUser {
    pub fn anonymous() -> Self {
        Self {
            subject: None,
            name: None,
            email: None,
            organization: None,
            roles: BTreeSet::new(),
        }
    }

    pub fn has_role(&self, role: PlatformRole) -> bool {
        self.roles.contains(&role)
    }

    /// The identity stamped on module calls on this user's behalf.
    pub fn identity(&self) -> Identity {
        Identity {
            subject: self.subject.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Maps provider role names to platform roles.
pub struct AuthenticationService {
    role_mapping: HashMap<String, BTreeSet<PlatformRole>>,
}

impl AuthenticationService {
    /// Build from the configured platform-role → provider-role-names
    /// table, inverting it for lookup.
    pub fn new(global_roles: &HashMap<PlatformRole, Vec<String>>) -> Self {
        let mut role_mapping: HashMap<String, BTreeSet<PlatformRole>> = HashMap::new();
        for (&platform_role, provider_roles) in global_roles {
            for provider_role in provider_roles {
                role_mapping
                    .entry(provider_role.clone())
                    .or_default()
                    .insert(platform_role);
            }
        }
        Self { role_mapping }
    }

    /// Resolve a user from verified claims. An unverified email is
    /// dropped; unknown provider roles are ignored.
    pub fn authenticate(&self, claims: &Claims) -> AuthenticatedUser {
        let roles = claims
            .roles
            .iter()
            .filter_map(|role| self.role_mapping.get(role))
            .flatten()
            .copied()
            .collect();
        AuthenticatedUser {
            subject: claims.subject.clone(),
            name: claims.name.clone(),
            email: claims.email_verified.then(|| claims.email.clone()).flatten(),
            organization: claims.organization.clone(),
            roles,
        }
    }
}
