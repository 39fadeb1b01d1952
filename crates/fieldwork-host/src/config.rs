//! Host configuration.
//!
//! TOML-backed. The `[components.<factory-id>]` sections are opaque to the
//! host; each section is handed to the factory registration helper of the
//! crate that owns the id, which deserializes it into its own config type
//! (e.g. the survey integration's endpoint and credentials).

use std::collections::HashMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::auth::PlatformRole;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid component section '{section}': {message}")]
    Section { section: String, message: String },
}

/// Role-mapping configuration: platform role → provider role names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub global_roles: HashMap<PlatformRole, Vec<String>>,
}

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub auth: AuthConfig,

    /// Opaque per-factory configuration sections, keyed by factory id.
    #[serde(default)]
    pub components: HashMap<String, toml::Value>,
}

impl HostConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Deserialize the section for one factory id, or its default when no
    /// section is present.
    pub fn component<T>(&self, id: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        match self.components.get(id) {
            None => Ok(T::default()),
            Some(section) => {
                section
                    .clone()
                    .try_into()
                    .map_err(|err: toml::de::Error| ConfigError::Section {
                        section: id.to_string(),
                        message: err.to_string(),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct SurveySection {
        #[serde(default)]
        base_url: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    }

    #[test]
    fn parses_auth_and_component_sections() {
        let config = HostConfig::from_toml_str(
            r#"
            [auth.global_roles]
            administrator = ["platform-admin"]
            operator = ["study-ops"]

            [components.web-survey-observation]
            base_url = "https://survey.example.org/rpc"
            timeout_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(
            config.auth.global_roles[&PlatformRole::Administrator],
            vec!["platform-admin"]
        );

        let section: SurveySection = config.component("web-survey-observation").unwrap();
        assert_eq!(section.base_url, "https://survey.example.org/rpc");
        assert_eq!(section.timeout_secs, Some(10));
    }

    #[test]
    fn missing_section_yields_default() {
        let config = HostConfig::from_toml_str("").unwrap();
        let section: SurveySection = config.component("web-survey-observation").unwrap();
        assert_eq!(section, SurveySection::default());
    }

    #[test]
    fn malformed_section_names_the_factory() {
        let config = HostConfig::from_toml_str(
            r#"
            [components.web-survey-observation]
            timeout_secs = "soon"
            "#,
        )
        .unwrap();
        let err = config
            .component::<SurveySection>("web-survey-observation")
            .unwrap_err();
        match err {
            ConfigError::Section { section, .. } => {
                assert_eq!(section, "web-survey-observation");
            }
            other => panic!("expected Section error, got: {other}"),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = HostConfig::from_toml_str("not [valid").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
