//! Per-run identity and credentials.
//!
//! A [`RunSession`] is built once per invocation and handed by reference to
//! every stage that talks to the catalog. Nothing in the crate reads
//! credentials from process-global state.

use secrecy::{ExposeSecret, SecretString};

use crate::config::CredentialsConfig;
use crate::error::{ConfigError, ListkitError};
use crate::secrets::{has_secret_source, resolve_secret};

pub struct RunSession {
    /// Correlates log lines of one invocation.
    pub run_id: String,
    pub shop_id: String,
    pub user_name: Option<String>,
    credential: SecretString,
    api_key: SecretString,
}

impl std::fmt::Debug for RunSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunSession")
            .field("run_id", &self.run_id)
            .field("shop_id", &self.shop_id)
            .field("user_name", &self.user_name)
            .field("credential", &"****")
            .field("api_key", &"****")
            .finish()
    }
}

impl RunSession {
    pub fn new(credential: SecretString, api_key: SecretString, shop_id: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            shop_id: shop_id.into(),
            user_name: None,
            credential,
            api_key,
        }
    }

    /// Resolves the credential and API key from their configured sources.
    pub fn from_config(credentials: &CredentialsConfig) -> Result<Self, ListkitError> {
        if !has_secret_source(
            credentials.access_token.as_deref(),
            credentials.access_token_file.as_deref(),
            credentials.access_token_env.as_deref(),
        ) {
            return Err(ConfigError::MissingSetting {
                name: "credentials.access_token".to_string(),
            }
            .into());
        }
        let credential = resolve_secret(
            credentials.access_token.as_deref(),
            credentials.access_token_file.as_deref(),
            credentials.access_token_env.as_deref(),
        )?;
        let api_key = resolve_secret(
            credentials.api_key.as_deref(),
            credentials.api_key_file.as_deref(),
            credentials.api_key_env.as_deref(),
        )?;
        let shop_id = credentials
            .shop_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingSetting {
                name: "credentials.shop_id".to_string(),
            })?;

        let mut session = Self::new(credential, api_key, shop_id);
        session.user_name = credentials.user_name.clone();
        Ok(session)
    }

    pub fn credential(&self) -> &SecretString {
        &self.credential
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// Numeric user id embedded in the access token (`<user_id>.<opaque>`).
    pub fn user_id(&self) -> Option<String> {
        let token = self.credential.expose_secret();
        let (prefix, _) = token.split_once('.')?;
        if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
            Some(prefix.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> RunSession {
        RunSession::new(
            SecretString::from(token.to_string()),
            SecretString::from("key".to_string()),
            "shop-1",
        )
    }

    #[test]
    fn test_user_id_from_token_prefix() {
        assert_eq!(session("12345678.abcDEF").user_id().as_deref(), Some("12345678"));
    }

    #[test]
    fn test_user_id_absent_for_opaque_token() {
        assert_eq!(session("opaque-token").user_id(), None);
        assert_eq!(session("abc.def").user_id(), None);
        assert_eq!(session(".def").user_id(), None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", session("12345678.secret-part"));
        assert!(!rendered.contains("secret-part"));
        assert!(rendered.contains("shop-1"));
    }

    #[test]
    fn test_from_config_requires_shop_id() {
        let credentials = CredentialsConfig {
            access_token: Some("1.token".to_string()),
            api_key: Some("key".to_string()),
            ..CredentialsConfig::default()
        };

        let result = RunSession::from_config(&credentials);
        assert!(matches!(
            result,
            Err(ListkitError::Config(ConfigError::MissingSetting { .. }))
        ));
    }

    #[test]
    fn test_from_config_names_missing_token_source() {
        let credentials = CredentialsConfig {
            access_token_env: None,
            shop_id: Some("shop-9".to_string()),
            ..CredentialsConfig::default()
        };

        match RunSession::from_config(&credentials) {
            Err(ListkitError::Config(ConfigError::MissingSetting { name })) => {
                assert_eq!(name, "credentials.access_token")
            }
            other => panic!("Expected MissingSetting, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_resolves_direct_values() {
        let credentials = CredentialsConfig {
            access_token: Some("77.token".to_string()),
            api_key: Some("key".to_string()),
            shop_id: Some("shop-9".to_string()),
            user_name: Some("Ada".to_string()),
            ..CredentialsConfig::default()
        };

        let session = RunSession::from_config(&credentials).unwrap();
        assert_eq!(session.shop_id, "shop-9");
        assert_eq!(session.user_name.as_deref(), Some("Ada"));
        assert_eq!(session.api_key().expose_secret(), "key");
        assert_eq!(session.user_id().as_deref(), Some("77"));
    }
}
