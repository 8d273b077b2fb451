use std::path::PathBuf;

use caredesk_client_core::auth::AuthIdentity;
use thiserror::Error;

pub const ENV_API_BASE_URL: &str = "CAREDESK_API_BASE_URL";
pub const ENV_SIGNIN_URL: &str = "CAREDESK_STAFF_SIGNIN_URL";
pub const ENV_ACCESS_TOKEN: &str = "CAREDESK_ACCESS_TOKEN";
pub const ENV_STATE_FILE: &str = "CAREDESK_STATE_FILE";
pub const ENV_SUBJECT_ID: &str = "CAREDESK_SUBJECT_ID";
pub const ENV_EMAIL: &str = "CAREDESK_EMAIL";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8787";
pub const DEFAULT_SIGNIN_URL: &str = "https://staff.caredesk.example/sign-in";
pub const DEFAULT_STATE_FILE: &str = "caredesk-state.json";

#[derive(Debug, Error)]
pub enum ShellConfigError {
    #[error("invalid CAREDESK_API_BASE_URL: {0}")]
    InvalidApiBaseUrl(String),
    #[error("invalid CAREDESK_STAFF_SIGNIN_URL: {0}")]
    InvalidSigninUrl(String),
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub api_base_url: String,
    pub signin_url: String,
    pub access_token: String,
    pub state_file: PathBuf,
    /// Signed-in identity fed to the static provider; absent means the
    /// shell behaves as signed out and the guard redirects.
    pub identity: Option<AuthIdentity>,
}

impl ShellConfig {
    pub fn from_env() -> Result<Self, ShellConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ShellConfigError> {
        let api_base_url = normalize_url(lookup(ENV_API_BASE_URL), DEFAULT_API_BASE_URL)
            .map_err(ShellConfigError::InvalidApiBaseUrl)?;
        let signin_url = normalize_url(lookup(ENV_SIGNIN_URL), DEFAULT_SIGNIN_URL)
            .map_err(ShellConfigError::InvalidSigninUrl)?;
        let access_token = non_empty(lookup(ENV_ACCESS_TOKEN)).unwrap_or_default();
        let state_file = non_empty(lookup(ENV_STATE_FILE))
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);

        let identity = match (
            non_empty(lookup(ENV_SUBJECT_ID)),
            non_empty(lookup(ENV_EMAIL)),
        ) {
            (Some(subject_id), Some(email)) => Some(AuthIdentity { subject_id, email }),
            _ => None,
        };

        Ok(Self {
            api_base_url,
            signin_url,
            access_token,
            state_file,
            identity,
        })
    }
}

fn normalize_url(raw: Option<String>, default: &str) -> Result<String, String> {
    let value = raw
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string());
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(value)
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ShellConfig::from_lookup(|_| None).expect("config");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.signin_url, DEFAULT_SIGNIN_URL);
        assert_eq!(config.access_token, "");
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert!(config.identity.is_none());
    }

    #[test]
    fn env_overrides_are_trimmed_and_normalized() {
        let values = HashMap::from([
            (ENV_API_BASE_URL, " https://support.caredesk.example/ "),
            (ENV_SUBJECT_ID, "sup-1"),
            (ENV_EMAIL, " sup@caredesk.example "),
        ]);
        let config = ShellConfig::from_lookup(|key| values.get(key).map(ToString::to_string))
            .expect("config");
        assert_eq!(config.api_base_url, "https://support.caredesk.example");
        let identity = config.identity.expect("identity");
        assert_eq!(identity.subject_id, "sup-1");
        assert_eq!(identity.email, "sup@caredesk.example");
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let values = HashMap::from([(ENV_API_BASE_URL, "support.caredesk.example")]);
        let error = ShellConfig::from_lookup(|key| values.get(key).map(ToString::to_string))
            .expect_err("invalid url should fail");
        assert!(matches!(error, ShellConfigError::InvalidApiBaseUrl(_)));
    }

    #[test]
    fn identity_requires_both_subject_and_email() {
        let values = HashMap::from([(ENV_SUBJECT_ID, "sup-1")]);
        let config = ShellConfig::from_lookup(|key| values.get(key).map(ToString::to_string))
            .expect("config");
        assert!(config.identity.is_none());
    }
}
