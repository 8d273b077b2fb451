use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::store::{KEY_ACCESS_TOKEN, KEY_ROLE_TAG, KeyValueStore};

/// Role tag a staff member must carry to operate this dashboard.
pub const REQUIRED_ROLE: &str = "patient_supervisor";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity_token_issuance_failed:{0}")]
    TokenIssuance(String),
    #[error("identity_sign_out_failed:{0}")]
    SignOut(String),
}

/// Authenticated identity as reported by the external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub subject_id: String,
    pub email: String,
}

/// One authentication-state notification from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStateChange {
    SignedIn(AuthIdentity),
    SignedOut,
}

/// Established staff session held for the lifetime of one shell instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSession {
    pub subject_id: String,
    pub email: String,
    pub role: String,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeniedReason {
    NotSignedIn,
    RoleMissing,
    RoleMismatch { found: String },
}

impl DeniedReason {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::NotSignedIn => "not signed in".to_string(),
            Self::RoleMissing => "no role tag stored".to_string(),
            Self::RoleMismatch { found } => format!("role mismatch ({found})"),
        }
    }
}

/// Exactly one of these per shell instance: a session, or a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Established(StaffSession),
    Redirect { location: String, reason: DeniedReason },
}

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub required_role: String,
    pub signin_url: String,
}

impl GuardConfig {
    #[must_use]
    pub fn new(signin_url: impl Into<String>) -> Self {
        Self {
            required_role: REQUIRED_ROLE.to_string(),
            signin_url: signin_url.into(),
        }
    }
}

/// External identity provider seam.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves once with the provider's current authentication state.
    async fn wait_auth_state(&self) -> AuthStateChange;
    /// Mints a fresh access token for the signed-in identity.
    async fn issue_access_token(&self) -> Result<String, IdentityError>;
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Gate for every dashboard bootstrap. Fails closed: anything short of a
/// signed-in identity carrying the required role tag yields a redirect and
/// leaves the stored token untouched.
pub async fn establish_session(
    provider: &dyn IdentityProvider,
    store: &dyn KeyValueStore,
    config: &GuardConfig,
) -> Result<SessionOutcome, IdentityError> {
    let identity = match provider.wait_auth_state().await {
        AuthStateChange::SignedIn(identity) => identity,
        AuthStateChange::SignedOut => {
            tracing::warn!("no authenticated identity, redirecting to staff sign-in");
            return Ok(SessionOutcome::Redirect {
                location: config.signin_url.clone(),
                reason: DeniedReason::NotSignedIn,
            });
        }
    };

    let role = match store.get(KEY_ROLE_TAG) {
        Some(role) if role == config.required_role => role,
        Some(found) => {
            tracing::error!(found = %found, required = %config.required_role, "staff role mismatch");
            return Ok(SessionOutcome::Redirect {
                location: config.signin_url.clone(),
                reason: DeniedReason::RoleMismatch { found },
            });
        }
        None => {
            tracing::error!(required = %config.required_role, "no staff role tag stored");
            return Ok(SessionOutcome::Redirect {
                location: config.signin_url.clone(),
                reason: DeniedReason::RoleMissing,
            });
        }
    };

    let access_token = provider.issue_access_token().await?;
    store.set(KEY_ACCESS_TOKEN, &access_token);
    tracing::debug!(subject_id = %identity.subject_id, "staff session established");

    Ok(SessionOutcome::Established(StaffSession {
        subject_id: identity.subject_id,
        email: identity.email,
        role,
        access_token,
    }))
}

/// Signs out at the provider, clears the stored role and token, and returns
/// the sign-in location the shell should send the user to.
pub async fn sign_out_and_clear(
    provider: &dyn IdentityProvider,
    store: &dyn KeyValueStore,
    config: &GuardConfig,
) -> Result<String, IdentityError> {
    provider.sign_out().await?;
    store.remove(KEY_ACCESS_TOKEN);
    store.remove(KEY_ROLE_TAG);
    Ok(config.signin_url.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::store::InMemoryStore;

    const SIGNIN_URL: &str = "https://staff.caredesk.example/sign-in";

    struct FakeProvider {
        state: AuthStateChange,
        token_requests: AtomicUsize,
    }

    impl FakeProvider {
        fn signed_in() -> Self {
            Self {
                state: AuthStateChange::SignedIn(AuthIdentity {
                    subject_id: "sup-1".to_string(),
                    email: "sup@caredesk.example".to_string(),
                }),
                token_requests: AtomicUsize::new(0),
            }
        }

        fn signed_out() -> Self {
            Self {
                state: AuthStateChange::SignedOut,
                token_requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn wait_auth_state(&self) -> AuthStateChange {
            self.state.clone()
        }

        async fn issue_access_token(&self) -> Result<String, IdentityError> {
            self.token_requests.fetch_add(1, Ordering::SeqCst);
            Ok("token-abc".to_string())
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn signed_out_identity_redirects_without_touching_the_store() {
        let provider = FakeProvider::signed_out();
        let store = InMemoryStore::new();
        let config = GuardConfig::new(SIGNIN_URL);

        let outcome = establish_session(&provider, &store, &config)
            .await
            .expect("guard outcome");

        assert_eq!(
            outcome,
            SessionOutcome::Redirect {
                location: SIGNIN_URL.to_string(),
                reason: DeniedReason::NotSignedIn,
            }
        );
        assert_eq!(provider.token_requests.load(Ordering::SeqCst), 0);
        assert_eq!(store.get(KEY_ACCESS_TOKEN), None);
    }

    #[tokio::test]
    async fn wrong_role_fails_closed_before_any_token_is_minted() {
        let provider = FakeProvider::signed_in();
        let store = InMemoryStore::new();
        store.set(KEY_ROLE_TAG, "front_desk");
        let config = GuardConfig::new(SIGNIN_URL);

        let outcome = establish_session(&provider, &store, &config)
            .await
            .expect("guard outcome");

        assert_eq!(
            outcome,
            SessionOutcome::Redirect {
                location: SIGNIN_URL.to_string(),
                reason: DeniedReason::RoleMismatch {
                    found: "front_desk".to_string()
                },
            }
        );
        assert_eq!(provider.token_requests.load(Ordering::SeqCst), 0);
        assert_eq!(store.get(KEY_ACCESS_TOKEN), None);
    }

    #[tokio::test]
    async fn missing_role_tag_redirects() {
        let provider = FakeProvider::signed_in();
        let store = InMemoryStore::new();
        let config = GuardConfig::new(SIGNIN_URL);

        let outcome = establish_session(&provider, &store, &config)
            .await
            .expect("guard outcome");

        assert!(matches!(
            outcome,
            SessionOutcome::Redirect {
                reason: DeniedReason::RoleMissing,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn matching_role_establishes_session_and_persists_the_token() {
        let provider = FakeProvider::signed_in();
        let store = InMemoryStore::new();
        store.set(KEY_ROLE_TAG, REQUIRED_ROLE);
        let config = GuardConfig::new(SIGNIN_URL);

        let outcome = establish_session(&provider, &store, &config)
            .await
            .expect("guard outcome");

        let SessionOutcome::Established(session) = outcome else {
            panic!("expected established session, got {outcome:?}");
        };
        assert_eq!(session.subject_id, "sup-1");
        assert_eq!(session.email, "sup@caredesk.example");
        assert_eq!(session.role, REQUIRED_ROLE);
        assert_eq!(session.access_token, "token-abc");
        assert_eq!(provider.token_requests.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(KEY_ACCESS_TOKEN), Some("token-abc".to_string()));
    }

    #[tokio::test]
    async fn sign_out_clears_role_and_token() {
        let provider = FakeProvider::signed_in();
        let store = InMemoryStore::new();
        store.set(KEY_ROLE_TAG, REQUIRED_ROLE);
        store.set(KEY_ACCESS_TOKEN, "token-abc");
        let config = GuardConfig::new(SIGNIN_URL);

        let location = sign_out_and_clear(&provider, &store, &config)
            .await
            .expect("sign out");

        assert_eq!(location, SIGNIN_URL);
        assert_eq!(store.get(KEY_ROLE_TAG), None);
        assert_eq!(store.get(KEY_ACCESS_TOKEN), None);
    }
}
