#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

//! Client-side session guard and storage seams for the supervisor shell.
//!
//! The identity provider and the persistent key-value store are external
//! collaborators; this crate owns the trait seams for both plus the
//! fail-closed role check that gates every dashboard bootstrap.

pub mod auth;
pub mod store;

pub use auth::{
    AuthIdentity, AuthStateChange, DeniedReason, GuardConfig, IdentityError, IdentityProvider,
    REQUIRED_ROLE, SessionOutcome, StaffSession, establish_session, sign_out_and_clear,
};
pub use store::{InMemoryStore, KEY_ACCESS_TOKEN, KEY_ROLE_TAG, KEY_SETTINGS, KeyValueStore};
