#![cfg_attr(test, allow(clippy::expect_used))]
#![allow(clippy::print_stdout)]

//! Headless shell: resolves config from the environment, runs the session
//! guard, bootstraps the dashboard and prints one section as text. The
//! browser chrome this stands in for is an external concern.

mod config;
mod file_store;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use caredesk_api::{PatientQuery, SupportApiClient, SupportApiConfig};
use caredesk_app::{Dashboard, render::render_patient_result};
use caredesk_client_core::auth::{
    AuthIdentity, AuthStateChange, GuardConfig, IdentityError, IdentityProvider, SessionOutcome,
    establish_session, sign_out_and_clear,
};
use caredesk_client_core::store::{KEY_ROLE_TAG, KeyValueStore};
use clap::Parser;

use crate::config::ShellConfig;
use crate::file_store::FileBackedStore;

#[derive(Parser)]
#[command(name = "caredesk-shell")]
#[command(about = "Headless patient-supervisor support desk shell")]
struct ShellCli {
    /// Dashboard section to open after bootstrap
    #[arg(long, default_value = "overview")]
    section: String,
    /// Search for a patient by email after bootstrap
    #[arg(long)]
    search_email: Option<String>,
    /// Seed the stored staff role tag before the guard runs
    #[arg(long)]
    role: Option<String>,
    /// Sign out, clear stored credentials and print the sign-in location
    #[arg(long)]
    logout: bool,
}

/// Identity provider fed entirely by shell configuration. Stands in for the
/// hosted provider's auth-state stream with a single notification.
struct StaticIdentityProvider {
    identity: Option<AuthIdentity>,
    token: String,
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn wait_auth_state(&self) -> AuthStateChange {
        match &self.identity {
            Some(identity) => AuthStateChange::SignedIn(identity.clone()),
            None => AuthStateChange::SignedOut,
        }
    }

    async fn issue_access_token(&self) -> Result<String, IdentityError> {
        if self.token.trim().is_empty() {
            return Err(IdentityError::TokenIssuance(
                "no access token configured".to_string(),
            ));
        }
        Ok(self.token.clone())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = ShellCli::parse();
    let shell_config = ShellConfig::from_env().context("shell configuration")?;

    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileBackedStore::open(&shell_config.state_file).context("opening state file")?,
    );
    if let Some(role) = &cli.role {
        store.set(KEY_ROLE_TAG, role);
    }

    let provider = StaticIdentityProvider {
        identity: shell_config.identity.clone(),
        token: shell_config.access_token.clone(),
    };
    let guard = GuardConfig::new(shell_config.signin_url.clone());

    if cli.logout {
        let location = sign_out_and_clear(&provider, store.as_ref(), &guard).await?;
        println!("signed out; sign in again at {location}");
        return Ok(());
    }

    let session = match establish_session(&provider, store.as_ref(), &guard).await? {
        SessionOutcome::Established(session) => session,
        SessionOutcome::Redirect { location, reason } => {
            println!("session denied ({}); redirecting to {location}", reason.label());
            return Ok(());
        }
    };

    let backend = Arc::new(SupportApiClient::new(SupportApiConfig::new(
        shell_config.api_base_url.clone(),
        session.access_token.clone(),
    ))?);
    let mut dashboard = Dashboard::new(backend, Arc::clone(&store), session);

    dashboard.bootstrap().await;
    dashboard.activate_section(&cli.section).await;

    if let Some(email) = cli.search_email {
        dashboard
            .search_patient(Instant::now(), PatientQuery::Email(email))
            .await;
    }

    println!("{} <{}>", dashboard.display_name(), dashboard.display_email());
    if let Some(count) = dashboard.ticket_badge() {
        println!("active tickets: {count}");
    }
    print!("{}", dashboard.render_active().to_text());
    if let Some(patient) = dashboard.search_result() {
        print!("{}", render_patient_result(patient).to_text());
    }
    for notice in dashboard.notices() {
        println!("[{}] {}", notice.severity.label(), notice.message);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::ShellCli;

    #[test]
    fn cli_defaults_to_the_overview_section() {
        let cli = ShellCli::try_parse_from(["caredesk-shell"]).expect("parse");
        assert_eq!(cli.section, "overview");
        assert!(cli.search_email.is_none());
        assert!(!cli.logout);
    }

    #[test]
    fn cli_accepts_section_and_search_flags() {
        let cli = ShellCli::try_parse_from([
            "caredesk-shell",
            "--section",
            "active-tickets",
            "--search-email",
            "ada.park@example.com",
            "--role",
            "patient_supervisor",
        ])
        .expect("parse");
        assert_eq!(cli.section, "active-tickets");
        assert_eq!(cli.search_email.as_deref(), Some("ada.park@example.com"));
        assert_eq!(cli.role.as_deref(), Some("patient_supervisor"));
    }
}
