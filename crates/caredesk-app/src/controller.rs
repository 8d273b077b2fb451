use std::sync::Arc;
use std::time::Instant;

use caredesk_api::{
    CreateTicketRequest, KnowledgeArticle, Patient, PatientHistory, PatientQuery, SupervisorSettings,
    SupportApiError, SupportBackend, TicketPriority, TicketStatus, UpdatePatientRequest, fallback,
};
use caredesk_client_core::auth::{
    GuardConfig, IdentityError, IdentityProvider, StaffSession, sign_out_and_clear,
};
use caredesk_client_core::store::{KEY_SETTINGS, KeyValueStore};

use crate::notify::{Notice, NoticeBoard, Severity};
use crate::regions::{RegionData, Regions};
use crate::render::{self, Command, Node};
use crate::view::{Activation, LoadAction, SectionRouter, ViewName};

/// Staff role title shown in the header next to the session email.
pub const SUPERVISOR_DISPLAY_NAME: &str = "Patient Supervisor";

/// The session-gated dashboard. Construction requires an established
/// [`StaffSession`], so no dashboard state can exist without passing the
/// guard first.
pub struct Dashboard {
    backend: Arc<dyn SupportBackend>,
    store: Arc<dyn KeyValueStore>,
    session: StaffSession,
    router: SectionRouter,
    regions: Regions,
    notices: NoticeBoard,
    settings: SupervisorSettings,
    search_result: Option<Patient>,
    patient_history: Option<PatientHistory>,
    edit_target: Option<Patient>,
}

impl Dashboard {
    #[must_use]
    pub fn new(
        backend: Arc<dyn SupportBackend>,
        store: Arc<dyn KeyValueStore>,
        session: StaffSession,
    ) -> Self {
        let settings = load_settings(store.as_ref());
        Self {
            backend,
            store,
            session,
            router: SectionRouter::new(),
            regions: Regions::default(),
            notices: NoticeBoard::new(),
            settings,
            search_result: None,
            patient_history: None,
            edit_target: None,
        }
    }

    /// Initial load: overview stats and common issues are fetched
    /// concurrently, each inside its own fallback boundary, then the
    /// overview section becomes active.
    pub async fn bootstrap(&mut self) {
        let activation = self.router.activate(ViewName::Overview);
        let issues_generation = self.router.generation();
        let backend = Arc::clone(&self.backend);
        let (overview, issues) = tokio::join!(backend.overview(), backend.common_issues());
        let overview = unwrap_or_fallback("overview", overview, fallback::overview);
        let issues = unwrap_or_fallback("common-issues", issues, fallback::common_issues);
        self.regions.commit(
            activation.view,
            activation.generation,
            RegionData::Overview(overview),
        );
        self.regions.commit(
            ViewName::PatientIssues,
            issues_generation,
            RegionData::CommonIssues(issues),
        );
        tracing::debug!(email = %self.session.email, "dashboard bootstrapped");
    }

    /// Section switch from a raw section name. Unknown names are a no-op.
    pub async fn activate_section(&mut self, raw: &str) {
        let Some(view) = ViewName::parse(raw) else {
            tracing::debug!(section = raw, "ignoring unknown section");
            return;
        };
        self.activate(view).await;
    }

    pub async fn activate(&mut self, view: ViewName) {
        let activation = self.router.activate(view);
        self.run_load(activation).await;
    }

    async fn run_load(&mut self, activation: Activation) {
        let data = self.load_region_data(activation.action).await;
        self.regions
            .commit(activation.view, activation.generation, data);
    }

    /// Re-fetch one section after a mutation, at the current generation.
    async fn refresh_region(&mut self, view: ViewName) {
        let generation = self.router.generation();
        let data = self.load_region_data(view.load_action()).await;
        self.regions.commit(view, generation, data);
    }

    async fn load_region_data(&self, action: LoadAction) -> RegionData {
        match action {
            LoadAction::SearchSetupOnly => RegionData::SearchReady,
            LoadAction::OverviewStats => RegionData::Overview(unwrap_or_fallback(
                "overview",
                self.backend.overview().await,
                fallback::overview,
            )),
            LoadAction::ActiveTickets => RegionData::ActiveTickets(unwrap_or_fallback(
                "active-tickets",
                self.backend.active_tickets().await,
                fallback::active_tickets,
            )),
            LoadAction::ResolvedTickets => RegionData::ResolvedTickets(unwrap_or_fallback(
                "resolved-tickets",
                self.backend.resolved_tickets().await,
                fallback::resolved_tickets,
            )),
            LoadAction::CommonIssues => RegionData::CommonIssues(unwrap_or_fallback(
                "common-issues",
                self.backend.common_issues().await,
                fallback::common_issues,
            )),
            LoadAction::KnowledgeBase => RegionData::KnowledgeBase(
                unwrap_or_fallback(
                    "knowledge-base",
                    self.backend.knowledge_base().await,
                    fallback::knowledge_base,
                )
                .articles,
            ),
            LoadAction::Reports => RegionData::Reports(unwrap_or_fallback(
                "reports",
                self.backend.reports().await,
                fallback::reports,
            )),
        }
    }

    /// Patient lookup. Blank input never reaches the backend; lookup
    /// failures leave the previous result untouched.
    pub async fn search_patient(&mut self, now: Instant, query: PatientQuery) {
        if query.value().trim().is_empty() {
            self.notices
                .push(now, blank_query_message(&query), Severity::Error);
            return;
        }
        match self.backend.search_patient(&query).await {
            Ok(patient) => {
                self.search_result = Some(patient);
            }
            Err(error) => {
                tracing::warn!(field = query.field(), %error, "patient lookup failed");
                let message = if error.is_not_found() {
                    "Patient not found"
                } else {
                    "Error searching for patient"
                };
                self.notices.push(now, message, Severity::Error);
            }
        }
    }

    /// Opens a medium-priority ticket for the patient on behalf of the
    /// signed-in supervisor, then re-fetches the active list.
    pub async fn create_ticket(&mut self, now: Instant, patient_id: &str) {
        let request = CreateTicketRequest {
            patient_id: patient_id.to_string(),
            supervisor_id: self.session.subject_id.clone(),
            priority: TicketPriority::Medium,
            status: TicketStatus::Open,
        };
        match self.backend.create_ticket(&request).await {
            Ok(created) => {
                tracing::debug!(ticket_id = %created.id, "support ticket created");
                self.notices
                    .push(now, "Support ticket created successfully", Severity::Success);
                self.refresh_region(ViewName::ActiveTickets).await;
            }
            Err(error) => {
                tracing::warn!(%error, "ticket creation failed");
                self.notices
                    .push(now, "Error creating support ticket", Severity::Error);
            }
        }
    }

    pub async fn resolve_ticket(&mut self, now: Instant, ticket_id: &str) {
        match self.backend.resolve_ticket(ticket_id).await {
            Ok(()) => {
                self.notices
                    .push(now, format!("Ticket {ticket_id} resolved"), Severity::Success);
                self.refresh_region(ViewName::ActiveTickets).await;
            }
            Err(error) => {
                tracing::warn!(ticket_id, %error, "ticket resolution failed");
                self.notices
                    .push(now, "Error resolving ticket", Severity::Error);
            }
        }
    }

    pub async fn escalate_ticket(&mut self, now: Instant, ticket_id: &str) {
        match self.backend.escalate_ticket(ticket_id).await {
            Ok(()) => {
                self.notices.push(
                    now,
                    format!("Ticket {ticket_id} escalated"),
                    Severity::Success,
                );
                self.refresh_region(ViewName::ActiveTickets).await;
            }
            Err(error) => {
                tracing::warn!(ticket_id, %error, "ticket escalation failed");
                self.notices
                    .push(now, "Error escalating ticket", Severity::Error);
            }
        }
    }

    /// Loads the patient record backing the edit form.
    pub async fn begin_patient_edit(&mut self, now: Instant, patient_id: &str) {
        match self.backend.patient_info(patient_id).await {
            Ok(patient) => {
                self.edit_target = Some(patient);
            }
            Err(error) => {
                tracing::warn!(patient_id, %error, "patient info load failed");
                self.notices
                    .push(now, "Error loading patient information", Severity::Error);
            }
        }
    }

    /// Saves edited patient details, then re-fetches the record instead of
    /// patching the displayed copy.
    pub async fn update_patient(
        &mut self,
        now: Instant,
        patient_id: &str,
        request: UpdatePatientRequest,
    ) {
        match self.backend.update_patient(patient_id, &request).await {
            Ok(()) => {
                self.notices.push(
                    now,
                    "Patient information updated successfully",
                    Severity::Success,
                );
                self.edit_target = None;
                match self.backend.patient_info(patient_id).await {
                    Ok(patient) => self.search_result = Some(patient),
                    Err(error) => {
                        tracing::warn!(patient_id, %error, "post-update refresh failed");
                    }
                }
            }
            Err(error) => {
                tracing::warn!(patient_id, %error, "patient update failed");
                self.notices
                    .push(now, "Error updating patient information", Severity::Error);
            }
        }
    }

    /// Issues a password reset. The receipt's password is deliberately not
    /// surfaced anywhere.
    pub async fn reset_password(&mut self, now: Instant, patient_id: &str) {
        match self.backend.reset_password(patient_id).await {
            Ok(_receipt) => {
                self.notices.push(
                    now,
                    "Password reset issued for the patient",
                    Severity::Success,
                );
            }
            Err(error) => {
                tracing::warn!(patient_id, %error, "password reset failed");
                self.notices
                    .push(now, "Error resetting password", Severity::Error);
            }
        }
    }

    pub async fn view_patient_history(&mut self, now: Instant, patient_id: &str) {
        match self.backend.patient_history(patient_id).await {
            Ok(history) => {
                self.patient_history = Some(history);
            }
            Err(error) => {
                tracing::warn!(patient_id, %error, "patient history load failed");
                self.notices
                    .push(now, "Error loading patient history", Severity::Error);
            }
        }
    }

    /// Persists settings locally first (last-write-wins), then remotely. A
    /// remote failure keeps the local copy and reports one error notice.
    pub async fn save_settings(&mut self, now: Instant, settings: SupervisorSettings) {
        self.settings = settings;
        persist_settings(self.store.as_ref(), &self.settings);
        match self.backend.save_settings(&self.settings).await {
            Ok(()) => {
                self.notices
                    .push(now, "Settings saved successfully", Severity::Success);
            }
            Err(error) => {
                tracing::warn!(%error, "remote settings save failed");
                self.notices
                    .push(now, "Error saving settings", Severity::Error);
            }
        }
    }

    /// Re-runs the two bootstrap loads at the current generation.
    pub async fn refresh(&mut self, now: Instant) {
        let generation = self.router.generation();
        let backend = Arc::clone(&self.backend);
        let (overview, issues) = tokio::join!(backend.overview(), backend.common_issues());
        let overview = unwrap_or_fallback("overview", overview, fallback::overview);
        let issues = unwrap_or_fallback("common-issues", issues, fallback::common_issues);
        self.regions
            .commit(ViewName::Overview, generation, RegionData::Overview(overview));
        self.regions.commit(
            ViewName::PatientIssues,
            generation,
            RegionData::CommonIssues(issues),
        );
        self.notices
            .push(now, "Dashboard refreshed successfully", Severity::Success);
    }

    /// Local filter over the loaded article list. Blank queries produce a
    /// validation notice and no results.
    pub fn search_knowledge_base(&mut self, now: Instant, query: &str) -> Vec<KnowledgeArticle> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.notices
                .push(now, "Please enter a search query", Severity::Error);
            return Vec::new();
        }
        let needle = trimmed.to_lowercase();
        match self.regions.snapshot(ViewName::KnowledgeBase) {
            RegionData::KnowledgeBase(articles) => articles
                .iter()
                .filter(|article| {
                    article.title.to_lowercase().contains(&needle)
                        || article.content.to_lowercase().contains(&needle)
                        || article
                            .tags
                            .iter()
                            .any(|tag| tag.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Dispatch for the action affordances attached to rendered items.
    pub async fn run_command(&mut self, now: Instant, command: Command) {
        match command {
            Command::ViewTicket { ticket_id } => {
                self.notices
                    .push(now, format!("Viewing ticket {ticket_id}"), Severity::Info);
            }
            Command::ResolveTicket { ticket_id } => self.resolve_ticket(now, &ticket_id).await,
            Command::EscalateTicket { ticket_id } => self.escalate_ticket(now, &ticket_id).await,
            Command::ReadArticle { article_id } => {
                self.notices
                    .push(now, format!("Viewing article {article_id}"), Severity::Info);
            }
            Command::CreateTicket { patient_id } => self.create_ticket(now, &patient_id).await,
            Command::ViewHistory { patient_id } => {
                self.view_patient_history(now, &patient_id).await;
            }
            Command::EditPatient { patient_id } => {
                self.begin_patient_edit(now, &patient_id).await;
            }
            Command::ResetPassword { patient_id } => self.reset_password(now, &patient_id).await,
        }
    }

    /// Signs out at the provider, clears stored credentials and returns the
    /// sign-in location. The dashboard instance is dead after this.
    pub async fn logout(
        &mut self,
        provider: &dyn IdentityProvider,
        config: &GuardConfig,
    ) -> Result<String, IdentityError> {
        sign_out_and_clear(provider, self.store.as_ref(), config).await
    }

    #[must_use]
    pub fn active_view(&self) -> ViewName {
        self.router.active()
    }

    #[must_use]
    pub fn render_active(&self) -> Node {
        self.render_view(self.router.active())
    }

    #[must_use]
    pub fn render_view(&self, view: ViewName) -> Node {
        render::render(view, self.regions.snapshot(view))
    }

    #[must_use]
    pub fn region(&self, view: ViewName) -> &RegionData {
        self.regions.snapshot(view)
    }

    /// Count for the active-tickets badge, present once the overview loaded.
    #[must_use]
    pub fn ticket_badge(&self) -> Option<u64> {
        match self.regions.snapshot(ViewName::Overview) {
            RegionData::Overview(stats) => Some(stats.active_tickets),
            _ => None,
        }
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        self.notices.active()
    }

    pub fn expire_notices(&mut self, now: Instant) -> bool {
        self.notices.expire(now)
    }

    #[must_use]
    pub fn display_name(&self) -> &'static str {
        SUPERVISOR_DISPLAY_NAME
    }

    #[must_use]
    pub fn display_email(&self) -> &str {
        &self.session.email
    }

    #[must_use]
    pub fn session(&self) -> &StaffSession {
        &self.session
    }

    #[must_use]
    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    #[must_use]
    pub fn search_result(&self) -> Option<&Patient> {
        self.search_result.as_ref()
    }

    #[must_use]
    pub fn patient_history(&self) -> Option<&PatientHistory> {
        self.patient_history.as_ref()
    }

    #[must_use]
    pub fn edit_target(&self) -> Option<&Patient> {
        self.edit_target.as_ref()
    }
}

/// The uniform availability policy for bulk reads: serve the static dataset
/// on any failure and keep the error out of the user's way.
fn unwrap_or_fallback<T>(
    resource: &'static str,
    result: Result<T, SupportApiError>,
    fallback: impl FnOnce() -> T,
) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(resource, %error, "read failed, serving fallback dataset");
            fallback()
        }
    }
}

fn blank_query_message(query: &PatientQuery) -> &'static str {
    match query {
        PatientQuery::Email(_) => "Please enter an email address",
        PatientQuery::ArcId(_) => "Please enter an ARC ID",
        PatientQuery::Phone(_) => "Please enter a phone number",
    }
}

fn load_settings(store: &dyn KeyValueStore) -> SupervisorSettings {
    store
        .get(KEY_SETTINGS)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

fn persist_settings(store: &dyn KeyValueStore, settings: &SupervisorSettings) {
    match serde_json::to_string(settings) {
        Ok(raw) => store.set(KEY_SETTINGS, &raw),
        Err(error) => tracing::warn!(%error, "settings serialization failed"),
    }
}
