/// The fixed set of dashboard sections. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewName {
    Overview,
    PatientSearch,
    ActiveTickets,
    ResolvedTickets,
    PatientIssues,
    KnowledgeBase,
    Reports,
}

impl ViewName {
    pub const ALL: [Self; 7] = [
        Self::Overview,
        Self::PatientSearch,
        Self::ActiveTickets,
        Self::ResolvedTickets,
        Self::PatientIssues,
        Self::KnowledgeBase,
        Self::Reports,
    ];

    /// Unknown section names are not an error; callers treat `None` as a
    /// no-op.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "overview" => Some(Self::Overview),
            "patient-search" => Some(Self::PatientSearch),
            "active-tickets" => Some(Self::ActiveTickets),
            "resolved-tickets" => Some(Self::ResolvedTickets),
            "patient-issues" => Some(Self::PatientIssues),
            "knowledge-base" => Some(Self::KnowledgeBase),
            "reports" => Some(Self::Reports),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::PatientSearch => "patient-search",
            Self::ActiveTickets => "active-tickets",
            Self::ResolvedTickets => "resolved-tickets",
            Self::PatientIssues => "patient-issues",
            Self::KnowledgeBase => "knowledge-base",
            Self::Reports => "reports",
        }
    }

    /// Static mapping from section to the load that populates it. The
    /// patient-search section only sets up its input state, no network.
    #[must_use]
    pub const fn load_action(self) -> LoadAction {
        match self {
            Self::Overview => LoadAction::OverviewStats,
            Self::PatientSearch => LoadAction::SearchSetupOnly,
            Self::ActiveTickets => LoadAction::ActiveTickets,
            Self::ResolvedTickets => LoadAction::ResolvedTickets,
            Self::PatientIssues => LoadAction::CommonIssues,
            Self::KnowledgeBase => LoadAction::KnowledgeBase,
            Self::Reports => LoadAction::Reports,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadAction {
    OverviewStats,
    SearchSetupOnly,
    ActiveTickets,
    ResolvedTickets,
    CommonIssues,
    KnowledgeBase,
    Reports,
}

/// One activation of a section. The generation orders region commits so a
/// stale load can never overwrite a newer one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    pub view: ViewName,
    pub action: LoadAction,
    pub generation: u64,
}

#[derive(Debug)]
pub struct SectionRouter {
    active: ViewName,
    generation: u64,
}

impl Default for SectionRouter {
    fn default() -> Self {
        Self {
            active: ViewName::Overview,
            generation: 0,
        }
    }
}

impl SectionRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deactivates every other section and re-triggers the load for `view`,
    /// even when it is already active.
    pub fn activate(&mut self, view: ViewName) -> Activation {
        self.active = view;
        self.generation = self.generation.saturating_add(1);
        Activation {
            view,
            action: view.load_action(),
            generation: self.generation,
        }
    }

    #[must_use]
    pub const fn active(&self) -> ViewName {
        self.active
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_round_trip() {
        for view in ViewName::ALL {
            assert_eq!(ViewName::parse(view.as_str()), Some(view));
        }
        assert_eq!(ViewName::parse("settings-modal"), None);
        assert_eq!(ViewName::parse(""), None);
        assert_eq!(ViewName::parse(" overview "), Some(ViewName::Overview));
    }

    #[test]
    fn exactly_one_view_is_active_after_each_activation() {
        let mut router = SectionRouter::new();
        for view in [
            ViewName::ActiveTickets,
            ViewName::Reports,
            ViewName::ActiveTickets,
            ViewName::Overview,
        ] {
            let activation = router.activate(view);
            assert_eq!(activation.view, view);
            assert_eq!(router.active(), view);
        }
    }

    #[test]
    fn reactivation_yields_a_fresh_generation() {
        let mut router = SectionRouter::new();
        let first = router.activate(ViewName::KnowledgeBase);
        let second = router.activate(ViewName::KnowledgeBase);
        assert_eq!(first.view, second.view);
        assert!(second.generation > first.generation);
    }

    #[test]
    fn load_actions_follow_the_section_table() {
        assert_eq!(
            ViewName::Overview.load_action(),
            LoadAction::OverviewStats
        );
        assert_eq!(
            ViewName::PatientSearch.load_action(),
            LoadAction::SearchSetupOnly
        );
        assert_eq!(
            ViewName::ActiveTickets.load_action(),
            LoadAction::ActiveTickets
        );
        assert_eq!(
            ViewName::ResolvedTickets.load_action(),
            LoadAction::ResolvedTickets
        );
        assert_eq!(
            ViewName::PatientIssues.load_action(),
            LoadAction::CommonIssues
        );
        assert_eq!(
            ViewName::KnowledgeBase.load_action(),
            LoadAction::KnowledgeBase
        );
        assert_eq!(ViewName::Reports.load_action(), LoadAction::Reports);
    }
}
