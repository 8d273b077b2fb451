use std::collections::HashMap;

use caredesk_api::{CommonIssues, KnowledgeArticle, OverviewStats, SupportReports, Ticket};

use crate::view::ViewName;

/// Loaded content for one section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionData {
    NotLoaded,
    Overview(OverviewStats),
    ActiveTickets(Vec<Ticket>),
    ResolvedTickets(Vec<Ticket>),
    CommonIssues(CommonIssues),
    KnowledgeBase(Vec<KnowledgeArticle>),
    Reports(SupportReports),
    SearchReady,
}

const NOT_LOADED: RegionData = RegionData::NotLoaded;

#[derive(Debug)]
struct Slot {
    generation: u64,
    data: RegionData,
}

/// Per-section data slots. Commits carry the generation of the load that
/// produced them; anything older than the slot's last commit is dropped.
#[derive(Debug, Default)]
pub struct Regions {
    slots: HashMap<ViewName, Slot>,
}

impl Regions {
    pub fn commit(&mut self, view: ViewName, generation: u64, data: RegionData) -> bool {
        match self.slots.get_mut(&view) {
            Some(slot) if generation < slot.generation => {
                tracing::debug!(
                    view = view.as_str(),
                    generation,
                    current = slot.generation,
                    "dropping stale region commit"
                );
                false
            }
            Some(slot) => {
                slot.generation = generation;
                slot.data = data;
                true
            }
            None => {
                self.slots.insert(view, Slot { generation, data });
                true
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self, view: ViewName) -> &RegionData {
        self.slots.get(&view).map_or(&NOT_LOADED, |slot| &slot.data)
    }
}
