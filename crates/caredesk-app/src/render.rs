//! Pure render layer: (view, region snapshot) in, value tree out. Nothing
//! here touches the network or mutates controller state, so every view can
//! be asserted on directly in tests.

use caredesk_api::{
    CommonIssues, KnowledgeArticle, OverviewStats, Patient, PatientHistory, SupportReports,
    Ticket, TrendDirection,
};

use crate::regions::RegionData;
use crate::view::ViewName;

/// A user-triggerable affordance attached to a rendered item. Dispatching
/// one routes into the mutating side of the controller, which re-fetches the
/// affected section afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    ViewTicket { ticket_id: String },
    ResolveTicket { ticket_id: String },
    EscalateTicket { ticket_id: String },
    ReadArticle { article_id: String },
    CreateTicket { patient_id: String },
    ViewHistory { patient_id: String },
    EditPatient { patient_id: String },
    ResetPassword { patient_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Section { id: String, children: Vec<Node> },
    Heading(String),
    Stat { label: String, value: String },
    Badge { label: String, value: String },
    Field { label: String, value: String },
    Text(String),
    Tag(String),
    List { id: String, items: Vec<Node> },
    Item { id: String, children: Vec<Node> },
    Action { label: String, command: Command },
    EmptyState { title: String, detail: String },
}

impl Node {
    /// Plain-text projection of the tree, used by the headless shell.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Self::Section { id, children } => {
                out.push_str(&format!("{indent}[{id}]\n"));
                for child in children {
                    child.write_text(out, depth + 1);
                }
            }
            Self::Heading(text) => out.push_str(&format!("{indent}# {text}\n")),
            Self::Stat { label, value } => out.push_str(&format!("{indent}{label}: {value}\n")),
            Self::Badge { label, value } => out.push_str(&format!("{indent}({label}: {value})\n")),
            Self::Field { label, value } => out.push_str(&format!("{indent}{label}: {value}\n")),
            Self::Text(text) => out.push_str(&format!("{indent}{text}\n")),
            Self::Tag(tag) => out.push_str(&format!("{indent}<{tag}>\n")),
            Self::List { id, items } => {
                out.push_str(&format!("{indent}[{id}]\n"));
                for item in items {
                    item.write_text(out, depth + 1);
                }
            }
            Self::Item { id, children } => {
                out.push_str(&format!("{indent}- {id}\n"));
                for child in children {
                    child.write_text(out, depth + 1);
                }
            }
            Self::Action { label, .. } => out.push_str(&format!("{indent}[{label}]\n")),
            Self::EmptyState { title, detail } => {
                out.push_str(&format!("{indent}{title} - {detail}\n"));
            }
        }
    }

    /// Depth-first search for an item with the given id.
    #[must_use]
    pub fn find_item(&self, item_id: &str) -> Option<&Node> {
        match self {
            Self::Item { id, .. } if id == item_id => Some(self),
            Self::Section { children, .. } | Self::Item { children, .. } => {
                children.iter().find_map(|child| child.find_item(item_id))
            }
            Self::List { items, .. } => items.iter().find_map(|item| item.find_item(item_id)),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains_empty_state(&self) -> bool {
        match self {
            Self::EmptyState { .. } => true,
            Self::Section { children, .. } | Self::Item { children, .. } => {
                children.iter().any(Node::contains_empty_state)
            }
            Self::List { items, .. } => items.iter().any(Node::contains_empty_state),
            _ => false,
        }
    }
}

/// Render the snapshot of one section. A region that has not loaded yet (or
/// does not match the section shape) renders a pending placeholder.
#[must_use]
pub fn render(view: ViewName, region: &RegionData) -> Node {
    match (view, region) {
        (ViewName::Overview, RegionData::Overview(stats)) => render_overview(stats),
        (ViewName::PatientSearch, RegionData::SearchReady) => render_search_setup(),
        (ViewName::ActiveTickets, RegionData::ActiveTickets(tickets)) => {
            render_active_tickets(tickets)
        }
        (ViewName::ResolvedTickets, RegionData::ResolvedTickets(tickets)) => {
            render_resolved_tickets(tickets)
        }
        (ViewName::PatientIssues, RegionData::CommonIssues(issues)) => render_common_issues(issues),
        (ViewName::KnowledgeBase, RegionData::KnowledgeBase(articles)) => {
            render_knowledge_base(articles)
        }
        (ViewName::Reports, RegionData::Reports(reports)) => render_reports(reports),
        (view, _) => render_pending(view),
    }
}

fn render_pending(view: ViewName) -> Node {
    Node::Section {
        id: view.as_str().to_string(),
        children: vec![Node::Text("Loading...".to_string())],
    }
}

#[must_use]
pub fn render_overview(stats: &OverviewStats) -> Node {
    Node::Section {
        id: ViewName::Overview.as_str().to_string(),
        children: vec![
            Node::Heading("Overview".to_string()),
            Node::Stat {
                label: "Total Patients".to_string(),
                value: stats.total_patients.to_string(),
            },
            Node::Stat {
                label: "Active Tickets".to_string(),
                value: stats.active_tickets.to_string(),
            },
            Node::Stat {
                label: "Resolved Tickets".to_string(),
                value: stats.resolved_tickets.to_string(),
            },
            Node::Stat {
                label: "Avg Response Time".to_string(),
                value: stats.avg_response_time.clone(),
            },
            Node::Badge {
                label: "active-tickets".to_string(),
                value: stats.active_tickets.to_string(),
            },
        ],
    }
}

fn render_search_setup() -> Node {
    Node::Section {
        id: ViewName::PatientSearch.as_str().to_string(),
        children: vec![
            Node::Heading("Patient Search".to_string()),
            Node::Text("Search by email, ARC ID, or phone number.".to_string()),
        ],
    }
}

#[must_use]
pub fn render_active_tickets(tickets: &[Ticket]) -> Node {
    let mut children = vec![Node::Heading("Active Tickets".to_string())];
    if tickets.is_empty() {
        children.push(Node::EmptyState {
            title: "No Active Tickets".to_string(),
            detail: "All patient support tickets have been resolved.".to_string(),
        });
    } else {
        children.push(Node::List {
            id: "active-tickets-list".to_string(),
            items: tickets.iter().map(active_ticket_item).collect(),
        });
    }
    Node::Section {
        id: ViewName::ActiveTickets.as_str().to_string(),
        children,
    }
}

fn active_ticket_item(ticket: &Ticket) -> Node {
    let mut children = vec![
        Node::Heading(ticket.issue.clone()),
        Node::Field {
            label: "Patient".to_string(),
            value: ticket.patient_name.clone(),
        },
        Node::Field {
            label: "Email".to_string(),
            value: ticket.patient_email.clone(),
        },
    ];
    if let Some(created_at) = ticket.created_at {
        children.push(Node::Field {
            label: "Created".to_string(),
            value: created_at.to_rfc3339(),
        });
    }
    children.extend([
        Node::Tag(ticket.priority.label().to_string()),
        Node::Tag(ticket.status.label().to_string()),
        Node::Action {
            label: "View Details".to_string(),
            command: Command::ViewTicket {
                ticket_id: ticket.id.clone(),
            },
        },
        Node::Action {
            label: "Resolve".to_string(),
            command: Command::ResolveTicket {
                ticket_id: ticket.id.clone(),
            },
        },
        Node::Action {
            label: "Escalate".to_string(),
            command: Command::EscalateTicket {
                ticket_id: ticket.id.clone(),
            },
        },
    ]);
    Node::Item {
        id: ticket.id.clone(),
        children,
    }
}

#[must_use]
pub fn render_resolved_tickets(tickets: &[Ticket]) -> Node {
    let mut children = vec![Node::Heading("Resolved Tickets".to_string())];
    if tickets.is_empty() {
        children.push(Node::EmptyState {
            title: "No Resolved Tickets".to_string(),
            detail: "No tickets have been resolved yet.".to_string(),
        });
    } else {
        children.push(Node::List {
            id: "resolved-tickets-list".to_string(),
            items: tickets.iter().map(resolved_ticket_item).collect(),
        });
    }
    Node::Section {
        id: ViewName::ResolvedTickets.as_str().to_string(),
        children,
    }
}

fn resolved_ticket_item(ticket: &Ticket) -> Node {
    let mut children = vec![
        Node::Heading(ticket.issue.clone()),
        Node::Field {
            label: "Patient".to_string(),
            value: ticket.patient_name.clone(),
        },
        Node::Field {
            label: "Email".to_string(),
            value: ticket.patient_email.clone(),
        },
        Node::Tag(ticket.status.label().to_string()),
    ];
    if let Some(resolution) = &ticket.resolution {
        children.push(Node::Field {
            label: "Resolution".to_string(),
            value: resolution.clone(),
        });
    }
    if let Some(resolution_time) = &ticket.resolution_time {
        children.push(Node::Field {
            label: "Resolved in".to_string(),
            value: resolution_time.clone(),
        });
    }
    Node::Item {
        id: ticket.id.clone(),
        children,
    }
}

#[must_use]
pub fn render_common_issues(issues: &CommonIssues) -> Node {
    let mut children = vec![Node::Heading("Common Patient Issues".to_string())];
    if issues.categories.is_empty() {
        children.push(Node::EmptyState {
            title: "No Issue Categories".to_string(),
            detail: "No common issues have been reported.".to_string(),
        });
    } else {
        children.push(Node::List {
            id: "issue-categories".to_string(),
            items: issues
                .categories
                .iter()
                .map(|category| Node::Item {
                    id: category.name.clone(),
                    children: vec![
                        Node::Field {
                            label: "Issues".to_string(),
                            value: format!("{} issues", category.count),
                        },
                        Node::Tag(category.icon.clone()),
                    ],
                })
                .collect(),
        });
    }
    if !issues.trending.is_empty() {
        children.push(Node::List {
            id: "trending-issues".to_string(),
            items: issues
                .trending
                .iter()
                .map(|trending| Node::Item {
                    id: trending.issue.clone(),
                    children: vec![
                        Node::Field {
                            label: "Reports".to_string(),
                            value: format!("{} reports", trending.count),
                        },
                        Node::Tag(
                            match trending.trend {
                                TrendDirection::Up => "up",
                                TrendDirection::Down => "down",
                            }
                            .to_string(),
                        ),
                    ],
                })
                .collect(),
        });
    }
    Node::Section {
        id: ViewName::PatientIssues.as_str().to_string(),
        children,
    }
}

#[must_use]
pub fn render_knowledge_base(articles: &[KnowledgeArticle]) -> Node {
    let mut children = vec![Node::Heading("Knowledge Base".to_string())];
    if articles.is_empty() {
        children.push(Node::EmptyState {
            title: "No Articles".to_string(),
            detail: "No help articles are available yet.".to_string(),
        });
    } else {
        children.push(Node::List {
            id: "kb-articles".to_string(),
            items: articles.iter().map(article_item).collect(),
        });
    }
    Node::Section {
        id: ViewName::KnowledgeBase.as_str().to_string(),
        children,
    }
}

fn article_item(article: &KnowledgeArticle) -> Node {
    let mut children = vec![
        Node::Heading(article.title.clone()),
        Node::Field {
            label: "Category".to_string(),
            value: article.category.clone(),
        },
        Node::Text(article.content.clone()),
    ];
    children.extend(article.tags.iter().map(|tag| Node::Tag(tag.clone())));
    children.push(Node::Action {
        label: "Read More".to_string(),
        command: Command::ReadArticle {
            article_id: article.id.clone(),
        },
    });
    Node::Item {
        id: article.id.clone(),
        children,
    }
}

#[must_use]
pub fn render_reports(reports: &SupportReports) -> Node {
    Node::Section {
        id: ViewName::Reports.as_str().to_string(),
        children: vec![
            Node::Heading("Support Reports".to_string()),
            Node::Stat {
                label: "Response Time".to_string(),
                value: reports.metrics.response_time.clone(),
            },
            Node::Stat {
                label: "Resolution Rate".to_string(),
                value: reports.metrics.resolution_rate.clone(),
            },
            Node::Stat {
                label: "Satisfaction".to_string(),
                value: reports.metrics.satisfaction.clone(),
            },
        ],
    }
}

/// Card for a successful patient lookup, with the follow-up affordances.
#[must_use]
pub fn render_patient_result(patient: &Patient) -> Node {
    Node::Section {
        id: "patient-result".to_string(),
        children: vec![
            Node::Heading("Patient Found".to_string()),
            Node::Field {
                label: "Name".to_string(),
                value: patient.name.clone(),
            },
            Node::Field {
                label: "ARC ID".to_string(),
                value: patient.arc_id.clone(),
            },
            Node::Field {
                label: "Email".to_string(),
                value: patient.email.clone(),
            },
            Node::Field {
                label: "Phone".to_string(),
                value: patient.phone.clone(),
            },
            Node::Tag(patient.status.label().to_string()),
            Node::Action {
                label: "Create Support Ticket".to_string(),
                command: Command::CreateTicket {
                    patient_id: patient.id.clone(),
                },
            },
            Node::Action {
                label: "View History".to_string(),
                command: Command::ViewHistory {
                    patient_id: patient.id.clone(),
                },
            },
            Node::Action {
                label: "Edit Info".to_string(),
                command: Command::EditPatient {
                    patient_id: patient.id.clone(),
                },
            },
            Node::Action {
                label: "Reset Password".to_string(),
                command: Command::ResetPassword {
                    patient_id: patient.id.clone(),
                },
            },
        ],
    }
}

#[must_use]
pub fn render_patient_history(history: &PatientHistory) -> Node {
    let mut children = vec![Node::Heading("Patient History".to_string())];
    if history.events.is_empty() {
        children.push(Node::EmptyState {
            title: "No History".to_string(),
            detail: "No events have been recorded for this patient.".to_string(),
        });
    } else {
        children.push(Node::List {
            id: "history-timeline".to_string(),
            items: history
                .events
                .iter()
                .map(|event| Node::Item {
                    id: event.date.to_rfc3339(),
                    children: vec![
                        Node::Heading(event.title.clone()),
                        Node::Text(event.description.clone()),
                    ],
                })
                .collect(),
        });
    }
    Node::Section {
        id: "patient-history".to_string(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use caredesk_api::fallback;

    use super::*;

    #[test]
    fn empty_ticket_list_renders_the_empty_state() {
        let node = render_active_tickets(&[]);
        assert!(node.contains_empty_state());
        let populated = render_active_tickets(&fallback::active_tickets());
        assert!(!populated.contains_empty_state());
    }

    #[test]
    fn overview_renders_all_four_stats_and_the_badge() {
        let node = render_overview(&fallback::overview());
        let Node::Section { children, .. } = &node else {
            panic!("expected a section");
        };
        let stats: Vec<_> = children
            .iter()
            .filter_map(|child| match child {
                Node::Stat { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(stats, vec!["1250", "23", "45", "2.5h"]);
        assert!(children.iter().any(|child| matches!(
            child,
            Node::Badge { label, value } if label == "active-tickets" && value == "23"
        )));
    }

    #[test]
    fn ticket_items_carry_the_three_ticket_actions() {
        let node = render_active_tickets(&fallback::active_tickets());
        let Some(item) = node.find_item("1") else {
            panic!("ticket item missing");
        };
        let Node::Item { children, .. } = item else {
            panic!("expected an item");
        };
        let commands: Vec<_> = children
            .iter()
            .filter_map(|child| match child {
                Node::Action { command, .. } => Some(command.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            commands,
            vec![
                Command::ViewTicket {
                    ticket_id: "1".to_string()
                },
                Command::ResolveTicket {
                    ticket_id: "1".to_string()
                },
                Command::EscalateTicket {
                    ticket_id: "1".to_string()
                },
            ]
        );
    }

    #[test]
    fn unloaded_regions_render_a_pending_placeholder() {
        let node = render(ViewName::Reports, &RegionData::NotLoaded);
        assert_eq!(
            node,
            Node::Section {
                id: "reports".to_string(),
                children: vec![Node::Text("Loading...".to_string())],
            }
        );
    }

    #[test]
    fn patient_result_offers_the_follow_up_actions() {
        let patient = Patient {
            id: "p-1".to_string(),
            name: "John Doe".to_string(),
            arc_id: "ARC-100".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "555-0100".to_string(),
            status: caredesk_api::PatientStatus::Active,
        };
        let node = render_patient_result(&patient);
        let Node::Section { children, .. } = &node else {
            panic!("expected a section");
        };
        let actions = children
            .iter()
            .filter(|child| matches!(child, Node::Action { .. }))
            .count();
        assert_eq!(actions, 4);
    }

    #[test]
    fn text_projection_is_indented_by_depth() {
        let node = render_knowledge_base(&fallback::knowledge_base().articles);
        let text = node.to_text();
        assert!(text.contains("[knowledge-base]"));
        assert!(text.contains("  # Knowledge Base"));
        assert!(text.contains("[Read More]"));
    }
}
