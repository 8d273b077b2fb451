//! Static substitute datasets served when a bulk read fails, so listing
//! views degrade to sample content instead of going blank. Single-record
//! lookups and writes have no entry here on purpose.

use chrono::{DateTime, Utc};

use crate::types::{
    CommonIssues, IssueCategory, KnowledgeArticle, KnowledgeBase, OverviewStats, SupportMetrics,
    SupportReports, Ticket, TicketPriority, TicketStatus, TrendDirection, TrendingIssue,
};

// Stable reference instant so the sample records render identically across
// calls and can be compared in tests.
const BASE_SECS: i64 = 1_754_000_000;

fn fixed_time(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_SECS + offset_secs, 0).unwrap_or_default()
}

#[must_use]
pub fn overview() -> OverviewStats {
    OverviewStats {
        total_patients: 1250,
        active_tickets: 23,
        resolved_tickets: 45,
        avg_response_time: "2.5h".to_string(),
    }
}

#[must_use]
pub fn active_tickets() -> Vec<Ticket> {
    vec![
        Ticket {
            id: "1".to_string(),
            patient_name: "John Doe".to_string(),
            patient_email: "john.doe@example.com".to_string(),
            issue: "Cannot upload medical reports".to_string(),
            priority: TicketPriority::High,
            status: TicketStatus::Open,
            created_at: Some(fixed_time(-2 * 60 * 60)),
            last_updated: Some(fixed_time(-30 * 60)),
            resolved_at: None,
            resolution: None,
            resolution_time: None,
        },
        Ticket {
            id: "2".to_string(),
            patient_name: "Jane Smith".to_string(),
            patient_email: "jane.smith@example.com".to_string(),
            issue: "App crashes on startup".to_string(),
            priority: TicketPriority::Medium,
            status: TicketStatus::InProgress,
            created_at: Some(fixed_time(-4 * 60 * 60)),
            last_updated: Some(fixed_time(-60 * 60)),
            resolved_at: None,
            resolution: None,
            resolution_time: None,
        },
    ]
}

#[must_use]
pub fn resolved_tickets() -> Vec<Ticket> {
    vec![Ticket {
        id: "3".to_string(),
        patient_name: "Mike Johnson".to_string(),
        patient_email: "mike.johnson@example.com".to_string(),
        issue: "Forgot password".to_string(),
        priority: TicketPriority::Medium,
        status: TicketStatus::Resolved,
        created_at: None,
        last_updated: None,
        resolved_at: Some(fixed_time(-24 * 60 * 60)),
        resolution: Some("Password reset and new password sent via email".to_string()),
        resolution_time: Some("45 minutes".to_string()),
    }]
}

#[must_use]
pub fn common_issues() -> CommonIssues {
    CommonIssues {
        categories: vec![
            IssueCategory {
                name: "Account Access".to_string(),
                count: 15,
                icon: "user-lock".to_string(),
            },
            IssueCategory {
                name: "App Problems".to_string(),
                count: 23,
                icon: "mobile-alt".to_string(),
            },
            IssueCategory {
                name: "Report Issues".to_string(),
                count: 8,
                icon: "file-medical".to_string(),
            },
            IssueCategory {
                name: "Payment Issues".to_string(),
                count: 12,
                icon: "credit-card".to_string(),
            },
        ],
        trending: vec![
            TrendingIssue {
                issue: "App crashes on startup".to_string(),
                count: 8,
                trend: TrendDirection::Up,
            },
            TrendingIssue {
                issue: "Cannot upload documents".to_string(),
                count: 6,
                trend: TrendDirection::Up,
            },
            TrendingIssue {
                issue: "Login authentication failed".to_string(),
                count: 4,
                trend: TrendDirection::Down,
            },
        ],
    }
}

#[must_use]
pub fn knowledge_base() -> KnowledgeBase {
    KnowledgeBase {
        articles: vec![
            KnowledgeArticle {
                id: "1".to_string(),
                title: "How to Reset Your Password".to_string(),
                category: "Account Management".to_string(),
                content: "Step-by-step guide to reset your password.".to_string(),
                tags: vec![
                    "password".to_string(),
                    "account".to_string(),
                    "security".to_string(),
                ],
            },
            KnowledgeArticle {
                id: "2".to_string(),
                title: "Uploading Medical Reports".to_string(),
                category: "App Features".to_string(),
                content: "Learn how to upload and manage your medical reports.".to_string(),
                tags: vec![
                    "reports".to_string(),
                    "upload".to_string(),
                    "documents".to_string(),
                ],
            },
        ],
    }
}

#[must_use]
pub fn reports() -> SupportReports {
    SupportReports {
        metrics: SupportMetrics {
            response_time: "2.5 hours".to_string(),
            resolution_rate: "94%".to_string(),
            satisfaction: "4.7/5".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_datasets_are_deterministic() {
        assert_eq!(active_tickets(), active_tickets());
        assert_eq!(resolved_tickets(), resolved_tickets());
        assert_eq!(overview(), overview());
    }

    #[test]
    fn fallback_overview_carries_the_sample_stats() {
        let stats = overview();
        assert_eq!(stats.total_patients, 1250);
        assert_eq!(stats.active_tickets, 23);
        assert_eq!(stats.resolved_tickets, 45);
        assert_eq!(stats.avg_response_time, "2.5h");
    }

    #[test]
    fn fallback_lists_are_non_empty() {
        assert_eq!(active_tickets().len(), 2);
        assert_eq!(resolved_tickets().len(), 1);
        assert_eq!(common_issues().categories.len(), 4);
        assert_eq!(common_issues().trending.len(), 3);
        assert_eq!(knowledge_base().articles.len(), 2);
    }
}
