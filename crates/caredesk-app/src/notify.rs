use std::time::{Duration, Instant};

/// Every notice is removed unconditionally this long after it is pushed.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

/// Transient user-facing notices. Concurrent notices stack, each expiring on
/// its own deadline.
#[derive(Debug)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self {
            notices: Vec::new(),
            next_id: 1,
        }
    }
}

impl NoticeBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, now: Instant, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.notices.push(Notice {
            id,
            message: message.into(),
            severity,
            expires_at: now + NOTICE_TTL,
        });
        id
    }

    /// Drops every notice whose deadline has passed. Returns whether
    /// anything changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.expires_at > now);
        before != self.notices.len()
    }

    #[must_use]
    pub fn active(&self) -> &[Notice] {
        &self.notices
    }

    #[must_use]
    pub fn count_of(&self, severity: Severity) -> usize {
        self.notices
            .iter()
            .filter(|notice| notice.severity == severity)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_exists_until_its_deadline_passes() {
        let mut board = NoticeBoard::new();
        let now = Instant::now();
        board.push(now, "x", Severity::Success);
        assert_eq!(board.active().len(), 1);

        assert!(!board.expire(now + NOTICE_TTL - Duration::from_millis(1)));
        assert_eq!(board.active().len(), 1);

        assert!(board.expire(now + NOTICE_TTL));
        assert!(board.active().is_empty());
    }

    #[test]
    fn overlapping_notices_expire_on_their_own_deadlines() {
        let mut board = NoticeBoard::new();
        let now = Instant::now();
        board.push(now, "first", Severity::Info);
        board.push(now + Duration::from_secs(2), "second", Severity::Error);
        assert_eq!(board.active().len(), 2);

        board.expire(now + Duration::from_secs(5));
        let remaining: Vec<_> = board
            .active()
            .iter()
            .map(|notice| notice.message.as_str())
            .collect();
        assert_eq!(remaining, vec!["second"]);

        board.expire(now + Duration::from_secs(7));
        assert!(board.active().is_empty());
    }

    #[test]
    fn notice_ids_are_unique_and_increasing() {
        let mut board = NoticeBoard::new();
        let now = Instant::now();
        let first = board.push(now, "a", Severity::Info);
        let second = board.push(now, "b", Severity::Info);
        assert!(second > first);
    }
}
