//! Sender allow-list.
//!
//! Built once from `ALLOWED_USER_IDS` and shared read-only by every pipeline
//! invocation.

use std::collections::HashSet;

use tracing::warn;

use crate::models::RejectReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(RejectReason),
}

/// Immutable set of Telegram user ids allowed to relay files.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allowed: HashSet<i64>,
}

impl AccessGuard {
    pub fn new(allowed: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// An empty set admits everyone; otherwise only listed ids pass.
    pub fn check(&self, sender_id: i64) -> AccessDecision {
        if self.allowed.is_empty() || self.allowed.contains(&sender_id) {
            return AccessDecision::Allow;
        }
        warn!(sender_id, "Sender not in allow-list");
        AccessDecision::Deny(RejectReason::NotAuthorized)
    }

    /// Allowed ids in ascending order (used for startup notifications).
    pub fn allowed_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.allowed.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_enforcement() {
        let guard = AccessGuard::new([42, 7]);
        assert_eq!(guard.check(42), AccessDecision::Allow);
        assert_eq!(
            guard.check(99),
            AccessDecision::Deny(RejectReason::NotAuthorized)
        );
    }

    #[test]
    fn test_empty_set_allows_everyone() {
        let guard = AccessGuard::default();
        assert_eq!(guard.check(123), AccessDecision::Allow);
    }

    #[test]
    fn test_allowed_ids_sorted() {
        let guard = AccessGuard::new([9, 3, 5]);
        assert_eq!(guard.allowed_ids(), vec![3, 5, 9]);
    }
}
