//! Dashboard aggregate returned by the statistics use-case.

use crate::model::todo::Todo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of entries in [`Dashboard::recent`].
pub const RECENT_LIMIT: usize = 5;

/// Summary counts over the whole todo set, taken from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    /// Todos due today.
    pub today: u64,
    /// Todos due in the current ISO week.
    pub this_week: u64,
    /// Todos due in the current calendar month.
    pub this_month: u64,
    pub by_category: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    /// Newest todos first, at most [`RECENT_LIMIT`].
    pub recent: Vec<Todo>,
    /// `completed / total` as a rounded percentage; 0 for an empty store.
    pub completion_rate: u32,
}

/// Rounded completion percentage (half rounds up).
pub fn completion_rate(completed: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let rate = (completed.saturating_mul(100) + total / 2) / total;
    u32::try_from(rate).unwrap_or(100)
}
