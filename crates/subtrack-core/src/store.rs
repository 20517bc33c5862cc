//! Storage collaborators
//!
//! The engine reads and writes through these traits. [`crate::Database`]
//! implements both against SQLite.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{NewSubscription, PeriodSnapshot, Subscription};

/// How `delete` removes a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Mark inactive and stamp `cancelled_at`; the row stays
    Soft,
    /// Remove the row
    Hard,
}

/// Filter for listing a user's subscriptions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub category: Option<String>,
    pub active: Option<bool>,
    /// Case-insensitive substring of name, description or provider
    pub search: Option<String>,
}

impl SubscriptionFilter {
    pub fn active() -> Self {
        Self {
            active: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        if let Some(active) = self.active {
            if subscription.is_active != active {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if subscription.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = |field: Option<&str>| {
                field.is_some_and(|f| f.to_lowercase().contains(&needle))
            };
            if !(hit(Some(&subscription.name))
                || hit(subscription.description.as_deref())
                || hit(subscription.provider.as_deref()))
            {
                return false;
            }
        }
        true
    }
}

/// Subscription persistence scoped to an owning user
///
/// Every lookup takes the user id; a subscription owned by someone else is
/// indistinguishable from a missing one.
pub trait SubscriptionRepository {
    fn list_active(&self, user_id: i64) -> Result<Vec<Subscription>>;

    fn list(&self, user_id: i64, filter: &SubscriptionFilter) -> Result<Vec<Subscription>>;

    /// All subscriptions the user holds, active or not
    fn count(&self, user_id: i64) -> Result<u64>;

    fn get_by_id(&self, user_id: i64, id: i64) -> Result<Option<Subscription>>;

    fn insert(&self, user_id: i64, subscription: &NewSubscription) -> Result<Subscription>;

    /// Persist every field of an existing subscription and bump `updated_at`
    fn save(&self, subscription: &Subscription) -> Result<()>;

    /// Returns false if no such subscription exists for the user
    fn delete(&self, user_id: i64, id: i64, mode: DeleteMode) -> Result<bool>;

    /// Distinct non-empty categories, sorted
    fn categories(&self, user_id: i64) -> Result<Vec<String>>;
}

/// Period snapshot cache, at most one row per `(user, start, end)`
pub trait SnapshotStore {
    fn find_snapshot(
        &self,
        user_id: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<PeriodSnapshot>>;

    /// Insert or replace the snapshot for its key
    fn upsert_snapshot(&self, snapshot: &PeriodSnapshot) -> Result<()>;

    /// Newest period first
    fn list_snapshots(&self, user_id: i64) -> Result<Vec<PeriodSnapshot>>;
}
