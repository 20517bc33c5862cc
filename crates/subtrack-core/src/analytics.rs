//! Period analytics
//!
//! Builds calendar windows, computes a [`PeriodSnapshot`] for a window and
//! keeps the snapshot store in sync according to the [`CachePolicy`].

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

use crate::aggregate::aggregate;
use crate::billing::{evaluate_all, BillingWindow};
use crate::config::CachePolicy;
use crate::error::{Error, Result};
use crate::models::{Currency, PeriodSnapshot, Subscription};
use crate::observe::{EngineEvent, Observer};
use crate::store::SnapshotStore;

/// Window covering one calendar month
pub fn month_window(year: i32, month: u32) -> Result<BillingWindow> {
    if !(1..=12).contains(&month) {
        return Err(Error::validation("month", format!("{} is not 1-12", month)));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::validation("year", format!("{} is out of range", year)))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| Error::validation("year", format!("{} is out of range", year)))?;
    BillingWindow::new(start, end)
}

/// Window covering one calendar year
pub fn year_window(year: i32) -> Result<BillingWindow> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => BillingWindow::new(start, end),
        _ => Err(Error::validation("year", format!("{} is out of range", year))),
    }
}

/// The last `months` calendar months up to and including the one holding
/// `today`, oldest first
pub fn trend_windows(months: u32, max_months: u32, today: NaiveDate) -> Result<Vec<BillingWindow>> {
    if months < 1 || months > max_months {
        return Err(Error::validation(
            "months",
            format!("must be between 1 and {}", max_months),
        ));
    }

    let current = month_window(today.year(), today.month())?.start();
    (0..months)
        .rev()
        .map(|back| {
            let start = current
                .checked_sub_months(Months::new(back))
                .ok_or_else(|| Error::validation("months", "reaches before the calendar start"))?;
            month_window(start.year(), start.month())
        })
        .collect()
}

/// Compute the snapshot for one window without touching storage
///
/// Only subscriptions in `currency` are summed; each active subscription in
/// another currency is reported to the observer and skipped.
pub fn compute_snapshot(
    user_id: i64,
    window: &BillingWindow,
    subscriptions: &[Subscription],
    currency: Currency,
    observer: &dyn Observer,
) -> PeriodSnapshot {
    let in_currency: Vec<Subscription> = subscriptions
        .iter()
        .filter(|sub| {
            if sub.currency == currency {
                return true;
            }
            if sub.is_active {
                observer.record(EngineEvent::CurrencySkipped {
                    subscription_id: sub.id,
                    currency: sub.currency,
                    reporting_currency: currency,
                });
            }
            false
        })
        .cloned()
        .collect();

    let breakdown = aggregate(evaluate_all(&in_currency, window, observer));

    PeriodSnapshot {
        user_id,
        period_start: window.start(),
        period_end: window.end(),
        total_spent: breakdown.total,
        currency,
        subscription_count: breakdown.count as i64,
        category_breakdown: breakdown.by_category,
        computed_at: now_seconds(),
    }
}

/// Snapshot cache over a [`SnapshotStore`]
pub struct PeriodCache<'a> {
    store: &'a dyn SnapshotStore,
    policy: CachePolicy,
    currency: Currency,
    observer: &'a dyn Observer,
}

impl<'a> PeriodCache<'a> {
    pub fn new(
        store: &'a dyn SnapshotStore,
        policy: CachePolicy,
        currency: Currency,
        observer: &'a dyn Observer,
    ) -> Self {
        Self {
            store,
            policy,
            currency,
            observer,
        }
    }

    /// Return the snapshot for `(user_id, window)`, computing and upserting
    /// it unless the policy allows reusing a stored one
    ///
    /// A stored snapshot in another currency counts as a miss.
    pub fn get_or_compute(
        &self,
        user_id: i64,
        window: &BillingWindow,
        subscriptions: &[Subscription],
    ) -> Result<PeriodSnapshot> {
        if self.policy == CachePolicy::ReuseCache {
            if let Some(snapshot) = self
                .store
                .find_snapshot(user_id, window.start(), window.end())?
                .filter(|s| s.currency == self.currency)
            {
                self.observer.record(EngineEvent::SnapshotReused {
                    user_id,
                    period_start: window.start(),
                    period_end: window.end(),
                });
                return Ok(snapshot);
            }
        }

        let snapshot = compute_snapshot(user_id, window, subscriptions, self.currency, self.observer);
        self.store.upsert_snapshot(&snapshot)?;
        self.observer.record(EngineEvent::SnapshotRecomputed {
            user_id,
            period_start: snapshot.period_start,
            period_end: snapshot.period_end,
            total_spent: snapshot.total_spent,
        });
        Ok(snapshot)
    }
}

/// Current time truncated to whole seconds, matching storage precision
fn now_seconds() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}
