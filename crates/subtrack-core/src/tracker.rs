//! Caller-facing subscription tracker
//!
//! `SubscriptionTracker` ties the pure engine components to the storage
//! collaborators and the engine config. Every operation is scoped to a user
//! id; operations that depend on the current date take it explicitly.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::info;

use crate::analytics::{month_window, trend_windows, year_window, PeriodCache};
use crate::billing::BillingWindow;
use crate::cadence::Cadence;
use crate::config::EngineConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::export::{write_json, write_subscriptions_csv, ExportDocument, ExportFormat};
use crate::models::{
    Billing, Entitlement, NewSubscription, PeriodSnapshot, Subscription, SubscriptionDraft,
};
use crate::observe::{EngineEvent, Observer, TracingObserver};
use crate::savings::{advise, SavingsAdvice};
use crate::store::{DeleteMode, SnapshotStore, SubscriptionFilter, SubscriptionRepository};
use crate::templates::{popular_templates, Template};
use crate::upcoming::{check_horizon, overdue, project, UpcomingPaymentGroup};
use crate::validation::SubscriptionPatch;

static TRACING_OBSERVER: TracingObserver = TracingObserver;

/// Which calendar period a category breakdown covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownPeriod {
    Month,
    Year,
}

impl std::str::FromStr for BreakdownPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            _ => Err(format!("Unknown period: {} (valid: monthly, yearly)", s)),
        }
    }
}

pub struct SubscriptionTracker<'a> {
    subscriptions: &'a dyn SubscriptionRepository,
    snapshots: &'a dyn SnapshotStore,
    config: EngineConfig,
    observer: &'a dyn Observer,
}

impl<'a> SubscriptionTracker<'a> {
    /// Tracker over the SQLite database with default config
    pub fn new(db: &'a Database) -> Self {
        Self::with_stores(db, db)
    }

    pub fn with_stores(
        subscriptions: &'a dyn SubscriptionRepository,
        snapshots: &'a dyn SnapshotStore,
    ) -> Self {
        Self {
            subscriptions,
            snapshots,
            config: EngineConfig::default(),
            observer: &TRACING_OBSERVER,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========== Lifecycle ==========

    pub fn list(&self, user_id: i64, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
        self.subscriptions.list(user_id, filter)
    }

    pub fn get(&self, user_id: i64, id: i64) -> Result<Subscription> {
        self.subscriptions
            .get_by_id(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("subscription {}", id)))
    }

    /// Validate and store a new subscription
    ///
    /// Accounts without a premium entitlement are capped by the free tier
    /// limit, counting inactive subscriptions too.
    pub fn create(
        &self,
        user_id: i64,
        entitlement: Entitlement,
        draft: &SubscriptionDraft,
    ) -> Result<Subscription> {
        if !entitlement.is_premium {
            let count = self.subscriptions.count(user_id)?;
            if !self.config.free_tier.allows(count) {
                return Err(Error::Entitlement(format!(
                    "Free tier limit of {} subscriptions reached. Upgrade to premium for unlimited subscriptions.",
                    self.config.free_tier
                )));
            }
        }

        let new = draft.validate()?;
        let subscription = self.subscriptions.insert(user_id, &new)?;
        info!(user_id, subscription_id = subscription.id, "Created subscription");
        Ok(subscription)
    }

    /// Apply a patch and store the re-validated result
    pub fn update(&self, user_id: i64, id: i64, patch: &SubscriptionPatch) -> Result<Subscription> {
        let current = self.get(user_id, id)?;
        let new = patch.apply(&current)?;
        self.subscriptions.save(&replace_fields(&current, new))?;
        self.get(user_id, id)
    }

    /// Soft removal: inactive with `cancelled_at` stamped
    pub fn cancel(&self, user_id: i64, id: i64) -> Result<Subscription> {
        if !self.subscriptions.delete(user_id, id, DeleteMode::Soft)? {
            return Err(Error::NotFound(format!("subscription {}", id)));
        }
        self.get(user_id, id)
    }

    /// Reactivate a cancelled subscription and clear `cancelled_at`
    ///
    /// A recurring subscription must still have a billing date to become
    /// active again.
    pub fn activate(&self, user_id: i64, id: i64) -> Result<Subscription> {
        let current = self.get(user_id, id)?;
        if current.is_active {
            return Ok(current);
        }

        let mut draft = current.to_draft();
        draft.is_active = true;
        let mut activated = replace_fields(&current, draft.validate()?);
        activated.cancelled_at = None;

        self.subscriptions.save(&activated)?;
        self.get(user_id, id)
    }

    /// Hard removal
    pub fn purge(&self, user_id: i64, id: i64) -> Result<()> {
        if !self.subscriptions.delete(user_id, id, DeleteMode::Hard)? {
            return Err(Error::NotFound(format!("subscription {}", id)));
        }
        info!(user_id, subscription_id = id, "Purged subscription");
        Ok(())
    }

    pub fn categories(&self, user_id: i64) -> Result<Vec<String>> {
        self.subscriptions.categories(user_id)
    }

    pub fn templates(&self) -> &'static [Template] {
        popular_templates()
    }

    /// Move every past-due billing date forward to its first occurrence on
    /// or after `today`; returns the subscriptions that changed
    pub fn advance_billing_dates(&self, user_id: i64, today: NaiveDate) -> Result<Vec<Subscription>> {
        let mut advanced = Vec::new();

        for mut sub in self.subscriptions.list_active(user_id)? {
            let Billing::Recurring(terms) = &mut sub.billing else {
                continue;
            };
            let Some(from) = terms.next_billing_date.filter(|d| *d < today) else {
                continue;
            };
            let Some(to) = Cadence::of(terms).roll_forward(from, today) else {
                self.observer.record(EngineEvent::DataInconsistency {
                    subscription_id: sub.id,
                    reason: format!("cannot advance billing date {}", from),
                });
                continue;
            };

            terms.next_billing_date = Some(to);
            self.subscriptions.save(&sub)?;
            self.observer.record(EngineEvent::BillingDateAdvanced {
                subscription_id: sub.id,
                from,
                to,
            });
            advanced.push(sub);
        }

        Ok(advanced)
    }

    /// Active recurring subscriptions whose billing date is before `today`
    pub fn overdue(&self, user_id: i64, today: NaiveDate) -> Result<Vec<Subscription>> {
        let active = self.subscriptions.list_active(user_id)?;
        Ok(overdue(&active, today).into_iter().cloned().collect())
    }

    // ========== Analytics ==========

    /// Snapshot for an arbitrary window, honoring the cache policy
    pub fn period_analytics(&self, user_id: i64, window: &BillingWindow) -> Result<PeriodSnapshot> {
        let subscriptions = self.subscriptions.list_active(user_id)?;
        self.cache().get_or_compute(user_id, window, &subscriptions)
    }

    pub fn monthly_analytics(&self, user_id: i64, year: i32, month: u32) -> Result<PeriodSnapshot> {
        self.period_analytics(user_id, &month_window(year, month)?)
    }

    pub fn yearly_analytics(&self, user_id: i64, year: i32) -> Result<PeriodSnapshot> {
        self.period_analytics(user_id, &year_window(year)?)
    }

    /// Monthly snapshots for the last `months` months, oldest first
    pub fn trend(&self, user_id: i64, months: u32, today: NaiveDate) -> Result<Vec<PeriodSnapshot>> {
        let windows = trend_windows(months, self.config.analytics.max_trend_months, today)?;
        let subscriptions = self.subscriptions.list_active(user_id)?;
        let cache = self.cache();
        windows
            .iter()
            .map(|window| cache.get_or_compute(user_id, window, &subscriptions))
            .collect()
    }

    /// Category totals for the month or year containing `today`
    pub fn category_breakdown(
        &self,
        user_id: i64,
        period: BreakdownPeriod,
        today: NaiveDate,
    ) -> Result<BTreeMap<String, f64>> {
        let snapshot = match period {
            BreakdownPeriod::Month => self.monthly_analytics(user_id, today.year(), today.month())?,
            BreakdownPeriod::Year => self.yearly_analytics(user_id, today.year())?,
        };
        Ok(snapshot.category_breakdown)
    }

    /// Charges expected in `[today, today + days]`, grouped by date
    ///
    /// `days` outside the configured horizon bounds is rejected.
    pub fn upcoming(
        &self,
        user_id: i64,
        days: i64,
        today: NaiveDate,
    ) -> Result<Vec<UpcomingPaymentGroup>> {
        let days = check_horizon(days, &self.config.upcoming)?;
        let subscriptions = self.subscriptions.list_active(user_id)?;
        Ok(project(&subscriptions, days, today))
    }

    /// Savings from switching monthly plans to annual billing (premium only)
    pub fn savings(&self, user_id: i64, entitlement: Entitlement) -> Result<SavingsAdvice> {
        require_premium(entitlement, "Savings analysis")?;

        let currency = self.config.analytics.reporting_currency;
        let subscriptions: Vec<Subscription> = self
            .subscriptions
            .list_active(user_id)?
            .into_iter()
            .filter(|sub| {
                if sub.currency == currency {
                    return true;
                }
                self.observer.record(EngineEvent::CurrencySkipped {
                    subscription_id: sub.id,
                    currency: sub.currency,
                    reporting_currency: currency,
                });
                false
            })
            .collect();

        Ok(advise(&subscriptions, &self.config.savings))
    }

    // ========== Export ==========

    /// Write the user's data in `format` (premium only)
    ///
    /// CSV holds subscriptions; JSON holds subscriptions and stored
    /// snapshots.
    pub fn export<W: Write>(
        &self,
        user_id: i64,
        entitlement: Entitlement,
        format: ExportFormat,
        writer: W,
    ) -> Result<usize> {
        require_premium(entitlement, "Export")?;

        let subscriptions = self.subscriptions.list(user_id, &SubscriptionFilter::default())?;
        let count = subscriptions.len();

        match format {
            ExportFormat::Csv => write_subscriptions_csv(&subscriptions, writer)?,
            ExportFormat::Json => {
                let document = ExportDocument {
                    user_id,
                    exported_at: Utc::now(),
                    subscriptions,
                    snapshots: self.snapshots.list_snapshots(user_id)?,
                };
                write_json(&document, writer)?;
            }
        }

        info!(user_id, count, format = format.extension(), "Exported subscriptions");
        Ok(count)
    }

    fn cache(&self) -> PeriodCache<'_> {
        PeriodCache::new(
            self.snapshots,
            self.config.analytics.cache_policy,
            self.config.analytics.reporting_currency,
            self.observer,
        )
    }
}

fn require_premium(entitlement: Entitlement, feature: &str) -> Result<()> {
    if entitlement.is_premium {
        Ok(())
    } else {
        Err(Error::Entitlement(format!(
            "{} requires a premium account",
            feature
        )))
    }
}

/// The stored subscription with its editable fields replaced
fn replace_fields(current: &Subscription, new: NewSubscription) -> Subscription {
    Subscription {
        id: current.id,
        user_id: current.user_id,
        name: new.name,
        description: new.description,
        amount: new.amount,
        currency: new.currency,
        billing: new.billing,
        category: new.category,
        provider: new.provider,
        logo_url: new.logo_url,
        website_url: new.website_url,
        is_active: new.is_active,
        cancelled_at: current.cancelled_at,
        created_at: current.created_at,
        updated_at: current.updated_at,
    }
}
