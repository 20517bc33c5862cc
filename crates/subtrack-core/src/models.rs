//! Domain models for Subtrack

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Category bucket for subscriptions without a category
pub const UNCATEGORIZED: &str = "uncategorized";

/// Supported currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
    Gbp,
    Cny,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rub => "RUB",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cny => "CNY",
        }
    }

    pub fn all() -> &'static [Currency] {
        &[Self::Rub, Self::Usd, Self::Eur, Self::Gbp, Self::Cny]
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "RUB" => Ok(Self::Rub),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "CNY" => Ok(Self::Cny),
            _ => Err(format!(
                "Unknown currency: {} (valid: RUB, USD, EUR, GBP, CNY)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical billing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!(
                "Unknown frequency: {} (valid: daily, weekly, monthly, yearly)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unit of a fine-grained billing interval ("every 2 weeks")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// The frequency a single step of this unit corresponds to
    pub fn frequency(&self) -> Frequency {
        match self {
            Self::Day => Frequency::Daily,
            Self::Week => Frequency::Weekly,
            Self::Month => Frequency::Monthly,
            Self::Year => Frequency::Yearly,
        }
    }
}

impl std::str::FromStr for IntervalUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(format!(
                "Unknown interval unit: {} (valid: day, week, month, year)",
                s
            )),
        }
    }
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cadence override: every `count` units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub unit: IntervalUnit,
    pub count: u32,
}

/// Unit of a one-time subscription's duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

impl std::str::FromStr for DurationUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "days" => Ok(Self::Days),
            "weeks" => Ok(Self::Weeks),
            "months" => Ok(Self::Months),
            "years" => Ok(Self::Years),
            _ => Err(format!(
                "Unknown duration type: {} (valid: days, weeks, months, years, indefinite)",
                s
            )),
        }
    }
}

/// How long a one-time purchase lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "duration_type")]
pub enum Term {
    Indefinite,
    Fixed { unit: DurationUnit, value: u32 },
}

impl Term {
    /// Value stored in the `duration_type` column
    pub fn duration_type(&self) -> &'static str {
        match self {
            Self::Indefinite => "indefinite",
            Self::Fixed { unit, .. } => unit.as_str(),
        }
    }

    pub fn duration_value(&self) -> Option<u32> {
        match self {
            Self::Indefinite => None,
            Self::Fixed { value, .. } => Some(*value),
        }
    }
}

/// Trial interval during which charges are suppressed (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TrialPeriod {
    /// True if the trial intersects the closed range `[start, end]`
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && self.end >= start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Subscription type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionType {
    Recurring,
    OneTime,
}

impl SubscriptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recurring => "recurring",
            Self::OneTime => "one_time",
        }
    }
}

impl std::str::FromStr for SubscriptionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recurring" => Ok(Self::Recurring),
            "one_time" | "one-time" => Ok(Self::OneTime),
            _ => Err(format!(
                "Unknown subscription type: {} (valid: recurring, one_time)",
                s
            )),
        }
    }
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields of a recurring subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTerms {
    /// Date of the next charge; always set while the subscription is active
    pub next_billing_date: Option<NaiveDate>,
    pub frequency: Frequency,
    /// Takes precedence over `frequency` for next-occurrence math
    pub interval: Option<Interval>,
    pub trial: Option<TrialPeriod>,
    /// Stored row claims a trial whose dates are missing or inverted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub trial_inconsistent: bool,
}

/// Fields of a one-time subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTimeTerms {
    /// Charge anchor; the creation date is used when absent
    pub start_date: Option<NaiveDate>,
    pub term: Term,
    /// Explicit, or derived from `start_date + term`
    pub end_date: Option<NaiveDate>,
}

/// Type-specific temporal fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "subscription_type", rename_all = "snake_case")]
pub enum Billing {
    Recurring(RecurringTerms),
    OneTime(OneTimeTerms),
}

impl Billing {
    pub fn subscription_type(&self) -> SubscriptionType {
        match self {
            Self::Recurring(_) => SubscriptionType::Recurring,
            Self::OneTime(_) => SubscriptionType::OneTime,
        }
    }
}

/// Raw, unvalidated subscription fields as supplied by a caller
///
/// Enumerated values are plain strings here; `validate()` turns a draft into
/// a typed [`NewSubscription`] or a validation error naming the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionDraft {
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub subscription_type: String,

    // Recurring
    pub next_billing_date: Option<NaiveDate>,
    pub frequency: Option<String>,
    pub interval_unit: Option<String>,
    pub interval_count: Option<i64>,

    // Trial overlay
    pub has_trial: bool,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,

    // One-time
    pub start_date: Option<NaiveDate>,
    pub duration_type: Option<String>,
    pub duration_value: Option<i64>,
    pub end_date: Option<NaiveDate>,

    pub category: Option<String>,
    pub provider: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub is_active: bool,
}

impl Default for SubscriptionDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            amount: 0.0,
            currency: Currency::Rub.as_str().to_string(),
            subscription_type: SubscriptionType::Recurring.as_str().to_string(),
            next_billing_date: None,
            frequency: None,
            interval_unit: None,
            interval_count: None,
            has_trial: false,
            trial_start_date: None,
            trial_end_date: None,
            start_date: None,
            duration_type: None,
            duration_value: None,
            end_date: None,
            category: None,
            provider: None,
            logo_url: None,
            website_url: None,
            is_active: true,
        }
    }
}

impl SubscriptionDraft {
    /// A monthly recurring draft charging on `next_billing_date`
    pub fn recurring(name: impl Into<String>, amount: f64, next_billing_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            next_billing_date: Some(next_billing_date),
            frequency: Some(Frequency::Monthly.as_str().to_string()),
            ..Default::default()
        }
    }

    /// An indefinite one-time draft anchored at `start_date`
    pub fn one_time(name: impl Into<String>, amount: f64, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            subscription_type: SubscriptionType::OneTime.as_str().to_string(),
            start_date: Some(start_date),
            duration_type: Some("indefinite".to_string()),
            ..Default::default()
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }

    pub fn with_interval(mut self, unit: impl Into<String>, count: i64) -> Self {
        self.interval_unit = Some(unit.into());
        self.interval_count = Some(count);
        self
    }

    pub fn with_trial(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.has_trial = true;
        self.trial_start_date = Some(start);
        self.trial_end_date = Some(end);
        self
    }

    pub fn with_duration(mut self, duration_type: impl Into<String>, value: i64) -> Self {
        self.duration_type = Some(duration_type.into());
        self.duration_value = Some(value);
        self
    }
}

/// A validated subscription ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    pub billing: Billing,
    pub category: Option<String>,
    pub provider: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub is_active: bool,
}

/// A tracked subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    #[serde(flatten)]
    pub billing: Billing,
    pub category: Option<String>,
    pub provider: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub is_active: bool,
    /// Set exactly when the subscription went from active to inactive
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn subscription_type(&self) -> SubscriptionType {
        self.billing.subscription_type()
    }

    pub fn recurring(&self) -> Option<&RecurringTerms> {
        match &self.billing {
            Billing::Recurring(terms) => Some(terms),
            Billing::OneTime(_) => None,
        }
    }

    pub fn one_time(&self) -> Option<&OneTimeTerms> {
        match &self.billing {
            Billing::OneTime(terms) => Some(terms),
            Billing::Recurring(_) => None,
        }
    }

    pub fn next_billing_date(&self) -> Option<NaiveDate> {
        self.recurring().and_then(|r| r.next_billing_date)
    }

    /// Category bucket used by aggregation
    pub fn category_key(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }

    /// The single charge date of a one-time subscription
    pub fn one_time_anchor(&self) -> Option<NaiveDate> {
        self.one_time()
            .map(|t| t.start_date.unwrap_or_else(|| self.created_at.date_naive()))
    }
}

/// External account attributes that gate operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub is_premium: bool,
}

impl Entitlement {
    pub fn free() -> Self {
        Self { is_premium: false }
    }

    pub fn premium() -> Self {
        Self { is_premium: true }
    }
}

/// Cached spend aggregate for one user and one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub user_id: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_spent: f64,
    pub currency: Currency,
    pub subscription_count: i64,
    pub category_breakdown: BTreeMap<String, f64>,
    pub computed_at: DateTime<Utc>,
}

/// Display status of a recurring charge relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingStatus {
    Overdue,
    /// Charges within the next three days
    Due,
    Upcoming,
}

impl BillingStatus {
    pub fn from_days_until(days: i64) -> Self {
        if days < 0 {
            Self::Overdue
        } else if days <= 3 {
            Self::Due
        } else {
            Self::Upcoming
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Due => "due",
            Self::Upcoming => "upcoming",
        }
    }
}
