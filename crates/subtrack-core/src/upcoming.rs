//! Upcoming payment projection

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregate::{from_minor, to_minor};
use crate::config::UpcomingConfig;
use crate::error::{Error, Result};
use crate::models::{Billing, BillingStatus, Currency, Subscription, SubscriptionType};

/// One charge expected inside the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPayment {
    pub subscription_id: i64,
    pub name: String,
    /// Zero while the charge falls inside a trial
    pub amount: f64,
    pub currency: Currency,
    pub category: Option<String>,
    pub subscription_type: SubscriptionType,
    pub in_trial: bool,
}

/// All charges expected on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPaymentGroup {
    pub date: NaiveDate,
    /// Plain sum across currencies; see `by_currency` for per-currency totals
    pub total_amount: f64,
    pub by_currency: BTreeMap<Currency, f64>,
    pub count: usize,
    pub subscriptions: Vec<UpcomingPayment>,
}

/// Check a requested horizon against the configured bounds
pub fn check_horizon(days: i64, config: &UpcomingConfig) -> Result<u32> {
    let min = i64::from(config.min_horizon_days);
    let max = i64::from(config.max_horizon_days);
    if days < min || days > max {
        return Err(Error::validation(
            "days",
            format!("must be between {} and {}, got {}", min, max, days),
        ));
    }
    u32::try_from(days).map_err(|_| Error::validation("days", "out of range"))
}

/// The date a subscription is next charged, if it is an active charge
/// candidate at all
fn charge_date(subscription: &Subscription) -> Option<NaiveDate> {
    if !subscription.is_active {
        return None;
    }
    match &subscription.billing {
        Billing::Recurring(terms) => terms.next_billing_date,
        Billing::OneTime(_) => subscription.one_time_anchor(),
    }
}

/// Group charges in `[today, today + days]` by date, ascending
pub fn project(subscriptions: &[Subscription], days: u32, today: NaiveDate) -> Vec<UpcomingPaymentGroup> {
    let horizon_end = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);

    let mut by_date: BTreeMap<NaiveDate, Vec<UpcomingPayment>> = BTreeMap::new();

    for sub in subscriptions {
        let Some(date) = charge_date(sub) else {
            continue;
        };
        if date < today || date > horizon_end {
            continue;
        }

        let in_trial = sub
            .recurring()
            .and_then(|r| r.trial)
            .is_some_and(|trial| trial.contains(date));

        by_date.entry(date).or_default().push(UpcomingPayment {
            subscription_id: sub.id,
            name: sub.name.clone(),
            amount: if in_trial { 0.0 } else { sub.amount },
            currency: sub.currency,
            category: sub.category.clone(),
            subscription_type: sub.subscription_type(),
            in_trial,
        });
    }

    by_date
        .into_iter()
        .map(|(date, mut payments)| {
            payments.sort_by(|a, b| a.name.cmp(&b.name).then(a.subscription_id.cmp(&b.subscription_id)));

            let mut total = 0i128;
            let mut by_currency: BTreeMap<Currency, i128> = BTreeMap::new();
            for payment in &payments {
                let minor = to_minor(payment.amount);
                total += minor;
                *by_currency.entry(payment.currency).or_insert(0) += minor;
            }

            UpcomingPaymentGroup {
                date,
                total_amount: from_minor(total),
                by_currency: by_currency
                    .into_iter()
                    .map(|(currency, minor)| (currency, from_minor(minor)))
                    .collect(),
                count: payments.len(),
                subscriptions: payments,
            }
        })
        .collect()
}

/// Active recurring subscriptions whose billing date has already passed,
/// oldest first
pub fn overdue(subscriptions: &[Subscription], today: NaiveDate) -> Vec<&Subscription> {
    let mut result: Vec<&Subscription> = subscriptions
        .iter()
        .filter(|s| s.is_active)
        .filter(|s| s.next_billing_date().is_some_and(|d| d < today))
        .collect();
    result.sort_by_key(|s| (s.next_billing_date(), s.id));
    result
}

/// Display status and day distance of a subscription's next charge
pub fn billing_status(subscription: &Subscription, today: NaiveDate) -> Option<(BillingStatus, i64)> {
    let date = charge_date(subscription)?;
    let days = (date - today).num_days();
    Some((BillingStatus::from_days_until(days), days))
}
