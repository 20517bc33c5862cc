//! Billing window evaluation
//!
//! Decides whether a subscription contributed cost to a closed date window
//! and how much. Trials take precedence over the billing date: a recurring
//! subscription whose trial touches the window is included at zero cost.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Billing, Subscription};
use crate::observe::{EngineEvent, Observer};

/// Closed date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::validation(
                "period",
                format!("start {} is after end {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What one subscription adds to one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub included: bool,
    pub amount: f64,
}

impl Contribution {
    pub fn excluded() -> Self {
        Self {
            included: false,
            amount: 0.0,
        }
    }

    pub fn charged(amount: f64) -> Self {
        Self {
            included: true,
            amount,
        }
    }

    /// Included at zero cost (trial)
    pub fn free() -> Self {
        Self::charged(0.0)
    }
}

/// Evaluate a subscription against a window
///
/// Returns `Error::DataInconsistency` for an active recurring subscription
/// that has neither a billing date nor an overlapping trial.
pub fn try_evaluate(subscription: &Subscription, window: &BillingWindow) -> Result<Contribution> {
    if !subscription.is_active {
        return Ok(Contribution::excluded());
    }

    match &subscription.billing {
        Billing::Recurring(terms) => {
            if terms.trial_inconsistent {
                return Err(Error::DataInconsistency {
                    subscription_id: subscription.id,
                    reason: "trial flagged without a valid start and end date".to_string(),
                });
            }
            if let Some(trial) = terms.trial {
                if trial.overlaps(window.start, window.end) {
                    return Ok(Contribution::free());
                }
            }
            match terms.next_billing_date {
                Some(date) if window.contains(date) => {
                    Ok(Contribution::charged(subscription.amount))
                }
                Some(_) => Ok(Contribution::excluded()),
                None => Err(Error::DataInconsistency {
                    subscription_id: subscription.id,
                    reason: "active recurring subscription has no next_billing_date".to_string(),
                }),
            }
        }
        Billing::OneTime(_) => match subscription.one_time_anchor() {
            Some(anchor) if window.contains(anchor) => {
                Ok(Contribution::charged(subscription.amount))
            }
            _ => Ok(Contribution::excluded()),
        },
    }
}

/// Evaluate a batch, reporting and skipping subscriptions that cannot be
/// anchored
///
/// The result pairs each evaluable subscription with its contribution, in
/// input order.
pub fn evaluate_all<'s>(
    subscriptions: &'s [Subscription],
    window: &BillingWindow,
    observer: &dyn Observer,
) -> Vec<(&'s Subscription, Contribution)> {
    subscriptions
        .iter()
        .filter_map(|sub| match try_evaluate(sub, window) {
            Ok(contribution) => Some((sub, contribution)),
            Err(Error::DataInconsistency {
                subscription_id,
                reason,
            }) => {
                observer.record(EngineEvent::DataInconsistency {
                    subscription_id,
                    reason,
                });
                None
            }
            Err(e) => {
                observer.record(EngineEvent::DataInconsistency {
                    subscription_id: sub.id,
                    reason: e.to_string(),
                });
                None
            }
        })
        .collect()
}
