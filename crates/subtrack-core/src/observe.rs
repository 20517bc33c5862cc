//! Engine event reporting
//!
//! The engine never prints. Anything worth reporting is sent to an
//! [`Observer`] as an [`EngineEvent`]; the default observer forwards to
//! `tracing`.

use std::sync::Mutex;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::Currency;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A subscription could not be evaluated and was skipped
    DataInconsistency { subscription_id: i64, reason: String },
    /// A subscription in a non-reporting currency was left out of a total
    CurrencySkipped {
        subscription_id: i64,
        currency: Currency,
        reporting_currency: Currency,
    },
    /// A period snapshot was computed and upserted
    SnapshotRecomputed {
        user_id: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
        total_spent: f64,
    },
    /// A stored snapshot was returned without recomputation
    SnapshotReused {
        user_id: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    },
    /// A past-due billing date was rolled forward
    BillingDateAdvanced {
        subscription_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    },
}

/// Sink for engine events
pub trait Observer: Send + Sync {
    fn record(&self, event: EngineEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn record(&self, event: EngineEvent) {
        match event {
            EngineEvent::DataInconsistency {
                subscription_id,
                reason,
            } => {
                warn!(subscription_id, %reason, "Skipping inconsistent subscription");
            }
            EngineEvent::CurrencySkipped {
                subscription_id,
                currency,
                reporting_currency,
            } => {
                debug!(
                    subscription_id,
                    %currency,
                    %reporting_currency,
                    "Skipping subscription outside reporting currency"
                );
            }
            EngineEvent::SnapshotRecomputed {
                user_id,
                period_start,
                period_end,
                total_spent,
            } => {
                debug!(
                    user_id,
                    %period_start,
                    %period_end,
                    total_spent,
                    "Recomputed period snapshot"
                );
            }
            EngineEvent::SnapshotReused {
                user_id,
                period_start,
                period_end,
            } => {
                debug!(user_id, %period_start, %period_end, "Reused cached period snapshot");
            }
            EngineEvent::BillingDateAdvanced {
                subscription_id,
                from,
                to,
            } => {
                debug!(subscription_id, %from, %to, "Advanced billing date");
            }
        }
    }
}

/// Keeps every event in memory, for tests and callers that want to inspect
/// what happened during a call
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<EngineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Observer for RecordingObserver {
    fn record(&self, event: EngineEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
