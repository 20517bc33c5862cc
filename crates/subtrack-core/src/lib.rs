//! Subtrack Core Library
//!
//! Subscription lifecycle and period-spend engine:
//! - Typed subscription model with draft validation and patches
//! - Billing window evaluation and category aggregation
//! - Period analytics snapshots with a configurable cache policy
//! - Upcoming payment projection and savings advisory
//! - SQLite storage (SQLCipher) behind repository traits
//! - CSV/JSON export

pub mod aggregate;
pub mod analytics;
pub mod billing;
pub mod cadence;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod observe;
pub mod savings;
pub mod store;
pub mod templates;
pub mod tracker;
pub mod upcoming;
pub mod validation;

pub use aggregate::{aggregate, CategoryBreakdown};
pub use analytics::{compute_snapshot, month_window, trend_windows, year_window, PeriodCache};
pub use billing::{evaluate_all, try_evaluate, BillingWindow, Contribution};
pub use cadence::Cadence;
pub use config::{CachePolicy, EngineConfig, FreeTierLimit};
pub use db::Database;
pub use error::{Error, Result};
pub use export::ExportFormat;
pub use models::{
    Billing, BillingStatus, Currency, Entitlement, Frequency, NewSubscription, PeriodSnapshot,
    Subscription, SubscriptionDraft, SubscriptionType,
};
pub use observe::{EngineEvent, Observer, RecordingObserver, TracingObserver};
pub use savings::{advise, SavingsAdvice, SavingsLine};
pub use store::{DeleteMode, SnapshotStore, SubscriptionFilter, SubscriptionRepository};
pub use templates::{find_template, popular_templates, Template};
pub use tracker::{BreakdownPeriod, SubscriptionTracker};
pub use upcoming::{UpcomingPayment, UpcomingPaymentGroup};
pub use validation::{BillingPatch, OneTimePatch, RecurringPatch, SubscriptionPatch};
