//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Subtrack - Know what your subscriptions cost
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(about = "Subscription lifecycle and period-spend tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "subtrack.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SUBTRACK_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Engine config file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User id all operations are scoped to
    #[arg(long, default_value = "1", global = true)]
    pub user: i64,

    /// Act as a premium account (unlimited subscriptions, savings, export)
    #[arg(long, global = true)]
    pub premium: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage subscriptions (list, add, show, update, cancel, activate, purge)
    Subscriptions {
        #[command(subcommand)]
        action: Option<SubscriptionsAction>,
    },

    /// Period spend analytics
    Analytics {
        #[command(subcommand)]
        action: AnalyticsAction,
    },

    /// Show charges expected in the next N days
    Upcoming {
        /// Horizon in days (defaults to upcoming.default_horizon_days)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Estimate savings from switching to annual billing (premium)
    Savings,

    /// Export subscriptions (premium)
    Export {
        /// Output format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List popular subscription templates
    Templates,
}

#[derive(Subcommand)]
pub enum SubscriptionsAction {
    /// List subscriptions
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Include cancelled subscriptions
        #[arg(long)]
        all: bool,

        /// Case-insensitive match on name, description or provider
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a subscription
    Add(AddArgs),

    /// Show one subscription
    Show {
        /// Subscription ID
        id: i64,
    },

    /// Update fields of a subscription
    Update(UpdateArgs),

    /// Cancel a subscription (kept for history, excluded from totals)
    Cancel {
        /// Subscription ID
        id: i64,
    },

    /// Reactivate a cancelled subscription
    Activate {
        /// Subscription ID
        id: i64,
    },

    /// Permanently delete a subscription
    Purge {
        /// Subscription ID
        id: i64,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List categories in use
    Categories,

    /// Move past billing dates forward to their next occurrence
    Advance,

    /// List subscriptions whose billing date has passed
    Overdue,
}

#[derive(Args)]
pub struct AddArgs {
    /// Subscription name (may be omitted with --template)
    pub name: Option<String>,

    /// Start from a popular template (e.g., "netflix", "yandex-plus")
    #[arg(short, long)]
    pub template: Option<String>,

    /// Charge amount
    #[arg(short, long)]
    pub amount: Option<f64>,

    /// Currency code: RUB, USD, EUR, GBP, CNY
    #[arg(long, default_value = "RUB")]
    pub currency: String,

    /// Add a one-time purchase instead of a recurring subscription
    #[arg(long)]
    pub one_time: bool,

    /// Next billing date (YYYY-MM-DD), recurring only
    #[arg(long)]
    pub next: Option<String>,

    /// Billing frequency: daily, weekly, monthly, yearly (default: monthly)
    #[arg(short, long)]
    pub frequency: Option<String>,

    /// Custom interval unit: day, week, month, year
    #[arg(long)]
    pub interval_unit: Option<String>,

    /// Custom interval count (with --interval-unit)
    #[arg(long)]
    pub interval_count: Option<i64>,

    /// Trial start date (YYYY-MM-DD)
    #[arg(long)]
    pub trial_start: Option<String>,

    /// Trial end date (YYYY-MM-DD)
    #[arg(long)]
    pub trial_end: Option<String>,

    /// Start date (YYYY-MM-DD), one-time only
    #[arg(long)]
    pub start: Option<String>,

    /// Duration type: days, weeks, months, years, indefinite
    #[arg(long)]
    pub duration_type: Option<String>,

    /// Duration length (with --duration-type)
    #[arg(long)]
    pub duration_value: Option<i64>,

    /// Explicit end date (YYYY-MM-DD), one-time only
    #[arg(long)]
    pub end: Option<String>,

    /// Category (e.g., "video", "music")
    #[arg(short, long)]
    pub category: Option<String>,

    /// Provider name
    #[arg(long)]
    pub provider: Option<String>,

    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Subscription ID
    pub id: i64,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New amount
    #[arg(short, long)]
    pub amount: Option<f64>,

    /// New currency code
    #[arg(long)]
    pub currency: Option<String>,

    /// New category (empty string clears it)
    #[arg(short, long)]
    pub category: Option<String>,

    /// New provider (empty string clears it)
    #[arg(long)]
    pub provider: Option<String>,

    /// New description (empty string clears it)
    #[arg(long)]
    pub description: Option<String>,

    /// Next billing date (YYYY-MM-DD), recurring only
    #[arg(long)]
    pub next: Option<String>,

    /// Billing frequency, recurring only
    #[arg(short, long)]
    pub frequency: Option<String>,

    /// Trial start date (YYYY-MM-DD), recurring only
    #[arg(long)]
    pub trial_start: Option<String>,

    /// Trial end date (YYYY-MM-DD), recurring only
    #[arg(long)]
    pub trial_end: Option<String>,

    /// Remove the trial, recurring only
    #[arg(long, conflicts_with_all = ["trial_start", "trial_end"])]
    pub no_trial: bool,

    /// Start date (YYYY-MM-DD), one-time only
    #[arg(long)]
    pub start: Option<String>,

    /// Explicit end date (YYYY-MM-DD), one-time only
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Subcommand)]
pub enum AnalyticsAction {
    /// Spend for one calendar month
    Monthly {
        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month 1-12 (defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Spend for one calendar year
    Yearly {
        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Month-by-month spend, oldest first
    Trend {
        /// Number of months ending with the current one
        #[arg(short, long, default_value = "12")]
        months: u32,
    },

    /// Spend by category for the current month or year
    Categories {
        /// Period: monthly, yearly
        #[arg(short, long, default_value = "monthly")]
        period: String,
    },
}
