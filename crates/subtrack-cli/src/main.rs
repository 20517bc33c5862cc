//! Subtrack CLI - Subscription spend tracker
//!
//! Usage:
//!   subtrack init                                Initialize database
//!   subtrack subscriptions add Netflix -a 599    Track a subscription
//!   subtrack analytics monthly                   Spend for this month
//!   subtrack upcoming --days 14                  Charges in the next two weeks

mod cli;
mod commands;


use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::Parser;
use subtrack_core::models::Entitlement;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    if let Commands::Init = cli.command {
        return commands::cmd_init(&cli.db, cli.no_encrypt);
    }
    if let Commands::Templates = cli.command {
        return commands::cmd_templates();
    }

    let db = commands::open_db(&cli.db, cli.no_encrypt)?;
    let config = commands::load_config(cli.config.as_deref())?;
    let entitlement = Entitlement {
        is_premium: cli.premium,
    };
    let session = commands::Session::new(&db, config, cli.user, entitlement);
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Init | Commands::Templates => Ok(()),
        Commands::Subscriptions { action } => match action {
            None => commands::cmd_subscriptions_list(&session, None, false, None, today),
            Some(SubscriptionsAction::List {
                category,
                all,
                search,
            }) => commands::cmd_subscriptions_list(
                &session,
                category.as_deref(),
                all,
                search.as_deref(),
                today,
            ),
            Some(SubscriptionsAction::Add(args)) => {
                commands::cmd_subscriptions_add(&session, &args, today)
            }
            Some(SubscriptionsAction::Show { id }) => {
                commands::cmd_subscriptions_show(&session, id, today)
            }
            Some(SubscriptionsAction::Update(args)) => {
                commands::cmd_subscriptions_update(&session, &args)
            }
            Some(SubscriptionsAction::Cancel { id }) => {
                commands::cmd_subscriptions_cancel(&session, id)
            }
            Some(SubscriptionsAction::Activate { id }) => {
                commands::cmd_subscriptions_activate(&session, id)
            }
            Some(SubscriptionsAction::Purge { id, yes }) => {
                commands::cmd_subscriptions_purge(&session, id, yes)
            }
            Some(SubscriptionsAction::Categories) => commands::cmd_categories(&session),
            Some(SubscriptionsAction::Advance) => commands::cmd_advance(&session, today),
            Some(SubscriptionsAction::Overdue) => commands::cmd_overdue(&session, today),
        },
        Commands::Analytics { action } => match action {
            AnalyticsAction::Monthly { year, month } => commands::cmd_analytics_monthly(
                &session,
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month()),
            ),
            AnalyticsAction::Yearly { year } => {
                commands::cmd_analytics_yearly(&session, year.unwrap_or_else(|| today.year()))
            }
            AnalyticsAction::Trend { months } => {
                commands::cmd_analytics_trend(&session, months, today)
            }
            AnalyticsAction::Categories { period } => {
                let period = period.parse().map_err(|e: String| anyhow::anyhow!(e))?;
                commands::cmd_analytics_categories(&session, period, today)
            }
        },
        Commands::Upcoming { days } => commands::cmd_upcoming(&session, days, today),
        Commands::Savings => commands::cmd_savings(&session),
        Commands::Export { format, output } => {
            let format = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            commands::cmd_export(&session, format, output.as_deref())
        }
    }
}
