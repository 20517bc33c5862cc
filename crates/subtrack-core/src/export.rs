//! Export of subscriptions and stored analytics
//!
//! Supports:
//! - Subscription CSV export, one flat row per subscription
//! - JSON export with subscriptions and every stored period snapshot

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Billing, PeriodSnapshot, Subscription};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (valid: csv, json)", s)),
        }
    }
}

/// Flat subscription row for CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRow {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub subscription_type: String,
    pub frequency: String,
    pub next_billing_date: String,
    pub start_date: String,
    pub end_date: String,
    pub trial_start_date: String,
    pub trial_end_date: String,
    pub category: String,
    pub provider: String,
    pub is_active: bool,
    pub cancelled_at: String,
    pub created_at: String,
}

impl From<&Subscription> for SubscriptionRow {
    fn from(sub: &Subscription) -> Self {
        let text = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();

        let mut row = Self {
            id: sub.id,
            name: sub.name.clone(),
            amount: sub.amount,
            currency: sub.currency.as_str().to_string(),
            subscription_type: sub.subscription_type().as_str().to_string(),
            frequency: String::new(),
            next_billing_date: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            trial_start_date: String::new(),
            trial_end_date: String::new(),
            category: sub.category.clone().unwrap_or_default(),
            provider: sub.provider.clone().unwrap_or_default(),
            is_active: sub.is_active,
            cancelled_at: sub
                .cancelled_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            created_at: sub.created_at.to_rfc3339(),
        };

        match &sub.billing {
            Billing::Recurring(terms) => {
                row.frequency = terms.frequency.as_str().to_string();
                row.next_billing_date = text(terms.next_billing_date);
                row.trial_start_date = text(terms.trial.map(|t| t.start));
                row.trial_end_date = text(terms.trial.map(|t| t.end));
            }
            Billing::OneTime(terms) => {
                row.start_date = text(terms.start_date);
                row.end_date = text(terms.end_date);
            }
        }
        row
    }
}

/// Everything exported for one user in JSON form
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub user_id: i64,
    pub exported_at: DateTime<Utc>,
    pub subscriptions: Vec<Subscription>,
    pub snapshots: Vec<PeriodSnapshot>,
}

/// Write subscriptions as CSV with a header row
pub fn write_subscriptions_csv<W: Write>(subscriptions: &[Subscription], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for sub in subscriptions {
        csv.serialize(SubscriptionRow::from(sub))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the export document as pretty-printed JSON
pub fn write_json<W: Write>(document: &ExportDocument, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, document)?;
    Ok(())
}
