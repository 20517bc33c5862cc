//! Subscription operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{
    Billing, Currency, DurationUnit, Frequency, Interval, IntervalUnit, NewSubscription,
    OneTimeTerms, RecurringTerms, Subscription, SubscriptionType, Term, TrialPeriod,
};
use crate::store::{DeleteMode, SubscriptionFilter, SubscriptionRepository};

const COLUMNS: &str = r#"
    id, user_id, name, description, amount, currency, subscription_type,
    next_billing_date, frequency, interval_unit, interval_count,
    has_trial, trial_start_date, trial_end_date,
    start_date, duration_type, duration_value, end_date,
    category, provider, logo_url, website_url,
    is_active, cancelled_at, created_at, updated_at
"#;

/// Column values for the variant-specific part of a row
#[derive(Default)]
struct BillingColumns {
    subscription_type: &'static str,
    next_billing_date: Option<String>,
    frequency: Option<&'static str>,
    interval_unit: Option<&'static str>,
    interval_count: Option<u32>,
    has_trial: bool,
    trial_start_date: Option<String>,
    trial_end_date: Option<String>,
    start_date: Option<String>,
    duration_type: Option<&'static str>,
    duration_value: Option<u32>,
    end_date: Option<String>,
}

impl BillingColumns {
    fn from_billing(billing: &Billing) -> Self {
        match billing {
            Billing::Recurring(terms) => Self {
                subscription_type: SubscriptionType::Recurring.as_str(),
                next_billing_date: terms.next_billing_date.map(|d| d.to_string()),
                frequency: Some(terms.frequency.as_str()),
                interval_unit: terms.interval.map(|i| i.unit.as_str()),
                interval_count: terms.interval.map(|i| i.count),
                has_trial: terms.trial.is_some() || terms.trial_inconsistent,
                trial_start_date: terms.trial.map(|t| t.start.to_string()),
                trial_end_date: terms.trial.map(|t| t.end.to_string()),
                ..Default::default()
            },
            Billing::OneTime(terms) => Self {
                subscription_type: SubscriptionType::OneTime.as_str(),
                start_date: terms.start_date.map(|d| d.to_string()),
                duration_type: Some(terms.term.duration_type()),
                duration_value: terms.term.duration_value(),
                end_date: terms.end_date.map(|d| d.to_string()),
                ..Default::default()
            },
        }
    }
}

impl SubscriptionRepository for Database {
    fn list_active(&self, user_id: i64) -> Result<Vec<Subscription>> {
        self.list(user_id, &SubscriptionFilter::active())
    }

    fn list(&self, user_id: i64, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;

        let mut query = format!("SELECT {} FROM subscriptions WHERE user_id = ?", COLUMNS);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(category) = &filter.category {
            query.push_str(" AND category = ?");
            params_vec.push(Box::new(category.clone()));
        }
        if let Some(active) = filter.active {
            query.push_str(" AND is_active = ?");
            params_vec.push(Box::new(active));
        }
        query.push_str(" ORDER BY is_active DESC, next_billing_date IS NULL, next_billing_date, id");

        let mut stmt = conn.prepare(&query)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut subscriptions = stmt
            .query_map(params_refs.as_slice(), row_to_subscription)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // SQLite's LIKE folds ASCII only; match in Rust so Cyrillic names search too
        if filter.search.is_some() {
            subscriptions.retain(|s| filter.matches(s));
        }

        Ok(subscriptions)
    }

    fn count(&self, user_id: i64) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM subscriptions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn get_by_id(&self, user_id: i64, id: i64) -> Result<Option<Subscription>> {
        let conn = self.conn()?;
        let subscription = conn
            .query_row(
                &format!(
                    "SELECT {} FROM subscriptions WHERE id = ? AND user_id = ?",
                    COLUMNS
                ),
                params![id, user_id],
                row_to_subscription,
            )
            .optional()?;
        Ok(subscription)
    }

    fn insert(&self, user_id: i64, subscription: &NewSubscription) -> Result<Subscription> {
        let conn = self.conn()?;
        let billing = BillingColumns::from_billing(&subscription.billing);
        let now = format_datetime(&Utc::now());

        conn.execute(
            r#"
            INSERT INTO subscriptions (
                user_id, name, description, amount, currency, subscription_type,
                next_billing_date, frequency, interval_unit, interval_count,
                has_trial, trial_start_date, trial_end_date,
                start_date, duration_type, duration_value, end_date,
                category, provider, logo_url, website_url,
                is_active, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                subscription.name,
                subscription.description,
                subscription.amount,
                subscription.currency.as_str(),
                billing.subscription_type,
                billing.next_billing_date,
                billing.frequency,
                billing.interval_unit,
                billing.interval_count,
                billing.has_trial,
                billing.trial_start_date,
                billing.trial_end_date,
                billing.start_date,
                billing.duration_type,
                billing.duration_value,
                billing.end_date,
                subscription.category,
                subscription.provider,
                subscription.logo_url,
                subscription.website_url,
                subscription.is_active,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_by_id(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("subscription {}", id)))
    }

    fn save(&self, subscription: &Subscription) -> Result<()> {
        let conn = self.conn()?;
        let billing = BillingColumns::from_billing(&subscription.billing);

        let updated = conn.execute(
            r#"
            UPDATE subscriptions SET
                name = ?, description = ?, amount = ?, currency = ?, subscription_type = ?,
                next_billing_date = ?, frequency = ?, interval_unit = ?, interval_count = ?,
                has_trial = ?, trial_start_date = ?, trial_end_date = ?,
                start_date = ?, duration_type = ?, duration_value = ?, end_date = ?,
                category = ?, provider = ?, logo_url = ?, website_url = ?,
                is_active = ?, cancelled_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                subscription.name,
                subscription.description,
                subscription.amount,
                subscription.currency.as_str(),
                billing.subscription_type,
                billing.next_billing_date,
                billing.frequency,
                billing.interval_unit,
                billing.interval_count,
                billing.has_trial,
                billing.trial_start_date,
                billing.trial_end_date,
                billing.start_date,
                billing.duration_type,
                billing.duration_value,
                billing.end_date,
                subscription.category,
                subscription.provider,
                subscription.logo_url,
                subscription.website_url,
                subscription.is_active,
                subscription.cancelled_at.as_ref().map(format_datetime),
                format_datetime(&Utc::now()),
                subscription.id,
                subscription.user_id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("subscription {}", subscription.id)));
        }
        Ok(())
    }

    fn delete(&self, user_id: i64, id: i64, mode: DeleteMode) -> Result<bool> {
        let conn = self.conn()?;
        let affected = match mode {
            DeleteMode::Soft => {
                let now = format_datetime(&Utc::now());
                conn.execute(
                    r#"
                    UPDATE subscriptions SET
                        cancelled_at = CASE WHEN is_active = 1 THEN ? ELSE cancelled_at END,
                        is_active = 0,
                        updated_at = ?
                    WHERE id = ? AND user_id = ?
                    "#,
                    params![now, now, id, user_id],
                )?
            }
            DeleteMode::Hard => conn.execute(
                "DELETE FROM subscriptions WHERE id = ? AND user_id = ?",
                params![id, user_id],
            )?,
        };
        Ok(affected > 0)
    }

    fn categories(&self, user_id: i64) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT category FROM subscriptions
            WHERE user_id = ? AND category IS NOT NULL AND TRIM(category) != ''
            ORDER BY category
            "#,
        )?;
        let categories = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(categories)
    }
}

/// Map a row to a subscription
///
/// Lenient: unknown enum values and half-filled variant columns fall back to
/// the closest valid shape instead of failing the whole listing.
fn row_to_subscription(row: &rusqlite::Row) -> rusqlite::Result<Subscription> {
    let currency_str: String = row.get(5)?;
    let type_str: String = row.get(6)?;
    let frequency_str: Option<String> = row.get(8)?;
    let interval_unit_str: Option<String> = row.get(9)?;
    let interval_count: Option<i64> = row.get(10)?;
    let has_trial: bool = row.get(11)?;
    let duration_type_str: Option<String> = row.get(15)?;
    let duration_value: Option<i64> = row.get(16)?;
    let cancelled_at_str: Option<String> = row.get(23)?;
    let created_at_str: String = row.get(24)?;
    let updated_at_str: Option<String> = row.get(25)?;

    let billing = match type_str.parse().unwrap_or(SubscriptionType::Recurring) {
        SubscriptionType::Recurring => {
            let interval = interval_unit_str
                .and_then(|u| u.parse::<IntervalUnit>().ok())
                .map(|unit| Interval {
                    unit,
                    count: interval_count
                        .and_then(|c| u32::try_from(c).ok())
                        .filter(|c| *c >= 1)
                        .unwrap_or(1),
                });
            let frequency = frequency_str
                .and_then(|f| f.parse::<Frequency>().ok())
                .or_else(|| interval.map(|i| i.unit.frequency()))
                .unwrap_or(Frequency::Monthly);
            let trial = match (
                has_trial,
                parse_date(row.get(12)?),
                parse_date(row.get(13)?),
            ) {
                (true, Some(start), Some(end)) if start <= end => Some(TrialPeriod { start, end }),
                _ => None,
            };
            Billing::Recurring(RecurringTerms {
                next_billing_date: parse_date(row.get(7)?),
                frequency,
                interval,
                trial_inconsistent: has_trial && trial.is_none(),
                trial,
            })
        }
        SubscriptionType::OneTime => {
            let term = match (
                duration_type_str.and_then(|t| t.parse::<DurationUnit>().ok()),
                duration_value.and_then(|v| u32::try_from(v).ok()).filter(|v| *v >= 1),
            ) {
                (Some(unit), Some(value)) => Term::Fixed { unit, value },
                _ => Term::Indefinite,
            };
            Billing::OneTime(OneTimeTerms {
                start_date: parse_date(row.get(14)?),
                term,
                end_date: parse_date(row.get(17)?),
            })
        }
    };

    Ok(Subscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        currency: currency_str.parse().unwrap_or(Currency::Rub),
        billing,
        category: row.get(18)?,
        provider: row.get(19)?,
        logo_url: row.get(20)?,
        website_url: row.get(21)?,
        is_active: row.get(22)?,
        cancelled_at: cancelled_at_str.map(|s| parse_datetime(&s)),
        created_at: parse_datetime(&created_at_str),
        updated_at: updated_at_str.map(|s| parse_datetime(&s)),
    })
}
