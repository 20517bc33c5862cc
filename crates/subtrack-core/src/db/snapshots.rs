//! Period analytics snapshot operations

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_date, parse_datetime, Database};
use crate::error::Result;
use crate::models::{Currency, PeriodSnapshot};
use crate::store::SnapshotStore;

impl SnapshotStore for Database {
    fn find_snapshot(
        &self,
        user_id: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<PeriodSnapshot>> {
        let conn = self.conn()?;
        let snapshot = conn
            .query_row(
                r#"
                SELECT user_id, period_start, period_end, total_spent, currency,
                       subscription_count, category_breakdown, computed_at
                FROM analytics_snapshots
                WHERE user_id = ? AND period_start = ? AND period_end = ?
                "#,
                params![user_id, period_start.to_string(), period_end.to_string()],
                row_to_snapshot,
            )
            .optional()?;
        Ok(snapshot.flatten())
    }

    fn upsert_snapshot(&self, snapshot: &PeriodSnapshot) -> Result<()> {
        let conn = self.conn()?;
        let breakdown = serde_json::to_string(&snapshot.category_breakdown)?;

        conn.execute(
            r#"
            INSERT INTO analytics_snapshots (
                user_id, period_start, period_end, total_spent, currency,
                subscription_count, category_breakdown, computed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, period_start, period_end) DO UPDATE SET
                total_spent = excluded.total_spent,
                currency = excluded.currency,
                subscription_count = excluded.subscription_count,
                category_breakdown = excluded.category_breakdown,
                computed_at = excluded.computed_at
            "#,
            params![
                snapshot.user_id,
                snapshot.period_start.to_string(),
                snapshot.period_end.to_string(),
                snapshot.total_spent,
                snapshot.currency.as_str(),
                snapshot.subscription_count,
                breakdown,
                format_datetime(&snapshot.computed_at),
            ],
        )?;
        Ok(())
    }

    fn list_snapshots(&self, user_id: i64) -> Result<Vec<PeriodSnapshot>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT user_id, period_start, period_end, total_spent, currency,
                   subscription_count, category_breakdown, computed_at
            FROM analytics_snapshots
            WHERE user_id = ?
            ORDER BY period_start DESC, period_end DESC
            "#,
        )?;
        let snapshots = stmt
            .query_map(params![user_id], row_to_snapshot)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(snapshots.into_iter().flatten().collect())
    }
}

/// Rows with unreadable period dates are dropped rather than failing the read
fn row_to_snapshot(row: &rusqlite::Row) -> rusqlite::Result<Option<PeriodSnapshot>> {
    let currency_str: String = row.get(4)?;
    let breakdown_json: String = row.get(6)?;
    let computed_at_str: String = row.get(7)?;

    let (Some(period_start), Some(period_end)) = (parse_date(row.get(1)?), parse_date(row.get(2)?))
    else {
        return Ok(None);
    };

    Ok(Some(PeriodSnapshot {
        user_id: row.get(0)?,
        period_start,
        period_end,
        total_spent: row.get(3)?,
        currency: currency_str.parse().unwrap_or(Currency::Rub),
        subscription_count: row.get(5)?,
        category_breakdown: serde_json::from_str::<BTreeMap<String, f64>>(&breakdown_json)
            .unwrap_or_default(),
        computed_at: parse_datetime(&computed_at_str),
    }))
}
