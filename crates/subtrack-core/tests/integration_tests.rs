//! Integration tests for subtrack-core
//!
//! These tests drive `SubscriptionTracker` against a real SQLite database:
//! create → evaluate → cache → project → advise.

use chrono::NaiveDate;
use subtrack_core::{
    config::UpcomingConfig,
    db::Database,
    models::{Billing, Currency, Entitlement, SubscriptionDraft},
    savings::{CONSOLIDATE_SUGGESTION, YEARLY_PLANS_SUGGESTION},
    BillingPatch, BreakdownPeriod, CachePolicy, EngineConfig, EngineEvent, Error, ExportFormat,
    FreeTierLimit, RecordingObserver, RecurringPatch, SnapshotStore, SubscriptionFilter,
    SubscriptionPatch, SubscriptionTracker,
};
use subtrack_core::validation::MAX_AMOUNT;

const USER: i64 = 1;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn premium() -> Entitlement {
    Entitlement::premium()
}

// =============================================================================
// Period analytics scenarios
// =============================================================================

#[test]
fn test_monthly_recurring_in_january() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("Netflix", 599.0, date(2025, 1, 15)),
        )
        .unwrap();

    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 599.0);
    assert_eq!(snapshot.subscription_count, 1);
    assert_eq!(snapshot.currency, Currency::Rub);
    assert_eq!(snapshot.category_breakdown["uncategorized"], 599.0);
}

#[test]
fn test_trial_overlap_counts_as_zero() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("Okko", 299.0, date(2025, 1, 15))
                .with_trial(date(2025, 1, 10), date(2025, 1, 20)),
        )
        .unwrap();

    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 0.0);
    assert_eq!(snapshot.subscription_count, 1);
}

#[test]
fn test_one_time_lands_in_its_month_only() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::one_time("Course", 5999.0, date(2025, 2, 1)).with_category("education"),
        )
        .unwrap();

    let january = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(january.total_spent, 0.0);
    assert_eq!(january.subscription_count, 0);

    let february = tracker.monthly_analytics(USER, 2025, 2).unwrap();
    assert_eq!(february.total_spent, 5999.0);
    assert_eq!(february.category_breakdown["education"], 5999.0);
}

#[test]
fn test_billing_date_on_window_end_is_included() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("Edge", 100.0, date(2025, 1, 31)),
        )
        .unwrap();

    assert_eq!(tracker.monthly_analytics(USER, 2025, 1).unwrap().total_spent, 100.0);
    assert_eq!(tracker.monthly_analytics(USER, 2025, 2).unwrap().total_spent, 0.0);
    assert_eq!(tracker.yearly_analytics(USER, 2025).unwrap().total_spent, 100.0);
}

#[test]
fn test_empty_user_gets_zero_snapshot() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 0.0);
    assert_eq!(snapshot.subscription_count, 0);
    assert!(snapshot.category_breakdown.is_empty());
}

#[test]
fn test_recompute_upserts_latest_values() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("A", 100.0, date(2025, 1, 5)))
        .unwrap();
    tracker.monthly_analytics(USER, 2025, 1).unwrap();

    tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("B", 50.0, date(2025, 1, 6)))
        .unwrap();
    tracker.monthly_analytics(USER, 2025, 1).unwrap();

    let stored = db.list_snapshots(USER).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].total_spent, 150.0);
    assert_eq!(stored[0].subscription_count, 2);
}

#[test]
fn test_reuse_cache_policy_returns_stored_snapshot() {
    let db = Database::in_memory().unwrap();
    let observer = RecordingObserver::default();
    let mut config = EngineConfig::default();
    config.analytics.cache_policy = CachePolicy::ReuseCache;
    let tracker = SubscriptionTracker::new(&db)
        .with_config(config)
        .with_observer(&observer);

    tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("A", 100.0, date(2025, 1, 5)))
        .unwrap();
    let first = tracker.monthly_analytics(USER, 2025, 1).unwrap();

    tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("B", 50.0, date(2025, 1, 6)))
        .unwrap();
    let second = tracker.monthly_analytics(USER, 2025, 1).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.total_spent, 100.0);
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, EngineEvent::SnapshotReused { .. })));
}

#[test]
fn test_inconsistent_subscription_is_skipped_and_reported() {
    let db = Database::in_memory().unwrap();
    let observer = RecordingObserver::default();
    let tracker = SubscriptionTracker::new(&db).with_observer(&observer);

    let good = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("Good", 10.0, date(2025, 1, 5)))
        .unwrap();
    let bad = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("Bad", 20.0, date(2025, 1, 6)))
        .unwrap();

    // Corrupt the stored row behind the engine's back
    let conn = db.conn().unwrap();
    conn.execute(
        "UPDATE subscriptions SET next_billing_date = NULL WHERE id = ?",
        [bad.id],
    )
    .unwrap();
    drop(conn);

    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 10.0);
    assert_eq!(snapshot.subscription_count, 1);
    assert!(observer.events().iter().any(|e| matches!(
        e,
        EngineEvent::DataInconsistency { subscription_id, .. } if *subscription_id == bad.id
    )));
    assert!(good.id != bad.id);
}

#[test]
fn test_stored_broken_trial_is_skipped_and_reported() {
    let db = Database::in_memory().unwrap();
    let observer = RecordingObserver::default();
    let tracker = SubscriptionTracker::new(&db).with_observer(&observer);

    let sub = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("Okko", 299.0, date(2025, 1, 15)))
        .unwrap();

    // Trial flagged with an end before its start
    let conn = db.conn().unwrap();
    conn.execute(
        r#"
        UPDATE subscriptions
        SET has_trial = 1, trial_start_date = '2025-01-20', trial_end_date = '2025-01-10'
        WHERE id = ?
        "#,
        [sub.id],
    )
    .unwrap();
    drop(conn);

    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 0.0);
    assert_eq!(snapshot.subscription_count, 0);
    assert!(observer.events().iter().any(|e| matches!(
        e,
        EngineEvent::DataInconsistency { subscription_id, .. } if *subscription_id == sub.id
    )));

    // An update has to repair the trial before it is accepted
    let rename = SubscriptionPatch {
        name: Some("Okko HD".into()),
        ..Default::default()
    };
    assert!(matches!(
        tracker.update(USER, sub.id, &rename),
        Err(Error::Validation { .. })
    ));
    let drop_trial = SubscriptionPatch {
        billing: Some(BillingPatch::Recurring(RecurringPatch {
            has_trial: Some(false),
            ..Default::default()
        })),
        ..Default::default()
    };
    tracker.update(USER, sub.id, &drop_trial).unwrap();
    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 299.0);
}

#[test]
fn test_reuse_cache_ignores_snapshot_in_other_currency() {
    let db = Database::in_memory().unwrap();
    let mut config = EngineConfig::default();
    config.analytics.cache_policy = CachePolicy::ReuseCache;
    let rub_tracker = SubscriptionTracker::new(&db).with_config(config.clone());

    rub_tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("Rub", 100.0, date(2025, 1, 5)))
        .unwrap();
    rub_tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("Usd", 10.0, date(2025, 1, 5)).with_currency("USD"),
        )
        .unwrap();
    let rub = rub_tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(rub.currency, Currency::Rub);

    config.analytics.reporting_currency = Currency::Usd;
    let observer = RecordingObserver::default();
    let usd_tracker = SubscriptionTracker::new(&db)
        .with_config(config)
        .with_observer(&observer);
    let usd = usd_tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(usd.currency, Currency::Usd);
    assert_eq!(usd.total_spent, 10.0);
    assert!(!observer
        .events()
        .iter()
        .any(|e| matches!(e, EngineEvent::SnapshotReused { .. })));
}

#[test]
fn test_largest_amounts_sum_without_overflow() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let huge = SubscriptionDraft::recurring("Huge", 6e16, date(2025, 1, 15));
    assert!(matches!(
        tracker.create(USER, premium(), &huge),
        Err(Error::Validation { .. })
    ));

    for name in ["A", "B", "C"] {
        tracker
            .create(
                USER,
                premium(),
                &SubscriptionDraft::recurring(name, MAX_AMOUNT, date(2025, 1, 15)),
            )
            .unwrap();
    }

    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 3.0 * MAX_AMOUNT);
    let groups = tracker.upcoming(USER, 30, date(2025, 1, 1)).unwrap();
    assert_eq!(groups[0].total_amount, 3.0 * MAX_AMOUNT);
    let advice = tracker.savings(USER, premium()).unwrap();
    assert_eq!(advice.total_monthly_spending, 3.0 * MAX_AMOUNT);
}

#[test]
fn test_other_currencies_left_out_of_totals() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("Rub", 100.0, date(2025, 1, 5)))
        .unwrap();
    tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("Usd", 10.0, date(2025, 1, 5)).with_currency("USD"),
        )
        .unwrap();

    let snapshot = tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 100.0);

    let mut config = EngineConfig::default();
    config.analytics.reporting_currency = Currency::Usd;
    let usd_tracker = SubscriptionTracker::new(&db).with_config(config);
    let snapshot = usd_tracker.monthly_analytics(USER, 2025, 1).unwrap();
    assert_eq!(snapshot.total_spent, 10.0);
    assert_eq!(snapshot.currency, Currency::Usd);
}

#[test]
fn test_trend_oldest_first() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("A", 100.0, date(2025, 2, 10)))
        .unwrap();

    let trend = tracker.trend(USER, 3, date(2025, 3, 15)).unwrap();
    let totals: Vec<(NaiveDate, f64)> = trend.iter().map(|s| (s.period_start, s.total_spent)).collect();
    assert_eq!(
        totals,
        vec![
            (date(2025, 1, 1), 0.0),
            (date(2025, 2, 1), 100.0),
            (date(2025, 3, 1), 0.0),
        ]
    );

    let err = tracker.trend(USER, 25, date(2025, 3, 15)).unwrap_err();
    assert_eq!(err.field(), Some("months"));
}

#[test]
fn test_category_breakdown_shortcut() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("A", 100.0, date(2025, 3, 10)).with_category("video"),
        )
        .unwrap();
    tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("B", 30.0, date(2025, 7, 1)).with_category("music"),
        )
        .unwrap();

    let month = tracker
        .category_breakdown(USER, BreakdownPeriod::Month, date(2025, 3, 1))
        .unwrap();
    assert_eq!(month.len(), 1);
    assert_eq!(month["video"], 100.0);

    let year = tracker
        .category_breakdown(USER, BreakdownPeriod::Year, date(2025, 3, 1))
        .unwrap();
    assert_eq!(year.len(), 2);
    assert_eq!(year["music"], 30.0);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_free_tier_limit_counts_inactive() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);
    let free = Entitlement::free();

    for i in 0..5 {
        let sub = tracker
            .create(
                USER,
                free,
                &SubscriptionDraft::recurring(format!("S{}", i), 10.0, date(2025, 1, 5)),
            )
            .unwrap();
        if i == 0 {
            tracker.cancel(USER, sub.id).unwrap();
        }
    }

    let err = tracker
        .create(USER, free, &SubscriptionDraft::recurring("S5", 10.0, date(2025, 1, 5)))
        .unwrap_err();
    assert!(matches!(err, Error::Entitlement(_)));

    // Premium and unlimited configs are not capped
    tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("S5", 10.0, date(2025, 1, 5)))
        .unwrap();
    let mut config = EngineConfig::default();
    config.free_tier = FreeTierLimit::Unlimited;
    SubscriptionTracker::new(&db)
        .with_config(config)
        .create(USER, free, &SubscriptionDraft::recurring("S6", 10.0, date(2025, 1, 5)))
        .unwrap();

    // The limit is per user
    tracker
        .create(2, free, &SubscriptionDraft::recurring("Other", 10.0, date(2025, 1, 5)))
        .unwrap();
}

#[test]
fn test_create_rejects_invalid_draft() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let err = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("A", 0.0, date(2025, 1, 5)))
        .unwrap_err();
    assert_eq!(err.field(), Some("amount"));
    assert!(tracker.list(USER, &SubscriptionFilter::default()).unwrap().is_empty());
}

#[test]
fn test_cancel_activate_purge() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let sub = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("A", 10.0, date(2025, 1, 5)))
        .unwrap();

    let cancelled = tracker.cancel(USER, sub.id).unwrap();
    assert!(!cancelled.is_active);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(tracker.monthly_analytics(USER, 2025, 1).unwrap().total_spent, 0.0);

    let activated = tracker.activate(USER, sub.id).unwrap();
    assert!(activated.is_active);
    assert!(activated.cancelled_at.is_none());
    assert_eq!(tracker.monthly_analytics(USER, 2025, 1).unwrap().total_spent, 10.0);

    tracker.purge(USER, sub.id).unwrap();
    assert!(matches!(tracker.get(USER, sub.id), Err(Error::NotFound(_))));
    assert!(matches!(tracker.purge(USER, sub.id), Err(Error::NotFound(_))));
}

#[test]
fn test_lifecycle_is_scoped_to_owner() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let sub = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("A", 10.0, date(2025, 1, 5)))
        .unwrap();

    assert!(matches!(tracker.get(2, sub.id), Err(Error::NotFound(_))));
    assert!(matches!(tracker.cancel(2, sub.id), Err(Error::NotFound(_))));
    assert!(matches!(
        tracker.update(2, sub.id, &SubscriptionPatch::default()),
        Err(Error::NotFound(_))
    ));
    assert!(tracker.get(USER, sub.id).unwrap().is_active);
}

#[test]
fn test_update_applies_typed_patch() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let sub = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("A", 10.0, date(2025, 1, 5)))
        .unwrap();

    let patch = SubscriptionPatch {
        name: Some("Renamed".into()),
        billing: Some(BillingPatch::Recurring(RecurringPatch {
            next_billing_date: Some(date(2025, 2, 5)),
            frequency: Some("yearly".into()),
            ..Default::default()
        })),
        ..Default::default()
    };
    let updated = tracker.update(USER, sub.id, &patch).unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.next_billing_date(), Some(date(2025, 2, 5)));
    assert_eq!(updated.created_at, sub.created_at);
    assert!(updated.updated_at.is_some());

    let bad = SubscriptionPatch {
        amount: Some(-5.0),
        ..Default::default()
    };
    assert_eq!(
        tracker.update(USER, sub.id, &bad).unwrap_err().field(),
        Some("amount")
    );
    assert_eq!(tracker.get(USER, sub.id).unwrap().amount, 10.0);
}

#[test]
fn test_advance_billing_dates() {
    let db = Database::in_memory().unwrap();
    let observer = RecordingObserver::default();
    let tracker = SubscriptionTracker::new(&db).with_observer(&observer);

    let monthly = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("M", 10.0, date(2025, 1, 31)))
        .unwrap();
    let future = tracker
        .create(USER, premium(), &SubscriptionDraft::recurring("F", 10.0, date(2025, 6, 1)))
        .unwrap();

    let today = date(2025, 3, 15);
    assert_eq!(tracker.overdue(USER, today).unwrap().len(), 1);

    let advanced = tracker.advance_billing_dates(USER, today).unwrap();
    assert_eq!(advanced.len(), 1);
    assert_eq!(advanced[0].id, monthly.id);

    // Stepped from the Jan 31 anchor, so the month end is kept
    assert_eq!(
        tracker.get(USER, monthly.id).unwrap().next_billing_date(),
        Some(date(2025, 3, 31))
    );
    assert_eq!(
        tracker.get(USER, future.id).unwrap().next_billing_date(),
        Some(date(2025, 6, 1))
    );
    assert!(tracker.overdue(USER, today).unwrap().is_empty());
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, EngineEvent::BillingDateAdvanced { .. })));
}

#[test]
fn test_categories() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    for (name, category) in [("A", "video"), ("B", "music"), ("C", "video")] {
        tracker
            .create(
                USER,
                premium(),
                &SubscriptionDraft::recurring(name, 1.0, date(2025, 1, 1)).with_category(category),
            )
            .unwrap();
    }

    assert_eq!(tracker.categories(USER).unwrap(), vec!["music", "video"]);
    assert_eq!(tracker.templates().len(), 5);
}

// =============================================================================
// Upcoming payments & savings
// =============================================================================

#[test]
fn test_upcoming_payments_grouped() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);
    let today = date(2025, 1, 10);

    for (name, amount, next) in [
        ("Zoom", 100.0, date(2025, 1, 12)),
        ("Apple", 50.0, date(2025, 1, 12)),
        ("Netflix", 599.0, date(2025, 1, 11)),
        ("Far", 1.0, date(2025, 6, 1)),
    ] {
        tracker
            .create(USER, premium(), &SubscriptionDraft::recurring(name, amount, next))
            .unwrap();
    }

    let groups = tracker.upcoming(USER, 30, today).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].date, date(2025, 1, 11));
    assert_eq!(groups[1].count, 2);
    assert_eq!(groups[1].total_amount, 150.0);
    assert_eq!(groups[1].subscriptions[0].name, "Apple");

    let bounds = UpcomingConfig::default();
    for days in [0, i64::from(bounds.max_horizon_days) + 1] {
        assert_eq!(
            tracker.upcoming(USER, days, today).unwrap_err().field(),
            Some("days")
        );
    }
}

#[test]
fn test_savings_three_monthly_at_500() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    for name in ["A", "B", "C"] {
        tracker
            .create(USER, premium(), &SubscriptionDraft::recurring(name, 500.0, date(2025, 1, 5)))
            .unwrap();
    }

    let advice = tracker.savings(USER, premium()).unwrap();
    assert_eq!(advice.potential_savings, 1800.0);
    assert_eq!(advice.subscription_count, 3);
    assert_eq!(advice.suggestions, vec![YEARLY_PLANS_SUGGESTION.to_string()]);
}

#[test]
fn test_savings_requires_premium() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);
    assert!(matches!(
        tracker.savings(USER, Entitlement::free()),
        Err(Error::Entitlement(_))
    ));
}

#[test]
fn test_savings_consolidation_suggestion() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    for i in 0..11 {
        tracker
            .create(
                USER,
                premium(),
                &SubscriptionDraft::recurring(format!("S{}", i), 10.0, date(2025, 1, 5))
                    .with_frequency("yearly"),
            )
            .unwrap();
    }

    let advice = tracker.savings(USER, premium()).unwrap();
    assert_eq!(advice.suggestions, vec![CONSOLIDATE_SUGGESTION.to_string()]);
    assert_eq!(advice.total_yearly_spending, 110.0);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_csv_and_json() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let sub = tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::recurring("Netflix", 599.0, date(2025, 1, 15)),
        )
        .unwrap();
    tracker.monthly_analytics(USER, 2025, 1).unwrap();

    let mut csv = Vec::new();
    let count = tracker.export(USER, premium(), ExportFormat::Csv, &mut csv).unwrap();
    assert_eq!(count, 1);
    assert!(String::from_utf8(csv).unwrap().contains("Netflix"));

    let mut json = Vec::new();
    tracker.export(USER, premium(), ExportFormat::Json, &mut json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["subscriptions"][0]["id"], sub.id);
    assert_eq!(value["snapshots"][0]["total_spent"], 599.0);

    let mut sink = Vec::new();
    assert!(matches!(
        tracker.export(USER, Entitlement::free(), ExportFormat::Csv, &mut sink),
        Err(Error::Entitlement(_))
    ));
    assert!(sink.is_empty());
}

#[test]
fn test_one_time_round_trips_through_storage() {
    let db = Database::in_memory().unwrap();
    let tracker = SubscriptionTracker::new(&db);

    let sub = tracker
        .create(
            USER,
            premium(),
            &SubscriptionDraft::one_time("Course", 5999.0, date(2025, 2, 1)).with_duration("weeks", 4),
        )
        .unwrap();

    let Billing::OneTime(terms) = &sub.billing else {
        panic!("expected one-time");
    };
    assert_eq!(terms.end_date, Some(date(2025, 3, 1)));

    let groups = tracker.upcoming(USER, 30, date(2025, 1, 20)).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].date, date(2025, 2, 1));
}
