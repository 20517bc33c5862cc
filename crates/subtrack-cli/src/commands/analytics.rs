//! Analytics, upcoming payment and savings command implementations

use anyhow::Result;
use chrono::NaiveDate;
use subtrack_core::models::PeriodSnapshot;
use subtrack_core::BreakdownPeriod;

use super::{truncate, Session};

fn print_breakdown(snapshot: &PeriodSnapshot) {
    if snapshot.category_breakdown.is_empty() {
        return;
    }

    let mut categories: Vec<(&String, &f64)> = snapshot.category_breakdown.iter().collect();
    categories.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!();
    for (category, amount) in categories {
        let pct = if snapshot.total_spent > 0.0 {
            amount / snapshot.total_spent * 100.0
        } else {
            0.0
        };
        println!(
            "   {:20} {:>12.2} {} ({:>5.1}%)",
            truncate(category, 20),
            amount,
            snapshot.currency,
            pct
        );
    }
}

fn print_snapshot(title: &str, snapshot: &PeriodSnapshot) {
    println!();
    println!("📊 {}", title);
    println!(
        "   Period: {} to {}",
        snapshot.period_start, snapshot.period_end
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Total:         {:.2} {}",
        snapshot.total_spent, snapshot.currency
    );
    println!("   Subscriptions: {}", snapshot.subscription_count);
    print_breakdown(snapshot);
}

pub fn cmd_analytics_monthly(session: &Session, year: i32, month: u32) -> Result<()> {
    let snapshot = session
        .tracker()
        .monthly_analytics(session.user_id, year, month)?;
    print_snapshot(&format!("Monthly Spend {}-{:02}", year, month), &snapshot);
    Ok(())
}

pub fn cmd_analytics_yearly(session: &Session, year: i32) -> Result<()> {
    let snapshot = session.tracker().yearly_analytics(session.user_id, year)?;
    print_snapshot(&format!("Yearly Spend {}", year), &snapshot);
    Ok(())
}

pub fn cmd_analytics_trend(session: &Session, months: u32, today: NaiveDate) -> Result<()> {
    let snapshots = session.tracker().trend(session.user_id, months, today)?;

    let max = snapshots
        .iter()
        .map(|s| s.total_spent)
        .fold(0.0_f64, f64::max);

    println!();
    println!("📈 Spending Trend ({} months)", months);
    println!("   ─────────────────────────────────────────────────────────────");

    for snapshot in &snapshots {
        let bar_len = if max > 0.0 {
            ((snapshot.total_spent / max) * 30.0).round() as usize
        } else {
            0
        };
        println!(
            "   {} │ {:>12.2} {} │ {}",
            snapshot.period_start.format("%Y-%m"),
            snapshot.total_spent,
            snapshot.currency,
            "█".repeat(bar_len)
        );
    }

    Ok(())
}

pub fn cmd_analytics_categories(
    session: &Session,
    period: BreakdownPeriod,
    today: NaiveDate,
) -> Result<()> {
    let breakdown = session
        .tracker()
        .category_breakdown(session.user_id, period, today)?;
    let currency = session.config.analytics.reporting_currency;

    let label = match period {
        BreakdownPeriod::Month => today.format("%Y-%m").to_string(),
        BreakdownPeriod::Year => today.format("%Y").to_string(),
    };

    println!();
    println!("🏷️  Spend by Category ({})", label);
    println!("   ─────────────────────────────────────────────────────────────");

    if breakdown.is_empty() {
        println!("   No charges in this period.");
        return Ok(());
    }

    let mut categories: Vec<(String, f64)> = breakdown.into_iter().collect();
    categories.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (category, amount) in categories {
        println!("   {:20} {:>12.2} {}", truncate(&category, 20), amount, currency);
    }

    Ok(())
}

pub fn cmd_upcoming(session: &Session, days: Option<i64>, today: NaiveDate) -> Result<()> {
    let days = days.unwrap_or_else(|| i64::from(session.config.upcoming.default_horizon_days));
    let groups = session.tracker().upcoming(session.user_id, days, today)?;

    println!();
    println!("📅 Upcoming Payments (next {} days)", days);
    println!("   ─────────────────────────────────────────────────────────────");

    if groups.is_empty() {
        println!("   Nothing due.");
        return Ok(());
    }

    for group in &groups {
        let totals: Vec<String> = group
            .by_currency
            .iter()
            .map(|(currency, amount)| format!("{:.2} {}", amount, currency))
            .collect();
        println!("   {} │ {}", group.date, totals.join(" + "));

        for payment in &group.subscriptions {
            let trial = if payment.in_trial { " (trial)" } else { "" };
            println!(
                "      {:20} {:>10.2} {}{}",
                truncate(&payment.name, 20),
                payment.amount,
                payment.currency,
                trial
            );
        }
    }

    Ok(())
}

pub fn cmd_savings(session: &Session) -> Result<()> {
    let advice = session
        .tracker()
        .savings(session.user_id, session.entitlement)?;
    let currency = session.config.analytics.reporting_currency;

    println!();
    println!("💰 Savings Analysis");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Monthly spending:   {:>12.2} {}",
        advice.total_monthly_spending, currency
    );
    println!(
        "   Yearly spending:    {:>12.2} {}",
        advice.total_yearly_spending, currency
    );
    println!(
        "   All plans, per month: {:>10.2} {}",
        advice.monthly_equivalent_spending, currency
    );
    println!(
        "   All plans, per year:  {:>10.2} {}",
        advice.yearly_equivalent_spending, currency
    );
    println!(
        "   Potential savings:  {:>12.2} {}/year",
        advice.potential_savings, currency
    );
    println!(
        "   {} subscription(s) in {} categories",
        advice.subscription_count, advice.category_count
    );

    if !advice.lines.is_empty() {
        println!();
        println!("   Switch to yearly billing:");
        for line in &advice.lines {
            println!(
                "   {:20} {:>10.2} → {:>10.2}  (save {:.2})",
                truncate(&line.name, 20),
                line.billed_monthly_per_year,
                line.billed_yearly,
                line.savings
            );
        }
    }

    if !advice.suggestions.is_empty() {
        println!();
        for suggestion in &advice.suggestions {
            println!("   💡 {}", suggestion);
        }
    }

    Ok(())
}
