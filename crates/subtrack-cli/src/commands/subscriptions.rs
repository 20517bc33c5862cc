//! Subscription command implementations

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use subtrack_core::models::{
    Billing, BillingStatus, Frequency, Subscription, SubscriptionDraft, SubscriptionType,
};
use subtrack_core::upcoming::billing_status;
use subtrack_core::{
    find_template, BillingPatch, Cadence, OneTimePatch, RecurringPatch, SubscriptionFilter,
    SubscriptionPatch,
};

use super::{parse_date, truncate, Session};
use crate::cli::{AddArgs, UpdateArgs};

/// Cadence as shown in listings: "monthly", "every 2 weeks", "one-time"
pub fn describe_cadence(sub: &Subscription) -> String {
    match &sub.billing {
        Billing::Recurring(terms) => match terms.interval {
            Some(interval) if interval.count > 1 => {
                format!("every {} {}s", interval.count, interval.unit.as_str())
            }
            Some(interval) => interval.unit.frequency().as_str().to_string(),
            None => terms.frequency.as_str().to_string(),
        },
        Billing::OneTime(_) => "one-time".to_string(),
    }
}

/// Recurring amount spread over a month; `None` for one-time purchases
pub fn monthly_cost(sub: &Subscription) -> Option<f64> {
    sub.recurring()
        .map(|terms| Cadence::of(terms).monthly_equivalent(sub.amount))
}

fn status_icon(sub: &Subscription, today: NaiveDate) -> &'static str {
    if !sub.is_active {
        return "❌";
    }
    match billing_status(sub, today) {
        Some((BillingStatus::Overdue, _)) => "⚠️ ",
        Some((BillingStatus::Due, _)) => "⏰",
        Some((BillingStatus::Upcoming, _)) => "✅",
        None => "❔",
    }
}

fn charge_date_label(sub: &Subscription) -> String {
    match &sub.billing {
        Billing::Recurring(terms) => terms
            .next_billing_date
            .map(|d| format!("next {}", d))
            .unwrap_or_else(|| "no billing date".to_string()),
        Billing::OneTime(terms) => terms
            .start_date
            .map(|d| format!("on {}", d))
            .unwrap_or_else(|| format!("on {}", sub.created_at.date_naive())),
    }
}

pub fn cmd_subscriptions_list(
    session: &Session,
    category: Option<&str>,
    include_cancelled: bool,
    search: Option<&str>,
    today: NaiveDate,
) -> Result<()> {
    let filter = SubscriptionFilter {
        category: category.map(str::to_string),
        active: if include_cancelled { None } else { Some(true) },
        search: search.map(str::to_string),
    };
    let subscriptions = session.tracker().list(session.user_id, &filter)?;

    if subscriptions.is_empty() {
        println!("No subscriptions found. Add one with:");
        println!("  subtrack subscriptions add Netflix --amount 599 --next YYYY-MM-DD");
        return Ok(());
    }

    println!();
    println!("📋 Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for sub in &subscriptions {
        let per_month = monthly_cost(sub)
            .map(|m| format!("≈{:.2}/mo", m))
            .unwrap_or_default();
        println!(
            "   {} {:>4} {:20} │ {:>10.2} {} │ {:<14} │ {:>14} │ {}",
            status_icon(sub, today),
            sub.id,
            truncate(&sub.name, 20),
            sub.amount,
            sub.currency,
            describe_cadence(sub),
            per_month,
            charge_date_label(sub)
        );
    }

    println!();
    println!("   {} subscription(s)", subscriptions.len());
    Ok(())
}

/// Build a creation draft from command-line arguments
pub fn build_draft(args: &AddArgs, today: NaiveDate) -> Result<SubscriptionDraft> {
    let next = parse_date(args.next.as_deref(), "next")?;

    let mut draft = match &args.template {
        Some(key) => {
            let template = find_template(key)
                .with_context(|| format!("Unknown template: {} (see: subtrack templates)", key))?;
            template.draft(next.unwrap_or(today))
        }
        None => SubscriptionDraft {
            name: args
                .name
                .clone()
                .context("A subscription name is required (or use --template)")?,
            amount: args.amount.context("--amount is required")?,
            ..Default::default()
        },
    };

    if let Some(name) = &args.name {
        draft.name = name.clone();
    }
    if let Some(amount) = args.amount {
        draft.amount = amount;
    }
    draft.currency = args.currency.clone();

    if args.one_time {
        draft.subscription_type = SubscriptionType::OneTime.as_str().to_string();
        draft.next_billing_date = None;
        draft.frequency = None;
        draft.start_date = parse_date(args.start.as_deref(), "start")?;
        draft.duration_type = args.duration_type.clone();
        draft.duration_value = args.duration_value;
        draft.end_date = parse_date(args.end.as_deref(), "end")?;
    } else {
        if next.is_some() {
            draft.next_billing_date = next;
        }
        if args.frequency.is_some() {
            draft.frequency = args.frequency.clone();
        } else if draft.frequency.is_none() && args.interval_unit.is_none() {
            draft.frequency = Some(Frequency::Monthly.as_str().to_string());
        }
        draft.interval_unit = args.interval_unit.clone();
        draft.interval_count = args.interval_count;

        let trial_start = parse_date(args.trial_start.as_deref(), "trial-start")?;
        let trial_end = parse_date(args.trial_end.as_deref(), "trial-end")?;
        draft.has_trial = trial_start.is_some() || trial_end.is_some();
        draft.trial_start_date = trial_start;
        draft.trial_end_date = trial_end;
    }

    if args.category.is_some() {
        draft.category = args.category.clone();
    }
    if args.provider.is_some() {
        draft.provider = args.provider.clone();
    }
    draft.description = args.description.clone();

    Ok(draft)
}

pub fn cmd_subscriptions_add(session: &Session, args: &AddArgs, today: NaiveDate) -> Result<()> {
    let draft = build_draft(args, today)?;
    let sub = session
        .tracker()
        .create(session.user_id, session.entitlement, &draft)?;

    println!(
        "✅ Added subscription #{}: {} ({:.2} {}, {})",
        sub.id,
        sub.name,
        sub.amount,
        sub.currency,
        describe_cadence(&sub)
    );
    println!("   {}", charge_date_label(&sub));
    Ok(())
}

pub fn cmd_subscriptions_show(session: &Session, id: i64, today: NaiveDate) -> Result<()> {
    let sub = session.tracker().get(session.user_id, id)?;

    println!();
    println!("{} #{} {}", status_icon(&sub, today), sub.id, sub.name);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Amount:    {:.2} {}", sub.amount, sub.currency);
    println!("   Type:      {}", sub.subscription_type());
    println!("   Cadence:   {}", describe_cadence(&sub));
    println!("   Charge:    {}", charge_date_label(&sub));

    match &sub.billing {
        Billing::Recurring(terms) => {
            let cadence = Cadence::of(terms);
            if let Some(then) = terms.next_billing_date.and_then(|d| cadence.advance(d)) {
                println!("   Then:      {}", then);
            }
            println!(
                "   Per month: {:.2} {}",
                cadence.monthly_equivalent(sub.amount),
                sub.currency
            );
            if let Some(trial) = terms.trial {
                println!("   Trial:     {} to {}", trial.start, trial.end);
            }
            if terms.trial_inconsistent {
                println!("   Trial:     ⚠️  stored dates are invalid; fix with --trial-start/--trial-end or --no-trial");
            }
            if let Some((status, days)) = billing_status(&sub, today) {
                println!("   Status:    {} ({} day(s))", status.as_str(), days);
            }
        }
        Billing::OneTime(terms) => {
            println!("   Term:      {}", terms.term.duration_type());
            if let Some(end) = terms.end_date {
                println!("   Ends:      {}", end);
            }
        }
    }

    println!("   Category:  {}", sub.category_key());
    if let Some(provider) = &sub.provider {
        println!("   Provider:  {}", provider);
    }
    if let Some(description) = &sub.description {
        println!("   Notes:     {}", description);
    }
    println!("   Active:    {}", if sub.is_active { "yes" } else { "no" });
    if let Some(cancelled) = sub.cancelled_at {
        println!("   Cancelled: {}", cancelled.format("%Y-%m-%d %H:%M"));
    }
    println!("   Created:   {}", sub.created_at.format("%Y-%m-%d %H:%M"));

    Ok(())
}

/// Build a typed patch from command-line arguments
pub fn build_patch(args: &UpdateArgs) -> Result<SubscriptionPatch> {
    let recurring = RecurringPatch {
        next_billing_date: parse_date(args.next.as_deref(), "next")?,
        frequency: args.frequency.clone(),
        has_trial: if args.no_trial {
            Some(false)
        } else if args.trial_start.is_some() || args.trial_end.is_some() {
            Some(true)
        } else {
            None
        },
        trial_start_date: parse_date(args.trial_start.as_deref(), "trial-start")?,
        trial_end_date: parse_date(args.trial_end.as_deref(), "trial-end")?,
        ..Default::default()
    };
    let one_time = OneTimePatch {
        start_date: parse_date(args.start.as_deref(), "start")?,
        end_date: parse_date(args.end.as_deref(), "end")?,
        ..Default::default()
    };

    let billing = match (recurring != RecurringPatch::default(), one_time != OneTimePatch::default()) {
        (true, true) => bail!("Recurring and one-time options cannot be combined"),
        (true, false) => Some(BillingPatch::Recurring(recurring)),
        (false, true) => Some(BillingPatch::OneTime(one_time)),
        (false, false) => None,
    };

    Ok(SubscriptionPatch {
        name: args.name.clone(),
        description: args.description.clone(),
        amount: args.amount,
        currency: args.currency.clone(),
        category: args.category.clone(),
        provider: args.provider.clone(),
        billing,
        ..Default::default()
    })
}

pub fn cmd_subscriptions_update(session: &Session, args: &UpdateArgs) -> Result<()> {
    let patch = build_patch(args)?;
    if patch.is_empty() {
        bail!("Nothing to update. Pass at least one field (see --help)");
    }

    let sub = session.tracker().update(session.user_id, args.id, &patch)?;
    println!(
        "✅ Updated subscription #{}: {} ({:.2} {}, {})",
        sub.id,
        sub.name,
        sub.amount,
        sub.currency,
        describe_cadence(&sub)
    );
    Ok(())
}

pub fn cmd_subscriptions_cancel(session: &Session, id: i64) -> Result<()> {
    let sub = session.tracker().cancel(session.user_id, id)?;
    println!("✅ Subscription cancelled (ID: {}): {}", sub.id, sub.name);
    println!("   It stays in history and no longer counts toward totals.");
    Ok(())
}

pub fn cmd_subscriptions_activate(session: &Session, id: i64) -> Result<()> {
    let sub = session.tracker().activate(session.user_id, id)?;
    println!("✅ Subscription reactivated (ID: {}): {}", sub.id, sub.name);
    Ok(())
}

pub fn cmd_subscriptions_purge(session: &Session, id: i64, yes: bool) -> Result<()> {
    let tracker = session.tracker();
    let sub = tracker.get(session.user_id, id)?;

    if !yes {
        println!(
            "⚠️  This permanently deletes subscription #{} ({}).",
            sub.id, sub.name
        );
        println!("   Re-run with --yes to confirm, or use 'cancel' to keep its history.");
        return Ok(());
    }

    tracker.purge(session.user_id, id)?;
    println!("🗑️  Deleted subscription #{}: {}", sub.id, sub.name);
    Ok(())
}

pub fn cmd_categories(session: &Session) -> Result<()> {
    let categories = session.tracker().categories(session.user_id)?;

    if categories.is_empty() {
        println!("No categories yet. Set one with --category when adding a subscription.");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    for category in categories {
        println!("   • {}", category);
    }
    Ok(())
}

pub fn cmd_advance(session: &Session, today: NaiveDate) -> Result<()> {
    let advanced = session
        .tracker()
        .advance_billing_dates(session.user_id, today)?;

    if advanced.is_empty() {
        println!("✅ All billing dates are current.");
        return Ok(());
    }

    println!("⏩ Advanced {} billing date(s):", advanced.len());
    for sub in &advanced {
        println!("   #{:<4} {:20} │ {}", sub.id, truncate(&sub.name, 20), charge_date_label(sub));
    }
    Ok(())
}

pub fn cmd_overdue(session: &Session, today: NaiveDate) -> Result<()> {
    let overdue = session.tracker().overdue(session.user_id, today)?;

    if overdue.is_empty() {
        println!("✅ Nothing overdue.");
        return Ok(());
    }

    println!();
    println!("⚠️  Overdue Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");
    for sub in &overdue {
        let days = billing_status(sub, today).map(|(_, d)| -d).unwrap_or_default();
        println!(
            "   #{:<4} {:20} │ {:>10.2} {} │ {} ({} day(s) ago)",
            sub.id,
            truncate(&sub.name, 20),
            sub.amount,
            sub.currency,
            charge_date_label(sub),
            days
        );
    }
    println!();
    println!("   Run 'subtrack subscriptions advance' to roll them forward.");
    Ok(())
}
