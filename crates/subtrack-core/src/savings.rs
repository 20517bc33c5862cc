//! Savings advisory
//!
//! Estimates what a user would save by moving monthly plans to annual
//! billing at the configured discount, and emits plain-text suggestions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::aggregate::{from_minor, to_minor};
use crate::cadence::Cadence;
use crate::config::SavingsConfig;
use crate::models::{IntervalUnit, Subscription};

pub const CONSOLIDATE_SUGGESTION: &str = "Consider consolidating similar services";
pub const YEARLY_PLANS_SUGGESTION: &str = "Switch to yearly plans to save money";

/// Savings estimate for one monthly subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsLine {
    pub subscription_id: i64,
    pub name: String,
    pub monthly_amount: f64,
    /// Twelve monthly charges
    pub billed_monthly_per_year: f64,
    /// One discounted annual charge
    pub billed_yearly: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsAdvice {
    /// Sum of amounts billed exactly monthly
    pub total_monthly_spending: f64,
    /// Sum of amounts billed exactly yearly
    pub total_yearly_spending: f64,
    /// Every recurring subscription normalized to a year of charges
    pub yearly_equivalent_spending: f64,
    pub monthly_equivalent_spending: f64,
    pub potential_savings: f64,
    pub subscription_count: usize,
    pub category_count: usize,
    pub suggestions: Vec<String>,
    pub lines: Vec<SavingsLine>,
}

/// Analyze active subscriptions; inactive ones are ignored
pub fn advise(subscriptions: &[Subscription], config: &SavingsConfig) -> SavingsAdvice {
    let active: Vec<&Subscription> = subscriptions.iter().filter(|s| s.is_active).collect();

    let mut monthly_minor = 0i128;
    let mut yearly_minor = 0i128;
    let mut savings_minor = 0i128;
    let mut equivalent_minor = 0i128;
    let mut lines = Vec::new();

    for sub in &active {
        let Some(terms) = sub.recurring() else {
            continue;
        };
        let cadence = Cadence::of(terms);
        equivalent_minor += to_minor(cadence.yearly_equivalent(sub.amount));

        if cadence.unit == IntervalUnit::Year && cadence.count == 1 {
            yearly_minor += to_minor(sub.amount);
        }
        if !cadence.is_monthly() {
            continue;
        }

        monthly_minor += to_minor(sub.amount);
        let billed_monthly_per_year = sub.amount * 12.0;
        let billed_yearly = billed_monthly_per_year * (1.0 - config.annual_discount);
        let savings = from_minor(to_minor(billed_monthly_per_year - billed_yearly));
        savings_minor += to_minor(savings);

        lines.push(SavingsLine {
            subscription_id: sub.id,
            name: sub.name.clone(),
            monthly_amount: sub.amount,
            billed_monthly_per_year,
            billed_yearly,
            savings,
        });
    }

    lines.sort_by(|a, b| {
        b.savings
            .total_cmp(&a.savings)
            .then(a.subscription_id.cmp(&b.subscription_id))
    });

    let potential_savings = from_minor(savings_minor);
    let category_count = active
        .iter()
        .map(|s| s.category_key())
        .collect::<BTreeSet<_>>()
        .len();

    let mut suggestions = Vec::new();
    if active.len() > config.consolidation_threshold {
        suggestions.push(CONSOLIDATE_SUGGESTION.to_string());
    }
    if potential_savings > config.savings_suggestion_threshold {
        suggestions.push(YEARLY_PLANS_SUGGESTION.to_string());
    }

    SavingsAdvice {
        total_monthly_spending: from_minor(monthly_minor),
        total_yearly_spending: from_minor(yearly_minor),
        yearly_equivalent_spending: from_minor(equivalent_minor),
        monthly_equivalent_spending: from_minor(equivalent_minor / 12),
        potential_savings,
        subscription_count: active.len(),
        category_count,
        suggestions,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Billing, Currency, Frequency, Interval, RecurringTerms};
    use chrono::{NaiveDate, Utc};

    fn sub(id: i64, amount: f64, frequency: Frequency, category: Option<&str>) -> Subscription {
        Subscription {
            id,
            user_id: 1,
            name: format!("sub-{}", id),
            description: None,
            amount,
            currency: Currency::Rub,
            billing: Billing::Recurring(RecurringTerms {
                next_billing_date: NaiveDate::from_ymd_opt(2025, 1, 15),
                frequency,
                interval: None,
                trial: None,
                trial_inconsistent: false,
            }),
            category: category.map(str::to_string),
            provider: None,
            logo_url: None,
            website_url: None,
            is_active: true,
            cancelled_at: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_three_monthly_at_500() {
        let subs: Vec<Subscription> = (1..=3)
            .map(|i| sub(i, 500.0, Frequency::Monthly, None))
            .collect();
        let advice = advise(&subs, &SavingsConfig::default());

        assert_eq!(advice.potential_savings, 1800.0);
        assert_eq!(advice.total_monthly_spending, 1500.0);
        assert_eq!(advice.lines.len(), 3);
        assert_eq!(advice.lines[0].savings, 600.0);
        assert_eq!(advice.suggestions, vec![YEARLY_PLANS_SUGGESTION.to_string()]);
    }

    #[test]
    fn test_non_monthly_cadences_do_not_save() {
        let mut quarterly = sub(1, 900.0, Frequency::Monthly, None);
        if let Billing::Recurring(terms) = &mut quarterly.billing {
            terms.interval = Some(Interval {
                unit: IntervalUnit::Month,
                count: 3,
            });
        }
        let yearly = sub(2, 3000.0, Frequency::Yearly, None);
        let weekly = sub(3, 100.0, Frequency::Weekly, None);

        let advice = advise(&[quarterly, yearly, weekly], &SavingsConfig::default());
        assert_eq!(advice.potential_savings, 0.0);
        assert_eq!(advice.total_yearly_spending, 3000.0);
        assert_eq!(advice.total_monthly_spending, 0.0);
        assert!(advice.suggestions.is_empty());

        // 900 x 4 + 3000 + 100 x 52
        assert_eq!(advice.yearly_equivalent_spending, 11800.0);
        assert_eq!(advice.monthly_equivalent_spending, 983.33);
    }

    #[test]
    fn test_consolidation_suggestion_above_threshold() {
        let subs: Vec<Subscription> = (1..=11)
            .map(|i| sub(i, 10.0, Frequency::Yearly, Some("x")))
            .collect();
        let advice = advise(&subs, &SavingsConfig::default());
        assert_eq!(advice.subscription_count, 11);
        assert_eq!(advice.category_count, 1);
        assert_eq!(advice.suggestions, vec![CONSOLIDATE_SUGGESTION.to_string()]);

        let advice = advise(&subs[..10], &SavingsConfig::default());
        assert!(advice.suggestions.is_empty());
    }

    #[test]
    fn test_inactive_ignored() {
        let mut inactive = sub(1, 5000.0, Frequency::Monthly, Some("video"));
        inactive.is_active = false;
        let advice = advise(&[inactive], &SavingsConfig::default());
        assert_eq!(advice, SavingsAdvice::default());
    }

    #[test]
    fn test_custom_discount() {
        let config = SavingsConfig {
            annual_discount: 0.25,
            ..Default::default()
        };
        let advice = advise(&[sub(1, 100.0, Frequency::Monthly, None)], &config);
        assert_eq!(advice.potential_savings, 300.0);
    }
}
