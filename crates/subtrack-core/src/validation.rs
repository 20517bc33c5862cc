//! Draft validation and typed patches
//!
//! Every write path goes through [`SubscriptionDraft::validate`]: creation
//! validates the caller's draft directly, updates apply a
//! [`SubscriptionPatch`] to the stored subscription's draft and validate the
//! result with the same rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cadence::term_end;
use crate::error::{Error, Result};
use crate::models::{
    Billing, Currency, DurationUnit, Frequency, Interval, IntervalUnit, NewSubscription,
    OneTimeTerms, RecurringTerms, Subscription, SubscriptionDraft, SubscriptionType, Term,
    TrialPeriod,
};

const INDEFINITE: &str = "indefinite";

/// Largest accepted charge amount
pub const MAX_AMOUNT: f64 = 1e12;

impl SubscriptionDraft {
    /// Validate into a typed subscription
    ///
    /// Fails with `Error::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<NewSubscription> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "must not be blank"));
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::validation("amount", "must be greater than zero"));
        }
        if self.amount > MAX_AMOUNT {
            return Err(Error::validation(
                "amount",
                format!("must not exceed {}", MAX_AMOUNT),
            ));
        }
        if !whole_cents(self.amount) {
            return Err(Error::validation("amount", "at most two decimal places"));
        }

        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: String| Error::validation("currency", e))?;

        let subscription_type: SubscriptionType = self
            .subscription_type
            .parse()
            .map_err(|e: String| Error::validation("subscription_type", e))?;

        let billing = match subscription_type {
            SubscriptionType::Recurring => Billing::Recurring(self.recurring_terms()?),
            SubscriptionType::OneTime => Billing::OneTime(self.one_time_terms()?),
        };

        Ok(NewSubscription {
            name: name.to_string(),
            description: clean(&self.description),
            amount: self.amount,
            currency,
            billing,
            category: clean(&self.category),
            provider: clean(&self.provider),
            logo_url: clean(&self.logo_url),
            website_url: clean(&self.website_url),
            is_active: self.is_active,
        })
    }

    fn recurring_terms(&self) -> Result<RecurringTerms> {
        let interval = match clean(&self.interval_unit) {
            Some(unit) => {
                let unit: IntervalUnit = unit
                    .parse()
                    .map_err(|e: String| Error::validation("interval_unit", e))?;
                let count = positive(self.interval_count.unwrap_or(1))
                    .ok_or_else(|| Error::validation("interval_count", "must be at least 1"))?;
                Some(Interval { unit, count })
            }
            None => None,
        };

        let frequency = match (clean(&self.frequency), interval) {
            (Some(f), _) => f
                .parse::<Frequency>()
                .map_err(|e| Error::validation("frequency", e))?,
            (None, Some(interval)) => interval.unit.frequency(),
            (None, None) => {
                return Err(Error::validation(
                    "frequency",
                    "recurring subscriptions need a frequency or interval_unit",
                ))
            }
        };

        let trial = if self.has_trial {
            let start = self
                .trial_start_date
                .ok_or_else(|| Error::validation("trial_start_date", "required when has_trial"))?;
            let end = self
                .trial_end_date
                .ok_or_else(|| Error::validation("trial_end_date", "required when has_trial"))?;
            if end < start {
                return Err(Error::validation(
                    "trial_end_date",
                    "must not be before trial_start_date",
                ));
            }
            Some(TrialPeriod { start, end })
        } else {
            None
        };

        if self.is_active && self.next_billing_date.is_none() {
            return Err(Error::validation(
                "next_billing_date",
                "required for active recurring subscriptions",
            ));
        }

        Ok(RecurringTerms {
            next_billing_date: self.next_billing_date,
            frequency,
            interval,
            trial,
            trial_inconsistent: false,
        })
    }

    fn one_time_terms(&self) -> Result<OneTimeTerms> {
        if self.next_billing_date.is_some() {
            return Err(Error::validation(
                "next_billing_date",
                "one-time subscriptions have no billing date",
            ));
        }
        if self.has_trial {
            return Err(Error::validation(
                "has_trial",
                "trials apply to recurring subscriptions only",
            ));
        }

        let term = match clean(&self.duration_type) {
            None => Term::Indefinite,
            Some(t) if t.eq_ignore_ascii_case(INDEFINITE) => Term::Indefinite,
            Some(t) => {
                let unit: DurationUnit = t
                    .parse()
                    .map_err(|e: String| Error::validation("duration_type", e))?;
                let value = self
                    .duration_value
                    .and_then(positive)
                    .ok_or_else(|| Error::validation("duration_value", "must be at least 1"))?;
                Term::Fixed { unit, value }
            }
        };

        let end_date = match (self.end_date, self.start_date) {
            (Some(end), Some(start)) if end < start => {
                return Err(Error::validation(
                    "end_date",
                    "must not be before start_date",
                ))
            }
            (Some(end), _) => Some(end),
            (None, Some(start)) => term_end(start, term),
            (None, None) => None,
        };

        Ok(OneTimeTerms {
            start_date: self.start_date,
            term,
            end_date,
        })
    }
}

impl Subscription {
    /// The raw field set that validates back into this subscription
    pub fn to_draft(&self) -> SubscriptionDraft {
        let mut draft = SubscriptionDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            amount: self.amount,
            currency: self.currency.as_str().to_string(),
            subscription_type: self.subscription_type().as_str().to_string(),
            category: self.category.clone(),
            provider: self.provider.clone(),
            logo_url: self.logo_url.clone(),
            website_url: self.website_url.clone(),
            is_active: self.is_active,
            ..Default::default()
        };

        match &self.billing {
            Billing::Recurring(terms) => {
                draft.next_billing_date = terms.next_billing_date;
                draft.frequency = Some(terms.frequency.as_str().to_string());
                if let Some(interval) = terms.interval {
                    draft.interval_unit = Some(interval.unit.as_str().to_string());
                    draft.interval_count = Some(i64::from(interval.count));
                }
                if let Some(trial) = terms.trial {
                    draft.has_trial = true;
                    draft.trial_start_date = Some(trial.start);
                    draft.trial_end_date = Some(trial.end);
                }
                // Kept so an update must repair or drop the broken trial
                draft.has_trial |= terms.trial_inconsistent;
            }
            Billing::OneTime(terms) => {
                draft.start_date = terms.start_date;
                draft.duration_type = Some(terms.term.duration_type().to_string());
                draft.duration_value = terms.term.duration_value().map(i64::from);
                // Only an explicit end date survives; a derived one is recomputed
                let derived = terms.start_date.and_then(|s| term_end(s, terms.term));
                if terms.end_date != derived {
                    draft.end_date = terms.end_date;
                }
            }
        }

        draft
    }
}

/// Partial update of a subscription
///
/// `None` leaves a field unchanged. For optional text fields an empty string
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub provider: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub billing: Option<BillingPatch>,
}

/// Variant-specific part of a patch; must match the stored variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "subscription_type", rename_all = "snake_case")]
pub enum BillingPatch {
    Recurring(RecurringPatch),
    OneTime(OneTimePatch),
}

impl BillingPatch {
    pub fn subscription_type(&self) -> SubscriptionType {
        match self {
            Self::Recurring(_) => SubscriptionType::Recurring,
            Self::OneTime(_) => SubscriptionType::OneTime,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringPatch {
    pub next_billing_date: Option<NaiveDate>,
    pub frequency: Option<String>,
    /// Empty string removes the interval override
    pub interval_unit: Option<String>,
    pub interval_count: Option<i64>,
    pub has_trial: Option<bool>,
    pub trial_start_date: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneTimePatch {
    pub start_date: Option<NaiveDate>,
    pub duration_type: Option<String>,
    pub duration_value: Option<i64>,
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to a stored subscription and re-validate the result
    pub fn apply(&self, subscription: &Subscription) -> Result<NewSubscription> {
        let mut draft = subscription.to_draft();

        if let Some(name) = &self.name {
            draft.name = name.clone();
        }
        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(currency) = &self.currency {
            draft.currency = currency.clone();
        }
        overwrite(&mut draft.description, &self.description);
        overwrite(&mut draft.category, &self.category);
        overwrite(&mut draft.provider, &self.provider);
        overwrite(&mut draft.logo_url, &self.logo_url);
        overwrite(&mut draft.website_url, &self.website_url);

        match (&self.billing, subscription.subscription_type()) {
            (None, _) => {}
            (Some(BillingPatch::Recurring(patch)), SubscriptionType::Recurring) => {
                if patch.next_billing_date.is_some() {
                    draft.next_billing_date = patch.next_billing_date;
                }
                if let Some(frequency) = &patch.frequency {
                    draft.frequency = Some(frequency.clone());
                }
                if let Some(unit) = &patch.interval_unit {
                    if unit.trim().is_empty() {
                        draft.interval_unit = None;
                        draft.interval_count = None;
                    } else {
                        draft.interval_unit = Some(unit.clone());
                    }
                }
                if patch.interval_count.is_some() {
                    draft.interval_count = patch.interval_count;
                }
                if let Some(has_trial) = patch.has_trial {
                    draft.has_trial = has_trial;
                }
                if patch.trial_start_date.is_some() {
                    draft.trial_start_date = patch.trial_start_date;
                }
                if patch.trial_end_date.is_some() {
                    draft.trial_end_date = patch.trial_end_date;
                }
            }
            (Some(BillingPatch::OneTime(patch)), SubscriptionType::OneTime) => {
                if patch.start_date.is_some() {
                    draft.start_date = patch.start_date;
                }
                if let Some(duration_type) = &patch.duration_type {
                    draft.duration_type = Some(duration_type.clone());
                    if duration_type.eq_ignore_ascii_case(INDEFINITE) {
                        draft.duration_value = None;
                    }
                }
                if patch.duration_value.is_some() {
                    draft.duration_value = patch.duration_value;
                }
                if patch.end_date.is_some() {
                    draft.end_date = patch.end_date;
                }
            }
            (Some(billing), stored) => {
                return Err(Error::validation(
                    "subscription_type",
                    format!(
                        "cannot apply a {} patch to a {} subscription",
                        billing.subscription_type(),
                        stored
                    ),
                ));
            }
        }

        draft.validate()
    }
}

/// Trimmed text, with blank values treated as absent
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn overwrite(target: &mut Option<String>, patch: &Option<String>) {
    if let Some(value) = patch {
        *target = clean(&Some(value.clone()));
    }
}

fn whole_cents(amount: f64) -> bool {
    (amount * 100.0).round() / 100.0 == amount
}

fn positive(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn field_of(draft: &SubscriptionDraft) -> String {
        draft
            .validate()
            .unwrap_err()
            .field()
            .unwrap_or_default()
            .to_string()
    }

    fn stored(new: NewSubscription) -> Subscription {
        Subscription {
            id: 1,
            user_id: 1,
            name: new.name,
            description: new.description,
            amount: new.amount,
            currency: new.currency,
            billing: new.billing,
            category: new.category,
            provider: new.provider,
            logo_url: new.logo_url,
            website_url: new.website_url,
            is_active: new.is_active,
            cancelled_at: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_valid_recurring() {
        let new = SubscriptionDraft::recurring("Netflix", 599.0, date(2025, 1, 15))
            .with_category("entertainment")
            .validate()
            .unwrap();

        assert_eq!(new.currency, Currency::Rub);
        let Billing::Recurring(terms) = new.billing else {
            panic!("expected recurring");
        };
        assert_eq!(terms.frequency, Frequency::Monthly);
        assert_eq!(terms.next_billing_date, Some(date(2025, 1, 15)));
        assert!(terms.interval.is_none());
    }

    #[test]
    fn test_rejects_bad_amount() {
        let next = date(2025, 1, 15);
        assert_eq!(field_of(&SubscriptionDraft::recurring("A", 0.0, next)), "amount");
        assert_eq!(field_of(&SubscriptionDraft::recurring("A", -5.0, next)), "amount");
        assert_eq!(
            field_of(&SubscriptionDraft::recurring("A", f64::NAN, next)),
            "amount"
        );
        assert_eq!(field_of(&SubscriptionDraft::recurring("A", 6e16, next)), "amount");
        assert!(SubscriptionDraft::recurring("A", MAX_AMOUNT, next).validate().is_ok());
    }

    #[test]
    fn test_rejects_sub_cent_amount() {
        let next = date(2025, 1, 15);
        assert_eq!(field_of(&SubscriptionDraft::recurring("A", 12.345, next)), "amount");
        assert_eq!(field_of(&SubscriptionDraft::recurring("A", 0.001, next)), "amount");
        for amount in [0.01, 0.1, 12.34, 199.99, 599.0] {
            assert!(
                SubscriptionDraft::recurring("A", amount, next).validate().is_ok(),
                "{} should be accepted",
                amount
            );
        }
    }

    #[test]
    fn test_rejects_unknown_currency_and_type() {
        let next = date(2025, 1, 15);
        let draft = SubscriptionDraft::recurring("A", 10.0, next).with_currency("JPY");
        assert_eq!(field_of(&draft), "currency");

        let mut draft = SubscriptionDraft::recurring("A", 10.0, next);
        draft.subscription_type = "lifetime".into();
        assert_eq!(field_of(&draft), "subscription_type");
    }

    #[test]
    fn test_rejects_blank_name() {
        let draft = SubscriptionDraft::recurring("   ", 10.0, date(2025, 1, 15));
        assert_eq!(field_of(&draft), "name");
    }

    #[test]
    fn test_trial_rules() {
        let next = date(2025, 1, 15);
        let mut draft = SubscriptionDraft::recurring("A", 10.0, next);
        draft.has_trial = true;
        draft.trial_end_date = Some(date(2025, 1, 20));
        assert_eq!(field_of(&draft), "trial_start_date");

        let draft = SubscriptionDraft::recurring("A", 10.0, next)
            .with_trial(date(2025, 1, 20), date(2025, 1, 10));
        assert_eq!(field_of(&draft), "trial_end_date");

        // Dates without the flag are dropped
        let mut draft = SubscriptionDraft::recurring("A", 10.0, next);
        draft.trial_start_date = Some(date(2025, 1, 1));
        draft.trial_end_date = Some(date(2025, 1, 5));
        let Billing::Recurring(terms) = draft.validate().unwrap().billing else {
            panic!("expected recurring");
        };
        assert!(terms.trial.is_none());
    }

    #[test]
    fn test_active_recurring_requires_next_billing_date() {
        let mut draft = SubscriptionDraft::recurring("A", 10.0, date(2025, 1, 15));
        draft.next_billing_date = None;
        assert_eq!(field_of(&draft), "next_billing_date");

        draft.is_active = false;
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_frequency_rules() {
        let next = date(2025, 1, 15);
        let draft = SubscriptionDraft::recurring("A", 10.0, next).with_frequency("fortnightly");
        assert_eq!(field_of(&draft), "frequency");

        let mut draft = SubscriptionDraft::recurring("A", 10.0, next);
        draft.frequency = None;
        assert_eq!(field_of(&draft), "frequency");

        // Frequency derived from the interval unit
        let draft = draft.with_interval("week", 2);
        let Billing::Recurring(terms) = draft.validate().unwrap().billing else {
            panic!("expected recurring");
        };
        assert_eq!(terms.frequency, Frequency::Weekly);
        assert_eq!(
            terms.interval,
            Some(Interval {
                unit: IntervalUnit::Week,
                count: 2
            })
        );
    }

    #[test]
    fn test_interval_rules() {
        let next = date(2025, 1, 15);
        let draft = SubscriptionDraft::recurring("A", 10.0, next).with_interval("fortnight", 1);
        assert_eq!(field_of(&draft), "interval_unit");

        let draft = SubscriptionDraft::recurring("A", 10.0, next).with_interval("month", 0);
        assert_eq!(field_of(&draft), "interval_count");
    }

    #[test]
    fn test_one_time_rules() {
        let start = date(2025, 2, 1);
        let new = SubscriptionDraft::one_time("Course", 5999.0, start)
            .with_frequency("one_time")
            .validate()
            .unwrap();
        let Billing::OneTime(terms) = new.billing else {
            panic!("expected one-time");
        };
        assert_eq!(terms.term, Term::Indefinite);
        assert_eq!(terms.end_date, None);

        let mut draft = SubscriptionDraft::one_time("Course", 5999.0, start);
        draft.next_billing_date = Some(start);
        assert_eq!(field_of(&draft), "next_billing_date");

        let draft = SubscriptionDraft::one_time("Course", 5999.0, start)
            .with_trial(start, start);
        assert_eq!(field_of(&draft), "has_trial");

        let draft = SubscriptionDraft::one_time("Course", 5999.0, start).with_duration("aeons", 1);
        assert_eq!(field_of(&draft), "duration_type");

        let draft = SubscriptionDraft::one_time("Course", 5999.0, start).with_duration("months", 0);
        assert_eq!(field_of(&draft), "duration_value");

        let mut draft = SubscriptionDraft::one_time("Course", 5999.0, start);
        draft.end_date = Some(date(2025, 1, 1));
        assert_eq!(field_of(&draft), "end_date");
    }

    #[test]
    fn test_one_time_end_date_derived() {
        let new = SubscriptionDraft::one_time("Course", 5999.0, date(2025, 2, 1))
            .with_duration("months", 3)
            .validate()
            .unwrap();
        let Billing::OneTime(terms) = new.billing else {
            panic!("expected one-time");
        };
        assert_eq!(terms.end_date, Some(date(2025, 5, 1)));
    }

    #[test]
    fn test_draft_round_trip_preserves_subscription() {
        let new = SubscriptionDraft::recurring("Spotify", 169.0, date(2025, 3, 3))
            .with_interval("month", 3)
            .with_trial(date(2025, 1, 1), date(2025, 1, 31))
            .with_category("music")
            .validate()
            .unwrap();
        let sub = stored(new.clone());
        assert_eq!(sub.to_draft().validate().unwrap(), new);

        let new = SubscriptionDraft::one_time("Course", 5999.0, date(2025, 2, 1))
            .with_duration("weeks", 6)
            .validate()
            .unwrap();
        let sub = stored(new.clone());
        let draft = sub.to_draft();
        assert_eq!(draft.end_date, None);
        assert_eq!(draft.validate().unwrap(), new);
    }

    #[test]
    fn test_patch_common_fields() {
        let sub = stored(
            SubscriptionDraft::recurring("Netflix", 599.0, date(2025, 1, 15))
                .with_category("video")
                .validate()
                .unwrap(),
        );

        let patch = SubscriptionPatch {
            amount: Some(699.0),
            category: Some(String::new()),
            ..Default::default()
        };
        let updated = patch.apply(&sub).unwrap();
        assert_eq!(updated.amount, 699.0);
        assert_eq!(updated.category, None);
        assert_eq!(updated.name, "Netflix");
    }

    #[test]
    fn test_patch_is_revalidated() {
        let sub = stored(
            SubscriptionDraft::recurring("Netflix", 599.0, date(2025, 1, 15))
                .validate()
                .unwrap(),
        );
        let patch = SubscriptionPatch {
            amount: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(patch.apply(&sub).unwrap_err().field(), Some("amount"));

        let patch = SubscriptionPatch {
            billing: Some(BillingPatch::Recurring(RecurringPatch {
                has_trial: Some(true),
                trial_start_date: Some(date(2025, 2, 1)),
                trial_end_date: Some(date(2025, 1, 1)),
                ..Default::default()
            })),
            ..Default::default()
        };
        assert_eq!(
            patch.apply(&sub).unwrap_err().field(),
            Some("trial_end_date")
        );
    }

    #[test]
    fn test_patch_must_repair_broken_trial() {
        let mut sub = stored(
            SubscriptionDraft::recurring("Okko", 299.0, date(2025, 1, 15))
                .validate()
                .unwrap(),
        );
        if let Billing::Recurring(terms) = &mut sub.billing {
            terms.trial_inconsistent = true;
        }

        let rename = SubscriptionPatch {
            name: Some("Okko HD".into()),
            ..Default::default()
        };
        assert_eq!(rename.apply(&sub).unwrap_err().field(), Some("trial_start_date"));

        let repair = SubscriptionPatch {
            billing: Some(BillingPatch::Recurring(RecurringPatch {
                trial_start_date: Some(date(2025, 1, 1)),
                trial_end_date: Some(date(2025, 1, 10)),
                ..Default::default()
            })),
            ..Default::default()
        };
        let Billing::Recurring(terms) = repair.apply(&sub).unwrap().billing else {
            panic!("expected recurring");
        };
        assert!(!terms.trial_inconsistent);
        assert_eq!(terms.trial.map(|t| t.end), Some(date(2025, 1, 10)));
    }

    #[test]
    fn test_patch_variant_mismatch() {
        let sub = stored(
            SubscriptionDraft::recurring("Netflix", 599.0, date(2025, 1, 15))
                .validate()
                .unwrap(),
        );
        let patch = SubscriptionPatch {
            billing: Some(BillingPatch::OneTime(OneTimePatch::default())),
            ..Default::default()
        };
        assert_eq!(
            patch.apply(&sub).unwrap_err().field(),
            Some("subscription_type")
        );
    }

    #[test]
    fn test_patch_clears_interval() {
        let sub = stored(
            SubscriptionDraft::recurring("Gym", 3000.0, date(2025, 1, 15))
                .with_interval("month", 3)
                .validate()
                .unwrap(),
        );
        let patch = SubscriptionPatch {
            billing: Some(BillingPatch::Recurring(RecurringPatch {
                interval_unit: Some(String::new()),
                ..Default::default()
            })),
            ..Default::default()
        };
        let Billing::Recurring(terms) = patch.apply(&sub).unwrap().billing else {
            panic!("expected recurring");
        };
        assert!(terms.interval.is_none());
        assert_eq!(terms.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_patch_one_time_start_recomputes_end() {
        let sub = stored(
            SubscriptionDraft::one_time("Course", 5999.0, date(2025, 2, 1))
                .with_duration("days", 10)
                .validate()
                .unwrap(),
        );
        let patch = SubscriptionPatch {
            billing: Some(BillingPatch::OneTime(OneTimePatch {
                start_date: Some(date(2025, 3, 1)),
                ..Default::default()
            })),
            ..Default::default()
        };
        let Billing::OneTime(terms) = patch.apply(&sub).unwrap().billing else {
            panic!("expected one-time");
        };
        assert_eq!(terms.end_date, Some(date(2025, 3, 11)));
    }

    #[test]
    fn test_patch_deserializes_tagged_billing() {
        let patch: SubscriptionPatch = serde_json::from_str(
            r#"{"amount": 10, "billing": {"subscription_type": "recurring", "frequency": "yearly"}}"#,
        )
        .unwrap();
        assert_eq!(patch.amount, Some(10.0));
        assert!(matches!(
            patch.billing,
            Some(BillingPatch::Recurring(RecurringPatch { ref frequency, .. })) if frequency.as_deref() == Some("yearly")
        ));
        assert!(!patch.is_empty());
        assert!(SubscriptionPatch::default().is_empty());
    }
}
