//! Billing cadence arithmetic
//!
//! A cadence is "every `count` units". Month and year steps use calendar
//! arithmetic and clamp to the last day of shorter months, so Jan 31 + 1
//! month is Feb 28 (or 29).

use chrono::{Days, Months, NaiveDate};

use crate::models::{DurationUnit, Frequency, IntervalUnit, RecurringTerms, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub unit: IntervalUnit,
    pub count: u32,
}

impl Cadence {
    pub fn new(unit: IntervalUnit, count: u32) -> Self {
        Self { unit, count }
    }

    /// A single step of the given frequency
    pub fn from_frequency(frequency: Frequency) -> Self {
        let unit = match frequency {
            Frequency::Daily => IntervalUnit::Day,
            Frequency::Weekly => IntervalUnit::Week,
            Frequency::Monthly => IntervalUnit::Month,
            Frequency::Yearly => IntervalUnit::Year,
        };
        Self::new(unit, 1)
    }

    /// The effective cadence of a recurring subscription; the interval wins
    /// over the frequency when both are present
    pub fn of(terms: &RecurringTerms) -> Self {
        match terms.interval {
            Some(interval) => Self::new(interval.unit, interval.count),
            None => Self::from_frequency(terms.frequency),
        }
    }

    /// Exactly one calendar month per charge
    pub fn is_monthly(&self) -> bool {
        self.unit == IntervalUnit::Month && self.count == 1
    }

    /// Date of the charge after `date`; `None` on calendar overflow
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        add_units(date, self.unit, self.count)
    }

    /// First occurrence on or after `today`, stepping from `date`
    ///
    /// Every step is measured from `date` itself, so a month-end anchor keeps
    /// its day in longer months. Returns `date` unchanged when it is already
    /// on or after `today`.
    pub fn roll_forward(&self, date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
        if self.count == 0 {
            return None;
        }
        let mut next = date;
        let mut steps: u32 = 0;
        while next < today {
            steps = steps.checked_add(1)?;
            next = add_units(date, self.unit, self.count.checked_mul(steps)?)?;
        }
        Some(next)
    }

    /// Charges per year at this cadence
    pub fn charges_per_year(&self) -> f64 {
        let per_unit = match self.unit {
            IntervalUnit::Day => 365.0,
            IntervalUnit::Week => 52.0,
            IntervalUnit::Month => 12.0,
            IntervalUnit::Year => 1.0,
        };
        per_unit / f64::from(self.count.max(1))
    }

    pub fn yearly_equivalent(&self, amount: f64) -> f64 {
        amount * self.charges_per_year()
    }

    pub fn monthly_equivalent(&self, amount: f64) -> f64 {
        self.yearly_equivalent(amount) / 12.0
    }
}

/// End of a fixed one-time term starting at `start`
pub fn term_end(start: NaiveDate, term: Term) -> Option<NaiveDate> {
    match term {
        Term::Indefinite => None,
        Term::Fixed { unit, value } => {
            let unit = match unit {
                DurationUnit::Days => IntervalUnit::Day,
                DurationUnit::Weeks => IntervalUnit::Week,
                DurationUnit::Months => IntervalUnit::Month,
                DurationUnit::Years => IntervalUnit::Year,
            };
            add_units(start, unit, value)
        }
    }
}

fn add_units(date: NaiveDate, unit: IntervalUnit, count: u32) -> Option<NaiveDate> {
    match unit {
        IntervalUnit::Day => date.checked_add_days(Days::new(u64::from(count))),
        IntervalUnit::Week => date.checked_add_days(Days::new(u64::from(count) * 7)),
        IntervalUnit::Month => date.checked_add_months(Months::new(count)),
        IntervalUnit::Year => date.checked_add_months(Months::new(count.checked_mul(12)?)),
    }
}
