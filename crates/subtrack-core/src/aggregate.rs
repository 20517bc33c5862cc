//! Category aggregation of window contributions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::billing::Contribution;
use crate::models::Subscription;

/// Totals for one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// Sum of included amounts, each taken to the nearest hundredth
    pub total: f64,
    pub by_category: BTreeMap<String, f64>,
    /// Number of included subscriptions (zero-cost trials count)
    pub count: usize,
}

/// Fold included contributions into a total and per-category sums
///
/// Amounts are summed in hundredths as integers, so the result is the same
/// for any ordering of the input. The sum is 128-bit and cannot overflow.
pub fn aggregate<'a, I>(contributions: I) -> CategoryBreakdown
where
    I: IntoIterator<Item = (&'a Subscription, Contribution)>,
{
    let mut total: i128 = 0;
    let mut by_category: BTreeMap<String, i128> = BTreeMap::new();
    let mut count = 0;

    for (subscription, contribution) in contributions {
        if !contribution.included {
            continue;
        }
        let minor = to_minor(contribution.amount);
        total += minor;
        *by_category
            .entry(subscription.category_key().to_string())
            .or_insert(0) += minor;
        count += 1;
    }

    CategoryBreakdown {
        total: from_minor(total),
        by_category: by_category
            .into_iter()
            .map(|(category, minor)| (category, from_minor(minor)))
            .collect(),
        count,
    }
}

/// Hundredths of `amount`; saturates at the `i64` range
pub(crate) fn to_minor(amount: f64) -> i128 {
    i128::from((amount * 100.0).round() as i64)
}

pub(crate) fn from_minor(minor: i128) -> f64 {
    minor as f64 / 100.0
}
