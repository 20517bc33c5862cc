//! Popular subscription templates
//!
//! A static catalogue of well-known services used to prefill new
//! subscriptions.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Frequency, SubscriptionDraft};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub key: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    pub category: &'static str,
    pub logo_url: &'static str,
    pub website_url: &'static str,
    pub common_amounts: &'static [f64],
    pub common_frequencies: &'static [Frequency],
}

const MONTHLY_YEARLY: &[Frequency] = &[Frequency::Monthly, Frequency::Yearly];

static TEMPLATES: &[Template] = &[
    Template {
        key: "yandex-plus",
        name: "Яндекс Плюс",
        provider: "Яндекс",
        category: "streaming",
        logo_url: "https://yastatic.net/s3/home/plus/plus-logo.svg",
        website_url: "https://plus.yandex.ru",
        common_amounts: &[199.0, 299.0, 399.0],
        common_frequencies: MONTHLY_YEARLY,
    },
    Template {
        key: "sberprime",
        name: "СберПрайм",
        provider: "Сбер",
        category: "shopping",
        logo_url: "https://sberprime.ru/static/images/logo.svg",
        website_url: "https://sberprime.ru",
        common_amounts: &[199.0, 299.0],
        common_frequencies: MONTHLY_YEARLY,
    },
    Template {
        key: "netflix",
        name: "Netflix",
        provider: "Netflix",
        category: "streaming",
        logo_url: "https://upload.wikimedia.org/wikipedia/commons/7/77/Netflix_2015_logo.svg",
        website_url: "https://netflix.com",
        common_amounts: &[599.0, 799.0, 999.0],
        common_frequencies: &[Frequency::Monthly],
    },
    Template {
        key: "spotify",
        name: "Spotify",
        provider: "Spotify",
        category: "music",
        logo_url: "https://upload.wikimedia.org/wikipedia/commons/1/19/Spotify_logo_without_text.svg",
        website_url: "https://spotify.com",
        common_amounts: &[199.0, 299.0],
        common_frequencies: MONTHLY_YEARLY,
    },
    Template {
        key: "okko",
        name: "Okko",
        provider: "Okko",
        category: "streaming",
        logo_url: "https://okko.tv/static/images/logo.svg",
        website_url: "https://okko.tv",
        common_amounts: &[199.0, 299.0, 399.0],
        common_frequencies: MONTHLY_YEARLY,
    },
];

pub fn popular_templates() -> &'static [Template] {
    TEMPLATES
}

/// Look up a template by key or display name, ignoring case
pub fn find_template(name: &str) -> Option<&'static Template> {
    let wanted = name.trim().to_lowercase();
    TEMPLATES
        .iter()
        .find(|t| t.key == wanted || t.name.to_lowercase() == wanted)
}

impl Template {
    /// A recurring draft prefilled from this template
    ///
    /// Uses the cheapest common amount and the first common frequency unless
    /// the caller overrides them on the returned draft.
    pub fn draft(&self, next_billing_date: NaiveDate) -> SubscriptionDraft {
        let amount = self.common_amounts.first().copied().unwrap_or_default();
        let frequency = self
            .common_frequencies
            .first()
            .copied()
            .unwrap_or(Frequency::Monthly);

        SubscriptionDraft {
            name: self.name.to_string(),
            amount,
            next_billing_date: Some(next_billing_date),
            frequency: Some(frequency.as_str().to_string()),
            category: Some(self.category.to_string()),
            provider: Some(self.provider.to_string()),
            logo_url: Some(self.logo_url.to_string()),
            website_url: Some(self.website_url.to_string()),
            ..Default::default()
        }
    }
}
