//! Engine configuration
//!
//! Loads tunables from TOML with an embedded default and an optional user
//! override at `~/.local/share/subtrack/config/engine.toml`.
//!
//! ```toml
//! [analytics]
//! reporting_currency = "RUB"
//! cache_policy = "reuse_cache"
//!
//! [free_tier]
//! max_subscriptions = "unlimited"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Currency;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Whether period analytics may return a stored snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Return the stored snapshot for the exact period if one exists
    ReuseCache,
    /// Recompute and upsert on every request
    #[default]
    AlwaysRecompute,
}

impl CachePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReuseCache => "reuse_cache",
            Self::AlwaysRecompute => "always_recompute",
        }
    }
}

impl std::str::FromStr for CachePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "reuse_cache" => Ok(Self::ReuseCache),
            "always_recompute" => Ok(Self::AlwaysRecompute),
            _ => Err(format!(
                "Unknown cache policy: {} (valid: reuse_cache, always_recompute)",
                s
            )),
        }
    }
}

/// Subscription cap for accounts without a premium entitlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeTierLimit {
    Limited(u32),
    Unlimited,
}

impl FreeTierLimit {
    /// True if a user already holding `count` subscriptions may add another
    pub fn allows(&self, count: u64) -> bool {
        match self {
            Self::Limited(max) => count < u64::from(*max),
            Self::Unlimited => true,
        }
    }
}

impl Default for FreeTierLimit {
    fn default() -> Self {
        Self::Limited(5)
    }
}

impl std::fmt::Display for FreeTierLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limited(max) => write!(f, "{}", max),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub reporting_currency: Currency,
    pub cache_policy: CachePolicy,
    pub max_trend_months: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            reporting_currency: Currency::Rub,
            cache_policy: CachePolicy::AlwaysRecompute,
            max_trend_months: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingConfig {
    pub default_horizon_days: u32,
    pub min_horizon_days: u32,
    pub max_horizon_days: u32,
}

impl Default for UpcomingConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: 30,
            min_horizon_days: 1,
            max_horizon_days: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsConfig {
    pub annual_discount: f64,
    pub consolidation_threshold: usize,
    pub savings_suggestion_threshold: f64,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self {
            annual_discount: 0.10,
            consolidation_threshold: 10,
            savings_suggestion_threshold: 1000.0,
        }
    }
}

/// All engine tunables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub analytics: AnalyticsConfig,
    pub upcoming: UpcomingConfig,
    pub free_tier: FreeTierLimit,
    pub savings: SavingsConfig,
}

impl EngineConfig {
    /// Load config from an explicit path, the default override location, or
    /// the embedded default, in that order
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path() {
                Some(path) if path.exists() => fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml(&content)
    }

    /// The embedded default config
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse config from TOML content, overlaying built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(analytics) = raw.analytics {
            if let Some(currency) = analytics.reporting_currency {
                config.analytics.reporting_currency =
                    currency.parse().map_err(Error::Config)?;
            }
            if let Some(policy) = analytics.cache_policy {
                config.analytics.cache_policy = policy.parse().map_err(Error::Config)?;
            }
            if let Some(months) = analytics.max_trend_months {
                config.analytics.max_trend_months = months;
            }
        }

        if let Some(upcoming) = raw.upcoming {
            if let Some(days) = upcoming.default_horizon_days {
                config.upcoming.default_horizon_days = days;
            }
            if let Some(days) = upcoming.min_horizon_days {
                config.upcoming.min_horizon_days = days;
            }
            if let Some(days) = upcoming.max_horizon_days {
                config.upcoming.max_horizon_days = days;
            }
        }

        if let Some(free_tier) = raw.free_tier {
            if let Some(limit) = free_tier.max_subscriptions {
                config.free_tier = match limit {
                    RawLimit::Count(n) => FreeTierLimit::Limited(u32::try_from(n).map_err(
                        |_| Error::Config(format!("Invalid free_tier.max_subscriptions: {}", n)),
                    )?),
                    RawLimit::Word(w) if w == "unlimited" => FreeTierLimit::Unlimited,
                    RawLimit::Word(w) => {
                        return Err(Error::Config(format!(
                            "Invalid free_tier.max_subscriptions: {} (expected a number or \"unlimited\")",
                            w
                        )))
                    }
                };
            }
        }

        if let Some(savings) = raw.savings {
            if let Some(discount) = savings.annual_discount {
                config.savings.annual_discount = discount;
            }
            if let Some(threshold) = savings.consolidation_threshold {
                config.savings.consolidation_threshold = threshold;
            }
            if let Some(threshold) = savings.savings_suggestion_threshold {
                config.savings.savings_suggestion_threshold = threshold;
            }
        }

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let upcoming = &self.upcoming;
        if upcoming.min_horizon_days == 0 || upcoming.min_horizon_days > upcoming.max_horizon_days {
            return Err(Error::Config(format!(
                "upcoming horizon bounds [{}, {}] are invalid",
                upcoming.min_horizon_days, upcoming.max_horizon_days
            )));
        }
        if !(upcoming.min_horizon_days..=upcoming.max_horizon_days)
            .contains(&upcoming.default_horizon_days)
        {
            return Err(Error::Config(format!(
                "upcoming.default_horizon_days {} is outside [{}, {}]",
                upcoming.default_horizon_days, upcoming.min_horizon_days, upcoming.max_horizon_days
            )));
        }
        if self.analytics.max_trend_months == 0 {
            return Err(Error::Config(
                "analytics.max_trend_months must be at least 1".to_string(),
            ));
        }
        let discount = self.savings.annual_discount;
        if !discount.is_finite() || !(0.0..1.0).contains(&discount) {
            return Err(Error::Config(format!(
                "savings.annual_discount {} must be in [0, 1)",
                discount
            )));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subtrack").join("config").join("engine.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    analytics: Option<RawAnalytics>,
    upcoming: Option<RawUpcoming>,
    free_tier: Option<RawFreeTier>,
    savings: Option<RawSavings>,
}

#[derive(Debug, Deserialize)]
struct RawAnalytics {
    reporting_currency: Option<String>,
    cache_policy: Option<String>,
    max_trend_months: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawUpcoming {
    default_horizon_days: Option<u32>,
    min_horizon_days: Option<u32>,
    max_horizon_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawFreeTier {
    max_subscriptions: Option<RawLimit>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Count(i64),
    Word(String),
}

#[derive(Debug, Deserialize)]
struct RawSavings {
    annual_discount: Option<f64>,
    consolidation_threshold: Option<usize>,
    savings_suggestion_threshold: Option<f64>,
}
