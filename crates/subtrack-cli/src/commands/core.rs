//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Engine config resolution
//! - `Session` - Database, config and account for one invocation
//! - `cmd_init` - Initialize the database
//! - `cmd_templates` - List popular templates

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use subtrack_core::config::default_config_path;
use subtrack_core::models::Entitlement;
use subtrack_core::{popular_templates, Database, EngineConfig, SubscriptionTracker};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Explicit --config path, else the user config, else built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load engine config")
}

/// Everything a command needs to act on behalf of one account
pub struct Session<'a> {
    pub db: &'a Database,
    pub config: EngineConfig,
    pub user_id: i64,
    pub entitlement: Entitlement,
}

impl<'a> Session<'a> {
    pub fn new(db: &'a Database, config: EngineConfig, user_id: i64, entitlement: Entitlement) -> Self {
        Self {
            db,
            config,
            user_id,
            entitlement,
        }
    }

    pub fn tracker(&self) -> SubscriptionTracker<'a> {
        SubscriptionTracker::new(self.db).with_config(self.config.clone())
    }
}

/// Parse a YYYY-MM-DD argument, naming the flag on failure
pub fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", flag))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if db
        .is_encrypted()
        .context("Failed to check database encryption")?
    {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: requested but SQLCipher is not active");
    }

    match default_config_path() {
        Some(path) if path.exists() => println!("   Config: {}", path.display()),
        Some(path) => println!("   Config: built-in defaults (override at {})", path.display()),
        None => println!("   Config: built-in defaults"),
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a subscription: subtrack subscriptions add Netflix --amount 599 --next 2025-01-15");
    println!("  2. See this month: subtrack analytics monthly");

    Ok(())
}

pub fn cmd_templates() -> Result<()> {
    println!();
    println!("📚 Popular Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for template in popular_templates() {
        let amounts: Vec<String> = template
            .common_amounts
            .iter()
            .map(|a| format!("{:.0}", a))
            .collect();
        let frequencies: Vec<&str> = template.common_frequencies.iter().map(|f| f.as_str()).collect();

        println!(
            "   {:12} │ {:16} │ {:14} │ {} ({})",
            template.key,
            template.name,
            template.category,
            amounts.join(" / "),
            frequencies.join(", ")
        );
    }

    println!();
    println!("Use one with: subtrack subscriptions add --template <key> --next YYYY-MM-DD");
    Ok(())
}
