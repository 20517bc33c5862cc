//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init, templates and shared utilities (open_db, load_config, Session)
//! - `subscriptions` - Subscription lifecycle commands
//! - `analytics` - Period analytics, upcoming payments and savings
//! - `export` - CSV/JSON export

pub mod analytics;
pub mod core;
pub mod export;
pub mod subscriptions;

// Re-export command functions for main.rs
pub use analytics::*;
pub use core::*;
pub use export::*;
pub use subscriptions::*;

/// Truncate a string to at most `max` characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
