//! # Configuration State
//!
//! Stores console configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line flags (`--db`, which clap also fills from `TILL_DB_PATH`)
//! 2. Environment variables (`TILL_*`)
//! 3. Defaults (this file)
//!
//! Configuration is read-only after startup.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Database file name inside the data directory.
const DB_FILE_NAME: &str = "till.db";

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Store name (printed on the sales report title)
    pub store_name: String,

    /// Currency symbol prefixed to amounts, including any spacing
    pub currency_symbol: String,

    /// Currency code labelling the CSV amount columns (`LKR`)
    pub currency_code: String,

    /// Directory exports are written to when `--out` is not given
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    /// Returns the default configuration.
    ///
    /// ## Default Values
    /// - Database: `<data dir>/till.db`, or `./till.db` without a home directory
    /// - Store: "Till POS"
    /// - Currency: Sri Lankan rupees (`Rs `, `LKR`)
    /// - Exports: current directory
    fn default() -> Self {
        AppConfig {
            db_path: default_database_path(),
            store_name: "Till POS".to_string(),
            currency_symbol: "Rs ".to_string(),
            currency_code: "LKR".to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Creates a configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TILL_STORE_NAME`: store name
    /// - `TILL_CURRENCY_SYMBOL`: currency symbol (e.g. `"$"`, `"LKR "`)
    /// - `TILL_CURRENCY_CODE`: CSV column label (e.g. `"USD"`, empty for none)
    /// - `TILL_EXPORT_DIR`: default export directory
    ///
    /// `TILL_DB_PATH` is read by the command line parser as the `--db` default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = AppConfig::default();

        if let Some(name) = lookup("TILL_STORE_NAME").filter(|v| !v.trim().is_empty()) {
            config.store_name = name;
        }

        // An empty symbol is allowed: plain numbers.
        if let Some(symbol) = lookup("TILL_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(code) = lookup("TILL_CURRENCY_CODE") {
            config.currency_code = code.trim().to_string();
        }

        if let Some(dir) = lookup("TILL_EXPORT_DIR").filter(|v| !v.trim().is_empty()) {
            config.export_dir = PathBuf::from(dir);
        }

        config
    }

    /// Applies the `--db` flag (or `TILL_DB_PATH`), which beats the default.
    pub fn with_db_path(mut self, path: Option<&Path>) -> Self {
        if let Some(path) = path {
            self.db_path = path.to_path_buf();
        }
        self
    }

    /// Title of the PDF sales report.
    pub fn report_title(&self) -> String {
        format!("{} - Sales Report", self.store_name)
    }

    /// Formats a cent amount as a currency string with thousands separators.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(123456), "Rs 1,234.56");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let magnitude = cents.unsigned_abs();
        let whole = (magnitude / 100).to_string();
        let frac = magnitude % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            grouped,
            frac
        )
    }
}

/// Gets the default database path.
///
/// ## Platform-Specific Paths
/// - **Linux**: `~/.local/share/till-pos/till.db`
/// - **macOS**: `~/Library/Application Support/com.till.pos/till.db`
/// - **Windows**: `%APPDATA%\till\pos\data\till.db`
fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "till", "pos")
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(symbol: &str) -> AppConfig {
        AppConfig {
            currency_symbol: symbol.to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_format_currency_positive() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(1234), "Rs 12.34");
        assert_eq!(config.format_currency(100), "Rs 1.00");
        assert_eq!(config.format_currency(1), "Rs 0.01");
        assert_eq!(config.format_currency(0), "Rs 0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = config_with("$");
        assert_eq!(config.format_currency(-1234), "-$12.34");
        assert_eq!(config.format_currency(-5), "-$0.05");
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        let config = config_with("");
        assert_eq!(config.format_currency(123456789), "1,234,567.89");
        assert_eq!(config.format_currency(100000), "1,000.00");
        assert_eq!(config.format_currency(99999), "999.99");
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            ("TILL_STORE_NAME", "Corner Shop"),
            ("TILL_CURRENCY_SYMBOL", "$"),
            ("TILL_CURRENCY_CODE", " USD "),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.store_name, "Corner Shop");
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.currency_code, "USD");
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.report_title(), "Corner Shop - Sales Report");
    }

    #[test]
    fn test_flag_beats_default() {
        let config = AppConfig::from_lookup(|_| None).with_db_path(Some(Path::new("/tmp/flag.db")));
        assert_eq!(config.db_path, PathBuf::from("/tmp/flag.db"));
        assert_eq!(config.currency_code, "LKR");

        let unchanged = AppConfig::default().with_db_path(None);
        assert!(unchanged.db_path.ends_with(DB_FILE_NAME));
    }
}
