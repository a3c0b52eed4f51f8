//! Configuration management for ranksnap.
//!
//! Configuration is read from `~/.config/ranksnap/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. Retry ceiling, backoff curve, and politeness interval are named
//! options here, never hard-coded in the pipeline.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/ranksnap/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("ranksnap").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# ranksnap configuration
#
# The page URL is built from url_template by substituting {category} and
# {page}. Selectors are CSS and can be adjusted when the source layout
# drifts without touching code.

[scrape]
# URL template for one listing page
url_template = "https://www.example.com/gp/bestsellers/{category}?pg={page}"

# Hard ceiling on pagination; the run stops here even if the listing
# never yields an empty page
max_pages = 5

# Attempts per page before the run ends as PARTIAL
max_retries = 3

# Exponential backoff between attempts: base doubles per attempt, capped
backoff_base_ms = 500
backoff_cap_ms = 8000

# Minimum delay between consecutive page requests
politeness_ms = 2000

# Bounded wait for the listing container to appear
timeout_secs = 30

# Run the browser without a visible window
headless = true

# User agent string to use
user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"

[selectors]
# Element whose presence marks the page as rendered
listing_container = "div.p13n-desktop-grid"

# One listing slot
slot = "div#gridItemRoot"

# Per-field selectors, each read independently inside a slot
rank = ".zg-bdg-text"
title = "._cDEzb_p13n-sc-css-line-clamp-3_g3dy1"
price = "._cDEzb_p13n-sc-price_3mJ9Z"
rating = ".a-icon-alt"
reviews = ".a-size-small"
badge = ".zg-bdg-supplementary-text"

# Substrings (lowercase) that mark a block/captcha page
block_markers = [
    "enter the characters you see below",
    "robot check",
    "captcha",
    "sorry, something went wrong",
]
"##
        .to_string()
    }
}

/// Scrape pipeline options. Defaults are deliberately conservative; all of
/// them can be overridden in the config file or per run from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// URL template with `{category}` and `{page}` placeholders
    pub url_template: String,

    /// Hard ceiling on pagination (default: 5)
    pub max_pages: u32,

    /// Attempts per page before escalating to PARTIAL (default: 3)
    pub max_retries: u32,

    /// Backoff base delay in milliseconds, doubled per attempt (default: 500)
    pub backoff_base_ms: u64,

    /// Backoff cap in milliseconds (default: 8000)
    pub backoff_cap_ms: u64,

    /// Politeness interval between page requests in milliseconds (default: 2000)
    pub politeness_ms: u64,

    /// Bounded wait for page readiness in seconds (default: 30)
    pub timeout_secs: u64,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.example.com/gp/bestsellers/{category}?pg={page}".to_string(),
            max_pages: 5,
            max_retries: 3,
            backoff_base_ms: 500,
            backoff_cap_ms: 8000,
            politeness_ms: 2000,
            timeout_secs: 30,
            headless: true,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ScrapeConfig {
    /// Get the page readiness timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the politeness interval as a Duration
    pub fn politeness(&self) -> Duration {
        Duration::from_millis(self.politeness_ms)
    }

    /// Backoff delay for the given 1-based attempt: base doubled per
    /// attempt, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let ms = self.backoff_base_ms.saturating_mul(1u64 << exp);
        Duration::from_millis(ms.min(self.backoff_cap_ms))
    }
}

/// CSS selectors for the listing page. Layout drift is handled here, not in
/// code: each field has its own selector and every read is independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Element whose presence marks the page as rendered
    pub listing_container: String,

    /// One listing slot
    pub slot: String,

    pub rank: String,
    pub title: String,
    pub price: String,
    pub rating: String,
    pub reviews: String,
    pub badge: String,

    /// Lowercase substrings that mark a block/captcha page
    pub block_markers: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_container: "div.p13n-desktop-grid".to_string(),
            slot: "div#gridItemRoot".to_string(),
            rank: ".zg-bdg-text".to_string(),
            title: "._cDEzb_p13n-sc-css-line-clamp-3_g3dy1".to_string(),
            price: "._cDEzb_p13n-sc-price_3mJ9Z".to_string(),
            rating: ".a-icon-alt".to_string(),
            reviews: ".a-size-small".to_string(),
            badge: ".zg-bdg-supplementary-text".to_string(),
            block_markers: vec![
                "enter the characters you see below".to_string(),
                "robot check".to_string(),
                "captcha".to_string(),
                "sorry, something went wrong".to_string(),
            ],
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.scrape.max_pages, 5);
        assert_eq!(config.scrape.max_retries, 3);
        assert_eq!(config.selectors.slot, "div#gridItemRoot");
        assert!(!config.selectors.block_markers.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[scrape]
max_pages = 12
politeness_ms = 100
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        // Custom values
        assert_eq!(config.scrape.max_pages, 12);
        assert_eq!(config.scrape.politeness_ms, 100);
        // Default values
        assert_eq!(config.scrape.max_retries, 3);
        assert_eq!(config.selectors.rank, ".zg-bdg-text");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.scrape.timeout_secs, 30);
        assert!(config.scrape.headless);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = ScrapeConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(500));
        assert_eq!(config.backoff(2), Duration::from_millis(1000));
        assert_eq!(config.backoff(3), Duration::from_millis(2000));
        // Capped well before overflow territory
        assert_eq!(config.backoff(10), Duration::from_millis(8000));
        assert_eq!(config.backoff(u32::MAX), Duration::from_millis(8000));
    }

    #[test]
    fn test_politeness_duration() {
        let config = ScrapeConfig::default();
        assert_eq!(config.politeness(), Duration::from_millis(2000));
    }
}
