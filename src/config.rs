use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::review::aggregate::StatsSource;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    pub default_stats_source: StatsSource,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file used while the TUI owns the terminal.
    pub file: String,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "review_decisions.db".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            default_stats_source: StatsSource::Auto,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "upload-review.log".to_string(),
        }
    }
}

impl Config {
    /// Load from `config/default` plus `REVIEW_`-prefixed environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("config/default")
    }

    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("REVIEW").separator("__"))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.gateway.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("gateway.base_url must be an http(s) URL, got {:?}", url);
        }
        if self.gateway.timeout_secs == 0 {
            anyhow::bail!("gateway.timeout_secs must be greater than zero");
        }
        if self.ui.tick_rate_ms == 0 {
            anyhow::bail!("ui.tick_rate_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        toml::from_str(
            r#"
            [gateway]
            base_url = "http://localhost:5000"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = sample();
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.database.path, "review_decisions.db");
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert_eq!(config.ui.default_stats_source, StatsSource::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = sample();
        config.gateway.base_url = "localhost:5000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = sample();
        config.gateway.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.toml");
        std::fs::write(
            &path,
            "[gateway]\nbase_url = \"https://verify.example.com\"\n\n[ui]\ndefault_stats_source = \"local\"\n",
        )
        .unwrap();

        let config = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.gateway.base_url, "https://verify.example.com");
        assert_eq!(config.ui.default_stats_source, StatsSource::Local);
        assert_eq!(config.ui.tick_rate_ms, 250);
    }
}
