//! Configuration management

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::format::DisplayFormat;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub backend: BackendConfig,

    /// Serve generated data instead of calling the REST backend
    #[serde(default)]
    pub demo: bool,

    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// REST API root, e.g. `https://api.example.com/v1/`
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
        }
    }
}

fn default_currency_symbol() -> String {
    DisplayFormat::default().currency_symbol
}

fn default_date_format() -> String {
    DisplayFormat::default().date_format
}

/// Where dashboard data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum BackendMode {
    Demo,
    Http { base_url: String, timeout: Duration },
}

impl Config {
    pub fn backend_mode(&self) -> Result<BackendMode> {
        if self.demo {
            return Ok(BackendMode::Demo);
        }
        match self.backend.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(BackendMode::Http {
                base_url: url.to_string(),
                timeout: Duration::from_secs(self.backend.timeout_secs.max(1)),
            }),
            _ => bail!(
                "backend.base_url is not set (use CATERING_BACKEND__BASE_URL, or CATERING_DEMO=1 for demo mode)"
            ),
        }
    }

    pub fn display_format(&self) -> DisplayFormat {
        DisplayFormat {
            currency_symbol: self.display.currency_symbol.clone(),
            date_format: self.display.date_format.clone(),
        }
    }
}

/// Get config directory (CATERING_CONFIG_DIR, XDG_CONFIG_HOME or platform default)
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CATERING_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join("Library/Application Support/catering-dashboard");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("catering-dashboard");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config/catering-dashboard");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("catering-dashboard");
        }
    }

    // Fallback to current directory
    PathBuf::from(".")
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let mut builder = ::config::Config::builder()
        .set_default("port", default_port() as i64)?
        // config.toml / config.json / config.yaml, whichever exists
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // CATERING_BACKEND__BASE_URL, CATERING_DISPLAY__CURRENCY_SYMBOL, ...
        .add_source(
            ::config::Environment::with_prefix("CATERING")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    // Explicit precedence: CATERING_PORT > PORT > config file > default
    if let Ok(port) = std::env::var("CATERING_PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    } else if let Ok(port) = std::env::var("PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    }

    // CATERING_DEMO accepts 1/true/yes/on
    if let Some(demo) = env_flag("CATERING_DEMO") {
        builder = builder.set_override("demo", demo)?;
    }

    let config = builder.build()?;

    Ok(config.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for key in [
            "CATERING_PORT",
            "PORT",
            "CATERING_DEMO",
            "CATERING_BACKEND__BASE_URL",
            "CATERING_BACKEND__TIMEOUT_SECS",
            "CATERING_DISPLAY__CURRENCY_SYMBOL",
        ] {
            env::remove_var(key);
        }
        env::set_var("CATERING_CONFIG_DIR", "/tmp/catering-test-nonexistent");
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        clear_env();
        let config = load_config().expect("config should load");
        env::remove_var("CATERING_CONFIG_DIR");

        assert_eq!(config.port, 8080);
        assert!(!config.demo);
        assert_eq!(config.backend.timeout_secs, 15);
        assert_eq!(config.display_format(), DisplayFormat::default());
        assert!(config.backend_mode().is_err());
    }

    #[test]
    #[serial]
    fn test_port_env_fallback() {
        clear_env();
        env::set_var("PORT", "3000");

        let config = load_config().expect("config should load");

        env::remove_var("PORT");
        env::remove_var("CATERING_CONFIG_DIR");

        assert_eq!(config.port, 3000, "PORT env var should set config.port");
    }

    #[test]
    #[serial]
    fn test_catering_port_takes_precedence_over_port() {
        clear_env();
        env::set_var("CATERING_PORT", "5000");
        env::set_var("PORT", "3000");

        let config = load_config().expect("config should load");

        env::remove_var("CATERING_PORT");
        env::remove_var("PORT");
        env::remove_var("CATERING_CONFIG_DIR");

        assert_eq!(config.port, 5000);
    }

    #[test]
    #[serial]
    fn test_invalid_port_uses_default() {
        clear_env();
        env::set_var("PORT", "not-a-number");

        let config = load_config().expect("config should load");

        env::remove_var("PORT");
        env::remove_var("CATERING_CONFIG_DIR");

        assert_eq!(config.port, 8080, "Invalid PORT should fall back to default");
    }

    #[test]
    #[serial]
    fn test_demo_flag_selects_demo_backend() {
        clear_env();
        env::set_var("CATERING_DEMO", "1");

        let config = load_config().expect("config should load");

        env::remove_var("CATERING_DEMO");
        env::remove_var("CATERING_CONFIG_DIR");

        assert!(config.demo);
        assert_eq!(config.backend_mode().unwrap(), BackendMode::Demo);
    }

    #[test]
    #[serial]
    fn test_nested_env_keys() {
        clear_env();
        env::set_var("CATERING_BACKEND__BASE_URL", "http://api.local/v1");
        env::set_var("CATERING_BACKEND__TIMEOUT_SECS", "30");

        let config = load_config().expect("config should load");

        env::remove_var("CATERING_BACKEND__BASE_URL");
        env::remove_var("CATERING_BACKEND__TIMEOUT_SECS");
        env::remove_var("CATERING_CONFIG_DIR");

        assert_eq!(
            config.backend_mode().unwrap(),
            BackendMode::Http {
                base_url: "http://api.local/v1".to_string(),
                timeout: Duration::from_secs(30),
            }
        );
    }

    #[test]
    #[serial]
    fn test_config_file_is_read_from_config_dir() {
        clear_env();
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            temp_dir.path().join("config.toml"),
            r#"
port = 9100

[backend]
base_url = "https://catering.example.com/api/"

[display]
currency_symbol = "$"
date_format = "%Y-%m-%d"
"#,
        )
        .expect("write config");
        env::set_var("CATERING_CONFIG_DIR", temp_dir.path());

        let config = load_config().expect("config should load");

        env::remove_var("CATERING_CONFIG_DIR");

        assert_eq!(config.port, 9100);
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("https://catering.example.com/api/")
        );
        assert_eq!(config.display_format().currency_symbol, "$");
        assert_eq!(config.display.date_format, "%Y-%m-%d");
    }

    #[test]
    #[serial]
    fn test_env_overrides_config_file() {
        clear_env();
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(temp_dir.path().join("config.toml"), "port = 9100\ndemo = false\n")
            .expect("write config");
        env::set_var("CATERING_CONFIG_DIR", temp_dir.path());
        env::set_var("CATERING_DEMO", "true");
        env::set_var("CATERING_PORT", "9200");

        let config = load_config().expect("config should load");

        env::remove_var("CATERING_DEMO");
        env::remove_var("CATERING_PORT");
        env::remove_var("CATERING_CONFIG_DIR");

        assert_eq!(config.port, 9200);
        assert!(config.demo);
    }
}
