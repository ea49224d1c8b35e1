use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storefront::pricing::Discount;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["bookworm.toml", "config/bookworm.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub storefront: StorefrontConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub base_url: String,
    pub list_name: String,
    pub api_key: Option<SecretString>,
    /// Unset means the request may wait indefinitely.
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub title: String,
    pub currency: String,
    pub discount_pct: u8,
    pub price_min: u32,
    pub price_max: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Values given on the command line; they win over env and file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub feed_list_name: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    /// Set when the path was named explicitly; a missing file is then an error.
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig {
                base_url: "https://api.nytimes.com/svc/books/v3".to_string(),
                list_name: "hardcover-fiction".to_string(),
                api_key: None,
                timeout_secs: None,
            },
            storefront: StorefrontConfig {
                title: "Kitap Kurdu Alışveriş".to_string(),
                currency: "TL".to_string(),
                discount_pct: 20,
                price_min: 20,
                price_max: 119,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl FeedConfig {
    /// Endpoint of the configured list, without credentials.
    pub fn list_url(&self) -> String {
        format!("{}/lists/current/{}.json", self.base_url.trim_end_matches('/'), self.list_name)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().map(|key| !key.expose_secret().trim().is_empty()).unwrap_or(false)
    }
}

impl StorefrontConfig {
    pub fn discount(&self) -> Discount {
        Discount::percent(self.discount_pct)
    }

    pub fn price_range(&self) -> std::ops::RangeInclusive<u32> {
        self.price_min..=self.price_max
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("bookworm.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(feed) = patch.feed {
            if let Some(base_url) = feed.base_url {
                self.feed.base_url = base_url;
            }
            if let Some(list_name) = feed.list_name {
                self.feed.list_name = list_name;
            }
            if let Some(api_key) = feed.api_key {
                self.feed.api_key = Some(api_key.into());
            }
            if let Some(timeout_secs) = feed.timeout_secs {
                self.feed.timeout_secs = Some(timeout_secs);
            }
        }

        if let Some(storefront) = patch.storefront {
            if let Some(title) = storefront.title {
                self.storefront.title = title;
            }
            if let Some(currency) = storefront.currency {
                self.storefront.currency = currency;
            }
            if let Some(discount_pct) = storefront.discount_pct {
                self.storefront.discount_pct = discount_pct;
            }
            if let Some(price_min) = storefront.price_min {
                self.storefront.price_min = price_min;
            }
            if let Some(price_max) = storefront.price_max {
                self.storefront.price_max = price_max;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BOOKWORM_FEED_BASE_URL") {
            self.feed.base_url = value;
        }
        if let Some(value) = read_env("BOOKWORM_FEED_LIST_NAME") {
            self.feed.list_name = value;
        }
        if let Some(value) = read_env("BOOKWORM_FEED_API_KEY") {
            self.feed.api_key = Some(value.into());
        }
        if let Some(value) = read_env("BOOKWORM_FEED_TIMEOUT_SECS") {
            self.feed.timeout_secs = Some(parse_number("BOOKWORM_FEED_TIMEOUT_SECS", &value)?);
        }

        if let Some(value) = read_env("BOOKWORM_STOREFRONT_TITLE") {
            self.storefront.title = value;
        }
        if let Some(value) = read_env("BOOKWORM_STOREFRONT_CURRENCY") {
            self.storefront.currency = value;
        }
        if let Some(value) = read_env("BOOKWORM_STOREFRONT_DISCOUNT_PCT") {
            self.storefront.discount_pct =
                parse_number("BOOKWORM_STOREFRONT_DISCOUNT_PCT", &value)?;
        }
        if let Some(value) = read_env("BOOKWORM_STOREFRONT_PRICE_MIN") {
            self.storefront.price_min = parse_number("BOOKWORM_STOREFRONT_PRICE_MIN", &value)?;
        }
        if let Some(value) = read_env("BOOKWORM_STOREFRONT_PRICE_MAX") {
            self.storefront.price_max = parse_number("BOOKWORM_STOREFRONT_PRICE_MAX", &value)?;
        }

        let log_level =
            read_env("BOOKWORM_LOGGING_LEVEL").or_else(|| read_env("BOOKWORM_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BOOKWORM_LOGGING_FORMAT").or_else(|| read_env("BOOKWORM_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(list_name) = overrides.feed_list_name {
            self.feed.list_name = list_name;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_feed(&self.feed)?;
        validate_storefront(&self.storefront)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_feed(feed: &FeedConfig) -> Result<(), ConfigError> {
    let base_url = feed.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "feed.base_url must start with http:// or https://".to_string(),
        ));
    }

    if feed.list_name.trim().is_empty() || feed.list_name.contains('/') {
        return Err(ConfigError::Validation(
            "feed.list_name must be a non-empty list slug such as `hardcover-fiction`".to_string(),
        ));
    }

    if let Some(timeout_secs) = feed.timeout_secs {
        if timeout_secs == 0 || timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "feed.timeout_secs must be in range 1..=300 when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_storefront(storefront: &StorefrontConfig) -> Result<(), ConfigError> {
    if storefront.currency.trim().is_empty() {
        return Err(ConfigError::Validation("storefront.currency must not be empty".to_string()));
    }

    if storefront.discount_pct > 100 {
        return Err(ConfigError::Validation(
            "storefront.discount_pct must be in range 0..=100".to_string(),
        ));
    }

    if storefront.price_min == 0 {
        return Err(ConfigError::Validation(
            "storefront.price_min must be greater than zero".to_string(),
        ));
    }

    if storefront.price_min > storefront.price_max {
        return Err(ConfigError::Validation(format!(
            "storefront.price_min ({}) must not exceed storefront.price_max ({})",
            storefront.price_min, storefront.price_max
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    feed: Option<FeedPatch>,
    storefront: Option<StorefrontPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedPatch {
    base_url: Option<String>,
    list_name: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StorefrontPatch {
    title: Option<String>,
    currency: Option<String>,
    discount_pct: Option<u8>,
    price_min: Option<u32>,
    price_max: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_point_at_hardcover_fiction_without_credentials() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(
            config.feed.list_url()
                == "https://api.nytimes.com/svc/books/v3/lists/current/hardcover-fiction.json",
            "default list url should target hardcover fiction",
        )?;
        ensure(!config.feed.has_api_key(), "no api key should be configured by default")?;
        ensure(config.feed.timeout_secs.is_none(), "no request timeout by default")?;
        ensure(config.storefront.price_range() == (20..=119), "default price range is 20..=119")?;
        ensure(config.storefront.discount().as_percent() == 20, "default discount is 20%")?;
        Ok(())
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_BOOKWORM_KEY", "key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("bookworm.toml");
            fs::write(
                &path,
                r#"
[feed]
api_key = "${TEST_BOOKWORM_KEY}"
list_name = "paperback-nonfiction"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let key = config.feed.api_key.as_ref().map(|key| key.expose_secret().to_string());
            ensure(key.as_deref() == Some("key-from-env"), "api key should be interpolated")?;
            ensure(
                config.feed.list_name == "paperback-nonfiction",
                "list name should come from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_BOOKWORM_KEY"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKWORM_LOG_LEVEL", "warn");
        env::set_var("BOOKWORM_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["BOOKWORM_LOG_LEVEL", "BOOKWORM_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKWORM_FEED_LIST_NAME", "from-env");
        env::set_var("BOOKWORM_STOREFRONT_CURRENCY", "EUR");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("bookworm.toml");
            fs::write(
                &path,
                r#"
[feed]
list_name = "from-file"
base_url = "http://localhost:9000/books"

[storefront]
currency = "USD"
discount_pct = 10

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    feed_list_name: Some("from-flag".to_string()),
                    log_level: Some("debug".to_string()),
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.feed.list_name == "from-flag", "flag list name should win over env")?;
            ensure(config.storefront.currency == "EUR", "env currency should win over file")?;
            ensure(
                config.feed.base_url == "http://localhost:9000/books",
                "file base url should win over default",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.storefront.discount_pct == 10, "file discount should win over default")?;
            Ok(())
        })();

        clear_vars(&["BOOKWORM_FEED_LIST_NAME", "BOOKWORM_STOREFRONT_CURRENCY"]);
        result
    }

    #[test]
    fn explicit_config_path_must_exist_when_required() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        })
        .err()
        .ok_or_else(|| "expected a missing file failure".to_string())?;
        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref path) if path == &missing),
            "failure should name the missing path",
        )?;

        AppConfig::load(LoadOptions { config_path: Some(missing), ..LoadOptions::default() })
            .map_err(|err| format!("optional missing file should fall back to defaults: {err}"))?;
        Ok(())
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKWORM_STOREFRONT_PRICE_MIN", "200");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("storefront.price_min")
            );
            ensure(has_message, "validation failure should mention storefront.price_min")
        })();

        clear_vars(&["BOOKWORM_STOREFRONT_PRICE_MIN"]);
        result
    }

    #[test]
    fn malformed_numeric_env_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKWORM_FEED_TIMEOUT_SECS", "soon");

        let result = (|| -> Result<(), String> {
            let error = AppConfig::load(LoadOptions::default())
                .err()
                .ok_or_else(|| "expected an env override failure".to_string())?;
            ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "BOOKWORM_FEED_TIMEOUT_SECS"),
                "failure should name the offending variable",
            )
        })();

        clear_vars(&["BOOKWORM_FEED_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn api_key_is_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKWORM_FEED_API_KEY", "super-secret-key-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(config.feed.has_api_key(), "api key should be loaded from env")?;
            ensure(
                !debug.contains("super-secret-key-value"),
                "debug output should not contain the api key",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["BOOKWORM_FEED_API_KEY"]);
        result
    }
}
