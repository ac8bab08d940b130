//! Loader for tweetie configuration with YAML + environment overlays.
//!
//! Precedence, lowest to highest: built-in defaults, YAML sources in the order
//! they were added, then `TWEETIE__`-prefixed environment variables (`__`
//! separates nesting levels, e.g. `TWEETIE__HTTP__MAX_RETRIES=0`). String
//! values may reference `${VAR}` placeholders, which are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tweetie_common::observability::LogFormat;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1/";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TweetieConfig {
    /// First line holds `consumer_key, consumer_secret, access_token, access_token_secret`.
    pub credentials_file: PathBuf,
    /// Screen name used when a command is given no account.
    pub account: String,
    pub api_base: String,
    /// Posts requested per `statuses/user_timeline` call.
    pub timeline_count: u32,
    /// Accounts requested per `friends/list` page.
    pub friends_page_size: u32,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
}

impl Default for TweetieConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("twitter.csv"),
            account: "the_antlr_guy".into(),
            api_base: DEFAULT_API_BASE.into(),
            timeline_count: 100,
            friends_page_size: 200,
            http: HttpSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            emit_stderr: false,
            dir: None,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TweetieConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TweetieConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetieConfigLoader {
    /// Start with built-in defaults overlaid by `TWEETIE__` env overrides.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// let config = TweetieConfigLoader::new()
    ///     .with_yaml_str("account: jack")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.account, "jack");
    /// assert_eq!(config.timeline_count, 100);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent, so a bare checkout runs on
    /// defaults and environment variables alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    /// use tweetie_common::observability::LogFormat;
    ///
    /// let cfg = TweetieConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// credentials_file: "keys/twitter.csv"
    /// http:
    ///   max_retries: 0
    /// logging:
    ///   format: json
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.credentials_file.to_str(), Some("keys/twitter.csv"));
    /// assert_eq!(cfg.http.max_retries, 0);
    /// assert_eq!(cfg.http.timeout_secs, 15);
    /// assert_eq!(cfg.logging.format, LogFormat::Json);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are layered last, then `${VAR}` placeholders are
    /// expanded before materialising [`TweetieConfig`].
    pub fn load(self) -> Result<TweetieConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("TWEETIE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
