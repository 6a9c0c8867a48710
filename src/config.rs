//! Layered application configuration.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. A TOML file: `--config PATH`, else `config.toml` in the platform config dir
//! 3. `DUPEKEEP_`-prefixed environment variables, `__` separating sections
//!    (e.g. `DUPEKEEP_INDEXER__MIN_SIZE=4096`)
//!
//! Command-line flags are applied on top by the caller.
//!
//! ```toml
//! [indexer]
//! min_size = 1
//! follow_symlinks = false
//! ignore_dirnames = ["node_modules", ".cache"]
//!
//! [policy]
//! forbid_total_deletion = true
//! require_certainty = true
//!
//! [rules]
//! use_defaults = true
//! keep = ["^/srv/masters/"]
//! delete = ["/Downloads/"]
//! prefer = ["deepest"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{
    default_rules, BuiltinRule, CompositionPolicy, NamedRule, Preference, RuleEngine, RuleError,
};
use crate::scanner::IndexerConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPEKEEP_";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be parsed or had the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A rule pattern did not compile.
    #[error("invalid rule in configuration: {0}")]
    Rule(#[from] RuleError),
}

/// `[indexer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Minimum file size in bytes
    pub min_size: u64,
    /// Maximum file size in bytes
    pub max_size: Option<u64>,
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Directory basenames to skip
    pub ignore_dirnames: Vec<String>,
    /// Descend below each root
    pub recursive: bool,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: None,
            follow_symlinks: false,
            ignore_dirnames: Vec::new(),
            recursive: true,
        }
    }
}

impl IndexSettings {
    /// Indexer configuration at the given diagnostic verbosity.
    #[must_use]
    pub fn indexer_config(&self, verbosity: u8) -> IndexerConfig {
        IndexerConfig {
            min_size: self.min_size,
            max_size: self.max_size,
            follow_symlinks: self.follow_symlinks,
            verbosity,
            ..IndexerConfig::default()
        }
        .with_ignore_dirnames(self.ignore_dirnames.iter().cloned())
    }
}

/// `[rules]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Start from the protective default rules
    pub use_defaults: bool,
    /// Regexes whose matches are kept
    pub keep: Vec<String>,
    /// Regexes whose matches are deleted (non-matches are kept)
    pub delete: Vec<String>,
    /// Tie-breaking strategies, applied after the pattern rules
    pub prefer: Vec<Preference>,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            use_defaults: true,
            keep: Vec::new(),
            delete: Vec::new(),
            prefer: Vec::new(),
        }
    }
}

impl RuleSettings {
    /// Build the rule list: defaults, keep patterns, delete patterns, preferences.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] for the first bad regex.
    pub fn build_rules(&self) -> Result<Vec<NamedRule>, RuleError> {
        let mut rules = if self.use_defaults {
            default_rules()
        } else {
            Vec::new()
        };
        for pattern in &self.keep {
            let rule = BuiltinRule::keep_regex(pattern)?;
            rules.push(NamedRule::new(rule.describe(), rule));
        }
        for pattern in &self.delete {
            let rule = BuiltinRule::delete_regex(pattern)?;
            rules.push(NamedRule::new(rule.describe(), rule));
        }
        for pref in &self.prefer {
            let rule = pref.rule();
            rules.push(NamedRule::new(rule.describe(), rule));
        }
        Ok(rules)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Indexer settings
    pub indexer: IndexSettings,
    /// Composition safety policy
    pub policy: CompositionPolicy,
    /// Rule list settings
    pub rules: RuleSettings,
}

impl Config {
    /// Load from defaults, a TOML file, and the environment.
    ///
    /// With `path` set the file must exist; otherwise the platform config
    /// file is used if present.
    ///
    /// # Errors
    ///
    /// Fails if an explicit file is missing, a source is malformed, or a
    /// rule pattern does not compile.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(p) => {
                if !p.is_file() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                log::debug!("Loading config from {}", p.display());
                figment = figment.merge(Toml::file(p));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    log::debug!("Looking for config at {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate a configuration from an assembled figment.
    ///
    /// # Errors
    ///
    /// Fails if extraction fails or a rule pattern does not compile.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every configured rule compiles.
    ///
    /// # Errors
    ///
    /// Returns the first rule error.
    pub fn validate(&self) -> Result<(), RuleError> {
        self.rules.build_rules().map(|_| ())
    }

    /// Rule engine for this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first rule error.
    pub fn rule_engine(&self) -> Result<RuleEngine, RuleError> {
        Ok(RuleEngine::new(self.rules.build_rules()?, self.policy))
    }

    /// Platform-specific config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "dupekeep", "dupekeep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
