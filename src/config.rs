use crate::classifier::DiffKind;
use crate::cli::{Cli, OutputFormat, VerbosityLevel};
use crate::error::ConfigurationResult;
use crate::settings::{ComparisonSettings, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_NAMES: [&str; 4] = [
    "xml-compare.toml",
    "xml-compare.json",
    ".xml-compare.toml",
    ".xml-compare.json",
];

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// A comparison profile
///
/// Every section is optional in a profile file; missing values keep their
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub comparison: ComparisonConfig,
    pub tolerate: Vec<ToleranceConfig>,
    /// Element name to key expression
    pub keys: BTreeMap<String, String>,
    pub output: OutputConfig,
}

/// Comparison-engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Compare element text exactly instead of trimmed and collapsed
    pub whitespace_relevant: bool,
    /// Maximum element nesting depth
    pub max_depth: usize,
}

/// One tolerance rule; without a kind it covers the whole subtree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToleranceConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiffKind>,
}

impl ToleranceConfig {
    pub fn any(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: None,
        }
    }

    pub fn of_kind(kind: DiffKind, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: Some(kind),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (verdict only)
    pub quiet: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            whitespace_relevant: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Compiles the profile into engine settings
    pub fn to_settings(&self) -> ConfigurationResult<ComparisonSettings> {
        let mut builder = ComparisonSettings::builder()
            .whitespace_relevant(self.comparison.whitespace_relevant)
            .max_depth(self.comparison.max_depth);
        for rule in &self.tolerate {
            builder = match rule.kind {
                None => builder.tolerate_any_diff_at(&rule.path),
                Some(kind) => builder.tolerate_generic_diff(kind, &rule.path),
            };
        }
        for (element, expression) in &self.keys {
            builder = builder.add_key_expression(element, expression);
        }
        builder.build()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider, cli).await
    }

    /// Same as [`ConfigManager::load_config`] with a custom environment provider
    pub async fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path).await?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides_with(env, config)?;

        // CLI arguments have the highest precedence
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Some("json") => {
                let config: Config = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    let config: Config = serde_json::from_str(&content)?;
                    Ok(config)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        if let Some(config) = Self::find_config_in(Path::new(".")).await? {
            return Ok(Some(config));
        }

        if let Some(config_dir) = dirs::config_dir() {
            return Self::find_config_in(&config_dir.join("xml-compare")).await;
        }

        Ok(None)
    }

    /// Load the first profile with a well-known name inside `dir`
    pub async fn find_config_in(dir: &Path) -> Result<Option<Config>> {
        for name in CONFIG_NAMES {
            let path: PathBuf = dir.join(name);
            if path.is_file() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }
        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(whitespace) = env.get("XML_COMPARE_WHITESPACE") {
            config.comparison.whitespace_relevant = parse_env("XML_COMPARE_WHITESPACE", &whitespace)?;
        }

        if let Some(max_depth) = env.get("XML_COMPARE_MAX_DEPTH") {
            config.comparison.max_depth = parse_env("XML_COMPARE_MAX_DEPTH", &max_depth)?;
        }

        if let Some(verbose) = env.get("XML_COMPARE_VERBOSE") {
            config.output.verbose = parse_env("XML_COMPARE_VERBOSE", &verbose)?;
        }

        if let Some(quiet) = env.get("XML_COMPARE_QUIET") {
            config.output.quiet = parse_env("XML_COMPARE_QUIET", &quiet)?;
        }

        if let Some(format) = env.get("XML_COMPARE_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid XML_COMPARE_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.ignore_whitespace {
            config.comparison.whitespace_relevant = false;
        }
        if let Some(max_depth) = cli.max_depth {
            config.comparison.max_depth = max_depth;
        }

        config
            .tolerate
            .extend(cli.tolerate.iter().map(ToleranceConfig::any));
        let exact = [
            (DiffKind::Different, &cli.tolerate_different),
            (DiffKind::Missing, &cli.tolerate_missing),
            (DiffKind::Unexpected, &cli.tolerate_unexpected),
        ];
        for (kind, paths) in exact {
            config
                .tolerate
                .extend(paths.iter().map(|path| ToleranceConfig::of_kind(kind, path)));
        }
        config.keys.extend(cli.keys.iter().cloned());

        if let Some(format) = cli.output_format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        config
    }

    /// Merge two configurations; rules accumulate, keys and scalars are overridden
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        base.comparison = override_config.comparison;
        base.tolerate.extend(override_config.tolerate);
        base.keys.extend(override_config.keys);
        base.output = override_config.output;
        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.comparison.max_depth == 0 {
            return Err(ConfigError::Validation(
                "Maximum depth must be greater than 0".to_string(),
            ));
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        for rule in &config.tolerate {
            if rule.path.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Tolerance paths must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
}
