use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for SciGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SciGraphConfig {
    /// Generative backend configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Hypothesis synthesis settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The closed set of generative backends. `RuleBased` never leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    #[default]
    RuleBased,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendKind::Anthropic => "anthropic",
            BackendKind::OpenAI => "openai",
            BackendKind::Gemini => "gemini",
            BackendKind::RuleBased => "rule-based",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(BackendKind::Anthropic),
            "openai" => Ok(BackendKind::OpenAI),
            "gemini" => Ok(BackendKind::Gemini),
            "rule-based" | "rule_based" | "rules" | "template" | "none" => {
                Ok(BackendKind::RuleBased)
            }
            other => Err(ConfigError::ValidationError(format!(
                "Invalid LLM provider: {}. Must be one of: anthropic, openai, gemini, rule-based",
                other
            ))),
        }
    }
}

/// Generative backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Backend: "anthropic", "openai", "gemini" or "rule-based"
    #[serde(default)]
    pub provider: BackendKind,

    /// Model identifier (provider default when unset)
    /// For Anthropic: e.g. "claude-3-5-sonnet-20241022"
    /// For OpenAI: e.g. "gpt-4o"
    /// For Gemini: e.g. "gemini-1.5-pro"
    #[serde(default)]
    pub model: Option<String>,

    /// Anthropic API key
    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Gemini API key
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// OpenAI base URL (for proxies and compatible endpoints)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: BackendKind::default(),
            model: None,
            anthropic_api_key: None,
            openai_api_key: None,
            gemini_api_key: None,
            openai_base_url: default_openai_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Hypothesis synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Number of hypotheses to produce
    #[serde(default = "default_num_hypotheses")]
    pub num_hypotheses: usize,

    /// Upper bound on the whole backend call, in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Optional focus area appended to prompts and templates
    #[serde(default)]
    pub focus_area: Option<String>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            num_hypotheses: default_num_hypotheses(),
            backend_timeout_secs: default_backend_timeout_secs(),
            focus_area: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> usize {
    4000
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    2
}
fn default_num_hypotheses() -> usize {
    5
}
fn default_backend_timeout_secs() -> u64 {
    120
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with smart defaults
pub struct ConfigManager {
    config: SciGraphConfig,
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.scigraph.toml)
    /// 3. Sensible defaults
    ///
    /// Nothing is logged about the outcome here; call [`ConfigManager::log_summary`]
    /// once logging has been set up from the loaded configuration.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        Ok(Self {
            config,
            config_path,
            env_file,
        })
    }

    /// Load configuration from an explicit file, still honouring env overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::apply_env_overrides(Self::read_toml_file(path)?);
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
            env_file: None,
        })
    }

    /// Load `./.env`, else `~/.scigraph.env`, returning the file that was applied.
    fn load_dotenv() -> Option<PathBuf> {
        let local = PathBuf::from(".env");
        let candidate = if local.exists() {
            local
        } else {
            dirs::home_dir()
                .map(|home| home.join(".scigraph.env"))
                .filter(|path| path.exists())?
        };
        match dotenv::from_path(&candidate) {
            Ok(()) => Some(candidate),
            Err(e) => {
                warn!("Failed to load {}: {}", candidate.display(), e);
                None
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.scigraph.toml (current directory)
    /// 2. ~/.scigraph/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(SciGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".scigraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((SciGraphConfig::default(), None))
    }

    /// `~/.scigraph/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".scigraph").join("config.toml"))
    }

    fn read_toml_file(path: &Path) -> Result<SciGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: SciGraphConfig) -> SciGraphConfig {
        if let Ok(provider) = std::env::var("SCIGRAPH_LLM_PROVIDER") {
            match provider.parse() {
                Ok(kind) => config.llm.provider = kind,
                Err(e) => warn!("Ignoring SCIGRAPH_LLM_PROVIDER: {}", e),
            }
        }
        if let Ok(model) = std::env::var("SCIGRAPH_MODEL") {
            config.llm.model = Some(model);
        }
        if let Ok(temp) = std::env::var("SCIGRAPH_TEMPERATURE") {
            if let Ok(t) = temp.parse() {
                config.llm.temperature = t;
            }
        }
        if let Ok(timeout) = std::env::var("SCIGRAPH_LLM_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.llm.timeout_secs = secs;
                config.synthesis.backend_timeout_secs = secs;
            }
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.llm.anthropic_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.llm.gemini_api_key = Some(key);
        }

        if let Ok(count) = std::env::var("SCIGRAPH_NUM_HYPOTHESES") {
            if let Ok(n) = count.parse() {
                config.synthesis.num_hypotheses = n;
            }
        }
        if let Ok(focus) = std::env::var("SCIGRAPH_FOCUS_AREA") {
            if !focus.trim().is_empty() {
                config.synthesis.focus_area = Some(focus);
            }
        }

        // Directive lists (e.g. "scigraph_ai=debug") are left to EnvFilter.
        if let Ok(level) = std::env::var("RUST_LOG") {
            let level = level.trim().to_lowercase();
            if matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                config.logging.level = level;
            }
        }

        config
    }

    /// Validate configuration
    pub fn validate_config(config: &SciGraphConfig) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid temperature: {}. Must be between 0.0 and 2.0",
                config.llm.temperature
            )));
        }

        if config.llm.timeout_secs == 0 || config.synthesis.backend_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Timeouts must be greater than zero".to_string(),
            ));
        }

        if config.synthesis.num_hypotheses == 0 {
            return Err(ConfigError::ValidationError(
                "num_hypotheses must be greater than zero".to_string(),
            ));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, compact, json",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &SciGraphConfig {
        &self.config
    }

    /// Get a mutable handle, e.g. for CLI flag overrides
    pub fn config_mut(&mut self) -> &mut SciGraphConfig {
        &mut self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Human-readable lines describing where the configuration came from.
    pub fn summary(&self) -> Vec<String> {
        let source = |path: Option<&Path>, none: &str| {
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|| none.to_string())
        };
        vec![
            format!(
                "📄 Config file: {}",
                source(self.config_path(), "NONE (using defaults)")
            ),
            format!("📋 Env file: {}", source(self.env_file.as_deref(), "NONE")),
            format!("🤖 Hypothesis backend: {}", self.config.llm.provider),
            format!(
                "🔧 Model: {}",
                self.config.llm.model.as_deref().unwrap_or("provider default")
            ),
            format!(
                "🧪 Hypotheses per report: {}",
                self.config.synthesis.num_hypotheses
            ),
        ]
    }

    pub fn log_summary(&self) {
        info!("🔧 SciGraph configuration");
        for line in self.summary() {
            info!("   {}", line);
        }
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = SciGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SciGraphConfig::default();
        assert_eq!(config.llm.provider, BackendKind::RuleBased);
        assert_eq!(config.synthesis.num_hypotheses, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = SciGraphConfig::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        let mut bad_config = config.clone();
        bad_config.llm.temperature = 3.5;
        assert!(ConfigManager::validate_config(&bad_config).is_err());

        let mut bad_config = config.clone();
        bad_config.synthesis.num_hypotheses = 0;
        assert!(ConfigManager::validate_config(&bad_config).is_err());

        let mut bad_config = config;
        bad_config.logging.format = "xml".to_string();
        assert!(ConfigManager::validate_config(&bad_config).is_err());
    }

    #[test]
    fn test_summary_reports_sources() {
        let mut manager = ConfigManager {
            config: SciGraphConfig::default(),
            config_path: None,
            env_file: None,
        };
        let summary = manager.summary();
        assert!(summary[0].ends_with("NONE (using defaults)"));
        assert!(summary[2].ends_with("rule-based"));
        assert!(summary[3].ends_with("provider default"));

        manager.config_path = Some(PathBuf::from("/etc/scigraph.toml"));
        manager.config_mut().llm.model = Some("gpt-4o".to_string());
        let summary = manager.summary();
        assert!(summary[0].ends_with("/etc/scigraph.toml"));
        assert!(summary[3].ends_with("gpt-4o"));
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("Anthropic".parse::<BackendKind>().unwrap(), BackendKind::Anthropic);
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAI);
        assert_eq!("rule-based".parse::<BackendKind>().unwrap(), BackendKind::RuleBased);
        assert!("gpt-4".parse::<BackendKind>().is_err());
    }
}
