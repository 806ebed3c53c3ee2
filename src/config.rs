use coderefine::domain::{ParseFailurePolicy, TimeoutSecs};
use coderefine::history::HistoryLimits;
use coderefine::llm::OpenAiConfig;
use coderefine::runner::RefineConfig;
use coderefine::sandbox::SandboxConfig;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmSection,
    pub sandbox: SandboxSection,
    pub refine: RefineSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub generation_temperature: f32,
    pub evaluation_temperature: f32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 4096,
            timeout_ms: 300000,
            generation_temperature: 0.7,
            evaluation_temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSection {
    pub interpreter: PathBuf,
    pub interpreter_args: Vec<String>,
    pub scratch_dir: Option<PathBuf>,
    pub default_timeout_secs: u64,
    pub max_output_bytes: usize,
}

impl Default for SandboxSection {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from("python3"),
            interpreter_args: Vec::new(),
            scratch_dir: None,
            default_timeout_secs: TimeoutSecs::DEFAULT,
            max_output_bytes: coderefine::sandbox::DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineSection {
    pub max_attempts: u32,
    pub pacing_delay_ms: u64,
    pub parse_failure_policy: ParseFailurePolicy,
    pub excerpt_chars: usize,
    pub max_summaries: usize,
    /// Lines of stdout/stderr shown per stream for the latest attempt
    pub max_output_lines: usize,
}

impl Default for RefineSection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pacing_delay_ms: 1000,
            parse_failure_policy: ParseFailurePolicy::AcceptAsSuccess,
            excerpt_chars: 200,
            max_summaries: 10,
            max_output_lines: 50,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmSection::default(),
            sandbox: SandboxSection::default(),
            refine: RefineSection::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the loop or sandbox would refuse later anyway
    pub fn validate(&self) -> Result<()> {
        TimeoutSecs::new(self.sandbox.default_timeout_secs).context("sandbox.default_timeout_secs")?;
        if self.refine.max_attempts == 0 {
            return Err(eyre!("refine.max_attempts must be >= 1"));
        }
        if self.refine.max_summaries == 0 {
            return Err(eyre!("refine.max_summaries must be >= 1"));
        }
        if let Some(level) = &self.log_level {
            level
                .parse::<log::LevelFilter>()
                .map_err(|_| eyre!("log_level {:?} is not a log level", level))?;
        }
        if self.llm.timeout_ms == 0 {
            return Err(eyre!("llm.timeout_ms must be > 0"));
        }
        Ok(())
    }

    pub fn sandbox_config(&self) -> SandboxConfig {
        let mut config = SandboxConfig {
            interpreter: self.sandbox.interpreter.clone(),
            interpreter_args: self.sandbox.interpreter_args.clone(),
            ..Default::default()
        }
        .max_output_bytes(self.sandbox.max_output_bytes);
        if let Some(dir) = &self.sandbox.scratch_dir {
            config = config.scratch_dir(dir);
        }
        config
    }

    pub fn refine_config(&self) -> Result<RefineConfig> {
        let execution_timeout = TimeoutSecs::new(self.sandbox.default_timeout_secs)?;
        Ok(RefineConfig::default()
            .with_max_attempts(self.refine.max_attempts)
            .with_execution_timeout(execution_timeout)
            .with_pacing_delay(Duration::from_millis(self.refine.pacing_delay_ms))
            .with_parse_failure_policy(self.refine.parse_failure_policy)
            .with_oracle_timeout(self.oracle_timeout())
            .with_history_limits(HistoryLimits {
                excerpt_chars: self.refine.excerpt_chars,
                max_summaries: self.refine.max_summaries,
                max_output_lines: self.refine.max_output_lines,
            }))
    }

    /// Default filter for the logger; `--verbose` wins over `log_level`
    pub fn log_filter(&self, verbose: bool) -> &str {
        if verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or("info")
        }
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            model: self.llm.model.clone(),
            base_url: self.llm.base_url.clone(),
            max_tokens: self.llm.max_tokens,
            timeout: self.oracle_timeout(),
        }
    }

    fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.llm.timeout_ms)
    }
}
