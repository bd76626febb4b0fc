// ABOUTME: loads and saves the toml configuration holding user settings and engine tunables.
// ABOUTME: a missing file means defaults; a malformed file is reported instead of ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nlterm_common::Settings;
use serde::{Deserialize, Serialize};

use crate::actions::exec::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};
use crate::delay::DelayRange;
use crate::error::EngineError;

const APP_NAME: &str = "nlterm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub translate_delay_ms: DelayRange,
    pub explain_delay_ms: u64,
    pub exec_timeout_secs: u64,
    pub max_output_bytes: usize,
    pub mock_exec_delay_ms: DelayRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            translate_delay_ms: DelayRange(500, 1000),
            explain_delay_ms: 300,
            exec_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            mock_exec_delay_ms: DelayRange(300, 800),
            journal_path: None,
        }
    }
}

impl EngineConfig {
    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    /// Drops every artificial delay; used by one-shot commands and tests.
    pub fn without_delays(mut self) -> Self {
        self.translate_delay_ms = DelayRange::NONE;
        self.explain_delay_ms = 0;
        self.mock_exec_delay_ms = DelayRange::NONE;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub engine: EngineConfig,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("config.toml")
}

pub fn load_config(path: &Path) -> Result<Config, EngineError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config, EngineError> {
    let config: Config = toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
    if config.engine.exec_timeout_secs == 0 {
        return Err(EngineError::Config("engine.exec_timeout_secs must be positive".to_string()));
    }
    if config.engine.max_output_bytes == 0 {
        return Err(EngineError::Config("engine.max_output_bytes must be positive".to_string()));
    }
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
