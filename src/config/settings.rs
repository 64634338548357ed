use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::console::Latency;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Anthropic,
    Bedrock,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub aws_region: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactConfig {
    #[serde(default = "default_whatsapp_number")]
    pub whatsapp_number: String,
    #[serde(default = "default_message")]
    pub default_message: String,
}

/// Simulated console latency, in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_base_latency")]
    pub base_latency_ms: u64,
    #[serde(default = "default_jitter")]
    pub jitter_ms: u64,
    #[serde(default = "default_unknown_delay")]
    pub unknown_delay_ms: u64,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_whatsapp_number() -> String {
    "201288181123".to_string()
}

fn default_message() -> String {
    "Hi, I'm interested in learning more about ParSec's automation solutions.".to_string()
}

fn default_base_latency() -> u64 {
    300
}

fn default_jitter() -> u64 {
    400
}

fn default_unknown_delay() -> u64 {
    200
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            aws_region: None,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: default_whatsapp_number(),
            default_message: default_message(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_latency_ms: default_base_latency(),
            jitter_ms: default_jitter(),
            unknown_delay_ms: default_unknown_delay(),
        }
    }
}

impl ConsoleConfig {
    pub fn latency(&self) -> Latency {
        Latency::new(
            Duration::from_millis(self.base_latency_ms),
            Duration::from_millis(self.jitter_ms),
            Duration::from_millis(self.unknown_delay_ms),
        )
    }
}

pub fn parsec_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".parsec"))
}

pub fn db_path() -> Result<PathBuf> {
    Ok(parsec_dir()?.join("parsec.db"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(parsec_dir()?.join("config.toml"))
}

pub fn env_file() -> Result<PathBuf> {
    Ok(parsec_dir()?.join("env"))
}

/// `KEY=value` pairs from an env file. Blank lines and `#` comments are skipped,
/// surrounding quotes are stripped.
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim().trim_start_matches("export ").trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.to_string(), value.to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Exports variables from `path` without overriding ones already set.
pub fn load_env_file(path: &Path) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };
    for (key, value) in parse_env(&content) {
        if std::env::var(&key).is_err() {
            std::env::set_var(&key, value);
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_env_file(&env_file()?);
    let mut config = load_config_from(&config_path()?)?;
    if config.llm.api_key.is_none() {
        config.llm.api_key = std::env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty());
    }
    Ok(config)
}

/// Reads a config file; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

pub fn ensure_parsec_dir() -> Result<PathBuf> {
    let dir = parsec_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Anthropic);
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.contact.whatsapp_number, "201288181123");
        assert_eq!(config.console.latency(), Latency::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[llm]\nprovider = \"bedrock\"\naws_region = \"eu-west-1\"\n\n[console]\njitter_ms = 0"
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Bedrock);
        assert_eq!(config.llm.aws_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.llm.base_url, "https://api.anthropic.com");
        assert_eq!(config.console.jitter_ms, 0);
        assert_eq!(config.console.base_latency_ms, 300);
        assert_eq!(config.contact.default_message, default_message());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm\nprovider = ").unwrap();
        assert!(load_config_from(file.path()).is_err());
    }

    #[test]
    fn test_parse_env() {
        let pairs = parse_env(
            "# keys\nANTHROPIC_API_KEY=\"sk-test\"\n\nexport AWS_REGION='us-west-2'\nnot a pair\n=orphan\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("ANTHROPIC_API_KEY".to_string(), "sk-test".to_string()),
                ("AWS_REGION".to_string(), "us-west-2".to_string()),
            ]
        );
    }
}
