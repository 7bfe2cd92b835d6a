// Configuration loader
// Resolves ~/.wren/config.toml, then WREN_* environment overrides

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;

const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// On-disk shape. Everything is optional so environment variables can fill
/// the gaps of a partial (or absent) file.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    markdown: Option<bool>,
    command_timeout_secs: Option<u64>,
}

/// Environment overrides, split out so resolution is testable without
/// touching the process environment.
#[derive(Debug, Default)]
struct EnvOverrides {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            api_base: non_empty_var("WREN_API_BASE"),
            api_key: non_empty_var("WREN_API_KEY"),
            model: non_empty_var("WREN_MODEL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Load configuration from ~/.wren/config.toml and the environment.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    let file = read_file_config(&path)?;
    resolve(file, EnvOverrides::from_env(), &path)
}

fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".wren/config.toml"))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn resolve(file: FileConfig, env: EnvOverrides, path: &Path) -> Result<Config> {
    let api_base = env.api_base.or(file.api_base);
    let api_key = env.api_key.or(file.api_key);
    let model = env.model.or(file.model);

    let (api_base, api_key, model) = match (api_base, api_key, model) {
        (Some(base), Some(key), Some(model)) => (base, key, model),
        _ => bail!(
            "No usable configuration found.\n\n\
             Create {} with:\n\n\
             api_base = \"https://llm.example.com/api\"\n\
             api_key = \"sk-...\"\n\
             model = \"x-ai/grok-4.1-fast:free\"\n\n\
             Or set WREN_API_BASE, WREN_API_KEY and WREN_MODEL.",
            path.display()
        ),
    };

    let config = Config {
        api_base,
        api_key,
        model,
        markdown: file.markdown.unwrap_or(true),
        command_timeout_secs: file
            .command_timeout_secs
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
    };

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}
