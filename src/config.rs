//! Runtime configuration read once from the environment.
//!
//! Every component that needs a setting receives `&Config`; nothing below
//! `main` reads environment variables on its own.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::error::ConfigError;

/// Project-local ignore file, resolved against the working directory.
pub const IGNORE_FILE_NAME: &str = ".commitpilotignore";

pub const DEFAULT_MAX_PROMPT_TOKENS: usize = 8000;
pub const DEFAULT_MAX_DIFF_TOKENS: usize = 6000;
pub const DEFAULT_MAX_LINES_PER_FILE: usize = 200;
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

const EXTRA_IGNORE_VAR: &str = "FILTER_EXTRA_IGNORE";
const MAX_PROMPT_TOKENS_VAR: &str = "MAX_PROMPT_TOKENS";
const MAX_DIFF_TOKENS_VAR: &str = "MAX_DIFF_TOKENS";
const MAX_LINES_PER_FILE_VAR: &str = "MAX_LINES_PER_FILE";
const TELEMETRY_VAR: &str = "EDGE_TELEMETRY";
const API_KEY_VAR: &str = "OPENAI_API_KEY";
const MODEL_VAR: &str = "OPENAI_MODEL";
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Settings consulted by the filter, the tokenizer and the model backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Globs from `FILTER_EXTRA_IGNORE`, applied after the ignore file's.
    pub extra_ignore_patterns: Vec<String>,
    pub ignore_file: PathBuf,
    pub max_prompt_tokens: usize,
    pub max_diff_tokens: usize,
    pub max_lines_per_file: usize,
    pub telemetry_enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extra_ignore_patterns: Vec::new(),
            ignore_file: PathBuf::from(IGNORE_FILE_NAME),
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
            max_diff_tokens: DEFAULT_MAX_DIFF_TOKENS,
            max_lines_per_file: DEFAULT_MAX_LINES_PER_FILE,
            telemetry_enabled: true,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// Unset or empty variables take their defaults. A variable that is set
    /// but unparseable is an error rather than a silent default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Self {
            extra_ignore_patterns: read_var(EXTRA_IGNORE_VAR)
                .map(|v| parse_pattern_list(&v))
                .unwrap_or_default(),
            ignore_file: defaults.ignore_file,
            max_prompt_tokens: read_usize(MAX_PROMPT_TOKENS_VAR, defaults.max_prompt_tokens)?,
            max_diff_tokens: read_usize(MAX_DIFF_TOKENS_VAR, defaults.max_diff_tokens)?,
            max_lines_per_file: read_usize(MAX_LINES_PER_FILE_VAR, defaults.max_lines_per_file)?,
            telemetry_enabled: read_bool(TELEMETRY_VAR, defaults.telemetry_enabled)?,
            api_key: read_var(API_KEY_VAR),
            model: read_var(MODEL_VAR).unwrap_or(defaults.model),
            api_base_url: read_var(BASE_URL_VAR).unwrap_or(defaults.api_base_url),
        })
    }
}

/// Split a comma-separated glob list, dropping blanks.
pub fn parse_pattern_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn read_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn read_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let Some(value) = read_var(name) else {
        return Ok(default);
    };

    match value.parse::<usize>() {
        Ok(0) => Err(invalid(name, value, "must be greater than zero")),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(name, value, &e.to_string())),
    }
}

fn read_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = read_var(name) else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, value, "expected a boolean")),
    }
}

fn invalid(name: &'static str, value: String, reason: &str) -> ConfigError {
    warn!("Invalid {} value '{}': {}", name, value, reason);
    ConfigError::InvalidValue {
        name,
        value,
        reason: reason.to_string(),
    }
}
