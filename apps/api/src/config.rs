use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM credential. `None` keeps the server up but every tailoring request
    /// fails with `MissingCredential`.
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
    pub templates: TemplateConfig,
    pub render: RenderConfig,
    pub scratch_root: PathBuf,
    pub keep_scratch: bool,
}

/// Where the base YAML templates live and what they are called.
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    /// Explicit template directory. When unset, the working directory and its
    /// parent are searched in that order.
    pub dir: Option<PathBuf>,
    pub cv_file: String,
    pub cover_letter_file: String,
}

/// Limits and program names for the external renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub rendercv_bin: String,
    pub python_bin: String,
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            templates: TemplateConfig {
                dir: optional_env("TEMPLATE_DIR").map(PathBuf::from),
                cv_file: optional_env("CV_TEMPLATE").unwrap_or_else(|| "CV.yaml".to_string()),
                cover_letter_file: optional_env("COVER_LETTER_TEMPLATE")
                    .unwrap_or_else(|| "Cover_Letter.yaml".to_string()),
            },
            render: RenderConfig {
                rendercv_bin: optional_env("RENDERCV_BIN").unwrap_or_else(|| "rendercv".to_string()),
                python_bin: optional_env("PYTHON_BIN").unwrap_or_else(|| "python".to_string()),
                timeout: Duration::from_secs(parse_env(
                    "RENDER_TIMEOUT_SECS",
                    DEFAULT_RENDER_TIMEOUT_SECS,
                )?),
                max_output_bytes: parse_env("RENDER_MAX_OUTPUT_BYTES", DEFAULT_MAX_OUTPUT_BYTES)?,
            },
            scratch_root: optional_env("SCRATCH_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            keep_scratch: parse_env("KEEP_SCRATCH", false)?,
        })
    }
}

/// Returns the variable's value, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
