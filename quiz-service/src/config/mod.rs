use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default cap on uploaded file size (20MB, matching the upload handler's
/// rejection threshold).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub provider: ProviderConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Which generation backend to use ("gemini" or "mock").
    pub kind: ProviderKind,
    /// Model for quiz generation (e.g., gemini-1.5-flash)
    pub text_model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted multipart body size in bytes.
    pub max_bytes: usize,
    /// Directory where uploads are staged before forwarding.
    pub temp_dir: PathBuf,
}

impl QuizConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let common: CommonConfig = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let default_temp_dir = env::temp_dir();
        let default_temp_dir = default_temp_dir.to_string_lossy();

        Ok(QuizConfig {
            common,
            provider: ProviderConfig {
                kind: parse_provider_kind(&get_env("QUIZ_PROVIDER", Some("gemini"), is_prod)?)?,
                text_model: get_env("QUIZ_TEXT_MODEL", Some("gemini-1.5-flash"), is_prod)?,
            },
            upload: UploadConfig {
                max_bytes: get_env(
                    "QUIZ_MAX_UPLOAD_BYTES",
                    Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
                temp_dir: get_env("QUIZ_TEMP_DIR", Some(&default_temp_dir), is_prod)?.into(),
            },
        })
    }
}

fn parse_provider_kind(value: &str) -> Result<ProviderKind, AppError> {
    match value {
        "gemini" => Ok(ProviderKind::Gemini),
        "mock" => Ok(ProviderKind::Mock),
        other => Err(AppError::Config(anyhow::anyhow!(
            "Unsupported provider kind: {}",
            other
        ))),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::Config(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Config(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
