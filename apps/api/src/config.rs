use anyhow::{Context, Result};

use crate::llm_client::{GenerationParams, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub events_namespace: String,
    pub events_table: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub provision_region: String,
    pub scoring_model: String,
    pub scoring_max_tokens: u32,
    pub scoring_temperature: f32,
    pub scoring_top_p: Option<f32>,
    /// Pins the fallback scorer's random source.
    pub fallback_seed: Option<u64>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Values are checked for presence
    /// and numeric syntax only.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            events_namespace: require("EVENTS_NAMESPACE")?,
            events_table: require("EVENTS_TABLE")?,
            s3_bucket: require("S3_BUCKET")?,
            s3_endpoint: require("S3_ENDPOINT")?,
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            provision_region: lookup("PROVISION_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            scoring_model: lookup("SCORING_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            scoring_max_tokens: parse_or(&lookup, "SCORING_MAX_TOKENS", 2048)?,
            scoring_temperature: parse_or(&lookup, "SCORING_TEMPERATURE", 0.1)?,
            scoring_top_p: parse_optional(&lookup, "SCORING_TOP_P")?,
            fallback_seed: parse_optional(&lookup, "FALLBACK_SEED")?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn scoring_params(&self) -> GenerationParams {
        GenerationParams {
            max_output_tokens: self.scoring_max_tokens,
            temperature: self.scoring_temperature,
            top_p: self.scoring_top_p,
        }
    }
}

fn parse_optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value: {raw}"))
        })
        .transpose()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}
