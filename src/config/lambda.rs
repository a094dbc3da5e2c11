use crate::adapters::store::DEFAULT_VERSION;
use crate::core::api_handler::ApiConfig;
use crate::core::cors::{CorsConfig, DEFAULT_ALLOW_HEADERS, DEFAULT_MAX_AGE};
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub cors_enabled: bool,
    pub cors_origin: String,
    pub cors_allow_headers: String,
    pub cors_max_age: u64,
    pub cors_allow_credentials: bool,
    pub strip_stage_prefix: bool,
    pub initial_version: String,
    pub monitoring: bool,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 以任意來源讀值 (測試時不必動到行程環境變數)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            cors_enabled: parse_bool(&lookup, "CORS_ENABLED", true)?,
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "*".to_string()),
            cors_allow_headers: lookup("CORS_ALLOW_HEADERS")
                .unwrap_or_else(|| DEFAULT_ALLOW_HEADERS.to_string()),
            cors_max_age: match lookup("CORS_MAX_AGE") {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| ApiError::InvalidConfigValueError {
                    field: "CORS_MAX_AGE".to_string(),
                    value: raw.clone(),
                    reason: "Expected a number of seconds".to_string(),
                })?,
                None => DEFAULT_MAX_AGE,
            },
            cors_allow_credentials: parse_bool(&lookup, "CORS_ALLOW_CREDENTIALS", false)?,
            strip_stage_prefix: parse_bool(&lookup, "STRIP_STAGE_PREFIX", true)?,
            initial_version: lookup("APP_VERSION").unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            monitoring: parse_bool(&lookup, "INVOCATION_METRICS", false)?,
        })
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            cors: CorsConfig {
                enabled: self.cors_enabled,
                origin: self.cors_origin.clone(),
                allow_headers: self.cors_allow_headers.clone(),
                max_age: self.cors_max_age,
                allow_credentials: self.cors_allow_credentials,
                ..CorsConfig::default()
            },
            strip_stage_prefix: self.strip_stage_prefix,
        }
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ApiError::InvalidConfigValueError {
            field: key.to_string(),
            value: raw,
            reason: "Expected true/false".to_string(),
        }),
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.api_config().cors.validate()?;
        validate_non_empty_string("APP_VERSION", &self.initial_version)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}
