use crate::adapters::store::DEFAULT_VERSION;
use crate::core::api_handler::ApiConfig;
use crate::core::cors::CorsConfig;
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub app: AppSection,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_true")]
    pub strip_stage_prefix: bool,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            strip_stage_prefix: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_version")]
    pub initial_version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            initial_version: default_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub invocation_metrics: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ApiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ApiError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CORS_ORIGIN})；未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;

        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            ApiError::ConfigError {
                message: format!("Invalid substitution pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            cors: self.cors.clone(),
            strip_stage_prefix: self.api.strip_stage_prefix,
        }
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn invocation_metrics(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.invocation_metrics)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.cors.validate()?;
        validate_non_empty_string("app.initial_version", &self.app.initial_version)?;
        Ok(())
    }
}
