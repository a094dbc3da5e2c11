use crate::core::api_handler::ApiConfig;
use crate::core::cors::CorsConfig;
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_route_path, Validate};
use clap::Parser;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "api-lambda")]
#[command(about = "Invoke the API Lambda router locally with API Gateway events")]
pub struct CliConfig {
    #[arg(long, help = "API Gateway event JSON file (repeatable, invoked in order)")]
    pub event: Vec<PathBuf>,

    #[arg(long, default_value = "GET", help = "HTTP method when no --event is given")]
    pub method: String,

    #[arg(long, default_value = "/version", help = "Request path when no --event is given")]
    pub path: String,

    #[arg(long, help = "Request body (JSON) when no --event is given")]
    pub body: Option<String>,

    #[arg(long = "header", value_name = "NAME:VALUE", help = "Request header (repeatable)")]
    pub headers: Vec<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Allowed CORS origin(s), `*` or comma-separated [default: *]")]
    pub cors_origin: Option<String>,

    #[arg(long, help = "Disable CORS headers")]
    pub no_cors: bool,

    #[arg(long, help = "Version served before any PATCH [default: 1.0]")]
    pub initial_version: Option<String>,

    #[arg(long, help = "Log per-invocation timing")]
    pub monitor: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn api_config(&self) -> ApiConfig {
        self.apply_to(ApiConfig {
            cors: CorsConfig::enabled("*"),
            ..ApiConfig::default()
        })
    }

    /// 有明確給的旗標覆寫 `base` (例如設定檔) 的值
    pub fn apply_to(&self, mut base: ApiConfig) -> ApiConfig {
        if let Some(origin) = &self.cors_origin {
            base.cors.enabled = true;
            base.cors.origin = origin.clone();
        }
        if self.no_cors {
            base.cors.enabled = false;
        }
        base
    }

    pub fn initial_version_or(&self, fallback: &str) -> String {
        self.initial_version
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// 沒有 --event 時，用 --method/--path/--body/--header 組出一個 REST API 事件
    pub fn inline_event(&self) -> Result<Value> {
        let mut headers = Map::new();
        for header in &self.headers {
            let (name, value) = header.split_once(':').ok_or_else(|| {
                ApiError::InvalidConfigValueError {
                    field: "header".to_string(),
                    value: header.clone(),
                    reason: "Expected NAME:VALUE".to_string(),
                }
            })?;
            headers.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
        }
        if self.body.is_some() && !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
            headers.insert(
                "Content-Type".to_string(),
                Value::String("application/json".to_string()),
            );
        }

        Ok(json!({
            "httpMethod": self.method,
            "path": self.path,
            "headers": headers,
            "body": self.body,
            "isBase64Encoded": false,
            "requestContext": {
                "requestId": "local-invoke",
                "stage": "$default",
            }
        }))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_route_path("path", &self.path)?;
        if let Some(version) = &self.initial_version {
            validate_non_empty_string("initial_version", version)?;
        }
        self.api_config().cors.validate()?;

        for event in &self.event {
            if !event.exists() {
                return Err(ApiError::InvalidConfigValueError {
                    field: "event".to_string(),
                    value: event.display().to_string(),
                    reason: "Event file does not exist".to_string(),
                });
            }
        }

        Ok(())
    }
}
