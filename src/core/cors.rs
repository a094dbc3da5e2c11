use crate::domain::model::Method;
use crate::utils::error::Result;
use crate::utils::validation::{validate_origin_list, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Api-Key";
pub const DEFAULT_MAX_AGE: u64 = 600;
const MAX_AGE_LIMIT: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// `*` 或逗號分隔的 origin 清單
    pub origin: String,
    pub allow_headers: String,
    pub allow_methods: Vec<Method>,
    pub max_age: u64,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            origin: "*".to_string(),
            allow_headers: DEFAULT_ALLOW_HEADERS.to_string(),
            allow_methods: Method::ALL.to_vec(),
            max_age: DEFAULT_MAX_AGE,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    pub fn enabled(origin: impl Into<String>) -> Self {
        Self {
            enabled: true,
            origin: origin.into(),
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    fn origins(&self) -> impl Iterator<Item = &str> {
        self.origin.split(',').map(str::trim).filter(|o| !o.is_empty())
    }

    fn is_wildcard(&self) -> bool {
        self.origins().any(|o| o == "*")
    }

    /// 決定 `Access-Control-Allow-Origin` 的值，不允許時回傳 None
    pub fn resolve_origin(&self, request_origin: Option<&str>) -> Option<String> {
        if self.is_wildcard() {
            // credentials 模式下瀏覽器不接受 `*`
            return match (self.allow_credentials, request_origin) {
                (true, Some(origin)) => Some(origin.to_string()),
                _ => Some("*".to_string()),
            };
        }

        match request_origin {
            Some(origin) => self
                .origins()
                .find(|allowed| allowed.eq_ignore_ascii_case(origin))
                .map(|_| origin.to_string()),
            None => {
                let mut origins = self.origins();
                match (origins.next(), origins.next()) {
                    (Some(single), None) => Some(single.to_string()),
                    _ => None,
                }
            }
        }
    }

    /// 一般回應要附加的 header
    pub fn response_headers(&self, request_origin: Option<&str>) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if !self.enabled {
            return headers;
        }

        if let Some(origin) = self.resolve_origin(request_origin) {
            if origin != "*" {
                headers.insert("Vary".to_string(), "Origin".to_string());
            }
            headers.insert("Access-Control-Allow-Origin".to_string(), origin);
            if self.allow_credentials {
                headers.insert(
                    "Access-Control-Allow-Credentials".to_string(),
                    "true".to_string(),
                );
            }
        }

        headers
    }

    /// preflight (OPTIONS) 回應的 header；`route_methods` 為該 path 實際註冊的 method
    pub fn preflight_headers(
        &self,
        request_origin: Option<&str>,
        route_methods: Option<&[Method]>,
    ) -> HashMap<String, String> {
        let mut headers = self.response_headers(request_origin);
        if !self.enabled {
            return headers;
        }

        let mut methods: Vec<Method> = route_methods
            .map(<[Method]>::to_vec)
            .unwrap_or_else(|| self.allow_methods.clone());
        if !methods.contains(&Method::Options) {
            methods.push(Method::Options);
        }

        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            methods
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        );
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            self.allow_headers.clone(),
        );
        headers.insert(
            "Access-Control-Max-Age".to_string(),
            self.max_age.to_string(),
        );

        headers
    }
}

impl Validate for CorsConfig {
    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        validate_origin_list("cors.origin", &self.origin)?;
        validate_range("cors.max_age", self.max_age, 0, MAX_AGE_LIMIT)?;
        Ok(())
    }
}
