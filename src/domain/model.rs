use crate::utils::error::{ApiError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Head,
        Method::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ApiError::UnsupportedMethod {
                method: s.to_string(),
            })
    }
}

/// 交給 handler 的請求
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    /// header 名稱一律小寫
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
    pub body: Value,
    pub raw_body: Option<String>,
    pub request_id: Option<String>,
    pub source_ip: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            path_params: HashMap::new(),
            body: Value::Object(Default::default()),
            raw_body: None,
            request_id: None,
            source_ip: None,
            received_at: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// 類似 dict 的 `.get`：body 不是物件或欄位不存在時回傳 None
    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.body.as_object().and_then(|obj| obj.get(key))
    }

    /// 以型別解析 body，不符合 schema 時回傳 ValidationError
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.body).map_err(|e| ApiError::validation(e.to_string()))
    }
}

/// handler 的回傳值：JSON body、狀態碼與額外 header
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
    pub headers: HashMap<String, String>,
}

impl HandlerResponse {
    pub fn ok(body: Value) -> Self {
        Self::with_status(body, 200)
    }

    pub fn with_status(body: Value, status: u16) -> Self {
        Self {
            status,
            body,
            headers: HashMap::new(),
        }
    }

    pub fn error(message: &str, status: u16) -> Self {
        Self::with_status(serde_json::json!({ "error": message }), status)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }
}

impl From<Value> for HandlerResponse {
    fn from(body: Value) -> Self {
        Self::ok(body)
    }
}

impl From<(Value, u16)> for HandlerResponse {
    fn from((body, status): (Value, u16)) -> Self {
        Self::with_status(body, status)
    }
}

impl From<ApiError> for HandlerResponse {
    fn from(err: ApiError) -> Self {
        let mut response = Self::error(&err.user_friendly_message(), err.status_code());
        if let ApiError::MethodNotAllowed { allowed, .. } = &err {
            response = response.header("Allow", allowed.join(", "));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::new(Method::Get, "/").with_header("Content-Type", "text/plain");
        assert_eq!(request.header("content-type"), Some("text/plain"));
        assert_eq!(request.header("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_body_field() {
        let request = HttpRequest::new(Method::Patch, "/version").with_body(json!({"a": 1}));
        assert_eq!(request.body_field("a"), Some(&json!(1)));
        assert_eq!(request.body_field("b"), None);

        let request = HttpRequest::new(Method::Patch, "/version").with_body(json!("text"));
        assert_eq!(request.body_field("a"), None);
    }

    #[test]
    fn test_json_extraction_reports_validation_error() {
        #[derive(Debug, Deserialize)]
        struct Update {
            #[allow(dead_code)]
            new_version: String,
        }

        let request = HttpRequest::new(Method::Patch, "/").with_body(json!({"new_version": 1}));
        let err = request.json::<Update>().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_response_conversions() {
        let response: HandlerResponse = json!({"ok": true}).into();
        assert_eq!(response.status, 200);

        let response: HandlerResponse = (json!({"error": "x"}), 400).into();
        assert_eq!(response.status, 400);

        let response: HandlerResponse = ApiError::MethodNotAllowed {
            method: "POST".to_string(),
            path: "/version".to_string(),
            allowed: vec!["GET".to_string(), "PATCH".to_string()],
        }
        .into();
        assert_eq!(response.status, 405);
        assert_eq!(response.body, json!({"error": "Method not allowed"}));
        assert_eq!(response.headers.get("Allow").unwrap(), "GET, PATCH");
    }
}
