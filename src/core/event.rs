//! API Gateway proxy event and response shapes.
//!
//! Both REST API (payload format 1.0) and HTTP API (payload format 2.0)
//! events deserialize into [`ApiGatewayEvent`]; the accessors hide which one
//! was received.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayEvent {
    #[serde(default)]
    pub version: Option<String>,
    // 1.0
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    // 2.0
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default)]
    pub raw_query_string: Option<String>,
    #[serde(default)]
    pub cookies: Option<Vec<String>>,
    // 共用
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub http: Option<HttpContext>,
    #[serde(default)]
    pub identity: Option<Identity>,
    /// 2.0 的毫秒時間戳
    #[serde(default)]
    pub time_epoch: Option<i64>,
    /// 1.0 的毫秒時間戳
    #[serde(default)]
    pub request_time_epoch: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpContext {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub source_ip: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub source_ip: Option<String>,
}

impl ApiGatewayEvent {
    pub fn method(&self) -> Option<&str> {
        self.http_method.as_deref().or_else(|| {
            self.request_context
                .as_ref()
                .and_then(|ctx| ctx.http.as_ref())
                .and_then(|http| http.method.as_deref())
        })
    }

    pub fn raw_path(&self) -> Option<&str> {
        self.raw_path.as_deref().or(self.path.as_deref()).or_else(|| {
            self.request_context
                .as_ref()
                .and_then(|ctx| ctx.http.as_ref())
                .and_then(|http| http.path.as_deref())
        })
    }

    /// HTTP API (payload 2.0) 事件；REST API 的 `path` 不含 stage
    pub fn is_http_api(&self) -> bool {
        self.version.as_deref() == Some("2.0") || self.raw_path.is_some()
    }

    pub fn stage(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.stage.as_deref())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.request_id.as_deref())
    }

    pub fn source_ip(&self) -> Option<&str> {
        let ctx = self.request_context.as_ref()?;
        ctx.http
            .as_ref()
            .and_then(|http| http.source_ip.as_deref())
            .or_else(|| ctx.identity.as_ref().and_then(|i| i.source_ip.as_deref()))
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        let ctx = self.request_context.as_ref()?;
        let millis = ctx.time_epoch.or(ctx.request_time_epoch)?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// header 名稱轉小寫；多值 header 以逗號合併，2.0 的 cookies 併入 `cookie`
    pub fn normalized_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();

        if let Some(multi) = &self.multi_value_headers {
            for (name, values) in multi {
                headers.insert(name.to_ascii_lowercase(), values.join(", "));
            }
        }
        if let Some(single) = &self.headers {
            for (name, value) in single {
                headers.insert(name.to_ascii_lowercase(), value.clone());
            }
        }
        if let Some(cookies) = self.cookies.as_ref().filter(|c| !c.is_empty()) {
            headers
                .entry("cookie".to_string())
                .or_insert_with(|| cookies.join("; "));
        }

        headers
    }

    pub fn query_params(&self) -> HashMap<String, String> {
        if let Some(params) = &self.query_string_parameters {
            return params.clone();
        }

        match self.raw_query_string.as_deref() {
            Some(raw) if !raw.is_empty() => url::form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect(),
            _ => HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiGatewayResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

/// 從 Lambda context 取出的呼叫資訊
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub aws_request_id: Option<String>,
    pub function_name: Option<String>,
}

impl InvocationContext {
    pub fn new(aws_request_id: impl Into<String>) -> Self {
        Self {
            aws_request_id: Some(aws_request_id.into()),
            function_name: None,
        }
    }
}
