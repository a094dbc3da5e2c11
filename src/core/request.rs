use crate::core::event::ApiGatewayEvent;
use crate::domain::model::{HttpRequest, Method};
use crate::utils::error::{ApiError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

/// 把 API Gateway 事件轉成 [`HttpRequest`]
pub fn build_request(event: &ApiGatewayEvent, strip_stage_prefix: bool) -> Result<HttpRequest> {
    let method_str = event.method().ok_or_else(|| ApiError::InvalidEvent {
        message: "missing HTTP method".to_string(),
    })?;
    let method: Method = method_str.parse()?;

    let raw_path = event.raw_path().unwrap_or("/");
    // 只有 HTTP API 的 rawPath 會帶 `/{stage}`
    let path = if strip_stage_prefix && event.is_http_api() {
        strip_stage(raw_path, event.stage())
    } else {
        raw_path.to_string()
    };

    let mut request = HttpRequest::new(method, path);
    request.headers = event.normalized_headers();
    request.query_params = event.query_params();
    request.request_id = event.request_id().map(str::to_string);
    request.source_ip = event.source_ip().map(str::to_string);
    request.received_at = event.received_at();

    let raw_body = decode_raw_body(event)?;
    request.body = parse_body(raw_body.as_deref(), request.header("content-type"))?;
    request.raw_body = raw_body;

    Ok(request)
}

fn strip_stage(path: &str, stage: Option<&str>) -> String {
    let Some(stage) = stage.filter(|s| !s.is_empty() && *s != "$default") else {
        return path.to_string();
    };

    let prefix = format!("/{}", stage);
    match path.strip_prefix(&prefix) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}

fn decode_raw_body(event: &ApiGatewayEvent) -> Result<Option<String>> {
    let Some(body) = event.body.as_deref() else {
        return Ok(None);
    };

    if !event.is_base64_encoded {
        return Ok(Some(body.to_string()));
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid base64 body: {}", e)))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|_| ApiError::bad_request("Body is not valid UTF-8"))
}

/// 依 content type 解析 body；沒有 body 時視為空物件
pub fn parse_body(raw: Option<&str>, content_type: Option<&str>) -> Result<Value> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(Value::Object(Map::new())),
    };

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some(ct) if ct == "application/json" || ct.ends_with("+json") => {
            serde_json::from_str(raw).map_err(ApiError::InvalidJsonBody)
        }
        Some("application/x-www-form-urlencoded") => {
            let form: Map<String, Value> = url::form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            Ok(Value::Object(form))
        }
        // 沒有 content type 時盡量當 JSON，失敗就保留原文
        None => Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))),
        Some(_) => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> ApiGatewayEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_build_request_from_rest_event() {
        let request = build_request(
            &event(json!({
                "httpMethod": "patch",
                "path": "/version",
                "headers": {"Content-Type": "application/json; charset=utf-8"},
                "queryStringParameters": {"dry_run": "1"},
                "body": "{\"new_version\": \"2.0\"}",
                "requestContext": {"requestId": "abc", "stage": "prod"}
            })),
            true,
        )
        .unwrap();

        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.path, "/version");
        assert_eq!(request.query("dry_run"), Some("1"));
        assert_eq!(request.body_field("new_version"), Some(&json!("2.0")));
        assert_eq!(request.request_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_rest_path_keeps_segment_named_like_stage() {
        let request = build_request(
            &event(json!({
                "httpMethod": "GET",
                "path": "/v1/items",
                "requestContext": {"stage": "v1"}
            })),
            true,
        )
        .unwrap();
        assert_eq!(request.path, "/v1/items");
    }

    #[test]
    fn test_http_api_path_is_stripped() {
        let request = build_request(
            &event(json!({
                "version": "2.0",
                "rawPath": "/v1/items",
                "requestContext": {"stage": "v1", "http": {"method": "GET"}}
            })),
            true,
        )
        .unwrap();
        assert_eq!(request.path, "/items");
    }

    #[test]
    fn test_stage_prefix_is_stripped() {
        assert_eq!(strip_stage("/prod/version", Some("prod")), "/version");
        assert_eq!(strip_stage("/prod", Some("prod")), "/");
        assert_eq!(strip_stage("/production/x", Some("prod")), "/production/x");
        assert_eq!(strip_stage("/version", Some("$default")), "/version");
        assert_eq!(strip_stage("/version", None), "/version");
    }

    #[test]
    fn test_base64_body() {
        let request = build_request(
            &event(json!({
                "httpMethod": "POST",
                "path": "/items",
                "headers": {"content-type": "application/json"},
                "body": STANDARD.encode("{\"a\": 1}"),
                "isBase64Encoded": true
            })),
            false,
        )
        .unwrap();
        assert_eq!(request.body, json!({"a": 1}));

        let err = build_request(
            &event(json!({
                "httpMethod": "POST",
                "path": "/items",
                "body": "%%%",
                "isBase64Encoded": true
            })),
            false,
        )
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body(None, None).unwrap(), json!({}));
        assert_eq!(parse_body(Some("  "), Some("application/json")).unwrap(), json!({}));
        assert_eq!(parse_body(Some("{\"a\":1}"), None).unwrap(), json!({"a": 1}));
        assert_eq!(parse_body(Some("hello"), None).unwrap(), json!("hello"));
        assert_eq!(
            parse_body(Some("a=1&b=x+y"), Some("application/x-www-form-urlencoded")).unwrap(),
            json!({"a": "1", "b": "x y"})
        );
        assert_eq!(
            parse_body(Some("hello"), Some("text/plain")).unwrap(),
            json!("hello")
        );
        assert!(matches!(
            parse_body(Some("{oops"), Some("application/json")),
            Err(ApiError::InvalidJsonBody(_))
        ));
    }

    #[test]
    fn test_missing_method_is_invalid_event() {
        let err = build_request(&event(json!({"path": "/"})), false).unwrap_err();
        assert!(matches!(err, ApiError::InvalidEvent { .. }));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let err = build_request(&event(json!({"httpMethod": "BREW", "path": "/"})), false)
            .unwrap_err();
        assert_eq!(err.status_code(), 405);
    }
}
