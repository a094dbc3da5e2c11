//! Entry adapter: API Gateway event in, routed handler call, proxy response out.

use crate::core::cors::CorsConfig;
use crate::core::event::{ApiGatewayEvent, ApiGatewayResponse, InvocationContext};
use crate::core::request::build_request;
use crate::core::router::{Resolution, Router};
use crate::domain::model::{HandlerResponse, HttpRequest, Method};
use crate::utils::error::{ApiError, ErrorSeverity};
use crate::utils::monitor::InvocationMonitor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub cors: CorsConfig,
    /// 移除 API Gateway stage 的 path 前綴 (例如 `/prod`)
    pub strip_stage_prefix: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors: CorsConfig::default(),
            strip_stage_prefix: true,
        }
    }
}

impl ApiConfig {
    pub fn with_cors(cors_enabled: bool, cors_origin: &str) -> Self {
        let cors = if cors_enabled {
            CorsConfig::enabled(cors_origin)
        } else {
            CorsConfig {
                origin: cors_origin.to_string(),
                ..CorsConfig::disabled()
            }
        };
        Self {
            cors,
            ..Self::default()
        }
    }
}

pub struct ApiHandler {
    router: Arc<Router>,
    config: ApiConfig,
    monitor: InvocationMonitor,
}

impl ApiHandler {
    pub fn new(router: Router, config: ApiConfig) -> Self {
        if router.is_empty() {
            tracing::warn!("⚠️ ApiHandler created without any routes");
        }
        Self {
            router: Arc::new(router),
            config,
            monitor: InvocationMonitor::default(),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = InvocationMonitor::new(enabled);
        self
    }

    pub fn monitor(&self) -> &InvocationMonitor {
        &self.monitor
    }

    /// 接受未型別化的事件；無法解析時回 400
    pub async fn handle_value(
        &self,
        event: serde_json::Value,
        context: &InvocationContext,
    ) -> ApiGatewayResponse {
        match serde_json::from_value::<ApiGatewayEvent>(event) {
            Ok(event) => self.handle(event, context).await,
            Err(e) => {
                tracing::warn!("❌ Rejected malformed event: {}", e);
                let err = ApiError::InvalidEvent {
                    message: e.to_string(),
                };
                self.finalize(Outcome::response(HandlerResponse::from(err)), None, false)
            }
        }
    }

    pub async fn handle(
        &self,
        event: ApiGatewayEvent,
        context: &InvocationContext,
    ) -> ApiGatewayResponse {
        let timer = self.monitor.start();
        let request_id = event
            .request_id()
            .or(context.aws_request_id.as_deref())
            .unwrap_or("-")
            .to_string();
        let origin = event.normalized_headers().remove("origin");

        let (outcome, method, path) = match build_request(&event, self.config.strip_stage_prefix)
        {
            Ok(request) => {
                let method = request.method;
                let path = request.path.clone();
                (self.dispatch(request).await, Some(method), path)
            }
            Err(err) => {
                tracing::warn!(request_id = %request_id, "❌ Invalid request: {}", err);
                let path = event.raw_path().unwrap_or("/").to_string();
                (Outcome::response(HandlerResponse::from(err)), None, path)
            }
        };

        let status = outcome.response.status;
        let omit_body = method == Some(Method::Head);
        let api_response = self.finalize(outcome, origin.as_deref(), omit_body);
        let stats = self.monitor.finish(timer, status);

        tracing::info!(
            request_id = %request_id,
            function = context.function_name.as_deref().unwrap_or("-"),
            method = method.map(|m| m.as_str()).unwrap_or("-"),
            path = %path,
            status,
            elapsed_ms = stats.elapsed_time.as_millis() as u64,
            cold_start = stats.cold_start,
            "Handled request"
        );

        api_response
    }

    async fn dispatch(&self, request: HttpRequest) -> Outcome {
        if request.method == Method::Options && self.config.cors.enabled {
            if let Some(outcome) = self.preflight(&request.path) {
                return outcome;
            }
        }

        match self.router.resolve(request.method, &request.path) {
            Resolution::Matched {
                handler,
                method,
                path_params,
                pattern,
            } => {
                tracing::debug!("Matched route {} {} for {}", method, pattern, request.path);
                let mut request = request;
                request.method = method;
                request.path_params = path_params;

                // 另開 task 執行，handler panic 不會拖垮整個 runtime
                let result = tokio::spawn(async move { handler.handle(request).await }).await;
                let response = match result {
                    Ok(Ok(response)) => response,
                    Ok(Err(err)) => {
                        if err.severity() >= ErrorSeverity::High {
                            tracing::error!(
                                "❌ Handler failed: {} ({})",
                                err,
                                err.recovery_suggestion()
                            );
                        } else {
                            tracing::debug!("Handler rejected request: {}", err);
                        }
                        HandlerResponse::from(err)
                    }
                    Err(join_err) => {
                        tracing::error!("💥 Handler panicked: {}", join_err);
                        HandlerResponse::from(ApiError::internal(join_err.to_string()))
                    }
                };
                Outcome::response(response)
            }
            Resolution::MethodNotAllowed { allowed } => {
                tracing::warn!("Method not allowed: {} {}", request.method, request.path);
                Outcome::response(HandlerResponse::from(ApiError::MethodNotAllowed {
                    method: request.method.to_string(),
                    path: request.path.clone(),
                    allowed: allowed.iter().map(ToString::to_string).collect(),
                }))
            }
            Resolution::NotFound => {
                tracing::warn!("No route for {} {}", request.method, request.path);
                Outcome::response(HandlerResponse::from(ApiError::NotFound {
                    path: request.path,
                }))
            }
        }
    }

    /// OPTIONS 沒有明確註冊時回 204 preflight。
    /// path 有路由時列出路由的 method，沒有時用設定的 `allow_methods`
    fn preflight(&self, path: &str) -> Option<Outcome> {
        let mut methods = match self.router.allowed_methods(path) {
            Some(methods) if methods.contains(&Method::Options) => return None,
            Some(methods) => methods,
            None => self.config.cors.allow_methods.clone(),
        };
        if !methods.contains(&Method::Options) {
            methods.push(Method::Options);
        }

        tracing::debug!("Answering preflight for {} with {}", path, join_methods(&methods));
        let response = HandlerResponse::with_status(serde_json::Value::Null, 204)
            .header("Allow", join_methods(&methods));
        Some(Outcome {
            response,
            preflight: Some(methods),
        })
    }

    fn finalize(
        &self,
        outcome: Outcome,
        origin: Option<&str>,
        omit_body: bool,
    ) -> ApiGatewayResponse {
        let Outcome { response, preflight } = outcome;
        let mut headers: HashMap<String, String> = HashMap::new();

        // HEAD 保留與 GET 相同的 header，只拿掉 body
        let body = if response.status == 204 {
            String::new()
        } else {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
            if omit_body {
                String::new()
            } else {
                serde_json::to_string(&response.body).unwrap_or_else(|e| {
                    tracing::error!("❌ Failed to serialize response body: {}", e);
                    r#"{"error":"Internal server error"}"#.to_string()
                })
            }
        };

        let cors_headers = match preflight.as_deref() {
            Some(methods) => self.config.cors.preflight_headers(origin, Some(methods)),
            None => self.config.cors.response_headers(origin),
        };

        headers.extend(cors_headers);
        headers.extend(response.headers);

        ApiGatewayResponse {
            status_code: response.status,
            headers,
            body,
            is_base64_encoded: false,
        }
    }
}

struct Outcome {
    response: HandlerResponse,
    /// preflight 回應時為允許的 method
    preflight: Option<Vec<Method>>,
}

impl Outcome {
    fn response(response: HandlerResponse) -> Self {
        Self {
            response,
            preflight: None,
        }
    }
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
