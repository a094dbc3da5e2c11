use api_lambda::{
    ApiConfig, ApiError, ApiHandler, CorsConfig, HandlerResponse, HttpRequest, InvocationContext,
    Method, Result, Router,
};
use serde_json::{json, Value};

async fn echo(request: HttpRequest) -> Result<HandlerResponse> {
    Ok(json!({
        "method": request.method,
        "path": request.path,
        "params": request.path_params,
        "query": request.query_params,
        "body": request.body,
    })
    .into())
}

async fn create_item(request: HttpRequest) -> Result<HandlerResponse> {
    let name = request
        .body_field("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("name is required"))?;
    Ok(HandlerResponse::with_status(json!({ "created": name }), 201)
        .header("Location", format!("/items/{}", name)))
}

async fn explode(_request: HttpRequest) -> Result<HandlerResponse> {
    panic!("handler bug");
}

async fn fail(_request: HttpRequest) -> Result<HandlerResponse> {
    Err(ApiError::internal("connection string: secret"))
}

fn api(cors: CorsConfig) -> ApiHandler {
    let mut router = Router::new();
    router
        .route("/items", &[Method::Post], |r: HttpRequest| create_item(r))
        .unwrap()
        .route("/items/{id}", &[Method::Get, Method::Put], |r: HttpRequest| echo(r))
        .unwrap()
        .route("/static/{path+}", &[Method::Get], |r: HttpRequest| echo(r))
        .unwrap()
        .route("/panic", &[Method::Get], |r: HttpRequest| explode(r))
        .unwrap()
        .route("/fail", &[Method::Get], |r: HttpRequest| fail(r))
        .unwrap();

    ApiHandler::new(
        router,
        ApiConfig {
            cors,
            ..ApiConfig::default()
        },
    )
}

fn event(method: &str, path: &str) -> Value {
    json!({
        "version": "2.0",
        "rawPath": path,
        "rawQueryString": "",
        "headers": {},
        "requestContext": {
            "requestId": "router-test",
            "stage": "$default",
            "http": {"method": method, "path": path}
        },
        "isBase64Encoded": false
    })
}

async fn invoke(api: &ApiHandler, event: Value) -> (u16, Value, api_lambda::ApiGatewayResponse) {
    let response = api.handle_value(event, &InvocationContext::default()).await;
    let body = response.json_body().unwrap_or(Value::Null);
    (response.status_code, body, response)
}

#[tokio::test]
async fn test_path_and_query_params_reach_handler() {
    let api = api(CorsConfig::disabled());

    let mut event = event("PUT", "/items/42/");
    event["rawQueryString"] = json!("expand=true");
    event["headers"] = json!({"content-type": "application/json"});
    event["body"] = json!("{\"qty\": 3}");

    let (status, body, response) = invoke(&api, event).await;
    assert_eq!(status, 200);
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["params"]["id"], "42");
    assert_eq!(body["query"]["expand"], "true");
    assert_eq!(body["body"], json!({"qty": 3}));
    assert!(response.header("Access-Control-Allow-Origin").is_none());
}

#[tokio::test]
async fn test_greedy_parameter() {
    let api = api(CorsConfig::disabled());

    let (status, body, _) = invoke(&api, event("GET", "/static/css/site/main.css")).await;
    assert_eq!(status, 200);
    assert_eq!(body["params"]["path"], "css/site/main.css");
}

#[tokio::test]
async fn test_handler_status_and_headers() {
    let api = api(CorsConfig::disabled());

    let mut event = event("POST", "/items");
    event["headers"] = json!({"content-type": "application/x-www-form-urlencoded"});
    event["body"] = json!("name=widget");

    let (status, body, response) = invoke(&api, event).await;
    assert_eq!(status, 201);
    assert_eq!(body, json!({"created": "widget"}));
    assert_eq!(response.header("Location"), Some("/items/widget"));
}

#[tokio::test]
async fn test_handler_error_maps_to_status() {
    let api = api(CorsConfig::disabled());

    let (status, body, _) = invoke(&api, event("POST", "/items")).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "name is required"}));

    let (status, body, _) = invoke(&api, event("GET", "/fail")).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_panicking_handler_returns_500() {
    let api = api(CorsConfig::enabled("*"));

    let (status, body, response) = invoke(&api, event("GET", "/panic")).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Internal server error"}));
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));

    // handler panic 後仍可繼續服務
    let (status, _, _) = invoke(&api, event("GET", "/items/1")).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_origin_allow_list() {
    let api = api(CorsConfig::enabled(
        "https://a.example.com, https://b.example.com",
    ));

    let mut allowed = event("GET", "/items/1");
    allowed["headers"] = json!({"Origin": "https://b.example.com"});
    let (_, _, response) = invoke(&api, allowed).await;
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://b.example.com")
    );
    assert_eq!(response.header("Vary"), Some("Origin"));

    let mut denied = event("GET", "/items/1");
    denied["headers"] = json!({"Origin": "https://evil.example.com"});
    let (status, _, response) = invoke(&api, denied).await;
    assert_eq!(status, 200);
    assert!(response.header("Access-Control-Allow-Origin").is_none());
}

#[tokio::test]
async fn test_preflight_for_parameterized_route() {
    let api = api(CorsConfig::enabled("*"));

    let (status, _, response) = invoke(&api, event("OPTIONS", "/items/7")).await;
    assert_eq!(status, 204);
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        Some("GET, PUT, HEAD, OPTIONS")
    );
    assert_eq!(response.header("Allow"), Some("GET, PUT, HEAD, OPTIONS"));

    let (status, _, response) = invoke(&api, event("OPTIONS", "/nowhere")).await;
    assert_eq!(status, 204);
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        Some("GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS")
    );
}

#[tokio::test]
async fn test_preflight_for_unrouted_path_uses_configured_methods() {
    let api = api(CorsConfig {
        allow_methods: vec![Method::Get, Method::Post],
        ..CorsConfig::enabled("https://app.example.com")
    });

    let mut preflight = event("OPTIONS", "/other");
    preflight["headers"] = json!({"Origin": "https://app.example.com"});
    let (status, body, response) = invoke(&api, preflight).await;

    assert_eq!(status, 204);
    assert_eq!(body, Value::Null);
    assert_eq!(
        response.header("Access-Control-Allow-Methods"),
        Some("GET, POST, OPTIONS")
    );
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://app.example.com")
    );
}

#[tokio::test]
async fn test_rest_route_starting_with_stage_name() {
    let mut router = Router::new();
    router
        .route("/v1/items", &[Method::Get], |r: HttpRequest| echo(r))
        .unwrap();
    let api = ApiHandler::new(router, ApiConfig::default());

    let rest_event = json!({
        "httpMethod": "GET",
        "path": "/v1/items",
        "requestContext": {"requestId": "rest-v1", "stage": "v1"}
    });
    let (status, body, _) = invoke(&api, rest_event).await;
    assert_eq!(status, 200);
    assert_eq!(body["path"], "/v1/items");

    let http_event = json!({
        "version": "2.0",
        "rawPath": "/v1/v1/items",
        "requestContext": {"stage": "v1", "http": {"method": "GET", "path": "/v1/v1/items"}}
    });
    let (status, body, _) = invoke(&api, http_event).await;
    assert_eq!(status, 200);
    assert_eq!(body["path"], "/v1/items");
}

#[tokio::test]
async fn test_unsupported_method_token() {
    let api = api(CorsConfig::disabled());

    let (status, body, _) = invoke(&api, event("BREW", "/items/1")).await;
    assert_eq!(status, 405);
    assert_eq!(body, json!({"error": "Method not allowed"}));
}
