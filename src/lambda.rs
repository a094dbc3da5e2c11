use api_lambda::app::version;
use api_lambda::utils::{logger, validation::Validate};
use api_lambda::{ApiGatewayResponse, ApiHandler, InMemoryVersionStore, InvocationContext, LambdaConfig};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;

async fn function_handler(
    handler: &ApiHandler,
    event: LambdaEvent<serde_json::Value>,
) -> Result<ApiGatewayResponse, Error> {
    let (payload, context) = event.into_parts();
    let invocation = InvocationContext {
        aws_request_id: Some(context.request_id.clone()),
        function_name: Some(context.env_config.function_name.clone()),
    };

    Ok(handler.handle_value(payload, &invocation).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let lambda_config = LambdaConfig::from_env()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    lambda_config
        .validate()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    // container 重用期間版本狀態會保留
    let store = Arc::new(InMemoryVersionStore::new(lambda_config.initial_version.clone()));
    let router = version::router(store)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    let handler = ApiHandler::new(router, lambda_config.api_config())
        .with_monitoring(lambda_config.monitoring);
    let handler = &handler;

    tracing::info!("Starting API Lambda function");
    run(service_fn(move |event| async move { function_handler(handler, event).await })).await
}
