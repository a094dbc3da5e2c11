use crate::core::router::Router;
use crate::domain::model::{HandlerResponse, HttpRequest, Method};
use crate::domain::ports::{Handler, VersionStore};
use crate::utils::error::{ApiError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub const VERSION_PATH: &str = "/version";

#[derive(Debug, Deserialize)]
struct VersionUpdate {
    new_version: String,
}

/// `GET|PATCH /version`
pub struct VersionHandler {
    store: Arc<dyn VersionStore>,
}

impl VersionHandler {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for VersionHandler {
    async fn handle(&self, request: HttpRequest) -> Result<HandlerResponse> {
        match request.method {
            Method::Get => Ok(json!({ "version": self.store.get().await }).into()),
            Method::Patch => {
                // 缺少、空字串或非字串都視為無效
                let update: VersionUpdate = request
                    .json()
                    .map_err(|_| ApiError::bad_request("Invalid version"))?;
                if update.new_version.is_empty() {
                    return Err(ApiError::bad_request("Invalid version"));
                }

                let version = self.store.set(update.new_version).await;
                tracing::info!("🔖 Version updated to {}", version);
                Ok(json!({ "version": version }).into())
            }
            _ => Ok((json!({ "error": "Invalid method" }), 405).into()),
        }
    }
}

/// 建立含 `/version` 路由的 router
pub fn router(store: Arc<dyn VersionStore>) -> Result<Router> {
    let mut router = Router::new();
    router.route(
        VERSION_PATH,
        &[Method::Get, Method::Patch],
        VersionHandler::new(store),
    )?;
    Ok(router)
}
