use crate::domain::model::{HandlerResponse, HttpRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::future::Future;

/// 路由處理器
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: HttpRequest) -> Result<HandlerResponse>;
}

// 讓一般的 async closure 也能註冊成 handler
#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HandlerResponse>> + Send,
{
    async fn handle(&self, request: HttpRequest) -> Result<HandlerResponse> {
        (self)(request).await
    }
}

/// 共享的版本字串儲存
#[async_trait]
pub trait VersionStore: Send + Sync {
    async fn get(&self) -> String;
    async fn set(&self, version: String) -> String;
}
