use crate::domain::ports::VersionStore;
use async_trait::async_trait;
use tokio::sync::RwLock;

pub const DEFAULT_VERSION: &str = "1.0";

/// 行程內的版本儲存；Lambda container 重用時狀態會保留
#[derive(Debug)]
pub struct InMemoryVersionStore {
    version: RwLock<String>,
}

impl InMemoryVersionStore {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            version: RwLock::new(initial.into()),
        }
    }
}

impl Default for InMemoryVersionStore {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
    async fn get(&self) -> String {
        self.version.read().await.clone()
    }

    async fn set(&self, version: String) -> String {
        let mut guard = self.version.write().await;
        *guard = version;
        guard.clone()
    }
}
