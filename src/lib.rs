pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::store::InMemoryVersionStore;
pub use crate::config::{LambdaConfig, TomlConfig};
pub use crate::core::{
    api_handler::{ApiConfig, ApiHandler},
    cors::CorsConfig,
    event::{ApiGatewayEvent, ApiGatewayResponse, InvocationContext},
    router::Router,
};
pub use crate::domain::model::{HandlerResponse, HttpRequest, Method};
pub use crate::domain::ports::{Handler, VersionStore};
pub use crate::utils::error::{ApiError, Result};
