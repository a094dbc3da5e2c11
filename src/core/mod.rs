pub mod api_handler;
pub mod cors;
pub mod event;
pub mod request;
pub mod router;

pub use crate::domain::model::{HandlerResponse, HttpRequest, Method};
pub use crate::domain::ports::{Handler, VersionStore};
pub use crate::utils::error::Result;
