// Domain layer: request/response models and ports (interfaces).

pub mod model;
pub mod ports;
