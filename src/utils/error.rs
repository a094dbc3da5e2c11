use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("No route for path: {path}")]
    NotFound { path: String },

    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed {
        method: String,
        path: String,
        allowed: Vec<String>,
    },

    #[error("Unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },

    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },

    #[error("Invalid JSON body: {0}")]
    InvalidJsonBody(serde_json::Error),

    #[error("Route registration failed for {path}: {reason}")]
    RouteError { path: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Routing,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. }
            | Self::ValidationError { .. }
            | Self::InvalidEvent { .. }
            | Self::InvalidJsonBody(_) => 400,
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } | Self::UnsupportedMethod { .. } => 405,
            _ => 500,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest { .. }
            | Self::ValidationError { .. }
            | Self::InvalidEvent { .. }
            | Self::InvalidJsonBody(_) => ErrorCategory::Client,
            Self::NotFound { .. }
            | Self::MethodNotAllowed { .. }
            | Self::UnsupportedMethod { .. } => ErrorCategory::Routing,
            Self::RouteError { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::Internal { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client | ErrorCategory::Routing => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => match self {
                Self::IoError(_) => ErrorSeverity::Medium,
                _ => ErrorSeverity::Critical,
            },
        }
    }

    /// 回傳給 API 呼叫端的訊息，不洩漏內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::BadRequest { message } | Self::ValidationError { message } => message.clone(),
            Self::NotFound { .. } => "Not found".to_string(),
            Self::MethodNotAllowed { .. } | Self::UnsupportedMethod { .. } => {
                "Method not allowed".to_string()
            }
            Self::InvalidEvent { .. } => "Invalid event".to_string(),
            Self::InvalidJsonBody(_) => "Invalid JSON body".to_string(),
            Self::RouteError { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Client => "Check the request body and parameters",
            ErrorCategory::Routing => "Check the request path and HTTP method",
            ErrorCategory::Configuration => {
                "Check the configuration file and environment variables"
            }
            ErrorCategory::System => "Check the function logs for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
