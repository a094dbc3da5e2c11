use crate::utils::error::{ApiError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 驗證 CORS origin：`*` 或一個 http(s) origin (不含 path)
pub fn validate_origin(field_name: &str, origin: &str) -> Result<()> {
    if origin == "*" {
        return Ok(());
    }

    if origin.is_empty() {
        return Err(ApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: "Origin cannot be empty".to_string(),
        });
    }

    match Url::parse(origin) {
        Ok(url) => {
            match url.scheme() {
                "http" | "https" => {}
                scheme => {
                    return Err(ApiError::InvalidConfigValueError {
                        field: field_name.to_string(),
                        value: origin.to_string(),
                        reason: format!("Unsupported origin scheme: {}", scheme),
                    })
                }
            }

            if url.host_str().is_none() || url.path() != "/" || origin.ends_with('/') {
                return Err(ApiError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: origin.to_string(),
                    reason: "Origin must be scheme://host[:port] without a path".to_string(),
                });
            }

            Ok(())
        }
        Err(e) => Err(ApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: format!("Invalid origin format: {}", e),
        }),
    }
}

/// 驗證逗號分隔的 origin 清單
pub fn validate_origin_list(field_name: &str, origins: &str) -> Result<()> {
    for origin in origins.split(',').map(str::trim) {
        validate_origin(field_name, origin)?;
    }
    Ok(())
}

pub fn validate_route_path(field_name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(ApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must start with '/'".to_string(),
        });
    }

    if path.contains(char::is_whitespace) || path.contains('\0') {
        return Err(ApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot contain whitespace or null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
