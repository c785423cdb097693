//! Configuration validation module
//!
//! Rules that span fields or need pattern matching, run after the
//! `validator` derive checks.

use regex::Regex;
use std::collections::HashSet;

use crate::config::AppConfig;
use crate::domain::service::is_exported;
use crate::shared::error::{AppError, AppResult};

/// `type/subtype` token syntax from RFC 6838
const MEDIA_TYPE_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*$";

/// Slash-separated unreserved URL segments; empty is allowed
const MOUNT_PATH_PATTERN: &str = r"^/?([A-Za-z0-9._~-]+/)*[A-Za-z0-9._~-]*$";

/// Configuration validator for additional validation logic
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete configuration
    pub fn validate_config(config: &AppConfig) -> AppResult<()> {
        Self::validate_mount_path(&config.server.mount_path)?;
        Self::validate_content_types(&config.rpc.content_types)?;
        Self::validate_service_name(config.rpc.service_name.as_deref())?;
        Self::validate_fallback_status(config.rpc.fallback_error_status)?;
        Ok(())
    }

    fn validate_mount_path(mount_path: &str) -> AppResult<()> {
        if !Self::matches(MOUNT_PATH_PATTERN, mount_path)? {
            return Err(AppError::Validation(format!("Invalid mount path: '{}'", mount_path)));
        }
        Ok(())
    }

    fn validate_content_types(content_types: &[String]) -> AppResult<()> {
        let mut seen = HashSet::new();
        for content_type in content_types {
            if !Self::matches(MEDIA_TYPE_PATTERN, content_type)? {
                return Err(AppError::Validation(format!("Invalid content type: '{}'", content_type)));
            }
            if !seen.insert(content_type.to_lowercase()) {
                return Err(AppError::Validation(format!("Duplicate content type: '{}'", content_type)));
            }
        }
        Ok(())
    }

    fn validate_service_name(service_name: Option<&str>) -> AppResult<()> {
        let Some(name) = service_name else {
            return Ok(());
        };
        if name.contains(['.', '/']) {
            return Err(AppError::Validation(format!(
                "Service name '{}' must not contain '.' or '/'",
                name
            )));
        }
        if !is_exported(name) {
            tracing::warn!(service = %name, "service name does not start with an uppercase letter");
        }
        Ok(())
    }

    fn validate_fallback_status(status: u16) -> AppResult<()> {
        if !(400..=599).contains(&status) {
            return Err(AppError::Validation(format!(
                "fallback_error_status must be a 4xx or 5xx status, got {}",
                status
            )));
        }
        Ok(())
    }

    fn matches(pattern: &str, value: &str) -> AppResult<bool> {
        match Regex::new(pattern) {
            Ok(regex) => Ok(regex.is_match(value)),
            Err(e) => Err(AppError::Validation(format!("Invalid regex pattern '{}': {}", pattern, e))),
        }
    }
}
