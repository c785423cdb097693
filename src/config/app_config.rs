//! Application configuration structures
//!
//! Defaults, then an optional `Conf.*` file, then `RPC_DISPATCH__*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use validator::Validate;
use warp::http::StatusCode;

use crate::application::dispatcher::{DispatchOptions, MalformedRequestReply};
use crate::config::validation::ConfigValidator;
use crate::shared::error::{AppError, AppResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server address to bind to
    pub bind_address: IpAddr,

    /// Server port
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Maximum request size in bytes
    #[validate(range(min = 1024, max = 10485760))] // 1KB to 10MB
    pub max_request_size: usize,

    /// Path prefix the RPC endpoint is mounted under; the method name follows it
    #[validate(length(max = 256))]
    pub mount_path: String,
}

/// RPC dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RpcConfig {
    /// Service name override; derived from the receiver type when unset
    #[validate(length(min = 1, max = 128))]
    pub service_name: Option<String>,

    /// Content types served by the JSON-RPC 2.0 codec
    #[validate(length(min = 1))]
    pub content_types: Vec<String>,

    /// Write no body for requests without an id
    pub suppress_notification_replies: bool,

    /// Require the last path segment to equal the body's method
    pub check_path_method: bool,

    /// How undecodable requests are answered
    pub malformed_request_reply: MalformedRequestReply,

    /// Error code for method failures without a protocol error
    #[validate(range(min = 400, max = 599))]
    pub fallback_error_status: u16,
}

/// Log output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level or filter directive; `RUST_LOG` takes precedence
    #[validate(length(min = 1))]
    pub level: String,

    /// Log format
    pub format: LogFormat,

    /// Colored output
    pub ansi: bool,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// RPC dispatch configuration
    #[validate(nested)]
    pub rpc: RpcConfig,

    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 8080,
                max_request_size: 1024 * 1024, // 1MB
                mount_path: "jsonrpc/v1".to_string(),
            },
            rpc: RpcConfig {
                service_name: None,
                content_types: vec!["application/json".to_string()],
                suppress_notification_replies: false,
                check_path_method: true,
                malformed_request_reply: MalformedRequestReply::Envelope,
                fallback_error_status: 400,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Full,
                ansi: false,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from `Conf.*` and environment variables
    pub fn load() -> AppResult<Self> {
        Self::load_from("Conf")
    }

    /// Load configuration from the file `basename` (any supported extension)
    /// and environment variables
    pub fn load_from(basename: &str) -> AppResult<Self> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .map_err(|e| AppError::Config(format!("Failed to build default configuration: {}", e)))?;

        let config = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(basename).required(false))
            .add_source(
                config::Environment::with_prefix("RPC_DISPATCH")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("rpc.content_types"),
            )
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build configuration: {}", e)))?;

        let config: AppConfig = config
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to deserialize configuration: {}", e)))?;

        config.validate_config()?;
        Ok(config)
    }

    /// Validate field ranges and cross-field rules
    pub fn validate_config(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Validation(format!("Configuration validation failed: {}", e)))?;
        ConfigValidator::validate_config(self)
    }

    /// Socket address the server binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind_address, self.server.port)
    }

    /// Mount path split into its non-empty segments
    pub fn mount_segments(&self) -> Vec<String> {
        self.server
            .mount_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Dispatcher options derived from this configuration
    pub fn dispatch_options(&self) -> AppResult<DispatchOptions> {
        let fallback_status = StatusCode::from_u16(self.rpc.fallback_error_status).map_err(|e| {
            AppError::Validation(format!("Invalid fallback_error_status {}: {}", self.rpc.fallback_error_status, e))
        })?;

        Ok(DispatchOptions {
            malformed_request_reply: self.rpc.malformed_request_reply,
            fallback_status,
            max_request_size: Some(self.server.max_request_size),
        })
    }
}
