//! Crate-level test suite
//!
//! - `common`: mock receiver and route fixtures
//! - `integration`: end-to-end HTTP scenarios through the warp routes

pub mod integration;

/// Configuration fixtures
pub mod config {
    use crate::config::AppConfig;
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Route tracing output through the test harness, once per process
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("debug")
                .with_test_writer()
                .try_init();
        });
    }

    /// Defaults with a 4 KiB body limit
    pub fn test_config() -> AppConfig {
        let mut fixture = AppConfig::default();
        fixture.server.max_request_size = 4096;
        fixture
    }

    /// Test configuration answering undecodable bodies with HTTP 400
    pub fn status_policy_config() -> AppConfig {
        let mut fixture = test_config();
        fixture.rpc.malformed_request_reply = crate::application::MalformedRequestReply::Status;
        fixture
    }

    /// Test configuration that writes no body for notifications
    pub fn quiet_notifications_config() -> AppConfig {
        let mut fixture = test_config();
        fixture.rpc.suppress_notification_replies = true;
        fixture
    }
}

/// Request builders and envelope assertions
pub mod utils {
    use serde_json::{json, Value};

    /// JSON-RPC 2.0 call envelope
    pub fn create_rpc_request(method: &str, params: Value, id: Value) -> Value {
        json!({"jsonrpc": "2.0", "method": method, "params": params, "id": id})
    }

    /// A reply envelope carries the version, an `id` member, and exactly one
    /// of `result` / `error`.
    pub fn assert_rpc_response(response: &Value) {
        assert_eq!(response.get("jsonrpc"), Some(&json!("2.0")), "{}", response);
        assert!(response.get("id").is_some(), "missing id: {}", response);
        assert!(
            response.get("result").is_some() ^ response.get("error").is_some(),
            "exactly one of result/error expected: {}",
            response
        );
    }

    /// Error envelope with the given code and a message
    pub fn assert_rpc_error(response: &Value, expected_code: i64) {
        assert_rpc_response(response);
        let error = &response["error"];
        assert!(error["message"].is_string(), "{}", response);
        assert_eq!(error["code"].as_i64(), Some(expected_code), "{}", response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixture_configs_validate() {
        config::init();
        for fixture in [
            config::test_config(),
            config::status_policy_config(),
            config::quiet_notifications_config(),
        ] {
            assert!(fixture.validate_config().is_ok());
        }
        assert!(config::quiet_notifications_config().rpc.suppress_notification_replies);
    }

    #[test]
    #[should_panic(expected = "exactly one of result/error")]
    fn envelope_with_result_and_error_is_rejected() {
        utils::assert_rpc_response(&json!({
            "jsonrpc": "2.0",
            "result": 1,
            "error": {"code": 1, "message": "x"},
            "id": null
        }));
    }

    #[test]
    fn error_envelope_matches_code() {
        let request = utils::create_rpc_request("Action", json!({"A": 1}), json!(9));
        assert_eq!(request["id"], 9);

        let error = json!({"jsonrpc": "2.0", "error": {"code": -32601, "message": "nope"}, "id": 9});
        utils::assert_rpc_error(&error, -32601);
    }
}
