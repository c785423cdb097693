//! End-to-end scenarios against the warp routes

use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::Filter;

use crate::tests::common::{mock_routes, MockArgs};
use crate::tests::config::{quiet_notifications_config, status_policy_config, test_config};
use crate::tests::utils::{assert_rpc_error, assert_rpc_response, create_rpc_request};

const MOUNT: &str = "/jsonrpc/v1";

fn endpoint(method: &str) -> String {
    format!("{}/{}", MOUNT, method)
}

async fn post<F>(routes: &F, path: &str, body: impl Into<String>) -> warp::http::Response<bytes::Bytes>
where
    F: Filter + Clone + 'static,
    F::Extract: warp::Reply + Send,
{
    warp::test::request()
        .method("POST")
        .path(path)
        .header("content-type", "application/json")
        .body(body.into())
        .reply(routes)
        .await
}

fn json_of(response: &warp::http::Response<bytes::Bytes>) -> Value {
    serde_json::from_slice(response.body()).expect("body must be JSON")
}

fn text_of(response: &warp::http::Response<bytes::Bytes>) -> String {
    String::from_utf8_lossy(response.body()).into_owned()
}

#[tokio::test]
async fn sanity_call_returns_difference() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": 5, "B": 2}), json!(1));

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json; charset=utf-8");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let body = json_of(&response);
    assert_rpc_response(&body);
    assert_eq!(body["result"], json!({"Value": 3}));
    assert_eq!(body["id"], 1);
    assert_eq!(mock.called(), 1);
    assert_eq!(mock.state().last_args, Some(MockArgs { a: 5, b: 2 }));
}

#[tokio::test]
async fn qualified_method_name_is_accepted() {
    let (_, routes) = mock_routes(test_config());
    let request = create_rpc_request("MockRpcObject.Action", json!({"A": 9, "B": 4}), json!("abc"));

    let response = post(&routes, &endpoint("MockRpcObject.Action"), request.to_string()).await;

    let body = json_of(&response);
    assert_eq!(body["result"]["Value"], 5);
    assert_eq!(body["id"], "abc");
}

#[tokio::test]
async fn positional_params_bind_first_element() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!([{"A": 7, "B": 3}]), json!(2));

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(json_of(&response)["result"]["Value"], 4);
    assert_eq!(mock.called(), 1);
}

#[tokio::test]
async fn omitted_params_call_method_with_defaults() {
    let (mock, routes) = mock_routes(test_config());
    let request = json!({"jsonrpc": "2.0", "method": "Echo", "id": 3});

    let response = post(&routes, &endpoint("Echo"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(&response)["result"], json!({"A": 0, "B": 0}));
    assert_eq!(mock.called(), 1);
}

#[tokio::test]
async fn ill_typed_params_are_invalid_params() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": "five"}), json!(4));

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(&response);
    assert_rpc_error(&body, -32602);
    assert_eq!(body["error"]["data"], json!({"A": "five"}));
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn malformed_bodies_get_error_envelopes() {
    let cases: [(&str, i64); 4] = [
        ("", -32700),
        ("garbage", -32700),
        ("{}", -32600),
        (r#"{"jsonrpc":"2.0"}"#, -32601),
    ];

    for (body, code) in cases {
        let (mock, routes) = mock_routes(test_config());
        let response = post(&routes, &endpoint("Action"), body).await;

        assert_eq!(response.status(), StatusCode::OK, "body {:?}", body);
        let reply = json_of(&response);
        assert_rpc_error(&reply, code);
        assert_eq!(reply["id"], Value::Null);
        assert_eq!(mock.called(), 0);
    }
}

#[tokio::test]
async fn malformed_bodies_get_bad_request_under_status_policy() {
    for body in ["", "garbage", "{}", r#"{"jsonrpc":"2.0"}"#] {
        let (mock, routes) = mock_routes(status_policy_config());
        let response = post(&routes, &endpoint("Action"), body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(response.headers()["content-type"], "text/plain; charset=utf-8");
        assert_eq!(mock.called(), 0);
    }
}

#[tokio::test]
async fn wrong_path_for_method_is_not_found() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": 5, "B": 2}), json!(1));

    let response = post(&routes, &endpoint("Wrong"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        text_of(&response),
        "rpc: URL.Path '/jsonrpc/v1/Wrong' does not end with method name 'Action'"
    );
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn wrong_method_for_path_is_not_found() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Wrong", json!({"A": 5, "B": 2}), json!(1));

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn unknown_method_gets_method_not_found_envelope() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Wrong", json!({}), json!(7));

    let response = post(&routes, &endpoint("Wrong"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(&response);
    assert_rpc_error(&body, -32601);
    assert_eq!(body["id"], 7);
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn unexported_method_is_not_reachable() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("hidden", json!({"A": 5, "B": 2}), json!(1));

    let response = post(&routes, &endpoint("hidden"), request.to_string()).await;

    assert_rpc_error(&json_of(&response), -32601);
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Other.Action", json!({"A": 5, "B": 2}), json!(1));

    let response = post(&routes, &endpoint("Other.Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(text_of(&response), "rpc: can't find service \"Other.Action\"");
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn method_error_uses_fallback_code() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": 4, "B": 4}), json!(1));

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(&response);
    assert_rpc_error(&body, 400);
    assert_eq!(body["error"]["message"], "expected error A==B");
    assert!(body["error"].get("data").is_none());
    assert_eq!(mock.state().error.as_deref(), Some("expected error A==B"));
}

#[tokio::test]
async fn omitted_params_reach_the_method() {
    let (mock, routes) = mock_routes(test_config());
    let request = json!({"jsonrpc": "2.0", "method": "Action", "id": 1});

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    // Zero-valued arguments satisfy A == B.
    assert_rpc_error(&json_of(&response), 400);
    assert_eq!(mock.called(), 1);
}

#[tokio::test]
async fn protocol_error_from_method_keeps_code_and_data() {
    let (_, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": 20, "B": 2}), json!(1));

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    let body = json_of(&response);
    assert_rpc_error(&body, 500);
    assert_eq!(body["error"]["message"], "jsonrpc-aware error");
    assert_eq!(body["error"]["data"], json!({"A": 20, "B": 2}));
}

#[tokio::test]
async fn notification_reply_echoes_null_id() {
    let (mock, routes) = mock_routes(test_config());
    let request = json!({"jsonrpc": "2.0", "method": "Action", "params": {"A": 5, "B": 2}});

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(&response);
    assert_eq!(body["result"]["Value"], 3);
    assert_eq!(body["id"], Value::Null);
    assert_eq!(mock.called(), 1);
}

#[tokio::test]
async fn suppressed_notifications_get_empty_body() {
    let (mock, routes) = mock_routes(quiet_notifications_config());

    let without_id = json!({"jsonrpc": "2.0", "method": "Action", "params": {"A": 5, "B": 2}});
    let null_id = create_rpc_request("Action", json!({"A": 3, "B": 3}), Value::Null);

    for request in [without_id, null_id] {
        let response = post(&routes, &endpoint("Action"), request.to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
        assert!(response.headers().get("content-type").is_none());
    }
    assert_eq!(mock.called(), 2);
}

#[tokio::test]
async fn suppression_still_answers_parse_errors() {
    let (_, routes) = mock_routes(quiet_notifications_config());

    let response = post(&routes, &endpoint("Action"), "garbage").await;

    assert_rpc_error(&json_of(&response), -32700);
}

#[tokio::test]
async fn non_post_is_method_not_allowed() {
    let (mock, routes) = mock_routes(test_config());

    let response = warp::test::request()
        .method("GET")
        .path(&endpoint("Action"))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(text_of(&response), "rpc: POST method required, received GET");
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn unrecognized_content_type_is_unsupported() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": 5, "B": 2}), json!(1));

    let response = warp::test::request()
        .method("POST")
        .path(&endpoint("Action"))
        .header("content-type", "text/xml")
        .body(request.to_string())
        .reply(&routes)
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(text_of(&response), "rpc: unrecognized Content-Type: text/xml");
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn content_type_parameters_and_case_are_ignored() {
    let (_, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": 5, "B": 2}), json!(1));

    let response = warp::test::request()
        .method("POST")
        .path(&endpoint("Action"))
        .header("content-type", "Application/JSON; charset=UTF-8")
        .body(request.to_string())
        .reply(&routes)
        .await;

    assert_eq!(json_of(&response)["result"]["Value"], 3);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (mock, routes) = mock_routes(test_config());
    let padding = "x".repeat(8192);
    let request = create_rpc_request("Action", json!({"A": 5, "B": 2, "pad": padding}), json!(1));

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()["content-type"], "text/plain; charset=utf-8");
    assert!(text_of(&response).starts_with("Request too large:"));
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn declared_oversize_is_refused_before_reading_the_body() {
    let (mock, routes) = mock_routes(test_config());

    let response = warp::test::request()
        .method("POST")
        .path(&endpoint("Action"))
        .header("content-type", "application/json")
        .header("content-length", "1000000")
        .reply(&routes)
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        text_of(&response),
        "Request too large: 1000000 bytes exceeds limit of 4096 bytes"
    );
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn null_method_keeps_the_request_id() {
    let (mock, routes) = mock_routes(test_config());
    let request = json!({"jsonrpc": "2.0", "method": null, "id": 11});

    let response = post(&routes, &endpoint("Action"), request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(&response);
    assert_rpc_error(&body, -32601);
    assert_eq!(body["id"], 11);
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn paths_outside_the_mount_are_not_routed() {
    let (mock, routes) = mock_routes(test_config());
    let request = create_rpc_request("Action", json!({"A": 5, "B": 2}), json!(1));

    let response = post(&routes, "/other/Action", request.to_string()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(mock.called(), 0);
}

#[tokio::test]
async fn health_reports_service_and_methods() {
    let (_, routes) = mock_routes(test_config());

    let response = warp::test::request().method("GET").path("/health").reply(&routes).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(&response);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "MockRpcObject");
    assert_eq!(body["methods"], json!(["Action", "Echo"]));
    assert_eq!(body["content_types"], json!(["application/json"]));
}

#[tokio::test]
async fn metrics_count_dispatch_outcomes() {
    let (_, routes) = mock_routes(test_config());
    let ok = create_rpc_request("Action", json!({"A": 5, "B": 2}), json!(1));
    let failing = create_rpc_request("Action", json!({"A": 1, "B": 1}), json!(2));

    post(&routes, &endpoint("Action"), ok.to_string()).await;
    post(&routes, &endpoint("Action"), failing.to_string()).await;

    let response = warp::test::request().method("GET").path("/metrics").reply(&routes).await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = text_of(&response);
    assert!(text.contains(r#"rpc_requests_total{outcome="success"} 1"#), "{}", text);
    assert!(text.contains(r#"rpc_requests_total{outcome="method_error"} 1"#), "{}", text);
    assert!(text.contains("rpc_dispatch_duration_seconds"));
}
