//! End-to-end dispatch over HTTP against mockito upstreams.
//!
//! Each upstream is a separate mock server, so hit counts show exactly which
//! endpoint served which call.

use crate::mock_infrastructure::RpcMockBuilder;
use relay_core::{
    config::AppConfig, create_client, dispatch::MethodShardMap, types::RequestOptions,
    upstream::UpstreamError, DispatchClient, DispatchError, PolicyKind,
};
use serde_json::json;

#[tokio::test]
async fn test_round_robin_over_http_upstreams() {
    let mut a = RpcMockBuilder::new().await;
    let mut b = RpcMockBuilder::new().await;
    a.mock_method_times("getSlot", &json!(100), 2);
    b.mock_method_times("getSlot", &json!(200), 1);

    let client = create_client([a.url(), b.url()], PolicyKind::RoundRobin, None).unwrap();

    let mut slots = Vec::new();
    for _ in 0..3 {
        let response = client.call("getSlot", vec![]).await.unwrap();
        slots.push(response.result.unwrap());
    }

    assert_eq!(slots, [json!(100), json!(200), json!(100)]);
    a.assert_all().await;
    b.assert_all().await;
}

#[tokio::test]
async fn test_method_sharding_over_http_upstreams() {
    let mut accounts = RpcMockBuilder::new().await;
    let mut overflow = RpcMockBuilder::new().await;
    accounts.mock_get_balance(5_000);
    overflow.mock_get_latest_blockhash("EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N");

    let map = MethodShardMap::with_overflow_last(2).unwrap().with_shard("getBalance", 0);
    let client =
        create_client([accounts.url(), overflow.url()], PolicyKind::MethodSharded, Some(map))
            .unwrap();

    let balance = client.call("getBalance", vec![json!("addr")]).await.unwrap();
    assert_eq!(balance.result.unwrap()["value"], 5_000);

    let blockhash = client.call("getLatestBlockhash", vec![]).await.unwrap();
    assert_eq!(
        blockhash.result.unwrap()["value"]["blockhash"],
        "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N"
    );

    accounts.assert_all().await;
    overflow.assert_all().await;
}

#[tokio::test]
async fn test_rpc_error_member_surfaces_as_transport_error() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.mock_rpc_error("getTransaction", -32602, "Invalid params");

    let client = create_client([upstream.url()], PolicyKind::RoundRobin, None).unwrap();
    let err = client.call("getTransaction", vec![json!("sig")]).await.unwrap_err();

    assert!(matches!(
        err.upstream_error(),
        Some(UpstreamError::RpcError(-32602, message)) if message == "Invalid params"
    ));
    assert_eq!(err.endpoint(), Some(upstream.url().as_str()));
    upstream.assert_all().await;
}

#[tokio::test]
async fn test_http_failure_is_not_redirected() {
    let mut failing = RpcMockBuilder::new().await;
    let healthy = RpcMockBuilder::new().await;
    failing.mock_http_status("getSlot", 503, "Service Unavailable");

    // Sharded to slot 0 only; slot 1 must never be contacted.
    let map = MethodShardMap::with_overflow_last(2).unwrap().with_shard("getSlot", 0);
    let client =
        create_client([failing.url(), healthy.url()], PolicyKind::MethodSharded, Some(map))
            .unwrap();

    let err = client.call("getSlot", vec![]).await.unwrap_err();
    match err {
        DispatchError::Transport { index, source: UpstreamError::HttpError(status, body), .. } => {
            assert_eq!(index, 0);
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("expected HTTP transport error, got {other:?}"),
    }

    failing.assert_all().await;
}

#[tokio::test]
async fn test_connection_refused_is_reported_with_endpoint() {
    let unreachable = "http://127.0.0.1:1".to_string();
    let client = create_client([unreachable.clone()], PolicyKind::RoundRobin, None).unwrap();

    let err = client.call("getSlot", vec![]).await.unwrap_err();
    assert_eq!(err.endpoint(), Some(unreachable.as_str()));
    assert!(matches!(err.upstream_error(), Some(UpstreamError::ConnectionFailed(_))));
    assert_eq!(client.stats().endpoints[0].failed, 1);
}

#[tokio::test]
async fn test_request_headers_are_forwarded() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.mock_method_with_header("getSlot", "x-request-source", "relay-tests", &json!(7));

    let client = create_client([upstream.url()], PolicyKind::RoundRobin, None).unwrap();
    let options = RequestOptions::default().with_header("x-request-source", "relay-tests");
    let response = client.send("getSlot", vec![], options).await.unwrap();

    assert_eq!(response.result, Some(json!(7)));
    upstream.assert_all().await;
}

#[tokio::test]
async fn test_client_from_config_dispatches_over_http() {
    let mut a = RpcMockBuilder::new().await;
    let mut b = RpcMockBuilder::new().await;
    a.mock_get_balance(1);
    b.mock_get_slot(42);

    let mut config = AppConfig::default();
    config.endpoints.urls = vec![a.url(), b.url()];
    config.dispatch.shards = [("getBalance".to_string(), 0)].into_iter().collect();
    config.dispatch.default_shard = None;

    let client = DispatchClient::from_config(&config).unwrap();
    assert_eq!(client.policy_kind(), PolicyKind::MethodSharded);

    client.call("getBalance", vec![json!("addr")]).await.unwrap();
    let slot = client.call("getSlot", vec![]).await.unwrap();
    assert_eq!(slot.result, Some(json!(42)));

    a.assert_all().await;
    b.assert_all().await;
}
