//! Concurrency tests for round-robin selection under parallel callers.
//!
//! Many tasks share one client on a multi-threaded runtime. Selections must form a
//! contiguous run modulo the pool size: no index handed out twice too often, none
//! skipped.

use crate::mock_infrastructure::{recorded_client_with_delay, sample_shard_map};
use futures::future::join_all;
use relay_core::PolicyKind;
use std::{collections::HashSet, sync::Arc, time::Duration};

const POOL: [&str; 5] = ["e0", "e1", "e2", "e3", "e4"];

fn slot_of(endpoint: &str) -> usize {
    POOL.iter().position(|id| *id == endpoint).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_select_contiguous_run() {
    const CALLS: usize = 203;

    let (client, log) = recorded_client_with_delay(
        &POOL,
        PolicyKind::RoundRobin,
        None,
        Some(Duration::from_millis(5)),
    )
    .unwrap();
    let client = Arc::new(client);

    let handles: Vec<_> = (0..CALLS)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.call("getSlot", vec![i.into()]).await })
        })
        .collect();

    for result in join_all(handles).await {
        result.unwrap().unwrap();
    }

    let mut counts = [0usize; POOL.len()];
    for endpoint in log.endpoints() {
        counts[slot_of(&endpoint)] += 1;
    }

    // Starting from slot 0, the first `CALLS % N` slots get one extra selection.
    let n = POOL.len();
    for (slot, count) in counts.iter().enumerate() {
        assert_eq!(*count, CALLS / n + usize::from(slot < CALLS % n), "slot {slot}");
    }

    let stats = client.stats();
    assert_eq!(stats.total_dispatched(), CALLS as u64);
    assert_eq!(stats.total_failed(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_request_ids_are_distinct() {
    const CALLS: usize = 64;

    let (client, log) =
        recorded_client_with_delay(&POOL, PolicyKind::RoundRobin, None, None).unwrap();
    let client = Arc::new(client);

    let handles: Vec<_> = (0..CALLS)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.call("getBalance", vec![]).await })
        })
        .collect();
    for result in join_all(handles).await {
        result.unwrap().unwrap();
    }

    let ids: HashSet<u64> = log.calls().iter().map(|c| c.request_id).collect();
    assert_eq!(ids.len(), CALLS);
    assert_eq!(ids.iter().copied().max(), Some(CALLS as u64));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sharded_calls_stay_on_their_shard() {
    let (client, log) = recorded_client_with_delay(
        &["A", "B", "C", "D"],
        PolicyKind::MethodSharded,
        Some(sample_shard_map()),
        Some(Duration::from_millis(1)),
    )
    .unwrap();
    let client = Arc::new(client);

    let methods = ["getAccountInfo", "getTransaction", "sendTransaction", "getSlotLeader"];
    let handles: Vec<_> = (0..100)
        .map(|i| {
            let client = client.clone();
            let method = methods[i % methods.len()];
            tokio::spawn(async move { client.call(method, vec![]).await })
        })
        .collect();
    for result in join_all(handles).await {
        result.unwrap().unwrap();
    }

    for call in log.calls() {
        let expected = match call.method.as_str() {
            "getAccountInfo" => "A",
            "getTransaction" => "B",
            "sendTransaction" => "C",
            _ => "D",
        };
        assert_eq!(call.endpoint, expected, "{}", call.method);
    }
    assert_eq!(log.len(), 100);
}
