//! Integration tests for the response cache
//!
//! These tests drive `cached_fetch` against a scripted HTTP client:
//! - Single network call within the TTL window
//! - Alternate-auth reuse
//! - Stale fallback after failures, opposite auth first
//! - Error propagation when nothing is cached
//! - Persistence through the file store

use async_trait::async_trait;
use showcase_core::cache::{
    CacheConfig, FileStore, HttpClient, HttpResponse, MemoryStore, RequestOptions, ResponseCache,
};
use showcase_core::error::{ErrorKind, Result, ShowcaseError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const USER_URL: &str = "https://api.github.com/users/octocat";
const GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Replays queued responses, then fails every call
#[derive(Default)]
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn respond(self, status: u16, body: Value) -> Self {
        self.push(Ok(HttpResponse::new(status, body.to_string())))
    }

    fn fail(self) -> Self {
        self.push(Err(ShowcaseError::Transport("connection refused".into())))
    }

    fn push(self, response: Result<HttpResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, _url: &str, _options: &RequestOptions) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ShowcaseError::Transport("offline".into())))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cache() -> ResponseCache {
    init_tracing();
    ResponseCache::in_memory(CacheConfig::builder().ttl_jitter(0.0).build())
}

#[tokio::test]
async fn test_second_fetch_within_ttl_skips_network() {
    let cache = cache();
    let client = ScriptedClient::new().respond(200, json!({"login": "octocat"}));

    for _ in 0..2 {
        let user: Value = cache
            .cached_fetch(&client, USER_URL, &RequestOptions::get(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(user["login"], "octocat");
    }

    assert_eq!(client.calls(), 1);
    let stats = cache.stats().await;
    assert_eq!(stats.network_fetches, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.writes, 1);
}

#[tokio::test]
async fn test_fresh_entry_survives_network_failure() {
    let cache = cache();
    cache
        .set("GET https://api.github.com/users/octocat [anon]", &json!({"login": "cached"}), Duration::from_secs(60))
        .await;
    let client = ScriptedClient::new().fail();

    let user: Value = cache
        .cached_fetch(&client, USER_URL, &RequestOptions::get(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(user["login"], "cached");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_expired_entry_used_as_fallback() {
    let cache = cache();
    let first = ScriptedClient::new().respond(200, json!({"login": "octocat", "public_repos": 8}));
    let _: Value = cache
        .cached_fetch(&first, USER_URL, &RequestOptions::get(), Duration::from_millis(50))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    let failing = ScriptedClient::new().respond(503, json!({"message": "unavailable"}));
    let user: Value = cache
        .cached_fetch(&failing, USER_URL, &RequestOptions::get(), Duration::from_millis(50))
        .await
        .unwrap();

    assert_eq!(user["public_repos"], 8);
    assert_eq!(failing.calls(), 1);
    assert_eq!(cache.stats().await.fallbacks, 1);
}

#[tokio::test]
async fn test_expired_alternate_entry_preferred_as_fallback() {
    let cache = cache();
    let ttl = Duration::from_millis(50);
    cache
        .set("GET https://api.github.com/users/octocat [anon]", &json!({"v": "anon"}), ttl)
        .await;
    cache
        .set("GET https://api.github.com/users/octocat [auth]", &json!({"v": "auth"}), ttl)
        .await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = ScriptedClient::new().respond(403, json!({"message": "Bad credentials"}));
    let authed = RequestOptions::get().bearer("ghp_token");
    let user: Value = cache
        .cached_fetch(&client, USER_URL, &authed, Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(user["v"], "anon");
    assert_eq!(client.calls(), 1);
    let stats = cache.stats().await;
    assert_eq!(stats.fallbacks, 1);
    assert_eq!(stats.alternate_hits, 0);
}

#[tokio::test]
async fn test_unauthenticated_entry_reused_for_authenticated_get() {
    let cache = cache();
    let anon = ScriptedClient::new().respond(200, json!({"login": "octocat"}));
    let _: Value = cache
        .cached_fetch(&anon, USER_URL, &RequestOptions::get(), Duration::from_secs(60))
        .await
        .unwrap();

    let authed = ScriptedClient::new();
    let user: Value = cache
        .cached_fetch(
            &authed,
            USER_URL,
            &RequestOptions::get().bearer("ghp_secret"),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    assert_eq!(user["login"], "octocat");
    assert_eq!(authed.calls(), 0);
    assert_eq!(cache.stats().await.alternate_hits, 1);
}

#[tokio::test]
async fn test_authenticated_post_does_not_reuse_anonymous_entry() {
    let cache = cache();
    let body = json!({"query": "{ viewer { login } }"}).to_string();

    let anon = ScriptedClient::new().respond(200, json!({"data": "anon"}));
    let _: Value = cache
        .cached_fetch(&anon, GRAPHQL_URL, &RequestOptions::post_json(body.clone()), Duration::from_secs(60))
        .await
        .unwrap();

    let authed = ScriptedClient::new().respond(200, json!({"data": "authed"}));
    let result: Value = cache
        .cached_fetch(
            &authed,
            GRAPHQL_URL,
            &RequestOptions::post_json(body).bearer("ghp_secret"),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    assert_eq!(result["data"], "authed");
    assert_eq!(authed.calls(), 1);
}

#[tokio::test]
async fn test_post_bodies_are_cached_separately() {
    let cache = cache();
    let client = ScriptedClient::new()
        .respond(200, json!({"n": 1}))
        .respond(200, json!({"n": 2}));

    let one: Value = cache
        .cached_fetch(&client, GRAPHQL_URL, &RequestOptions::post_json(r#"{"query":"a"}"#), Duration::from_secs(60))
        .await
        .unwrap();
    let two: Value = cache
        .cached_fetch(&client, GRAPHQL_URL, &RequestOptions::post_json(r#"{"query":"b"}"#), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(one["n"], 1);
    assert_eq!(two["n"], 2);
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_error_propagates_without_fallback() {
    let cache = cache();
    let client = ScriptedClient::new().respond(429, json!({"message": "rate limited"}));

    let result = cache
        .cached_fetch::<Value, _>(&client, USER_URL, &RequestOptions::get(), Duration::from_secs(60))
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.status(), Some(429));
    assert_eq!(error.kind(), ErrorKind::AuthOrRateLimit);
    assert!(!cache.has("GET https://api.github.com/users/octocat [anon]").await);
}

#[tokio::test]
async fn test_stale_fallback_can_be_disabled() {
    let cache = ResponseCache::in_memory(
        CacheConfig::builder()
            .ttl_jitter(0.0)
            .enable_stale_fallback(false)
            .build(),
    );
    let first = ScriptedClient::new().respond(200, json!({"login": "octocat"}));
    let _: Value = cache
        .cached_fetch(&first, USER_URL, &RequestOptions::get(), Duration::from_millis(20))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;

    let result = cache
        .cached_fetch::<Value, _>(&ScriptedClient::new(), USER_URL, &RequestOptions::get(), Duration::from_millis(20))
        .await;
    assert!(matches!(result, Err(ShowcaseError::Transport(_))));
}

#[tokio::test]
async fn test_ttl_expiration() {
    let cache = cache();
    cache.set("expiring_key", &"expiring_value", Duration::from_millis(100)).await;

    let value: Option<String> = cache.get("expiring_key", false).await;
    assert_eq!(value.as_deref(), Some("expiring_value"));

    tokio::time::sleep(Duration::from_millis(150)).await;

    let stale: Option<String> = cache.get("expiring_key", true).await;
    assert_eq!(stale.as_deref(), Some("expiring_value"));

    let fresh: Option<String> = cache.get("expiring_key", false).await;
    assert!(fresh.is_none());
    assert!(!cache.has("expiring_key").await);

    let stats = cache.stats().await;
    assert!(stats.evictions_ttl > 0);
}

#[tokio::test]
async fn test_storage_failures_degrade_to_network() {
    let store = Arc::new(MemoryStore::new());
    store.set_fail_reads(true);
    store.set_fail_writes(true);
    let cache = ResponseCache::new(CacheConfig::default(), store.clone());

    let client = ScriptedClient::new()
        .respond(200, json!({"login": "octocat"}))
        .respond(200, json!({"login": "octocat"}));

    for _ in 0..2 {
        let user: Value = cache
            .cached_fetch(&client, USER_URL, &RequestOptions::get(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(user["login"], "octocat");
    }

    assert_eq!(client.calls(), 2);
    assert!(store.is_empty().await);
    assert!(cache.stats().await.storage_errors > 0);
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    let writer = ResponseCache::new(CacheConfig::default(), Arc::new(FileStore::new(dir.path())));
    let client = ScriptedClient::new().respond(200, json!({"login": "octocat"}));
    let _: Value = writer
        .cached_fetch(&client, USER_URL, &RequestOptions::get(), Duration::from_secs(60))
        .await
        .unwrap();

    let reader = ResponseCache::new(CacheConfig::default(), Arc::new(FileStore::new(dir.path())));
    let offline = ScriptedClient::new();
    let user: Value = reader
        .cached_fetch(&offline, USER_URL, &RequestOptions::get(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(user["login"], "octocat");
    assert_eq!(offline.calls(), 0);

    reader.clear().await;
    assert!(!reader.has("GET https://api.github.com/users/octocat [anon]").await);
}
