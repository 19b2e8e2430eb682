use bundledl_e2e_tests::{
    ORDER_KEYS_PATH, ORDERS_PATH, catalog_params, init_tracing, mount_order_keys, mount_orders,
    order_json, subproduct_json,
};
use bundledl_lib::BundleDlError;
use bundledl_lib::catalog::ORDER_DETAIL_BATCH_SIZE;
use bundledl_lib::cli::fetch_bundles;
use bundledl_lib::filter::SortKey;
use serde_json::json;
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ebook_order(key: &str, name: &str, created: &str) -> serde_json::Value {
    order_json(
        key,
        name,
        created,
        vec![subproduct_json(
            &format!("{name} Book"),
            "https://publisher.example/book",
            "ebook",
            vec![json!({ "name": "EPUB", "url": { "web": "https://dl.example/book.epub" } })],
        )],
    )
}

#[tokio::test]
async fn test_detail_requests_are_batched() {
    init_tracing();
    let server = MockServer::start().await;

    let keys: Vec<String> = (0..85).map(|i| format!("key{i:03}")).collect();
    // Repeated keys must not produce extra bundles.
    let mut listed: Vec<&str> = keys.iter().map(String::as_str).collect();
    listed.extend(["key000", "key001"]);
    mount_order_keys(&server, &listed).await;

    let orders = keys
        .iter()
        .map(|key| ebook_order(key, &format!("Bundle {key}"), "2020-01-01T00:00:00"))
        .collect();
    mount_orders(&server, orders, 3).await;

    let bundles = server_catalog(&server, None).await.expect("catalog fetch should succeed");

    assert_eq!(bundles.len(), keys.len(), "every key should yield one bundle");
    let unique: HashSet<&str> = bundles.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(unique.len(), keys.len(), "bundles should not repeat");

    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    for request in requests.iter().filter(|r| r.url.path() == ORDERS_PATH) {
        let batch = request
            .url
            .query_pairs()
            .filter(|(name, _)| name == "gamekeys")
            .count();
        assert!(
            batch <= ORDER_DETAIL_BATCH_SIZE,
            "detail request carried {batch} keys"
        );
    }
}

#[tokio::test]
async fn test_unknown_key_fails_before_detail_fetch() {
    init_tracing();
    let server = MockServer::start().await;

    mount_order_keys(&server, &["known"]).await;
    mount_orders(&server, vec![ebook_order("known", "Known", "2020-01-01")], 0).await;

    let result = server_catalog(&server, Some(vec!["known".into(), "missing".into()])).await;

    match result {
        Err(BundleDlError::Validation { details }) => {
            assert_eq!(details, "Purchase keys not found in account: missing");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_key_subset_fetches_only_requested_orders() {
    init_tracing();
    let server = MockServer::start().await;

    mount_order_keys(&server, &["a", "b", "c"]).await;
    mount_orders(
        &server,
        vec![
            ebook_order("a", "Alpha", "2020-01-01"),
            ebook_order("b", "Beta", "2020-01-02"),
            ebook_order("c", "Gamma", "2020-01-03"),
        ],
        1,
    )
    .await;

    let bundles = server_catalog(&server, Some(vec!["b".into()]))
        .await
        .expect("catalog fetch should succeed");

    assert_eq!(bundles.len(), 1);
    assert_eq!(bundles[0].key, "b");
    assert_eq!(bundles[0].name, "Beta");
}

#[tokio::test]
async fn test_catalog_status_error_is_reported() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ORDER_KEYS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_orders(&server, vec![], 0).await;

    match server_catalog(&server, None).await {
        Err(BundleDlError::Fetch { url, status }) => {
            assert_eq!(status, 401);
            assert!(url.ends_with(ORDER_KEYS_PATH), "unexpected url: {url}");
        }
        other => panic!("expected a fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_detail_batch_aborts_fetch() {
    init_tracing();
    let server = MockServer::start().await;

    mount_order_keys(&server, &["a"]).await;
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = server_catalog(&server, None).await;
    assert!(
        matches!(result, Err(BundleDlError::Fetch { status: 503, .. })),
        "expected a 503 fetch error, got {result:?}"
    );
}

#[tokio::test]
async fn test_filter_and_sort_applied_to_fetched_bundles() {
    init_tracing();
    let server = MockServer::start().await;

    mount_order_keys(&server, &["old", "new", "other"]).await;
    mount_orders(
        &server,
        vec![
            ebook_order("old", "Python Classics", "2019-05-01T10:00:00"),
            ebook_order("new", "Python Cookbook Bundle", "2023-02-11T10:00:00"),
            ebook_order("other", "Rust Essentials", "2021-07-07T10:00:00"),
        ],
        2,
    )
    .await;

    let mut params = catalog_params(&server, None);
    params.filter.name_contains = Some("python".to_string());
    params.filter.sort_by = SortKey::Date;

    let bundles = fetch_bundles(&params).await.expect("fetch should succeed");
    let keys: Vec<&str> = bundles.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["new", "old"], "newest matching bundle first");

    params.filter.name_contains = None;
    params.filter.sort_by = SortKey::Name;
    let bundles = fetch_bundles(&params).await.expect("fetch should succeed");
    let names: Vec<&str> = bundles.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Python Classics", "Python Cookbook Bundle", "Rust Essentials"]
    );
}

async fn server_catalog(
    server: &MockServer,
    keys: Option<Vec<String>>,
) -> Result<Vec<bundledl_lib::catalog::Bundle>, BundleDlError> {
    let params = catalog_params(server, keys);
    params.client.fetch_catalog(params.keys.as_deref()).await
}
