use bundledl_lib::catalog::CatalogClient;
use bundledl_lib::cli::{CatalogParams, DownloadParams};
use bundledl_lib::download::DownloadAndCheckOptions;
use bundledl_lib::filter::BundleFilter;
use bundledl_lib::format::FormatSelection;
use serde_json::{Map, Value, json};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::path::Path;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TEST_SESSION: &str = "test-session";
pub const ORDER_KEYS_PATH: &str = "/api/v1/user/order";
pub const ORDERS_PATH: &str = "/api/v1/orders";

pub fn sha1_hex(content: &[u8]) -> String {
    hex::encode(Sha1::digest(content))
}

/// A `download_struct` entry served from `server`.
pub fn variant_json(server: &MockServer, label: &str, content_path: &str, content: &[u8]) -> Value {
    json!({
        "name": label,
        "url": { "web": format!("{}{}", server.uri(), content_path) },
        "file_size": content.len(),
        "sha1": sha1_hex(content),
    })
}

pub fn subproduct_json(name: &str, url: &str, platform: &str, variants: Vec<Value>) -> Value {
    json!({
        "human_name": name,
        "url": url,
        "downloads": [{ "platform": platform, "download_struct": variants }],
    })
}

pub fn order_json(key: &str, name: &str, created: &str, subproducts: Vec<Value>) -> Value {
    json!({
        "gamekey": key,
        "created": created,
        "product": { "human_name": name },
        "subproducts": subproducts,
    })
}

/// Answers order-detail requests with the orders named in the `gamekeys` query.
pub struct OrdersResponder {
    orders: HashMap<String, Value>,
}

impl Respond for OrdersResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Map<String, Value> = request
            .url
            .query_pairs()
            .filter(|(name, _)| name == "gamekeys")
            .filter_map(|(_, key)| {
                self.orders
                    .get(key.as_ref())
                    .map(|order| (key.to_string(), order.clone()))
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(Value::Object(body))
    }
}

pub async fn mount_order_keys(server: &MockServer, keys: &[&str]) {
    let body: Vec<Value> = keys.iter().map(|key| json!({ "gamekey": key })).collect();
    Mock::given(method("GET"))
        .and(path(ORDER_KEYS_PATH))
        .and(header("cookie", format!("_simpleauth_sess={TEST_SESSION}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts the order-detail endpoint, expecting exactly `expected_requests` calls.
pub async fn mount_orders(server: &MockServer, orders: Vec<Value>, expected_requests: u64) {
    let orders = orders
        .into_iter()
        .map(|order| (order["gamekey"].as_str().unwrap_or_default().to_string(), order))
        .collect();

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .and(query_param("all_tpkds", "true"))
        .respond_with(OrdersResponder { orders })
        .expect(expected_requests)
        .mount(server)
        .await;
}

/// Serves `content` at `content_path`, expecting exactly `expected_requests` calls.
pub async fn mount_content(
    server: &MockServer,
    content_path: &str,
    content: &[u8],
    expected_requests: u64,
) {
    Mock::given(method("GET"))
        .and(path(content_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(expected_requests)
        .mount(server)
        .await;
}

pub fn catalog_params(server: &MockServer, keys: Option<Vec<String>>) -> CatalogParams {
    CatalogParams {
        client: CatalogClient::new(&server.uri(), TEST_SESSION)
            .expect("mock server URI is a valid base URL"),
        keys,
        filter: BundleFilter::default(),
    }
}

pub fn download_params(
    server: &MockServer,
    formats: &[&str],
    download_folder: &Path,
    options: DownloadAndCheckOptions,
) -> DownloadParams {
    DownloadParams {
        catalog: catalog_params(server, None),
        formats: FormatSelection::parse(formats).expect("test formats are valid"),
        download_folder: download_folder.to_path_buf(),
        options,
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("bundledl_lib=debug,bundledl_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
