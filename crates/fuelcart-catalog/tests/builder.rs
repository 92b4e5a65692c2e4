//! Integration tests for `AdminClient` and `CatalogBuilder` against a mock
//! Admin API.
//!
//! Each test stands up its own `wiremock` server under
//! `/admin/api/2025-10/`, so no real network traffic is made.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fuelcart_catalog::{
    write_catalog, AdminClient, AdminClientOptions, CatalogBuilder, CatalogError, VariantStrategy,
};
use fuelcart_core::{load_catalog, PackDefinition, PacksFile};

const PREFIX: &str = "/admin/api/2025-10";

fn options(max_retries: u32) -> AdminClientOptions {
    AdminClientOptions {
        timeout_secs: 5,
        user_agent: "fuelcart-test/0.1".to_string(),
        max_retries,
        backoff_base_secs: 0,
    }
}

fn test_client(server: &MockServer) -> AdminClient {
    AdminClient::with_base_url(&format!("{}{PREFIX}", server.uri()), "shpat_test", &options(0))
        .expect("failed to build test AdminClient")
}

fn pack(key: &str, handle: &str, option: &str, collection: Option<&str>) -> PackDefinition {
    PackDefinition {
        pack_key: key.to_string(),
        product_handle: handle.to_string(),
        pack_option: option.to_string(),
        collection_handle: collection.map(str::to_string),
    }
}

async fn mount_product(server: &MockServer, handle: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products.json")))
        .and(query_param("handle", handle))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn byob_product() -> serde_json::Value {
    json!({"products": [{
        "id": 7_134_322_196_677_u64,
        "handle": "build-your-own-bundle",
        "title": "Build Your Own Bundle",
        "variants": [{"id": 41_291_293_425_861_u64, "title": "Default Title"}]
    }]})
}

fn mix60_product() -> serde_json::Value {
    json!({"products": [{
        "id": 7_134_322_196_000_u64,
        "handle": "mix60-dual-carb-drink",
        "title": "MIX60",
        "variants": [
            {"id": 41_291_293_425_900_u64, "title": "6 pack", "option1": "6 pack"},
            {"id": 41_291_293_425_901_u64, "title": "12 pack", "option1": "12 pack"}
        ]
    }]})
}

// ---------------------------------------------------------------------------
// AdminClient
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_requests_carry_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products.json")))
        .and(query_param("handle", "build-your-own-bundle"))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(byob_product()))
        .expect(1)
        .mount(&server)
        .await;

    let product = test_client(&server)
        .product_by_handle("build-your-own-bundle")
        .await
        .unwrap()
        .expect("product should be found");
    assert_eq!(product.id, 7_134_322_196_677);
    assert_eq!(product.variants.len(), 1);
}

#[tokio::test]
async fn empty_product_list_is_none() {
    let server = MockServer::start().await;
    mount_product(&server, "missing", json!({"products": []})).await;

    let product = test_client(&server).product_by_handle("missing").await.unwrap();
    assert!(product.is_none());
}

#[tokio::test]
async fn unauthorized_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products.json")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"errors": "Invalid API key"})))
        .mount(&server)
        .await;

    let result = test_client(&server).product_by_handle("anything").await;
    assert!(
        matches!(result, Err(CatalogError::UnexpectedStatus { status: 401, .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn rate_limit_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/custom_collections.json")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2.0"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/custom_collections.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "custom_collections": [{"id": 281_234_567_890_u64, "handle": "byob-high-carb-bars"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AdminClient::with_base_url(
        &format!("{}{PREFIX}", server.uri()),
        "shpat_test",
        &options(3),
    )
    .unwrap();
    let collection = client
        .custom_collection_by_handle("byob-high-carb-bars")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(collection.id, 281_234_567_890);
}

#[tokio::test]
async fn rate_limit_surfaces_when_retries_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/collects.json")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "4"))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server).first_collect_for_product(1).await;
    assert!(
        matches!(result, Err(CatalogError::RateLimited { retry_after_secs: 4, .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/smart_collections.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server).smart_collection_by_handle("x").await;
    assert!(matches!(result, Err(CatalogError::Deserialize { .. })), "got {result:?}");
}

// ---------------------------------------------------------------------------
// CatalogBuilder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn builds_catalog_with_collection_fallbacks() {
    let server = MockServer::start().await;
    mount_product(&server, "build-your-own-bundle", byob_product()).await;

    // Fetched once even though two packs share the handle.
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products.json")))
        .and(query_param("handle", "mix60-dual-carb-drink"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mix60_product()))
        .expect(1)
        .mount(&server)
        .await;

    // Collection handle only exists as a smart collection; looked up once.
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/custom_collections.json")))
        .and(query_param("handle", "byob-energy-drink-powders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"custom_collections": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/smart_collections.json")))
        .and(query_param("handle", "byob-energy-drink-powders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "smart_collections": [{"id": 281_234_567_890_u64, "handle": "byob-energy-drink-powders"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // No collection handle: first collect for the product.
    mount_product(
        &server,
        "slt-plus",
        json!({"products": [{
            "id": 7_000_000_000_001_u64,
            "handle": "slt-plus",
            "variants": [{"id": 42_000_000_000_001_u64, "title": "Default Title", "sku": "SLTPLUS-30"}]
        }]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/collects.json")))
        .and(query_param("product_id", "7000000000001"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collects": [{"collection_id": 290_000_000_001_u64, "product_id": 7_000_000_000_001_u64}]
        })))
        .mount(&server)
        .await;

    mount_product(&server, "gone", json!({"products": []})).await;

    let packs = PacksFile {
        bundle_product_handle: "build-your-own-bundle".to_string(),
        packs: vec![
            pack("MIX60_6", "mix60-dual-carb-drink", "6 pack", Some("byob-energy-drink-powders")),
            pack("MIX60_12", "mix60-dual-carb-drink", "12 pack", Some("byob-energy-drink-powders")),
            pack("SLTPLUS_30", "slt-plus", "Box (30 servings)", None),
            pack("GEL30_6", "gone", "6 pack", None),
        ],
    };

    let client = test_client(&server);
    let report = CatalogBuilder::new(&client).build(&packs).await.unwrap();
    let catalog = &report.catalog;

    assert_eq!(catalog.bundle_product_id.resolved(), Some("7134322196677"));
    assert_eq!(catalog.bundle_variant_id.resolved(), Some("41291293425861"));
    assert!(catalog.bundle_selling_plan.is_sentinel());

    let mix12 = catalog.lookup("MIX60_12").unwrap();
    assert_eq!(mix12.variant_id.resolved(), Some("41291293425901"));
    assert_eq!(mix12.product_id.resolved(), Some("7134322196000"));
    assert_eq!(mix12.collection_id.resolved(), Some("281234567890"));

    let slt = catalog.lookup("SLTPLUS_30").unwrap();
    assert_eq!(slt.variant_id.resolved(), Some("42000000000001"));
    assert_eq!(slt.collection_id.resolved(), Some("290000000001"));

    assert!(!catalog.lookup("GEL30_6").unwrap().is_resolved());
    assert_eq!(report.unresolved_packs(), vec!["GEL30_6"]);
    assert_eq!(
        report.fallback_matches(),
        vec![("SLTPLUS_30", VariantStrategy::FirstVariant)]
    );
}

#[tokio::test]
async fn missing_collection_becomes_not_found() {
    let server = MockServer::start().await;
    mount_product(&server, "build-your-own-bundle", byob_product()).await;
    mount_product(&server, "mix60-dual-carb-drink", mix60_product()).await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/custom_collections.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"custom_collections": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/smart_collections.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"smart_collections": []})))
        .mount(&server)
        .await;

    let packs = PacksFile {
        bundle_product_handle: "build-your-own-bundle".to_string(),
        packs: vec![pack("MIX60_6", "mix60-dual-carb-drink", "6 pack", Some("no-such-collection"))],
    };
    let client = test_client(&server);
    let report = CatalogBuilder::new(&client).build(&packs).await.unwrap();

    let entry = report.catalog.lookup("MIX60_6").unwrap();
    assert_eq!(entry.variant_id.resolved(), Some("41291293425900"));
    assert!(entry.collection_id.is_sentinel());
    assert_eq!(entry.collection_id.as_raw(), "NOT_FOUND");
    assert_eq!(report.unresolved_packs(), vec!["MIX60_6"]);
}

#[tokio::test]
async fn missing_bundle_product_is_fatal() {
    let server = MockServer::start().await;
    mount_product(&server, "build-your-own-bundle", json!({"products": []})).await;

    let packs = PacksFile {
        bundle_product_handle: "build-your-own-bundle".to_string(),
        packs: vec![pack("MIX60_6", "mix60-dual-carb-drink", "6 pack", None)],
    };
    let client = test_client(&server);
    let result = CatalogBuilder::new(&client).build(&packs).await;
    assert!(
        matches!(result, Err(CatalogError::MissingBundleProduct { ref handle }) if handle == "build-your-own-bundle"),
        "got {result:?}"
    );
}

#[tokio::test]
async fn written_catalog_loads_back() {
    let server = MockServer::start().await;
    mount_product(&server, "build-your-own-bundle", byob_product()).await;
    mount_product(&server, "mix60-dual-carb-drink", mix60_product()).await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/custom_collections.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "custom_collections": [{"id": 281_234_567_890_u64}]
        })))
        .mount(&server)
        .await;

    let packs = PacksFile {
        bundle_product_handle: "build-your-own-bundle".to_string(),
        packs: vec![pack("MIX60_6", "mix60-dual-carb-drink", "6 pack", Some("byob-energy-drink-powders"))],
    };
    let client = test_client(&server);
    let report = CatalogBuilder::new(&client).build(&packs).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("catalog.yaml");
    let at = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
    write_catalog(&out, &report.catalog, "styrkr.myshopify.com", at).unwrap();

    let loaded = load_catalog(&out).unwrap();
    assert_eq!(loaded, report.catalog);
    let audit = loaded.audit();
    assert!(audit.parent_configured);
    assert!(!audit.selling_plan_configured);
    assert!(audit.unresolved_packs.is_empty());
}
