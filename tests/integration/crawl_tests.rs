//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock shop servers and test the
//! fetch, feature, catalog and variant passes end-to-end.

use catalog_harvest::config::Config;
use catalog_harvest::correlate::{correlate, Query};
use catalog_harvest::crawler::{
    build_http_client, harvest, merge_crops, CatalogCrawler, CropSource, FeatureCrawler,
    FeatureLink, FetchOutcome, Fetcher, PageLayout, RetryPolicy, VariantExpander,
};
use catalog_harvest::input::{load_local, save_local};
use catalog_harvest::output::{CsvSink, OutputSink};
use catalog_harvest::HarvestError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.fetch.attempts = 3;
    config.fetch.wait_seconds = 0.05; // Very short for testing
    config.fetch.feature_batch_size = 3;
    config.fetch.timeout_seconds = 5;
    config
}

fn create_fetcher(config: &Config) -> Fetcher {
    let client = build_http_client(&config.site, &config.fetch).expect("Failed to build client");
    Fetcher::new(client, RetryPolicy::from_config(&config.fetch))
}

fn create_layout(config: &Config) -> Arc<PageLayout> {
    Arc::new(PageLayout::from_config(config).expect("Default layout should compile"))
}

fn card(name: &str, href: &str, price: &str) -> String {
    format!(
        r#"<div class="productitem">
             <h2 class="productitem--title"><a href="{}">{}</a></h2>
             <div class="price--main">{}</div>
             <div class="price--main">{}</div>
           </div>"#,
        href, name, price, price
    )
}

fn pagination(controls: &[(&str, &str)]) -> String {
    controls
        .iter()
        .map(|(label, href)| format!(r#"<a class="pagination--item" href="{}">{}</a>"#, href, label))
        .collect::<Vec<_>>()
        .join("\n")
}

fn catalog_page(cards: &[String], controls: &[(&str, &str)]) -> String {
    format!(
        r#"<html><body>
           <ul>
             <li class="filter-item" data-handle="indoor-plants">
               <a href="/collections/all/indoor-plants">Indoor Plants</a>
             </li>
             <li class="filter-item" data-handle="succulents">
               <a href="/collections/all/succulents">Succulents</a>
             </li>
           </ul>
           <div id="shopify-section-static-collection">{}</div>
           <nav>{}</nav>
           </body></html>"#,
        cards.join("\n"),
        pagination(controls)
    )
}

fn feature_page(names: &[&str], controls: &[(&str, &str)]) -> String {
    let items = names
        .iter()
        .map(|name| {
            format!(
                r#"<li class="productgrid--item">
                     <h2 class="productitem--title"><a href="/products/x">{}</a></h2>
                   </li>"#,
                name
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<html><body><ul>{}</ul><nav>{}</nav></body></html>",
        items,
        pagination(controls)
    )
}

fn detail_page(axis: &str, entries: &[&str]) -> String {
    format!(
        r#"<html><body><div id="shopify-section-static-product">
           <div class="option-name">{}</div>
           <select name="id">
           <option>Choose an option</option>
           <option>---</option>
           {}
           </select>
           </div></body></html>"#,
        axis,
        entries
            .iter()
            .map(|entry| format!("<option>{}</option>", entry))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

async fn mount_page(
    server: &MockServer,
    route: &str,
    page: Option<&str>,
    status: u16,
    body: String,
) {
    let mut mock = Mock::given(method("GET")).and(path(route));
    if let Some(page) = page {
        mock = mock.and(query_param("page", page));
    }
    mock.respond_with(
        ResponseTemplate::new(status)
            .set_body_string(body)
            .insert_header("content-type", "text/html"),
    )
    .mount(server)
    .await;
}

#[tokio::test]
async fn test_full_harvest() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    // Catalog page 1: one priced card, two multi-option cards
    mount_page(
        &mock_server,
        "/collections/all",
        Some("1"),
        200,
        catalog_page(
            &[
                card("Fern", "/products/fern", "$15.00"),
                card("Monstera", "/products/monstera", "2 options"),
                card("Pothos", "/products/pothos", "4 options"),
            ],
            &[("1", "?page=1"), ("2", "?page=2"), ("Next", "/collections/all?page=2")],
        ),
    )
    .await;

    // Catalog page 2: last page, with a sold-out card without a price
    mount_page(
        &mock_server,
        "/collections/all",
        Some("2"),
        200,
        catalog_page(
            &[
                card("Cactus", "/products/cactus", "$12.00"),
                r#"<div class="productitem">
                     <h2 class="productitem--title"><a href="/products/snake">Snake Plant</a></h2>
                     <div class="price--main"></div>
                     <span>Sold out</span>
                   </div>"#
                    .to_string(),
            ],
            &[("1", "?page=1"), ("2", "?page=2")],
        ),
    )
    .await;

    // Feature listings: indoor-plants spans two pages, succulents is down
    mount_page(
        &mock_server,
        "/collections/all/indoor-plants",
        Some("1"),
        200,
        feature_page(
            &["Fern", "Monstera"],
            &[("1", "?page=1"), ("2", "?page=2"), ("Next", "?page=2")],
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/collections/all/indoor-plants",
        Some("2"),
        200,
        feature_page(&["Cactus"], &[("1", "?page=1"), ("2", "?page=2")]),
    )
    .await;
    mount_page(
        &mock_server,
        "/collections/all/succulents",
        None,
        500,
        String::new(),
    )
    .await;

    // Detail pages: Monstera has two variants, Pothos is unavailable
    mount_page(
        &mock_server,
        "/products/monstera",
        None,
        200,
        detail_page("Size: Small", &["Small - $30.00", "Large - sold_out"]),
    )
    .await;
    mount_page(&mock_server, "/products/pothos", None, 404, String::new()).await;

    let harvest = harvest(&config).await.expect("Harvest should succeed");

    // Features
    assert_eq!(harvest.features.len(), 2);
    assert_eq!(
        harvest.features.get(0).map(|f| f.name.as_str()),
        Some("indoor-plants")
    );
    assert_eq!(harvest.features.get(1).map(|f| f.name.as_str()), Some("succulents"));
    let indoor: Vec<&str> = harvest
        .links
        .iter()
        .filter(|link| link.feature_id == 0)
        .map(|link| link.product_name.as_str())
        .collect();
    assert_eq!(indoor, vec!["Fern", "Monstera", "Cactus"]);
    assert!(harvest.links.iter().all(|link| link.feature_id == 0));

    // Products
    let names: Vec<String> = harvest.products.iter().map(|p| p.full_name()).collect();
    assert_eq!(
        names,
        vec![
            "Fern",
            "Monstera Size Small",
            "Monstera Size Large",
            "Cactus",
            "Snake Plant"
        ]
    );
    let snake = &harvest.products.rows()[4];
    assert_eq!(snake.price, None);
    assert!(snake.is_sold_out);

    // Report
    assert_eq!(harvest.report.features_found, 2);
    assert_eq!(harvest.report.features_unavailable, 1);
    assert_eq!(harvest.report.catalog_pages, 2);
    assert_eq!(harvest.report.products_disregarded, 1);
    assert_eq!(harvest.report.product_rows, 5);
    assert!(!harvest.report.is_complete());

    // Correlation over the crawled tables
    let result = correlate(
        &harvest.features,
        &harvest.links,
        &harvest.products,
        &Query::new().with_feature("indoor").with_sold_out(Some(false)),
    );
    let matched: Vec<String> = result.products.iter().map(|p| p.full_name()).collect();
    assert_eq!(matched, vec!["Cactus", "Fern", "Monstera Size Small"]);
}

#[tokio::test]
async fn test_retry_makes_exactly_n_attempts() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let fetcher = create_fetcher(&config);

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/flaky", mock_server.uri())).unwrap();
    let policy = RetryPolicy::new(4, Duration::from_millis(100));

    let started = Instant::now();
    let outcome = fetcher.fetch_with(&url, policy).await;
    let elapsed = started.elapsed();

    assert!(!outcome.is_ok());
    assert_eq!(outcome.attempts(), 4);
    // Three waits between four attempts
    assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_retry_recovers_after_failures() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let fetcher = create_fetcher(&config);

    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/recovering", mock_server.uri())).unwrap();

    match fetcher.fetch(&url).await {
        FetchOutcome::Fetched { body, attempts } => {
            assert_eq!(body, "ok");
            assert_eq!(attempts, 3);
        }
        other => panic!("Expected a successful fetch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_each_catalog_page_fetched_once() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let crawler = CatalogCrawler::new(create_fetcher(&config), create_layout(&config));

    // Page 2 points back at page 1
    Mock::given(method("GET"))
        .and(path("/collections/all"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page(
            &[card("Fern", "/products/fern", "$15.00")],
            &[("1", "?page=1"), ("Next", "?page=2")],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/all"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page(
            &[card("Ivy", "/products/ivy", "$5.00")],
            &[("2", "?page=2"), ("Next", "?page=1")],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let start = Url::parse(&format!("{}/collections/all?page=1", mock_server.uri())).unwrap();
    let crawl = crawler.crawl(&start).await;

    assert_eq!(crawl.pages_fetched, 2);
    assert_eq!(crawl.products.len(), 2);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_catalog_stops_on_unavailable_page() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let crawler = CatalogCrawler::new(create_fetcher(&config), create_layout(&config));

    mount_page(
        &mock_server,
        "/collections/all",
        Some("1"),
        200,
        catalog_page(
            &[card("Fern", "/products/fern", "$15.00")],
            &[("1", "?page=1"), ("Next", "?page=2")],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/collections/all"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&mock_server)
        .await;

    let start = Url::parse(&format!("{}/collections/all?page=1", mock_server.uri())).unwrap();
    let crawl = crawler.crawl(&start).await;

    // Rows gathered before the failure are kept
    assert_eq!(crawl.pages_fetched, 1);
    assert_eq!(crawl.products.len(), 1);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_variant_expansion_row_count() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let expander = VariantExpander::new(create_fetcher(&config), create_layout(&config));

    mount_page(
        &mock_server,
        "/products/calathea",
        None,
        200,
        detail_page(
            "Size",
            &["Small - $8.00", "Medium - $12.50", "Large - sold_out", ""],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/products/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let found = Url::parse(&format!("{}/products/calathea", mock_server.uri())).unwrap();
    let rows = expander
        .expand("Calathea", &found)
        .await
        .expect("Detail page should be fetched");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.name == "Calathea" && row.option_type == "Size"));
    assert_eq!(rows[1].option, "Medium");
    assert_eq!(rows[1].price, Some(12.5));
    assert!(rows[2].is_sold_out);

    let gone = Url::parse(&format!("{}/products/gone", mock_server.uri())).unwrap();
    assert!(expander.expand("Gone", &gone).await.is_none());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_feature_batch_keeps_results_by_index() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let crawler = FeatureCrawler::new(
        create_fetcher(&config),
        create_layout(&config),
        config.fetch.feature_batch_size,
    );

    // Earlier features answer slower, so the batch completes out of order
    let mut features = Vec::new();
    for i in 0..7u64 {
        let route = format!("/collections/all/feature-{}", i);
        let product = format!("Product {}", i);
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(feature_page(&[product.as_str()], &[]))
                    .set_delay(Duration::from_millis(20 * (7 - i))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        features.push(FeatureLink {
            name: format!("feature-{}", i),
            url: Url::parse(&format!("{}{}?page=1", mock_server.uri(), route)).unwrap(),
        });
    }

    let crawl = crawler.crawl(&features).await;

    assert_eq!(crawl.features.len(), 7);
    assert_eq!(crawl.unavailable, 0);
    assert_eq!(crawl.links.len(), 7);
    for link in &crawl.links {
        let feature = crawl.features.get(link.feature_id).unwrap();
        let index = feature.name.trim_start_matches("feature-");
        assert_eq!(link.product_name, format!("Product {}", index));
        assert_eq!(link.feature_id.to_string(), index);
    }

    mock_server.verify().await;
}

#[tokio::test]
async fn test_feature_page_failure_skips_only_that_page() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let crawler = FeatureCrawler::new(create_fetcher(&config), create_layout(&config), 2);

    mount_page(
        &mock_server,
        "/collections/all/ferns",
        Some("1"),
        200,
        feature_page(
            &["Boston Fern", "Bird's Nest Fern"],
            &[("1", "?page=1"), ("2", "?page=2"), ("3", "?page=3"), ("Next", "?page=2")],
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/collections/all/ferns",
        Some("2"),
        503,
        String::new(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/collections/all/ferns"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(feature_page(&["Staghorn Fern"], &[])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let features = vec![FeatureLink {
        name: "ferns".to_string(),
        url: Url::parse(&format!("{}/collections/all/ferns?page=1", mock_server.uri())).unwrap(),
    }];
    let crawl = crawler.crawl(&features).await;

    let names: Vec<&str> = crawl.links.iter().map(|l| l.product_name.as_str()).collect();
    assert_eq!(names, vec!["Boston Fern", "Bird's Nest Fern", "Staghorn Fern"]);
    assert_eq!(crawl.unavailable, 0);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_snapshot_keeps_unfiltered_tables() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    mount_page(
        &mock_server,
        "/collections/all",
        Some("1"),
        200,
        catalog_page(
            &[
                card("Fern", "/products/fern", "$15.00"),
                card("Cactus", "/products/cactus", "$12.00"),
            ],
            &[],
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/collections/all/indoor-plants",
        Some("1"),
        200,
        feature_page(&["Fern", "Cactus"], &[]),
    )
    .await;
    mount_page(
        &mock_server,
        "/collections/all/succulents",
        Some("1"),
        200,
        feature_page(&["Cactus"], &[]),
    )
    .await;

    let harvest = harvest(&config).await.expect("Harvest should succeed");
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("snapshot");
    let output = dir.path().join("out");

    save_local(&snapshot, &harvest.features, &harvest.links, &harvest.products).unwrap();

    // A filtered CSV export goes elsewhere and leaves the snapshot whole
    let result = correlate(
        &harvest.features,
        &harvest.links,
        &harvest.products,
        &Query::new().with_product("fern"),
    );
    CsvSink::new(&output).write(&result).unwrap();

    let tables = load_local(&snapshot).unwrap();
    assert_eq!(tables.features.len(), 2);
    assert_eq!(tables.links, harvest.links);
    assert_eq!(tables.links.len(), 3);
    assert_eq!(tables.products.rows(), harvest.products.rows());

    let exported = load_local(&output).unwrap();
    assert_eq!(exported.products.len(), 1);
    assert_eq!(exported.links.len(), 1);
}

#[tokio::test]
async fn test_crop_enrichment() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri());
    config.api.crops_url = format!("{}/api/v1/crops", mock_server.uri());

    // First attempt fails, the retry budget covers it
    Mock::given(method("GET"))
        .and(path("/api/v1/crops"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/crops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"id": "1", "type": "crops", "attributes": {"name": "maize", "perennial": false}},
                {"id": "2", "type": "crops", "attributes": {"name": "rhubarb", "perennial": true}}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = CropSource::new(&config).expect("Crop source should build");
    let crops = source.fetch().await.expect("Crops should be fetched");
    assert_eq!(crops.len(), 2);

    let mut features = catalog_harvest::FeatureTable::new();
    let mut links = Vec::new();
    let mut products = catalog_harvest::ProductTable::new();
    let added = merge_crops(&crops, &config.api, &mut features, &mut links, &mut products);
    assert_eq!(added, 2);

    let result = correlate(
        &features,
        &links,
        &products,
        &Query::new().with_feature("perennial"),
    );
    let names: Vec<&str> = result.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["rhubarb"]);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_crop_source_unavailable() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri());
    config.api.crops_url = format!("{}/api/v1/crops", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/crops"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = CropSource::new(&config).unwrap().fetch().await;

    assert!(matches!(result, Err(HarvestError::Unavailable { .. })));
    mock_server.verify().await;
}
