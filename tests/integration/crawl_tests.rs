//! Integration tests for the crawler
//!
//! These tests use wiremock to serve catalog, detail and image feeds and
//! drive workers and the orchestrator against a temporary database.

use catalog_mirror::config::{load_config, FeedConfig};
use catalog_mirror::crawler::{CrawlContext, CrawlWorker, Orchestrator};
use catalog_mirror::feed::FeedClient;
use catalog_mirror::state::SiteState;
use catalog_mirror::storage::{CatalogStore, Site, SqliteConnector, SqliteStorage};
use catalog_mirror::{Cancelled, ConfigError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG_PATH: &str = "/catalog.php";
const DETAIL_PATH: &str = "/detail.php";

fn create_test_context() -> CrawlContext {
    let config = FeedConfig {
        scheme: "http".to_string(),
        catalog_path: CATALOG_PATH.to_string(),
        detail_path: DETAIL_PATH.to_string(),
        accept_invalid_certs: false,
    };
    let feeds = FeedClient::new(reqwest::Client::new(), &config);
    CrawlContext::new(feeds, Duration::from_millis(1))
}

/// Host and port the mock server answers on, used as the site name
fn site_name(server: &MockServer) -> String {
    server.address().to_string()
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("catalog.db")
}

fn base_path(dir: &TempDir) -> String {
    dir.path().join("images").display().to_string()
}

async fn run_worker(site: &str, db: &Path, base: &str) -> catalog_mirror::SiteReport {
    let store = SqliteStorage::new(db).unwrap();
    CrawlWorker::new(site, create_test_context(), store, base, CancellationToken::new())
        .run()
        .await
        .unwrap()
}

async fn mount_catalog(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, code: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("code", code))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn single_product_catalog() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8"?>
<root timestamp="1000">
  <products>
    <product>
      <code>7</code>
      <name>Boots</name>
      <avalible>true</avalible>
      <price>100</price>
      <price_old>120</price_old>
      <currency>RUB</currency>
    </product>
  </products>
</root>"#
}

#[tokio::test]
async fn test_end_to_end_single_product_without_detail() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(&server, single_product_catalog()).await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;

    assert_eq!(report.state, SiteState::Done);
    assert_eq!(report.entries, 1);
    assert_eq!(report.stored, 1);
    assert_eq!(report.details_missing, 1);
    assert_eq!(report.variants, 0);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product = storage.get_product("7").unwrap().unwrap();
    assert!(product.available);
    assert_eq!(product.price, 100);
    assert_eq!(product.price_old, 120);
    assert_eq!(product.time_xml, Some(1000));
    assert_eq!(product.site, site);
    assert_eq!(product.currency.as_deref(), Some("RUB"));
    assert_eq!(product.path_img_small, "");
    assert_eq!(product.path_img_large, "");
    assert!(storage.get_variants("7").unwrap().is_empty());
}

#[tokio::test]
async fn test_second_run_skips_stored_products() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(
        &server,
        r#"<root timestamp="1000"><products>
             <product><code>7</code><avalible>true</avalible><price>100</price>
               <price_old>120</price_old><img_small>img/a.jpg</img_small></product>
           </products></root>"#,
    )
    .await;
    // Each of these may only be hit by the first run
    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("code", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<root><products><product><code>7</code><avalible>true</avalible>
                 <price>100</price><price_old>120</price_old></product></products></root>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let first = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(first.stored, 1);
    assert_eq!(first.variants, 1);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product_before = storage.get_product("7").unwrap().unwrap();
    let variants_before = storage.get_variants("7").unwrap();
    drop(storage);

    let second = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(second.state, SiteState::Done);
    assert_eq!(second.skipped, 1);
    assert_eq!(second.stored, 0);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    assert_eq!(storage.get_product("7").unwrap().unwrap(), product_before);
    assert_eq!(storage.get_variants("7").unwrap(), variants_before);
    assert_eq!(storage.count_by_site().unwrap(), vec![(site, 1, 1)]);

    server.verify().await;
}

#[tokio::test]
async fn test_images_are_mirrored_under_site_directory() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);
    let base = base_path(&dir);

    mount_catalog(
        &server,
        r#"<root timestamp="5"><products>
             <product><code>11</code><avalible>true</avalible><price>10</price>
               <price_old>0</price_old>
               <img_small>img/small/11.jpg</img_small>
               <img_large>/img/large/11.jpg</img_large></product>
           </products></root>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/small/11.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"small".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/large/11.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"large".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = run_worker(&site, &db_path(&dir), &base).await;
    assert_eq!(report.stored, 1);

    let small = format!("{}/{}/img/small/11.jpg", base, site);
    let large = format!("{}/{}/img/large/11.jpg", base, site);
    assert_eq!(std::fs::read(&small).unwrap(), b"small");
    assert_eq!(std::fs::read(&large).unwrap(), b"large");

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product = storage.get_product("11").unwrap().unwrap();
    assert_eq!(product.path_img_small, small);
    assert_eq!(product.path_img_large, large);
    assert_eq!(product.img_small.as_deref(), Some("img/small/11.jpg"));
}

#[tokio::test]
async fn test_missing_image_still_stores_product() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(
        &server,
        r#"<root timestamp="5"><products>
             <product><code>12</code><avalible>false</avalible><price>10</price>
               <price_old>0</price_old><img_small>/img/gone.jpg</img_small></product>
           </products></root>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.state, SiteState::Done);
    assert_eq!(report.stored, 1);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product = storage.get_product("12").unwrap().unwrap();
    assert!(!product.available);
    assert_eq!(product.path_img_small, "");
}

#[tokio::test]
async fn test_variant_price_fallback_from_detail_feed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(&server, single_product_catalog()).await;
    mount_detail(
        &server,
        "7",
        r#"<root><products><product>
             <code>7</code><name>Boots</name><avalible>true</avalible>
             <price>100</price><price_old>120</price_old>
             <params>
               <param name="S" avalible="true" price="90" price_old="0"/>
               <param name="M" avalible="false" price="" />
               <param name="L" avalible="true" price="95" price_old="150"/>
             </params>
           </product></products></root>"#,
    )
    .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.variants, 3);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let variants = storage.get_variants("7").unwrap();
    let by_name = |name: &str| {
        variants
            .iter()
            .find(|v| v.param_name.as_deref() == Some(name))
            .unwrap()
            .clone()
    };

    let small = by_name("S");
    assert_eq!(small.param_price, 90);
    assert_eq!(small.param_price_old, 120);
    assert_eq!(small.param_available, Some(true));

    let medium = by_name("M");
    assert_eq!(medium.param_price, 100);
    assert_eq!(medium.param_price_old, 120);
    assert_eq!(medium.param_available, Some(false));

    let large = by_name("L");
    assert_eq!(large.param_price_old, 150);
    assert_eq!(large.price, 100);
    assert_eq!(large.time_xml, Some(1000));
}

#[tokio::test]
async fn test_detail_without_params_yields_base_row() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(&server, single_product_catalog()).await;
    // The detail omits its code; the catalog's is used
    mount_detail(
        &server,
        "7",
        r#"<root><products><product>
             <name>Boots</name><avalible>true</avalible>
             <price>100</price><price_old>120</price_old>
           </product></products></root>"#,
    )
    .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.variants, 1);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let variants = storage.get_variants("7").unwrap();
    assert_eq!(variants.len(), 1);

    let base = &variants[0];
    assert_eq!(base.param_name, None);
    assert_eq!(base.param_available, Some(true));
    assert_eq!(base.param_price, 100);
    assert_eq!(base.param_price_old, 120);
    assert_eq!(base.price, 100);
    assert_eq!(base.price_old, 120);
}

#[tokio::test]
async fn test_flat_catalog_and_entries_without_code() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(
        &server,
        r#"<root>
             <product><code>1</code><avalible>true</avalible><price>5</price><price_old>5</price_old></product>
             <product><name>No code</name></product>
             <product><code>2</code><avalible>maybe</avalible><price>n/a</price><price_old>9.5</price_old></product>
           </root>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<root/>"))
        .mount(&server)
        .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.entries, 3);
    assert_eq!(report.missing_code, 1);
    assert_eq!(report.stored, 2);
    assert_eq!(report.details_missing, 2);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let second = storage.get_product("2").unwrap().unwrap();
    assert!(!second.available);
    assert_eq!(second.price, 0);
    assert_eq!(second.price_old, 9);
    assert_eq!(second.time_xml, None);
}

#[tokio::test]
async fn test_empty_catalog_fails_site() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(&server, r#"<root timestamp="1"/>"#).await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.state, SiteState::Failed);
    assert_eq!(report.entries, 0);
    assert_eq!(report.stored, 0);
    assert!(report.error.unwrap().contains("empty product list"));

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    assert!(storage.count_by_site().unwrap().is_empty());

    server.verify().await;
}

#[tokio::test]
async fn test_detail_without_product_level_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(&server, single_product_catalog()).await;
    mount_detail(&server, "7", "<root><products/></root>").await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.state, SiteState::Done);
    assert_eq!(report.stored, 1);
    assert_eq!(report.details_missing, 1);
    assert_eq!(report.variants, 0);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    assert!(storage.get_product("7").unwrap().is_some());
    assert!(storage.get_variants("7").unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_small_image_keeps_large() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);
    let base = base_path(&dir);

    mount_catalog(
        &server,
        r#"<root timestamp="5"><products>
             <product><code>13</code><avalible>true</avalible><price>10</price>
               <price_old>0</price_old>
               <img_small>/img/small/13.jpg</img_small>
               <img_large>/img/large/13.jpg</img_large></product>
           </products></root>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/small/13.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/large/13.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"large".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = run_worker(&site, &db_path(&dir), &base).await;
    assert_eq!(report.stored, 1);
    assert_eq!(report.images_failed, 0);

    let large = format!("{}/{}/img/large/13.jpg", base, site);
    assert_eq!(std::fs::read(&large).unwrap(), b"large");
    assert!(!Path::new(&format!("{}/{}/img/small/13.jpg", base, site)).exists());

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product = storage.get_product("13").unwrap().unwrap();
    assert_eq!(product.path_img_small, "");
    assert_eq!(product.path_img_large, large);
}

/// Serves the catalog, answers detail requests with 404 and closes the
/// connection on anything else without replying
async fn spawn_hangup_server(catalog: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let detail_requests = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&detail_requests);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let target = request.split_whitespace().nth(1).unwrap_or("").to_string();

            let reply = if target.starts_with(CATALOG_PATH) {
                Some(("200 OK", catalog))
            } else if target.starts_with(DETAIL_PATH) {
                seen.fetch_add(1, Ordering::SeqCst);
                Some(("404 Not Found", ""))
            } else {
                None
            };

            if let Some((status, body)) = reply {
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        }
    });

    (address, detail_requests)
}

#[tokio::test]
async fn test_image_transport_failure_still_stores_product() {
    let dir = TempDir::new().unwrap();
    let (site, detail_requests) = spawn_hangup_server(
        r#"<root timestamp="5"><products>
             <product><code>14</code><avalible>true</avalible><price>10</price>
               <price_old>12</price_old>
               <img_small>/img/small/14.jpg</img_small>
               <img_large>/img/large/14.jpg</img_large></product>
           </products></root>"#,
    )
    .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.state, SiteState::Done);
    assert_eq!(report.images_failed, 1);
    assert_eq!(report.stored, 1);
    assert_eq!(report.details_missing, 1);
    assert_eq!(detail_requests.load(Ordering::SeqCst), 1);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product = storage.get_product("14").unwrap().unwrap();
    assert_eq!(product.path_img_small, "");
    assert_eq!(product.path_img_large, "");
    assert_eq!(product.price_old, 12);
}

#[tokio::test]
async fn test_windows_1251_catalog_is_decoded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    let mut body =
        b"<?xml version=\"1.0\" encoding=\"windows-1251\"?><root timestamp=\"2\"><products><product><code>21</code><name>".to_vec();
    // "Сапоги" in windows-1251
    body.extend_from_slice(&[0xD1, 0xE0, 0xEF, 0xEE, 0xE3, 0xE8]);
    body.extend_from_slice(b"</name><avalible>true</avalible><price>1</price></product></products></root>");

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = run_worker(&site, &db_path(&dir), &base_path(&dir)).await;
    assert_eq!(report.stored, 1);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product = storage.get_product("21").unwrap().unwrap();
    assert_eq!(product.name.as_deref(), Some("Сапоги"));
}

#[tokio::test]
async fn test_failing_site_does_not_affect_others() {
    let dir = TempDir::new().unwrap();
    let healthy_b = MockServer::start().await;
    let healthy_c = MockServer::start().await;

    for (server, code) in [(&healthy_b, "b1"), (&healthy_c, "c1")] {
        mount_catalog(
            server,
            &format!(
                r#"<root timestamp="1"><products><product><code>{}</code>
                     <avalible>true</avalible><price>1</price><price_old>1</price_old>
                   </product></products></root>"#,
                code
            ),
        )
        .await;
        mount_detail(
            server,
            code,
            &format!(
                r#"<root><products><product><code>{}</code><avalible>true</avalible>
                     <price>1</price><price_old>1</price_old></product></products></root>"#,
                code
            ),
        )
        .await;
    }

    // Nothing listens on port 1, so this site's catalog pull fails
    let broken = "127.0.0.1:1".to_string();
    let sites = vec![
        Site::named(broken.clone()),
        Site::named(site_name(&healthy_b)),
        Site::named(site_name(&healthy_c)),
    ];

    let orchestrator = Orchestrator::new(
        SqliteConnector::new(db_path(&dir), None),
        create_test_context(),
        CancellationToken::new(),
    );
    let summary = orchestrator.run(sites, &base_path(&dir), 2).await.unwrap();

    assert_eq!(summary.reports.len(), 3);
    assert_eq!(summary.completed(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.report(&broken).unwrap().state, SiteState::Failed);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    assert!(storage.get_product("b1").unwrap().is_some());
    assert!(storage.get_product("c1").unwrap().is_some());
    assert_eq!(storage.get_variants("c1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancellation_interrupts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(single_product_catalog())
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(
        SqliteConnector::new(db_path(&dir), None),
        create_test_context(),
        CancellationToken::new(),
    );
    let token = orchestrator.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.run(vec![Site::named(site_name(&server))], &base_path(&dir), 1),
    )
    .await
    .expect("cancellation should end the run promptly");

    assert_eq!(result, Err(Cancelled));

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    assert!(storage.get_product("7").unwrap().is_none());
}

#[tokio::test]
async fn test_run_all_crawls_registered_sites() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = site_name(&server);

    mount_catalog(&server, single_product_catalog()).await;
    mount_detail(
        &server,
        "7",
        r#"<root><products><product><code>7</code><avalible>true</avalible>
             <price>100</price><price_old>120</price_old></product></products></root>"#,
    )
    .await;

    let mut storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    storage.insert_site(&site, Some(1)).unwrap();
    drop(storage);

    let orchestrator = Orchestrator::new(
        SqliteConnector::new(db_path(&dir), Some("nightly".to_string())),
        create_test_context(),
        CancellationToken::new(),
    );
    let summary = orchestrator.run_all(&base_path(&dir), 4).await.unwrap();

    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.stored(), 1);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    let product = storage.get_product("7").unwrap().unwrap();
    assert_eq!(product.user_load.as_deref(), Some("nightly"));
}

#[test]
fn test_config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]
crawl-delay-ms = 10
pool-size = 2

[feed]
scheme = "https"
detail-path = "/detail.php"

[user-agent]
crawler-name = "CatalogMirror"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "ops@example.com"

[storage]
database-path = "catalog.db"

[images]
base-path = "/var/lib/catalog-mirror/images"
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.crawler.pool_size, 2);
    assert_eq!(config.crawler.crawl_delay(), Duration::from_millis(10));
    assert_eq!(config.feed.scheme, "https");
    assert_eq!(config.feed.catalog_path, "/feedxml_crm.php");
    assert_eq!(config.feed.detail_path, "/detail.php");
}

#[test]
fn test_config_rejects_bad_scheme() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]

[feed]
scheme = "ftp"

[user-agent]
crawler-name = "CatalogMirror"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "ops@example.com"

[storage]
database-path = "catalog.db"

[images]
base-path = "images"
"#
    )
    .unwrap();

    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::Validation(_))
    ));
}
