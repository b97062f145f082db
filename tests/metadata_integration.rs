//! Integration tests for metadata table mirroring.

mod support;

use std::time::Duration;

use knesset_corpus::{CursorStore, Layout, MetadataMirror, PageFetcher, Source};
use support::catalog_page;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLENUM: &str = "KNS_PlenumSession";

fn mirror(layout: &Layout, endpoint: &str) -> MetadataMirror {
    MetadataMirror::new(
        layout.clone(),
        PageFetcher::new(endpoint, Duration::from_millis(50)),
    )
}

#[tokio::test]
async fn test_mirror_persists_every_page() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::new(tmp.path());
    let table = Source::new(PLENUM);

    Mock::given(method("GET"))
        .and(path(format!("/{PLENUM}")))
        .and(query_param("$skiptoken", "P2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(catalog_page(PLENUM, &[], None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{PLENUM}")))
        .and(query_param("$format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_page(
            PLENUM,
            &["https://fs.knesset.gov.il//20/session_1.doc"],
            Some(&format!("{PLENUM}?$skiptoken=P2")),
        )))
        .mount(&server)
        .await;

    let report = mirror(&layout, &server.uri()).mirror_table(&table).await;

    assert!(report.error.is_none(), "unexpected: {:?}", report.error);
    assert_eq!(report.pages, 2);

    let pages_dir = layout.metadata_pages_dir(&table);
    assert!(pages_dir.join(format!("{PLENUM}_P2.json")).exists());
    assert!(pages_dir.join(format!("{PLENUM}_last.json")).exists());

    // Exhausted: no stale cursor left behind.
    assert_eq!(CursorStore::new(&layout).load(&table).unwrap(), None);
}

#[tokio::test]
async fn test_mirror_failure_is_resumable() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::new(tmp.path());
    let table = Source::new(PLENUM);

    Mock::given(method("GET"))
        .and(path(format!("/{PLENUM}")))
        .and(query_param("$skiptoken", "P2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{PLENUM}")))
        .and(query_param("$format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_page(
            PLENUM,
            &[],
            Some(&format!("{PLENUM}?$skiptoken=P2")),
        )))
        .mount(&server)
        .await;

    let report = mirror(&layout, &server.uri()).mirror_table(&table).await;

    assert!(report.error.is_some());
    assert_eq!(report.pages, 1);
    assert_eq!(
        CursorStore::new(&layout).load(&table).unwrap().as_deref(),
        Some(&*format!("{PLENUM}?$skiptoken=P2"))
    );
}
