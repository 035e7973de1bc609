use aster_so2::core::{GenerationOutcome, ProductGenerator, ProductRequest};
use aster_so2::io::container::MemoryContainer;
use aster_so2::io::{Catalog, CatalogLookup, HttpCatalog};
use aster_so2::{ProductConfig, ProductId};
use ndarray::Array2;
use serde_json::{Map, Value};

mod common;
use common::serve_once;

const INDEX: &str = "grq_v1.0_AST_L1T-SO";

fn catalog(url: String) -> HttpCatalog {
    let client = reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to create HTTP client");
    HttpCatalog::with_client(url, client)
}

#[test]
fn test_found_count_is_reported() {
    let (url, server) = serve_once("200 OK", r#"{"hits": {"total": 2, "hits": []}}"#);
    let catalog = catalog(url);
    let id = ProductId::new("AST_L1T-SO-20190514T034140_20190514T034149-v1.0");

    let lookup = catalog.lookup(INDEX, &id);
    assert_eq!(lookup, CatalogLookup::Found { count: 2 });

    let request = server.join().unwrap();
    assert!(request.starts_with(&format!("POST /{}/_search", INDEX)));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let query: Value = serde_json::from_str(body).unwrap();
    assert_eq!(query["query"]["bool"]["must"][0]["term"]["id.raw"], id.as_str());
    assert_eq!(query["size"], 1);
}

#[test]
fn test_zero_hits_is_not_found() {
    let (url, server) = serve_once("200 OK", r#"{"hits": {"total": {"value": 0, "relation": "eq"}}}"#);
    let catalog = catalog(url);

    assert_eq!(catalog.lookup(INDEX, &ProductId::new("x")), CatalogLookup::NotFoundOrUnknown);
    server.join().unwrap();
}

#[test]
fn test_error_status_surfaces_from_count() {
    let (url, server) = serve_once("404 Not Found", r#"{"error": "index_not_found_exception"}"#);
    let catalog = catalog(url);

    assert!(catalog.count(INDEX, &ProductId::new("x")).is_err());
    server.join().unwrap();
}

#[test]
fn test_error_status_treated_like_zero_hits() {
    let (url, server) = serve_once("503 Service Unavailable", "{}");
    let catalog = catalog(url);

    assert_eq!(catalog.lookup(INDEX, &ProductId::new("x")), CatalogLookup::NotFoundOrUnknown);
    server.join().unwrap();
}

#[test]
fn test_generation_proceeds_when_catalog_errors() {
    let (url, server) = serve_once("500 Internal Server Error", "{}");
    let catalog = catalog(url);

    let input = tempfile::TempDir::new().unwrap();
    let output = tempfile::TempDir::new().unwrap();
    std::fs::write(input.path().join("scene.HDF"), b"").unwrap();

    let name = |band: u8| format!("HDF4_EOS:EOS_SWATH:\"scene.HDF\":SurfaceRadianceTIR:Band{}", band);
    let container = MemoryContainer::new("scene.HDF")
        .with_subdataset(name(10), Array2::from_elem((3, 3), 5.0))
        .with_subdataset(name(11), Array2::from_elem((3, 3), 3.0))
        .with_subdataset(name(12), Array2::from_elem((3, 3), 4.0));

    let generator = ProductGenerator::new(ProductConfig::default(), &catalog, output.path());
    let request = ProductRequest {
        input_dir: input.path(),
        starttime: "2019-05-14T03:41:40Z",
        endtime: "2019-05-14T03:41:49Z",
        location: &Value::Null,
        metadata: &Map::new(),
    };

    let outcome = generator.generate_product(request, |_| Ok(container)).unwrap();
    assert!(matches!(outcome, GenerationOutcome::Generated(_)));
    server.join().unwrap();
}
