use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

mod common;
use common::serve_once;

fn so2_generate(work_dir: &Path, catalog_url: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_so2-generate"))
        .current_dir(work_dir)
        .args(["--catalog-url", catalog_url, "--output-dir", "out"])
        .env_remove("GRQ_ES_URL")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .env("NO_PROXY", "127.0.0.1")
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to run so2-generate")
}

fn write_context(work_dir: &Path, prod_type: &str) {
    std::fs::create_dir_all(work_dir.join("input")).unwrap();
    std::fs::write(work_dir.join("input").join("scene.hdf"), b"").unwrap();
    let context = json!({
        "prod_metadata": {"platform": "Terra"},
        "prod_type": prod_type,
        "prod_id": "input",
        "starttime": "2019-05-14T03:41:40.000Z",
        "endtime": "2019-05-14T03:41:49.000Z"
    });
    std::fs::write(work_dir.join("_context.json"), context.to_string()).unwrap();
}

#[test]
fn test_missing_context_exits_non_zero() {
    let work = TempDir::new().unwrap();

    let output = so2_generate(work.path(), "http://127.0.0.1:9");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("_context.json"), "{}", stderr);
    assert!(!work.path().join("out").exists());
}

#[test]
fn test_wrong_input_type_exits_non_zero() {
    let work = TempDir::new().unwrap();
    write_context(work.path(), "AST_L2");

    let output = so2_generate(work.path(), "http://127.0.0.1:9");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input needs to be AST_L1T"), "{}", stderr);
}

#[test]
fn test_existing_product_exits_zero() {
    let work = TempDir::new().unwrap();
    write_context(work.path(), "AST_L1T");
    let (url, server) = serve_once("200 OK", r#"{"hits": {"total": {"value": 1, "relation": "eq"}}}"#);

    let output = so2_generate(work.path(), &url);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    server.join().unwrap();
    assert!(!work.path().join("out").exists());
}

#[test]
fn test_ratio_on_missing_input_exits_non_zero() {
    let work = TempDir::new().unwrap();
    let out = work.path().join("ratio.tif");

    let output = Command::new(env!("CARGO_BIN_EXE_so2-ratio"))
        .arg("-f")
        .arg(work.path().join("absent.hdf"))
        .arg("-o")
        .arg(&out)
        .output()
        .expect("Failed to run so2-ratio");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.hdf"));
    assert!(!out.exists());
}
