use anyhow::Result;
use predicates::prelude::*;
use serde_json::Value;

use crate::common::{UpstreamCatalog, catalog_cmd, catalog_cmd_for};

#[test]
fn test_list_prints_json() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");

    let output = catalog_cmd_for(&upstream, &data_dir).arg("list").assert().success();
    let listing: Value = serde_json::from_slice(&output.get_output().stdout)?;

    let templates = listing.as_array().expect("listing is an array");
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["id"], "foo");
    assert_eq!(templates[0]["defaultVersion"], "1");
    assert_eq!(templates[0]["versionLinks"]["1"], "foo/1");
    Ok(())
}

#[test]
fn test_list_text_format() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");

    catalog_cmd_for(&upstream, &data_dir)
        .args(["list", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo"))
        .stdout(predicate::str::contains("versions: 1"));
    Ok(())
}

#[test]
fn test_show_prints_inherited_detail() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");

    let output = catalog_cmd_for(&upstream, &data_dir).args(["show", "foo", "1"]).assert().success();
    let detail: Value = serde_json::from_slice(&output.get_output().stdout)?;

    assert_eq!(detail["id"], "foo/1");
    assert_eq!(detail["name"], "Foo");
    assert_eq!(detail["iconPath"], "foo/catalogIcon-foo.svg");
    assert_eq!(detail["questions"][0]["variable"], "scale");
    assert_eq!(detail["questions"][0]["default"], "3");
    assert_eq!(detail["questions"][0]["type"], "int");
    Ok(())
}

#[test]
fn test_show_unknown_version_fails() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");

    catalog_cmd_for(&upstream, &data_dir)
        .args(["show", "foo", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Version '9' not found for template 'foo'"));
    Ok(())
}

#[test]
fn test_missing_catalog_url_fails() -> Result<()> {
    let upstream = UpstreamCatalog::new()?;
    catalog_cmd()
        .arg("--data-dir")
        .arg(upstream.mirror_dir("DATA"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog_url is required"));
    assert!(!upstream.mirror_dir("DATA").exists());
    Ok(())
}

#[test]
fn test_config_file_and_log_file() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let config_path = upstream.scratch().join("catalog.toml");
    let log_path = upstream.scratch().join("catalog.log");
    std::fs::write(
        &config_path,
        format!(
            "catalog_url = \"{}\"\ndata_dir = \"{}\"\nlog_file = \"{}\"\n",
            upstream.url(),
            upstream.mirror_dir("DATA").display(),
            log_path.display()
        ),
    )?;

    catalog_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"foo\""));

    let log = std::fs::read_to_string(&log_path)?;
    assert!(log.contains("Published catalog generation 1"));
    Ok(())
}

#[test]
fn test_unreachable_catalog_fails_startup() -> Result<()> {
    let upstream = UpstreamCatalog::new()?;
    catalog_cmd()
        .arg("--catalog-url")
        .arg(format!("file://{}", upstream.scratch().join("missing").display()))
        .arg("--data-dir")
        .arg(upstream.mirror_dir("DATA"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to clone catalog repository"));
    Ok(())
}
