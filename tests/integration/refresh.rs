use anyhow::Result;
use catalog_service::core::CatalogError;
use catalog_service::git::GitRepo;
use catalog_service::refresh::RefreshOutcome;
use catalog_service::service::CatalogService;
use catalog_service::source::GitSyncSource;
use catalog_service::test_utils::init_test_logging;
use std::path::Path;
use std::time::Duration;

use crate::common::UpstreamCatalog;

fn git_service(url: &str, data_dir: &Path) -> CatalogService {
    init_test_logging(None);
    CatalogService::new(
        GitSyncSource::new(None, Duration::from_secs(60)),
        url,
        data_dir,
        data_dir.join("templates"),
        Duration::from_secs(60),
    )
}

#[tokio::test]
async fn test_bootstrap_clones_and_indexes() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");
    let service = git_service(&upstream.url(), &data_dir);

    let report = service.bootstrap().await?;
    assert_eq!(report.generation, 1);
    assert!(data_dir.join(".git").exists());
    assert_eq!(GitRepo::new(&data_dir).current_commit().await?, upstream.git.rev_parse_head()?);

    let templates = service.list_templates();
    assert_eq!(templates.len(), 1);
    let foo = &templates[0];
    assert_eq!(foo.id, "foo");
    assert_eq!(foo.name, "Foo");
    assert_eq!(foo.category, "Database");
    assert_eq!(foo.default_version, "1");
    assert_eq!(foo.icon_path.as_deref(), Some("foo/catalogIcon-foo.svg"));
    assert_eq!(foo.version_links.get("1").map(String::as_str), Some("foo/1"));

    let detail = service.get_template_version("foo", "1")?;
    assert_eq!(detail.name, "Foo");
    assert_eq!(detail.icon_path.as_deref(), Some("foo/catalogIcon-foo.svg"));
    assert_eq!(detail.docker_manifest.as_deref(), Some("db:\n  image: foo:1\n"));
    assert_eq!(detail.questions.len(), 1);
    assert_eq!(detail.questions[0].variable, "scale");
    assert_eq!(detail.questions[0].kind, "int");
    assert!(!detail.questions[0].required);
    assert_eq!(detail.questions[0].default.as_deref(), Some("3"));
    Ok(())
}

#[tokio::test]
async fn test_refresh_picks_up_upstream_commits() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");
    let service = git_service(&upstream.url(), &data_dir);
    service.bootstrap().await?;

    upstream
        .write("foo/2/config.yml", "name: Foo Two\ncategory: Database\n")?
        .write("foo/2/docker-compose.yml", "db:\n  image: foo:2\n")?
        .write("bar/config.yml", "name: Bar\n")?;
    upstream.commit("Add foo 2 and bar")?;

    let outcome = service.scheduler().refresh().await?;
    assert!(matches!(outcome, RefreshOutcome::Completed(ref r) if r.generation == 2));

    let ids: Vec<String> = service.list_templates().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["bar".to_string(), "foo".to_string()]);

    let foo = service.snapshot().get("foo").cloned().expect("foo is listed");
    assert_eq!(foo.version_links.len(), 2);

    let two = service.get_template_version("foo", "2")?;
    assert_eq!(two.name, "Foo Two");
    assert_eq!(two.default_version, "");
    // No icon of its own
    assert_eq!(two.icon_path.as_deref(), Some("foo/catalogIcon-foo.svg"));
    assert!(two.questions.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_removed_template_disappears_after_refresh() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    upstream.write("bar/config.yml", "name: Bar\n")?;
    upstream.commit("Add bar")?;
    let data_dir = upstream.mirror_dir("DATA");
    let service = git_service(&upstream.url(), &data_dir);
    service.bootstrap().await?;
    assert_eq!(service.list_templates().len(), 2);

    upstream.remove("bar")?;
    upstream.commit("Remove bar")?;
    service.scheduler().refresh().await?;

    let ids: Vec<String> = service.list_templates().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["foo".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_upstream_keeps_serving_mirror() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");
    let service = git_service(&upstream.url(), &data_dir);
    service.bootstrap().await?;

    std::fs::remove_dir_all(upstream.path())?;

    let outcome = service.scheduler().refresh().await?;
    let RefreshOutcome::Completed(report) = outcome else {
        panic!("refresh should run even though the pull fails");
    };
    assert_eq!(report.templates, 1);
    assert_eq!(service.get_template_version("foo", "1")?.name, "Foo");
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_with_existing_mirror_pulls() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");
    git_service(&upstream.url(), &data_dir).bootstrap().await?;

    upstream.write("bar/config.yml", "name: Bar\n")?;
    upstream.commit("Add bar")?;

    // A restarted service reuses the mirror and pulls instead of cloning
    let restarted = git_service(&upstream.url(), &data_dir);
    restarted.bootstrap().await?;
    assert_eq!(restarted.list_templates().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_clones_into_pre_created_data_dir() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");
    // e.g. a mounted volume or `mkdir DATA` before the first start
    std::fs::create_dir_all(&data_dir)?;
    let service = git_service(&upstream.url(), &data_dir);

    let report = service.bootstrap().await?;
    assert!(data_dir.join(".git").exists());
    assert_eq!(report.templates, 1);
    assert!(report.diagnostics.is_empty());

    upstream.write("bar/config.yml", "name: Bar\n")?;
    upstream.commit("Add bar")?;
    service.scheduler().refresh().await?;
    assert_eq!(service.list_templates().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_rejects_non_mirror_directory() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");
    std::fs::create_dir_all(data_dir.join("templates"))?;
    std::fs::write(data_dir.join("templates/leftover.yml"), "partial\n")?;
    let service = git_service(&upstream.url(), &data_dir);

    // git refuses to clone into a non-empty directory
    let error = service.bootstrap().await.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<CatalogError>(),
        Some(CatalogError::GitCloneFailed { .. })
    ));
    assert_eq!(service.snapshot().generation, 0);
    Ok(())
}

#[tokio::test]
async fn test_refresh_recreates_deleted_mirror() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let data_dir = upstream.mirror_dir("DATA");
    let service = git_service(&upstream.url(), &data_dir);
    service.bootstrap().await?;

    std::fs::remove_dir_all(&data_dir)?;
    service.scheduler().refresh().await?;

    assert!(data_dir.join(".git").exists());
    assert_eq!(service.list_templates().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_explicit_branch_is_pulled() -> Result<()> {
    let upstream = UpstreamCatalog::new()?.with_foo()?;
    let branch = upstream.git.get_current_branch()?;
    let data_dir = upstream.mirror_dir("DATA");
    let service = CatalogService::new(
        GitSyncSource::new(Some(branch), Duration::from_secs(60)),
        upstream.url(),
        &data_dir,
        data_dir.join("templates"),
        Duration::from_secs(60),
    );
    service.bootstrap().await?;

    upstream.write("foo/config.yml", "name: Foo Renamed\n")?;
    upstream.commit("Rename foo")?;
    service.scheduler().refresh().await?;

    assert_eq!(service.list_templates()[0].name, "Foo Renamed");
    Ok(())
}

#[tokio::test]
async fn test_failed_initial_clone_is_fatal() -> Result<()> {
    let upstream = UpstreamCatalog::new()?;
    let missing = format!("file://{}", upstream.scratch().join("no-such-repo").display());
    let data_dir = upstream.mirror_dir("DATA");
    let service = git_service(&missing, &data_dir);

    let error = service.bootstrap().await.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<CatalogError>(),
        Some(CatalogError::GitCloneFailed { .. })
    ));
    assert!(service.list_templates().is_empty());
    Ok(())
}
