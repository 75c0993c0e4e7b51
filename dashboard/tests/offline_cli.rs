//! The CLI run end to end against the generated example directory.
#![cfg(feature = "example-data")]

use std::path::Path;

use clap::Parser;
use dashboard::config::DashboardSettings;
use dashboard::domain::{ACTIVITY_LOG_KEY, SETTINGS_KEY};
use dashboard::inbound::cli::{Cli, run};
use rstest::rstest;

fn settings(storage: &Path) -> DashboardSettings {
    DashboardSettings {
        api_base_url: None,
        view_url: None,
        page_size: None,
        storage_dir: Some(storage.to_path_buf()),
        stale_after_secs: None,
        request_timeout_secs: None,
        toast_ttl_secs: None,
        offline: false,
        example_seed: Some(7),
        example_count: Some(20),
    }
}

async fn invoke(settings: &DashboardSettings, args: &[&str]) -> (bool, String) {
    let cli = Cli::try_parse_from(
        ["dashboard", "--offline"]
            .into_iter()
            .chain(args.iter().copied()),
    )
    .expect("arguments parse");
    let mut out = Vec::new();
    let ok = run(cli, settings, &mut out).await.is_ok();
    (ok, String::from_utf8(out).expect("utf-8 output"))
}

#[rstest]
#[tokio::test]
async fn lists_the_last_generated_page() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());

    let (ok, text) = invoke(&settings, &["list", "--page", "3"]).await;

    assert!(ok, "{text}");
    assert!(text.contains("Page 3 of 3  (20 users)  [prev]"), "{text}");
}

#[rstest]
#[tokio::test]
async fn actions_and_theme_persist_between_runs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());

    let (listed, _) = invoke(&settings, &["list"]).await;
    assert!(listed);
    let (deleted, text) = invoke(&settings, &["delete", "3"]).await;
    assert!(deleted, "{text}");
    assert!(text.contains("[success] User deleted successfully"), "{text}");
    let (themed, _) = invoke(&settings, &["theme", "dark"]).await;
    assert!(themed);

    let (shown, feed) = invoke(&settings, &["activity"]).await;
    assert!(shown);
    assert!(feed.contains("Just now"), "{feed}");
    assert!(feed.contains("deleted"), "{feed}");

    let (_, theme) = invoke(&settings, &["theme"]).await;
    assert_eq!(theme, "Theme: dark\n");
    assert!(dir.path().join(format!("{SETTINGS_KEY}.json")).exists());
    assert!(dir.path().join(format!("{ACTIVITY_LOG_KEY}.json")).exists());
}

#[rstest]
#[tokio::test]
async fn malformed_api_url_is_rejected_before_any_request() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings(dir.path());
    let cli = Cli::try_parse_from(["dashboard", "--api-base-url", "not a url", "list"])
        .expect("arguments parse");

    let mut out = Vec::new();
    let result = run(cli, &settings, &mut out).await;

    assert!(result.is_err());
    assert!(out.is_empty());
}
