//! Command coverage against an in-memory directory.

use super::*;
use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::domain::ports::UsersRepositoryError;
use crate::domain::{ActivityAction, DashboardOptions};
use crate::outbound::storage::InMemoryKeyValueStore;
use crate::test_support::{GatedUsersRepository, MutableClock, RepositoryOperation, sample_users};

struct Harness {
    repository: Arc<InMemoryUsersRepository>,
    clock: Arc<MutableClock>,
    dashboard: Dashboard<InMemoryUsersRepository, UrlQueryState>,
}

impl Harness {
    async fn run(&self, args: &[&str]) -> (eyre::Result<()>, String) {
        let cli = Cli::try_parse_from(std::iter::once("dashboard").chain(args.iter().copied()))
            .expect("arguments parse");
        let mut out = Vec::new();
        let result = execute(&self.dashboard, self.clock.as_ref(), cli.command, &mut out).await;
        (result, String::from_utf8(out).expect("utf-8 output"))
    }
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryUsersRepository::new(sample_users(10)));
    let clock = Arc::new(MutableClock::at_epoch_offset(1_700_000_000));
    let ports = DashboardPorts {
        repository: Arc::clone(&repository),
        query: Arc::new(UrlQueryState::new(
            Url::parse("http://localhost/users").expect("view url"),
        )),
        store: Arc::new(InMemoryKeyValueStore::new()),
        clock: Arc::clone(&clock) as Arc<dyn Clock>,
    };
    let dashboard = Dashboard::new(ports, DashboardOptions::default()).expect("dashboard");
    Harness {
        repository,
        clock,
        dashboard,
    }
}

#[rstest]
#[case::list(&["list", "--page", "2", "--sort", "desc"])]
#[case::theme(&["theme", "toggle"])]
#[case::show(&["show", "7"])]
#[case::edit(&["edit", "4", "--email", "new@example.com"])]
#[case::global_flags(&["delete", "3", "--offline", "--api-base-url", "http://api.test/"])]
fn parses_commands(#[case] args: &[&str]) {
    let parsed = Cli::try_parse_from(std::iter::once("dashboard").chain(args.iter().copied()));
    assert!(parsed.is_ok(), "{parsed:?}");
}

#[rstest]
fn rejects_unknown_sort_order() {
    let parsed = Cli::try_parse_from(["dashboard", "list", "--sort", "sideways"]);
    assert!(parsed.is_err());
}

#[rstest]
#[tokio::test]
async fn list_clamps_requested_page(harness: Harness) {
    let (result, text) = harness.run(&["list", "--page", "9"]).await;

    result.expect("list succeeds");
    assert_eq!(harness.dashboard.state().snapshot().page, 2);
    assert!(text.contains("Page 2 of 2  (10 users)  [prev]"), "{text}");
    assert!(text.contains("user.09@example.com"));
}

#[rstest]
#[tokio::test]
async fn list_reports_a_page_it_could_not_apply() {
    let repository = Arc::new(GatedUsersRepository::new(sample_users(10)));
    repository.fail_next(
        RepositoryOperation::List,
        UsersRepositoryError::transport("connection refused"),
    );
    let clock = Arc::new(MutableClock::at_epoch_offset(1_700_000_000));
    let ports = DashboardPorts {
        repository,
        query: Arc::new(UrlQueryState::new(
            Url::parse("http://localhost/users").expect("view url"),
        )),
        store: Arc::new(InMemoryKeyValueStore::new()),
        clock: Arc::clone(&clock) as Arc<dyn Clock>,
    };
    let dashboard = Dashboard::new(ports, DashboardOptions::default()).expect("dashboard");
    let cli = Cli::try_parse_from(["dashboard", "list", "--page", "2"]).expect("arguments parse");

    let mut out = Vec::new();
    let result = execute(&dashboard, clock.as_ref(), cli.command, &mut out).await;

    let text = String::from_utf8(out).expect("utf-8 output");
    assert!(result.is_err());
    assert!(text.contains("Page 2 not applied: the page count is unknown."), "{text}");
    assert!(text.contains("Failed to load users"), "{text}");
    assert!(text.contains("connection refused"), "{text}");
    assert_eq!(dashboard.state().snapshot().page, 1);
}

#[rstest]
#[tokio::test]
async fn show_prints_the_user_card(harness: Harness) {
    let (result, text) = harness.run(&["show", "6"]).await;

    result.expect("show succeeds");
    assert!(text.starts_with("User 06 (U0)  #6\n"), "{text}");
    assert!(text.contains("  Email:    user.06@example.com"), "{text}");
    assert!(text.contains("Company\n  Globex\n"), "{text}");
}

#[rstest]
#[tokio::test]
async fn show_of_missing_user_fails(harness: Harness) {
    let (result, text) = harness.run(&["show", "99"]).await;

    assert!(result.is_err());
    assert!(text.is_empty());
}

#[rstest]
#[tokio::test]
async fn list_applies_filters(harness: Harness) {
    let (result, text) = harness
        .run(&["list", "--company", "Globex", "--sort", "desc"])
        .await;

    result.expect("list succeeds");
    let view = harness.dashboard.view();
    let ids: Vec<u64> = view.users.iter().map(|user| user.id.get()).collect();
    assert_eq!(ids, vec![10, 8, 6, 4, 2]);
    assert!(text.contains("company: Globex  sort: email desc"), "{text}");
}

#[rstest]
#[tokio::test]
async fn add_reports_invalid_fields(harness: Harness) {
    let (result, text) = harness
        .run(&["add", "--name", "Ada", "--email", "nope", "--phone", "555"])
        .await;

    assert!(result.is_err());
    assert!(text.contains("  email: Please enter a valid email"), "{text}");
    assert!(text.contains("  company: Company is required"), "{text}");
    assert_eq!(harness.repository.snapshot().len(), 10);
}

#[rstest]
#[tokio::test]
async fn add_creates_user_and_shows_toast(harness: Harness) {
    let (result, text) = harness
        .run(&[
            "add",
            "--name",
            "Ada Lovelace",
            "--email",
            "ada@example.com",
            "--phone",
            "555-0100",
            "--company",
            "Analytical Engines",
        ])
        .await;

    result.expect("create succeeds");
    assert!(text.contains("[success] User created successfully"), "{text}");
    assert!(text.contains("Created user 11 (ada@example.com)"), "{text}");
    let entries = harness.dashboard.activity().entries();
    assert_eq!(entries.first().map(|entry| entry.action), Some(ActivityAction::Created));
}

#[rstest]
#[tokio::test]
async fn edit_keeps_omitted_fields(harness: Harness) {
    let (result, _) = harness.run(&["edit", "4", "--phone", "555-9999"]).await;

    result.expect("edit succeeds");
    let stored = harness
        .repository
        .snapshot()
        .into_iter()
        .find(|user| user.id == UserId::new(4))
        .expect("user 4 exists");
    assert_eq!(stored.phone, "555-9999");
    assert_eq!(stored.name, "User 04");
    assert_eq!(stored.company.name, "Globex");
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_user_shows_error_toast(harness: Harness) {
    let (result, text) = harness.run(&["delete", "99"]).await;

    assert!(result.is_err());
    assert!(text.contains("[error] Failed to delete user"), "{text}");
    assert!(harness.dashboard.activity().is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_then_activity_lists_the_action(harness: Harness) {
    let (deleted, text) = harness.run(&["delete", "5"]).await;
    deleted.expect("delete succeeds");
    assert!(text.contains("Deleted user 5"), "{text}");

    harness.clock.advance(Duration::from_secs(180));
    let (listed, feed) = harness.run(&["activity"]).await;

    listed.expect("activity renders");
    assert!(feed.starts_with("3m ago"), "{feed}");
    // Nothing was listed first, so only the id is known.
    assert!(feed.contains("Deleted user 5"), "{feed}");

    let (cleared, _) = harness.run(&["clear-activity"]).await;
    cleared.expect("clear succeeds");
    assert!(harness.dashboard.activity().is_empty());
}

#[rstest]
#[tokio::test]
async fn theme_commands_persist(harness: Harness) {
    let (shown, text) = harness.run(&["theme"]).await;
    shown.expect("theme shows");
    assert_eq!(text, "Theme: light\n");

    let (toggled, text) = harness.run(&["theme", "toggle"]).await;
    toggled.expect("theme toggles");
    assert_eq!(text, "Theme: dark\n");
    assert_eq!(harness.dashboard.settings().theme(), Theme::Dark);
}
