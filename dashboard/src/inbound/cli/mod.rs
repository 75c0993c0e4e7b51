//! Command-line adapter driving the dashboard.
//!
//! Each invocation maps one subcommand onto dashboard operations and renders
//! the outcome as text. Persistent state (activity log, theme) lives in the
//! configured storage directory; the view state is read from the configured
//! view URL and overridden by `list` flags.

mod render;

use std::io::Write;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{self, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::info;
use url::Url;

use crate::config::DashboardSettings;
use crate::domain::ports::{KeyValueStore, QueryState, UsersRepository};
use crate::domain::{
    CompanySelection, Dashboard, DashboardPorts, DeleteOutcome, Error, SortOrder, Theme,
    UserForm, UserId,
};
use crate::outbound::memory::InMemoryUsersRepository;
use crate::outbound::query_state::UrlQueryState;
use crate::outbound::storage::FileKeyValueStore;
use crate::outbound::users_http::UsersHttpRepository;

pub use render::{render_activity, render_form_errors, render_toasts, render_user, render_view};

/// `dashboard` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dashboard",
    about = "Browse and edit the user directory from the terminal",
    version
)]
pub struct Cli {
    /// Serve the generated example directory instead of the users API.
    #[arg(long, global = true)]
    pub offline: bool,
    /// Users API base URL. Falls back to `DASHBOARD_API_BASE_URL` when omitted.
    #[arg(long = "api-base-url", value_name = "url", global = true)]
    pub api_base_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show one page of users.
    List(ListArgs),
    /// Show one user's contact details, address and company.
    Show {
        #[arg(value_name = "id")]
        id: u64,
    },
    /// Show recent create, update and delete actions.
    Activity,
    /// Forget every recorded action.
    ClearActivity,
    /// Show the colour theme, or change it.
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
    /// Create a user.
    Add(FormArgs),
    /// Edit a user. Omitted fields keep their current values.
    Edit {
        #[arg(value_name = "id")]
        id: u64,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Delete a user.
    Delete {
        #[arg(value_name = "id")]
        id: u64,
    },
}

/// Filters applied before listing.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Page to show; clamped to the last page.
    #[arg(long, value_name = "n")]
    pub page: Option<u32>,
    /// Case-insensitive name search.
    #[arg(long, value_name = "term")]
    pub search: Option<String>,
    /// Company name, or `all`.
    #[arg(long, value_name = "name")]
    pub company: Option<String>,
    /// Email sort direction.
    #[arg(long, value_name = "asc|desc")]
    pub sort: Option<SortOrder>,
}

/// Editable user fields.
#[derive(Debug, Clone, Default, Args)]
pub struct FormArgs {
    #[arg(long, value_name = "name")]
    pub name: Option<String>,
    #[arg(long, value_name = "email")]
    pub email: Option<String>,
    #[arg(long, value_name = "phone")]
    pub phone: Option<String>,
    #[arg(long, value_name = "name")]
    pub company: Option<String>,
}

impl FormArgs {
    /// Overlay the supplied fields onto `base`.
    pub fn apply_to(self, base: UserForm) -> UserForm {
        UserForm {
            name: self.name.unwrap_or(base.name),
            email: self.email.unwrap_or(base.email),
            phone: self.phone.unwrap_or(base.phone),
            company: self.company.unwrap_or(base.company),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

/// Assemble the dashboard from `settings` and run `cli.command`.
///
/// # Errors
///
/// Returns an error when a port cannot be built or the command fails.
pub async fn run(
    cli: Cli,
    settings: &DashboardSettings,
    out: &mut impl Write,
) -> eyre::Result<()> {
    let storage_dir = settings.storage_dir();
    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileKeyValueStore::open(&storage_dir)
            .wrap_err_with(|| format!("open storage directory {}", storage_dir.display()))?,
    );
    let query = Arc::new(UrlQueryState::new(
        settings.view_url().wrap_err("parse view URL")?,
    ));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    if cli.offline || settings.offline {
        let repository = Arc::new(offline_repository(settings)?);
        let ports = DashboardPorts {
            repository,
            query,
            store,
            clock: Arc::clone(&clock),
        };
        let dashboard = Dashboard::new(ports, settings.dashboard_options())?;
        return execute(&dashboard, clock.as_ref(), cli.command, out).await;
    }

    let base_url = match cli.api_base_url {
        Some(raw) => Url::parse(&raw).wrap_err_with(|| format!("parse API base URL '{raw}'"))?,
        None => settings.api_base_url().wrap_err("parse API base URL")?,
    };
    info!(base_url = %base_url, "using users API");
    let repository = Arc::new(
        UsersHttpRepository::new(base_url, settings.request_timeout())
            .wrap_err("build users API client")?,
    );
    let ports = DashboardPorts {
        repository,
        query,
        store,
        clock: Arc::clone(&clock),
    };
    let dashboard = Dashboard::new(ports, settings.dashboard_options())?;
    execute(&dashboard, clock.as_ref(), cli.command, out).await
}

#[cfg(feature = "example-data")]
fn offline_repository(settings: &DashboardSettings) -> eyre::Result<InMemoryUsersRepository> {
    let (seed, count) = (settings.example_seed(), settings.example_count());
    info!(seed, count, "serving generated example directory");
    InMemoryUsersRepository::with_example_users(seed, count)
        .wrap_err("generate example directory")
}

#[cfg(not(feature = "example-data"))]
fn offline_repository(_settings: &DashboardSettings) -> eyre::Result<InMemoryUsersRepository> {
    eyre::bail!("offline mode needs the `example-data` feature")
}

/// Run one command against an assembled dashboard.
///
/// # Errors
///
/// Returns the dashboard error when the command fails. Toasts and form
/// messages are written to `out` before the error is returned.
pub async fn execute<R, Q>(
    dashboard: &Dashboard<R, Q>,
    clock: &dyn Clock,
    command: Command,
    out: &mut impl Write,
) -> eyre::Result<()>
where
    R: UsersRepository + 'static,
    Q: QueryState,
{
    match command {
        Command::List(args) => list(dashboard, args, out).await,
        Command::Show { id } => {
            let user = dashboard.user(UserId::new(id)).await?;
            render_user(out, &user)?;
            Ok(())
        }
        Command::Activity => {
            render_activity(out, &dashboard.activity().entries(), clock.utc())?;
            Ok(())
        }
        Command::ClearActivity => {
            dashboard.activity().clear();
            writeln!(out, "Activity log cleared.")?;
            Ok(())
        }
        Command::Theme { choice } => {
            let settings = dashboard.settings();
            let theme = match choice {
                None => settings.theme(),
                Some(ThemeChoice::Light) => settings.set_theme(Theme::Light),
                Some(ThemeChoice::Dark) => settings.set_theme(Theme::Dark),
                Some(ThemeChoice::Toggle) => settings.toggle_theme(),
            };
            writeln!(out, "Theme: {theme}")?;
            Ok(())
        }
        Command::Add(form) => {
            let form = form.apply_to(UserForm::default());
            let result = dashboard.add_user(&form).await;
            let user = finish(dashboard, result, out)?;
            writeln!(out, "Created user {} ({})", user.id, user.email)?;
            Ok(())
        }
        Command::Edit { id, form } => {
            let id = UserId::new(id);
            let existing = dashboard.user(id).await?;
            let form = form.apply_to(UserForm::from_user(&existing));
            let result = dashboard.edit_user(id, &form).await;
            let user = finish(dashboard, result, out)?;
            writeln!(out, "Updated user {} ({})", user.id, user.email)?;
            Ok(())
        }
        Command::Delete { id } => {
            let result = dashboard.delete_user(UserId::new(id)).await;
            match finish(dashboard, result, out)? {
                DeleteOutcome::Deleted => writeln!(out, "Deleted user {id}")?,
                DeleteOutcome::AlreadyPending => {
                    writeln!(out, "A delete for user {id} is already in progress")?;
                }
            }
            Ok(())
        }
    }
}

async fn list<R, Q>(
    dashboard: &Dashboard<R, Q>,
    args: ListArgs,
    out: &mut impl Write,
) -> eyre::Result<()>
where
    R: UsersRepository + 'static,
    Q: QueryState,
{
    let ListArgs {
        page,
        search,
        company,
        sort,
    } = args;
    if let Some(term) = search {
        dashboard.set_search(term)?;
    }
    if let Some(name) = company {
        dashboard.set_company(CompanySelection::from_query_value(&name))?;
    }
    if let Some(order) = sort {
        dashboard.set_sort(order)?;
    }

    let mut loaded = dashboard.refresh().await;
    if let Some(requested) = page {
        // Totals are only known once the first page has loaded.
        if loaded.is_ok() {
            dashboard.go_to_page(requested)?;
            loaded = dashboard.refresh().await;
        } else if requested != dashboard.state().snapshot().page {
            writeln!(out, "Page {requested} not applied: the page count is unknown.")?;
        }
    }

    render_view(
        out,
        &dashboard.view(),
        &dashboard.company_options(),
        dashboard.settings().theme(),
    )?;
    loaded?;
    Ok(())
}

/// Render toasts and field messages, then hand back the result.
fn finish<R, Q, T>(
    dashboard: &Dashboard<R, Q>,
    result: Result<T, Error>,
    out: &mut impl Write,
) -> eyre::Result<T>
where
    R: UsersRepository + 'static,
    Q: QueryState,
{
    render_toasts(out, &dashboard.notifications().active())?;
    match result {
        Ok(value) => Ok(value),
        Err(error) => {
            render_form_errors(out, &error)?;
            Err(error.into())
        }
    }
}

#[cfg(test)]
mod tests;
