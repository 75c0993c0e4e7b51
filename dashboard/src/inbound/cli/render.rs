//! Plain-text rendering of dashboard state for the terminal.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{
    ActivityEntry, DashboardView, Error, ErrorCode, Theme, Toast, User, ViewStatus, initials,
    relative_time,
};

const NAME_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 30;
const PHONE_WIDTH: usize = 22;

/// Write the users table with its filter summary and pagination footer.
pub fn render_view(
    out: &mut impl Write,
    view: &DashboardView,
    companies: &[String],
    theme: Theme,
) -> io::Result<()> {
    let state = &view.state;
    let search = if state.search.is_empty() {
        "-"
    } else {
        state.search.as_str()
    };
    writeln!(
        out,
        "Users  search: {search}  company: {}  sort: email {}  theme: {theme}",
        state.company.name().unwrap_or("All companies"),
        state.sort,
    )?;
    if !companies.is_empty() {
        writeln!(out, "Companies: {}", companies.join(", "))?;
    }

    match &view.status {
        ViewStatus::Failed(error) => {
            return writeln!(out, "Failed to load users: {}", error.message());
        }
        ViewStatus::Loading if view.users.is_empty() => return writeln!(out, "Loading users..."),
        ViewStatus::Idle => return writeln!(out, "No data loaded."),
        ViewStatus::Loading | ViewStatus::Ready => {}
    }

    if view.users.is_empty() {
        writeln!(out, "No users found.")?;
    } else {
        writeln!(
            out,
            "{:>5}  {:<3} {:<NAME_WIDTH$} {:<EMAIL_WIDTH$} {:<PHONE_WIDTH$} COMPANY",
            "ID", "", "NAME", "EMAIL", "PHONE"
        )?;
        for user in &view.users {
            writeln!(
                out,
                "{:>5}  {:<3} {:<NAME_WIDTH$} {:<EMAIL_WIDTH$} {:<PHONE_WIDTH$} {}",
                user.id.get(),
                initials(&user.name),
                user.name,
                user.email,
                user.phone,
                user.company.name
            )?;
        }
    }

    let total = view
        .total_count
        .map_or_else(|| "unknown".to_owned(), |count| count.to_string());
    writeln!(
        out,
        "Page {} of {}  ({total} users){}{}",
        state.page,
        view.total_pages.max(1),
        if view.has_previous { "  [prev]" } else { "" },
        if view.has_next { "  [next]" } else { "" },
    )
}

/// Write one user's contact details, address and company.
pub fn render_user(out: &mut impl Write, user: &User) -> io::Result<()> {
    writeln!(out, "{} ({})  #{}", user.name, initials(&user.name), user.id.get())?;
    writeln!(out, "  Username: {}", user.username)?;
    writeln!(out, "  Email:    {}", user.email)?;
    writeln!(out, "  Phone:    {}", user.phone)?;
    writeln!(out, "  Website:  {}", user.website)?;

    let address = &user.address;
    let street = [address.street.as_str(), address.suite.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "Address")?;
    writeln!(out, "  {}", if street.is_empty() { "-" } else { street.as_str() })?;
    writeln!(out, "  {} {}", address.city, address.zipcode)?;
    if !address.geo.lat.is_empty() || !address.geo.lng.is_empty() {
        writeln!(out, "  Geo: {}, {}", address.geo.lat, address.geo.lng)?;
    }

    let company = &user.company;
    writeln!(out, "Company")?;
    writeln!(out, "  {}", company.name)?;
    if !company.catch_phrase.is_empty() {
        writeln!(out, "  \"{}\"", company.catch_phrase)?;
    }
    if !company.bs.is_empty() {
        writeln!(out, "  {}", company.bs)?;
    }
    Ok(())
}

/// Write the activity feed, newest first.
pub fn render_activity(
    out: &mut impl Write,
    entries: &[ActivityEntry],
    now: DateTime<Utc>,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No recent activity.");
    }
    for entry in entries {
        writeln!(
            out,
            "{:<9} {:<8} {}",
            relative_time(entry.timestamp, now),
            entry.action,
            entry.details
        )?;
    }
    Ok(())
}

/// Write visible toasts, one per line.
pub fn render_toasts(out: &mut impl Write, toasts: &[Toast]) -> io::Result<()> {
    for toast in toasts {
        writeln!(out, "[{}] {}", toast.kind, toast.title)?;
    }
    Ok(())
}

/// Write per-field messages carried by a validation error.
///
/// Errors of any other category write nothing.
pub fn render_form_errors(out: &mut impl Write, error: &Error) -> io::Result<()> {
    if error.code() != ErrorCode::Validation {
        return Ok(());
    }
    let Some(Value::Object(fields)) = error.details() else {
        return Ok(());
    };
    for (field, message) in fields {
        writeln!(out, "  {field}: {}", message.as_str().unwrap_or_default())?;
    }
    Ok(())
}
