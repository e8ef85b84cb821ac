//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, BufRead, IsTerminal};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;

use linkday_core::{Entry, User};

use crate::cli::GlobalOpts;
use crate::context::Context;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Use `value` when given, otherwise ask for it.
pub fn text_or_prompt(value: Option<String>, prompt: &str) -> Result<String, CliError> {
    match value {
        Some(v) => Ok(v),
        None => Input::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(prompt_err),
    }
}

/// Read a password from stdin's first line or from a hidden prompt.
pub fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    let raw = if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_owned()
    } else {
        rpassword::prompt_password("Password: ").map_err(prompt_err)?
    };
    Ok(SecretString::from(raw))
}

// ── Loading indicator ────────────────────────────────────────────────

/// Run `fut` behind a spinner on stderr. Hidden when quiet or not a TTY.
pub async fn with_spinner<F: Future>(global: &GlobalOpts, message: &str, fut: F) -> F::Output {
    let bar = if global.quiet || !io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    };
    bar.set_message(message.to_owned());
    let out = fut.await;
    bar.finish_and_clear();
    out
}

// ── Guards ───────────────────────────────────────────────────────────

/// Admit the signed-in user to a protected command, revalidating the
/// stored credential when the session needs it.
pub async fn require_user(ctx: &Context, global: &GlobalOpts) -> Result<User, CliError> {
    let guard = ctx.app.protected_guard();
    let entry = with_spinner(
        global,
        "Checking session…",
        guard.enter(ctx.app.session(), &ctx.cancel),
    )
    .await?;
    match entry {
        Entry::Admitted(user) => Ok(user),
        Entry::Redirect(path) => {
            tracing::debug!(%path, "protected command redirected");
            Err(CliError::NotSignedIn)
        }
    }
}

/// Announce a completed action on stderr unless `--quiet`.
pub fn notice(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
