//! Profile command handlers.

use std::fmt::Write;

use linkday_core::{UpdateProfileRequest, User};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::util;

/// Detail view of a user record.
pub fn detail(user: &User, public_url: Option<&str>, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output::heading(&user.name, color));
    let _ = writeln!(out, "  Username:  {}", user.username);
    let _ = writeln!(out, "  Email:     {}", user.email);
    let _ = writeln!(out, "  Theme:     {}", user.theme);
    if let Some(ref bio) = user.bio {
        let _ = writeln!(out, "  Bio:       {bio}");
    }
    if let Some(ref avatar) = user.avatar {
        let _ = writeln!(out, "  Avatar:    {avatar}");
    }
    if let Some(url) = public_url {
        let _ = writeln!(out, "  Page:      {url}");
    }
    let _ = write!(out, "  Joined:    {}", util::format_date(&user.created_at));
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_user(ctx, global).await?;
    let session = ctx.app.session();

    let user = match args.command {
        ProfileCommand::Show => session.user().ok_or(CliError::NotSignedIn)?,

        ProfileCommand::Update {
            name,
            bio,
            theme,
            avatar,
        } => {
            let patch = UpdateProfileRequest {
                name,
                bio,
                theme,
                avatar,
            };
            let user = util::with_spinner(
                global,
                "Saving profile…",
                session.update_profile(&patch, &ctx.cancel),
            )
            .await?;
            util::notice(global, "✓ Profile updated");
            user
        }

        ProfileCommand::Username { username } => {
            let ack = util::with_spinner(
                global,
                "Changing username…",
                session.update_username(&username, &ctx.cancel),
            )
            .await?;
            if !ack.message.is_empty() {
                util::notice(global, &format!("✓ {}", ack.message));
            }
            session.user().ok_or(CliError::NotSignedIn)?
        }
    };

    let public_url = ctx.app.public_url().and_then(Result::ok).map(String::from);
    let out = output::render_single(
        &global.output,
        &user,
        |u| detail(u, public_url.as_deref(), ctx.color),
        |u| u.username.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
