//! Visitor-facing handlers: public pages and click-through.

use std::fmt::Write;

use serde::Serialize;

use linkday_core::{Link, PublicProfile, User};

use crate::cli::{GlobalOpts, OpenArgs};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── View ────────────────────────────────────────────────────────────

/// What a visitor sees: the owner and their active links in page order.
#[derive(Serialize)]
struct PageView<'a> {
    user: &'a User,
    links: Vec<&'a Link>,
}

fn page_detail(view: &PageView<'_>, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (@{})",
        output::heading(&view.user.name, color),
        view.user.username
    );
    if let Some(ref bio) = view.user.bio {
        let _ = writeln!(out, "{bio}");
    }
    if view.links.is_empty() {
        let _ = write!(out, "\nNo links yet.");
        return out;
    }
    for link in &view.links {
        let _ = write!(out, "\n  • {}\n    {}", link.title, link.url);
        if let Some(ref description) = link.description {
            let _ = write!(out, "\n    {description}");
        }
        let _ = write!(out, "\n    id: {}", link.id);
    }
    out
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn show(ctx: &Context, username: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let profile = load(ctx, username, global).await?;
    let view = PageView {
        user: &profile.user,
        links: profile.visible_links(),
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| page_detail(v, ctx.color),
        |v| {
            v.links
                .iter()
                .map(|l| l.url.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Track a click and print the destination. Tracking failures still
/// yield the link's own URL.
pub async fn open(ctx: &Context, args: OpenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let link = match args.user {
        Some(ref username) => {
            let profile = load(ctx, username, global).await?;
            profile
                .visible_links()
                .into_iter()
                .find(|l| l.id == args.link_id)
                .cloned()
        }
        None => {
            util::require_user(ctx, global).await?;
            let store = ctx.app.links();
            util::with_spinner(global, "Loading links…", store.fetch_links(&ctx.cancel)).await?;
            store.get(&args.link_id).map(|l| (*l).clone())
        }
    };
    let link = link.ok_or_else(|| CliError::NotFound {
        resource_type: "link".into(),
        identifier: args.link_id.clone(),
        list_command: args
            .user
            .as_ref()
            .map_or_else(|| "links list".into(), |u| format!("public {u}")),
    })?;

    let destination = ctx.app.follow(&link, &ctx.cancel).await?;
    output::print_output(&destination, global.quiet);
    Ok(())
}

async fn load(ctx: &Context, username: &str, global: &GlobalOpts) -> Result<PublicProfile, CliError> {
    let profile = util::with_spinner(
        global,
        "Loading page…",
        ctx.app.public_profile(username, &ctx.cancel),
    )
    .await
    .map_err(|e| match CliError::from(e) {
        CliError::ApiError {
            status: Some(404), ..
        } => CliError::NotFound {
            resource_type: "user".into(),
            identifier: username.into(),
            list_command: "public <username>".into(),
        },
        other => other,
    })?;
    Ok(profile)
}
