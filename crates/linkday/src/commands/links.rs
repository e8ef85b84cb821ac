//! Link command handlers.

use std::sync::Arc;

use tabled::Tabled;

use linkday_core::{CreateLinkRequest, Link, UpdateLinkRequest};

use crate::cli::{GlobalOpts, LinksArgs, LinksCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "#")]
    position: u32,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Clicks")]
    clicks: u64,
    #[tabled(rename = "Status")]
    status: String,
}

impl LinkRow {
    fn new(link: &Link, color: bool) -> Self {
        Self {
            position: link.order.saturating_add(1),
            id: link.id.clone(),
            title: link.title.clone(),
            url: link.url.clone(),
            clicks: link.clicks,
            status: output::visibility(link.is_active, color),
        }
    }
}

/// Table of `links` for embedding in detail views.
pub fn table(links: &[Arc<Link>], color: bool) -> String {
    let rows: Vec<LinkRow> = links.iter().map(|l| LinkRow::new(l, color)).collect();
    output::render_table(&rows)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: LinksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_user(ctx, global).await?;
    let store = ctx.app.links();

    // Mutations act on records the store already holds.
    util::with_spinner(global, "Loading links…", store.fetch_links(&ctx.cancel)).await?;

    match args.command {
        LinksCommand::List => {}

        LinksCommand::Add {
            title,
            url,
            description,
            icon,
        } => {
            let request = CreateLinkRequest {
                title,
                url,
                description,
                icon,
            };
            let link = util::with_spinner(
                global,
                "Adding link…",
                store.create_link(&request, &ctx.cancel),
            )
            .await?;
            util::notice(global, &format!("✓ Added '{}' ({})", link.title, link.id));
        }

        LinksCommand::Edit {
            id,
            title,
            url,
            description,
            icon,
            active,
        } => {
            let patch = UpdateLinkRequest {
                title,
                url,
                description,
                icon,
                is_active: active,
            };
            let link = util::with_spinner(
                global,
                "Saving link…",
                store.update_link(&id, &patch, &ctx.cancel),
            )
            .await?;
            util::notice(global, &format!("✓ Updated '{}'", link.title));
        }

        LinksCommand::Toggle { id } => {
            let link = util::with_spinner(
                global,
                "Saving link…",
                store.toggle_active(&id, &ctx.cancel),
            )
            .await?;
            let state = if link.is_active { "shown" } else { "hidden" };
            util::notice(global, &format!("✓ '{}' is now {state}", link.title));
        }

        LinksCommand::Rm { id } => {
            let link = store.get(&id).ok_or_else(|| CliError::NotFound {
                resource_type: "link".into(),
                identifier: id.clone(),
                list_command: "links list".into(),
            })?;
            if !util::confirm(&format!("Delete link '{}'?", link.title), global.yes)? {
                return Ok(());
            }
            util::with_spinner(global, "Deleting link…", store.delete_link(&id, &ctx.cancel))
                .await?;
            util::notice(global, &format!("✓ Deleted '{}'", link.title));
        }

        LinksCommand::Reorder { ids } => {
            util::with_spinner(
                global,
                "Saving order…",
                store.reorder_links(&ids, &ctx.cancel),
            )
            .await?;
            util::notice(global, "✓ Order saved");
        }
    }

    let snap = store.snapshot();
    let out = output::render_list(
        &global.output,
        snap.as_slice(),
        |l| LinkRow::new(l, ctx.color),
        |l| l.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
