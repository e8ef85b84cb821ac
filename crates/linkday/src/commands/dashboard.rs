//! Dashboard and analytics handlers.

use std::fmt::Write;
use std::sync::Arc;

use serde::Serialize;

use linkday_core::{AnalyticsSummary, DashboardOverview, Link, User};

use crate::cli::GlobalOpts;
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::{links, util};

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView<'a> {
    user: &'a User,
    public_url: Option<String>,
    #[serde(flatten)]
    overview: &'a DashboardOverview,
}

fn dashboard_detail(view: &DashboardView<'_>, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        output::heading(&format!("Welcome back, {}", view.user.name), color)
    );
    if let Some(ref url) = view.public_url {
        let _ = writeln!(out, "Your page: {url}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  Total links:   {}", view.overview.total_links);
    let _ = writeln!(out, "  Total clicks:  {}", view.overview.total_clicks);

    if view.overview.recent_links.is_empty() {
        let _ = write!(out, "\nNo links yet. Add one with: linkday links add <title> <url>");
    } else {
        let _ = writeln!(out, "\n{}", output::heading("Recent links", color));
        let _ = write!(out, "{}", links::table(&view.overview.recent_links, color));
    }
    out
}

fn analytics_detail(summary: &AnalyticsSummary, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output::heading("Analytics", color));
    let _ = writeln!(out, "  Total clicks:     {}", summary.total_clicks);
    let _ = writeln!(out, "  Total links:      {}", summary.total_links);
    let _ = writeln!(out, "  Active links:     {}", summary.active_links);
    let _ = writeln!(out, "  Avg. per link:    {}", summary.average_clicks);

    if !summary.top_links.is_empty() {
        let _ = writeln!(out, "\n{}", output::heading("Top links", color));
        let _ = write!(out, "{}", links::table(&summary.top_links, color));
    }
    out
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let user = util::require_user(ctx, global).await?;
    fetch(ctx, global).await?;

    let overview = ctx.app.links().overview();
    let view = DashboardView {
        user: &user,
        public_url: ctx.app.public_url().and_then(Result::ok).map(String::from),
        overview: &overview,
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| dashboard_detail(v, ctx.color),
        |v| ids(&v.overview.recent_links),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn analytics(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_user(ctx, global).await?;
    fetch(ctx, global).await?;

    let summary = ctx.app.links().summary();
    let out = output::render_single(
        &global.output,
        &summary,
        |s| analytics_detail(s, ctx.color),
        |s| ids(&s.top_links),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn fetch(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    util::with_spinner(
        global,
        "Loading links…",
        ctx.app.links().fetch_links(&ctx.cancel),
    )
    .await?;
    Ok(())
}

fn ids(links: &[Arc<Link>]) -> String {
    links.iter().map(|l| l.id.as_str()).collect::<Vec<_>>().join("\n")
}
