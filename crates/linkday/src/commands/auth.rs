//! Sign-in, registration and sign-out handlers.

use linkday_core::validation::{validate_login, validate_registration};
use linkday_core::{GuardView, RegisterRequest, User};

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::{dashboard, profile, util};

// ── Handlers ────────────────────────────────────────────────────────

pub async fn login(ctx: &Context, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if already_signed_in(ctx) {
        return redirect_to_dashboard(ctx, global).await;
    }

    let email = util::text_or_prompt(args.email, "Email")?;
    let password = util::read_password(args.password_stdin)?;
    validate_login(&email, &password)?;

    let user = util::with_spinner(
        global,
        "Signing in…",
        ctx.app.session().login(&email, &password, &ctx.cancel),
    )
    .await?;

    util::notice(
        global,
        &format!("✓ Signed in as {} (profile '{}')", user.username, ctx.profile),
    );
    show_user(ctx, &user, global)
}

pub async fn register(
    ctx: &Context,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if already_signed_in(ctx) {
        return redirect_to_dashboard(ctx, global).await;
    }

    let request = RegisterRequest {
        name: util::text_or_prompt(args.name, "Name")?,
        email: util::text_or_prompt(args.email, "Email")?,
        username: util::text_or_prompt(args.username, "Username")?,
        password: util::read_password(args.password_stdin)?,
    };
    validate_registration(&request)?;

    let user = util::with_spinner(
        global,
        "Creating account…",
        ctx.app.session().register(&request, &ctx.cancel),
    )
    .await?;

    util::notice(global, &format!("✓ Welcome to LinkDay, {}", user.name));
    show_user(ctx, &user, global)
}

pub fn logout(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.app.logout()?;
    util::notice(global, "✓ Signed out");
    Ok(())
}

pub async fn whoami(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let user = util::require_user(ctx, global).await?;
    show_user(ctx, &user, global)
}

// ── Helpers ─────────────────────────────────────────────────────────

/// The auth pages send an authenticated session to the dashboard. A
/// session whose credential is gone signs in again instead.
fn already_signed_in(ctx: &Context) -> bool {
    let session = ctx.app.session();
    let view = ctx.app.auth_pages_guard().evaluate(&session.state());
    matches!(view, GuardView::Redirect(_)) && session.has_credential()
}

async fn redirect_to_dashboard(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(user) = ctx.app.session().user() {
        util::notice(
            global,
            &format!(
                "Already signed in as {}. Run `linkday logout` to switch accounts.",
                user.username
            ),
        );
    }
    dashboard::handle(ctx, global).await
}

fn show_user(ctx: &Context, user: &User, global: &GlobalOpts) -> Result<(), CliError> {
    let public_url = ctx
        .app
        .config()
        .public_profile_url(&user.username)
        .ok()
        .map(String::from);
    let out = output::render_single(
        &global.output,
        user,
        |u| profile::detail(u, public_url.as_deref(), ctx.color),
        |u| u.username.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
