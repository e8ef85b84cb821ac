//! Command dispatch: bridges CLI args -> core stores -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod links;
pub mod profile;
pub mod public;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::context::Context;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args, global).await,
        Command::Register(args) => auth::register(ctx, args, global).await,
        Command::Logout => auth::logout(ctx, global),
        Command::Whoami => auth::whoami(ctx, global).await,
        Command::Dashboard => dashboard::handle(ctx, global).await,
        Command::Analytics => dashboard::analytics(ctx, global).await,
        Command::Links(args) => links::handle(ctx, args, global).await,
        Command::Profile(args) => profile::handle(ctx, args, global).await,
        Command::Public { username } => public::show(ctx, &username, global).await,
        Command::Open(args) => public::open(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
