//! Clap derive structures for the `linkday` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use linkday_core::Theme;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// linkday -- manage your link-in-bio page from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "linkday",
    version,
    about = "Manage your LinkDay link-in-bio page from the command line",
    long_about = "Manage your LinkDay link-in-bio page from the command line.\n\n\
        Sign in to a LinkDay backend, curate the ordered list of links on your\n\
        public page, check click analytics and browse other users' pages.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Deployment profile to use
    #[arg(long, short = 'p', env = "LINKDAY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, env = "LINKDAY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LINKDAY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "LINKDAY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Config file to read instead of the platform default
    #[arg(long, env = "LINKDAY_CONFIG", global = true, hide = true)]
    pub config: Option<PathBuf>,

    /// Directory holding per-profile credential and session files
    #[arg(long, env = "LINKDAY_DATA_DIR", global = true, hide = true)]
    pub data_dir: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login(LoginArgs),

    /// Create an account and sign in
    #[command(alias = "signup")]
    Register(RegisterArgs),

    /// Sign out and forget the stored credential
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Overview of your page: totals and most recent links
    #[command(alias = "dash")]
    Dashboard,

    /// Manage the links on your page
    #[command(alias = "l")]
    Links(LinksArgs),

    /// Click statistics for your links
    #[command(alias = "stats")]
    Analytics,

    /// View and edit your profile
    Profile(ProfileArgs),

    /// View someone's public page
    #[command(alias = "u")]
    Public {
        /// Username whose page to show
        username: String,
    },

    /// Record a click on a link and print where it leads
    Open(OpenArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Display name (prompted when omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Username for your public page (prompted when omitted)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub password_stdin: bool,
}

// ── Links ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LinksArgs {
    #[command(subcommand)]
    pub command: LinksCommand,
}

#[derive(Debug, Subcommand)]
pub enum LinksCommand {
    /// List your links in page order
    #[command(alias = "ls")]
    List,

    /// Add a link to the end of your page
    #[command(alias = "create")]
    Add {
        /// Link title
        title: String,
        /// Destination URL
        url: String,
        /// Short description shown under the title
        #[arg(long, short = 'd')]
        description: Option<String>,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
    },

    /// Edit fields of a link
    Edit {
        /// Link ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, short = 'd')]
        description: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// Show or hide the link on your public page
        #[arg(long)]
        active: Option<bool>,
    },

    /// Flip a link between shown and hidden
    Toggle {
        /// Link ID
        id: String,
    },

    /// Delete a link
    #[command(alias = "delete")]
    Rm {
        /// Link ID
        id: String,
    },

    /// Set the page order; every link ID exactly once, first to last
    Reorder {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show your profile and public page URL
    Show,

    /// Update display fields
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// light, dark or colorful
        #[arg(long)]
        theme: Option<Theme>,
        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Change your username (moves your public page)
    Username {
        /// New username
        username: String,
    },
}

// ── Open ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Link ID
    pub link_id: String,

    /// Look the link up on this user's public page instead of your own
    #[arg(long, short = 'u')]
    pub user: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display the effective configuration
    Show,

    /// Print the config file and data directory locations
    Path,

    /// Make a profile the default
    SetDefault {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
