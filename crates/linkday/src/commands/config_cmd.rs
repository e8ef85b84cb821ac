//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde::Serialize;

use linkday_api::DEFAULT_API_URL;
use linkday_config::{self as config, Config, CredentialBackend, Profile};
use linkday_core::DEFAULT_APP_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::context::{Paths, available_profiles};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

fn prompt_url(prompt: &str, default: &str) -> Result<String, CliError> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(default.into())
        .validate_with(|s: &String| {
            url::Url::parse(s)
                .map(|_| ())
                .map_err(|e| format!("not a URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;
    Ok(raw)
}

#[derive(Serialize)]
struct PathsView {
    config: String,
    data: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let paths = Paths::resolve(global);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            eprintln!("✨ LinkDay CLI configuration wizard");
            eprintln!("   Config path: {}\n", paths.config.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(config::DEFAULT_PROFILE.into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url = prompt_url("Backend URL", DEFAULT_API_URL)?;
            let app_url = prompt_url("Public page URL", DEFAULT_APP_URL)?;

            let store_choices = &[
                "File in the profile's data directory",
                "System keyring",
            ];
            let credential_store = match Select::new()
                .with_prompt("Where should the sign-in token be kept?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
            {
                0 => CredentialBackend::File,
                _ => CredentialBackend::Keyring,
            };

            let mut cfg = config::load_config_from(&paths.config).unwrap_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    api_url,
                    app_url,
                    credential_store,
                    timeout: None,
                },
            );
            cfg.default_profile = Some(profile_name.clone());
            config::save_config_to(&cfg, &paths.config)?;

            eprintln!("\n✓ Configuration written to {}", paths.config.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: linkday login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = paths.load()?;
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.active_profile_name(global.profile.as_deref())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            let view = PathsView {
                config: paths.config.display().to_string(),
                data: paths.data.display().to_string(),
            };
            let out = output::render_single(
                &global.output,
                &view,
                |v| format!("config: {}\ndata:   {}", v.config, v.data),
                |v| v.config.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetDefault <name> ───────────────────────────────────────
        ConfigCommand::SetDefault { name } => {
            let mut cfg = paths.load()?;
            if name != config::DEFAULT_PROFILE && !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config_to(&cfg, &paths.config)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}
