//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use riverlink_api::transport::{DEFAULT_API_VERSION, DEFAULT_PORT};
use riverlink_core::config::DEFAULT_HOST;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("riverlink configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let host: String = Input::new()
                .with_prompt("BlueRiver API host")
                .default(DEFAULT_HOST.into())
                .interact_text()
                .map_err(prompt_err)?;

            let port: u16 = Input::new()
                .with_prompt("Port")
                .default(DEFAULT_PORT)
                .interact_text()
                .map_err(prompt_err)?;

            let api_version: String = Input::new()
                .with_prompt("API version")
                .default(DEFAULT_API_VERSION.into())
                .interact_text()
                .map_err(prompt_err)?;

            let make_default = cfg.profiles.is_empty()
                || Confirm::new()
                    .with_prompt(format!("Make '{profile_name}' the default profile?"))
                    .default(true)
                    .interact()
                    .map_err(prompt_err)?;

            let profile = Profile {
                host: host.trim().to_string(),
                port,
                api_version: api_version.trim().to_string(),
                ..Profile::default()
            };
            // Surface bad values now rather than on first use.
            config::resolve_profile(&profile, &cfg.defaults, global)?;

            cfg.profiles.insert(profile_name.clone(), profile);
            if make_default {
                cfg.default_profile = Some(profile_name.clone());
            }
            let path = config::save_config(&cfg)?;

            eprintln!("\n   Profile '{profile_name}' saved to {}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = match global.output {
                OutputFormat::Json => output::render_json_pretty(&cfg),
                OutputFormat::JsonCompact => output::render_json_compact(&cfg),
                OutputFormat::Yaml => output::render_yaml(&cfg),
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Validation {
                        field: "config".into(),
                        reason: e.to_string(),
                    })?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
