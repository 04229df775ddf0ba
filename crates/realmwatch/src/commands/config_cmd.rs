//! Config subcommand handlers.

use std::path::Path;

use dialoguer::{Input, Select};

use realmwatch_config::{Config, RealmSourceKind, load_config_from, save_config_to};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = util::resolve_config_path(global);
    match args.command {
        ConfigCommand::Init { defaults, force } => init(&path, defaults, force, global.quiet),
        ConfigCommand::Show => show(&path, global),
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}

fn show(path: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config_from(path)?;
    let out = match global.output {
        OutputFormat::Json => output::render_json_pretty(&cfg),
        OutputFormat::JsonCompact => output::render_json_compact(&cfg),
        OutputFormat::Yaml => output::render_yaml(&cfg),
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)?,
    };
    output::print_output(out.trim_end(), global.quiet);
    Ok(())
}

fn init(path: &Path, defaults: bool, force: bool, quiet: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::ConfigExists {
            path: path.display().to_string(),
        });
    }

    let cfg = if defaults {
        Config::default()
    } else {
        eprintln!("realmwatch configuration");
        eprintln!("   Config path: {}\n", path.display());
        prompt_config()?
    };
    cfg.validate()?;
    save_config_to(&cfg, path)?;

    if !quiet {
        eprintln!("Configuration saved to {}", path.display());
    }
    Ok(())
}

fn prompt_config() -> Result<Config, CliError> {
    let mut cfg = Config::default();

    cfg.engine.brand_domain = Input::new()
        .with_prompt("Brand domain")
        .default(cfg.engine.brand_domain.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.engine.reachability_url = Input::new()
        .with_prompt("Reachability URL")
        .default(cfg.engine.reachability_url.clone())
        .validate_with(|raw: &String| util::parse_url("reachability_url", raw).map(|_| ()))
        .interact_text()
        .map_err(prompt_err)?;

    let source_choices = &[
        "None (decide from reachability only)",
        "Poll a realm probe server",
    ];
    let selection = Select::new()
        .with_prompt("Realm source")
        .items(source_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 1 {
        cfg.realm_source.kind = RealmSourceKind::Probe;
        let url: String = Input::new()
            .with_prompt("Realm probe URL")
            .default(format!("http://127.0.0.1:{}/realm", cfg.server.port))
            .validate_with(|raw: &String| util::parse_url("realm_source.url", raw).map(|_| ()))
            .interact_text()
            .map_err(prompt_err)?;
        cfg.realm_source.url = Some(url);
    }

    cfg.server.port = Input::new()
        .with_prompt("Probe server port")
        .default(cfg.server.port)
        .interact_text()
        .map_err(prompt_err)?;

    Ok(cfg)
}
