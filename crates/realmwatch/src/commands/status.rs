//! `status`: decide the branding mode once.

use serde::Serialize;
use tracing::warn;

use realmwatch_config::Config;
use realmwatch_core::{DecisionReason, Mode, PermissionState, ProbeRealmSource};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct StatusReport {
    mode: Mode,
    reason: DecisionReason,
    on_wifi: bool,
    connectivity: String,
    realm: Option<String>,
    brand_domain: String,
    reachability_url: String,
    permission: PermissionState,
    needs_permission_prompt: bool,
}

pub async fn handle(
    args: StatusArgs,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let engine_config = util::engine_config(config, &args.decision)?;
    let brand_domain = engine_config.brand_domain.clone();
    let reachability_url = engine_config.reachability_url.to_string();

    let realm = match args.decision.realm {
        Some(realm) => Some(realm),
        None => fetch_configured_realm(config).await?,
    };
    let on_wifi = args.decision.wifi.unwrap_or_else(util::detect_wifi);

    let engine = util::engine_builder(engine_config, config)?.spawn();
    engine.on_connectivity_changed(on_wifi);
    if let Some(realm) = &realm {
        engine.on_realm_observed(Some(realm.clone()));
    }
    engine.settled().await?;

    let snapshot = engine.snapshot();
    let permission = engine.permission().current_status();
    let report = StatusReport {
        mode: snapshot.mode,
        reason: snapshot.reason,
        on_wifi,
        connectivity: engine.connectivity_description(),
        realm,
        brand_domain,
        reachability_url,
        permission,
        needs_permission_prompt: permission.needs_prompt(),
    };
    engine.shutdown().await;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            vec![
                ("Mode", output::paint_mode(r.mode, color)),
                ("Reason", r.reason.to_string()),
                ("Connectivity", r.connectivity.clone()),
                ("Realm", r.realm.clone().unwrap_or_else(|| "-".into())),
                ("Brand domain", r.brand_domain.clone()),
                ("Reachability URL", r.reachability_url.clone()),
                ("Permission", r.permission.to_string()),
                ("Needs prompt", output::paint_flag(r.needs_permission_prompt, color)),
            ]
        },
        |r| r.mode.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// One realm reading from the configured probe source, if any.
///
/// A failed fetch is not fatal: the decision falls back to the
/// reachability heuristic.
async fn fetch_configured_realm(config: &Config) -> Result<Option<String>, CliError> {
    let Some(probe) = config.probe_realm_config()? else {
        return Ok(None);
    };
    let source = ProbeRealmSource::new(&probe)?;
    match source.fetch_once().await {
        Ok(realm) => Ok(Some(realm)),
        Err(e) => {
            warn!(url = %probe.url, error = %e, "realm fetch failed, deciding without a realm");
            Ok(None)
        }
    }
}
