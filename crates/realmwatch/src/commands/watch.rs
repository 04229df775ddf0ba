//! `watch`: follow mode decisions as inputs change.
//!
//! Prints one line per settled decision. Snapshots with a probe still in
//! flight are skipped; `mode` does not move until the probe answers.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info};

use realmwatch_config::Config;
use realmwatch_core::{
    DecisionReason, Mode, ModeEngine, ModeSnapshot, PollingPathObserver, ProbeRealmConfig,
    ProbeRealmSource,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct WatchEvent {
    timestamp: String,
    mode: Mode,
    reason: DecisionReason,
    connectivity: String,
}

pub async fn handle(args: WatchArgs, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let engine_config = util::engine_config(config, &args.decision)?;
    let mut builder = util::engine_builder(engine_config, config)?;

    if args.decision.wifi.is_none() {
        builder = builder.path_observer(PollingPathObserver::new(config.path_poll_interval()));
    }
    if let Some(probe) = realm_probe_config(&args, config)? {
        info!(url = %probe.url, "polling realm probe server");
        builder = builder.realm_source(ProbeRealmSource::new(&probe)?);
    }

    let engine = builder.spawn();
    if let Some(on_wifi) = args.decision.wifi {
        engine.on_connectivity_changed(on_wifi);
    }
    if let Some(realm) = args.decision.realm.clone() {
        engine.on_realm_observed(Some(realm));
    }

    let result = follow(&engine, &args, global).await;
    engine.shutdown().await;
    result
}

/// `--realm-url` wins over `[realm_source]`; its other settings still apply.
fn realm_probe_config(
    args: &WatchArgs,
    config: &Config,
) -> Result<Option<ProbeRealmConfig>, CliError> {
    let configured = config.probe_realm_config()?;
    let Some(raw) = &args.realm_url else {
        return Ok(configured);
    };
    let url = util::parse_url("realm-url", raw)?;
    Ok(Some(match configured {
        Some(probe) => ProbeRealmConfig { url, ..probe },
        None => ProbeRealmConfig::new(url),
    }))
}

async fn follow(
    engine: &ModeEngine,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut reevaluate = match args.reevaluate_secs {
        Some(0) => {
            return Err(CliError::Validation {
                field: "reevaluate-secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Some(secs) => Some(tokio::time::interval(Duration::from_secs(secs))),
        None => None,
    };
    let color = output::should_color(&global.color);

    engine.settled().await?;
    let mut updates = engine.subscribe().into_stream();
    let Some(mut last) = updates.next().await else {
        return Err(CliError::EngineStopped);
    };
    emit(engine, last, &global.output, color, global.quiet);

    let mut printed = 0usize;
    loop {
        if args.count.is_some_and(|n| printed >= n) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            next = updates.next() => {
                let Some(snap) = next else {
                    return Err(CliError::EngineStopped);
                };
                if is_new_decision(last, snap) {
                    last = snap;
                    printed += 1;
                    emit(engine, snap, &global.output, color, global.quiet);
                }
            }
            () = tick(reevaluate.as_mut()) => {
                debug!("periodic re-evaluation");
                engine.on_activity_resumed();
            }
        }
    }
    Ok(())
}

/// A settled snapshot whose mode or reason differs from the last one printed.
fn is_new_decision(last: ModeSnapshot, snap: ModeSnapshot) -> bool {
    !snap.probe_pending && (snap.mode, snap.reason) != (last.mode, last.reason)
}

async fn tick(interval: Option<&mut tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn emit(engine: &ModeEngine, snap: ModeSnapshot, format: &OutputFormat, color: bool, quiet: bool) {
    let event = WatchEvent {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        mode: snap.mode,
        reason: snap.reason,
        connectivity: engine.connectivity_description(),
    };
    let line = match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(&event),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(&event).trim_end()),
        OutputFormat::Plain => format!("{}\t{}\t{}", event.timestamp, event.mode, event.reason),
        OutputFormat::Table => {
            let timestamp = if color {
                event.timestamp.dimmed().to_string()
            } else {
                event.timestamp.clone()
            };
            let reason = event.reason.to_string();
            format!(
                "{timestamp}  {:<8}  {reason:<16}  {}",
                output::paint_mode(event.mode, color),
                event.connectivity
            )
        }
    };
    output::print_output(&line, quiet);
}
