//! `check`: one-shot reachability probes.

use std::time::Instant;

use futures_util::future::join_all;
use serde::Serialize;
use tabled::Tabled;

use realmwatch_api::ReachabilityProbe;
use realmwatch_config::Config;
use realmwatch_core::EngineConfig;

use crate::cli::{CheckArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct CheckReport {
    endpoint: String,
    reachable: bool,
    status: Option<u16>,
    elapsed_ms: u64,
    error: Option<String>,
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Reachable")]
    reachable: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Time")]
    elapsed: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl CheckRow {
    fn new(r: &CheckReport, color: bool) -> Self {
        Self {
            endpoint: r.endpoint.clone(),
            reachable: output::paint_flag(r.reachable, color),
            status: r.status.map(|s| s.to_string()).unwrap_or_default(),
            elapsed: format!("{}ms", r.elapsed_ms),
            error: r.error.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: CheckArgs, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let base = config.engine_config()?;
    let settings = EngineConfig {
        probe_timeout: util::timeout_override(args.timeout_ms)?.unwrap_or(base.probe_timeout),
        tls: util::tls_override(base.tls.clone(), args.insecure),
        ..base
    };

    let urls = if args.urls.is_empty() {
        vec![settings.reachability_url.clone()]
    } else {
        args.urls
            .iter()
            .map(|raw| util::parse_url("url", raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    let transport = settings.transport();
    let probes = urls
        .into_iter()
        .map(|url| {
            let label = url.to_string();
            ReachabilityProbe::new(url, &transport).map_err(|e| CliError::from_api(e, &label))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let reports = join_all(probes.iter().map(run_check)).await;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &reports,
        |r| CheckRow::new(r, color),
        |r| format!("{}\t{}", r.endpoint, if r.reachable { "reachable" } else { "unreachable" }),
    );
    output::print_output(&out, global.quiet);

    match reports.into_iter().find(|r| !r.reachable) {
        Some(failed) => Err(CliError::Unreachable {
            url: failed.endpoint,
            reason: failed.error.unwrap_or_else(|| "no response".into()),
        }),
        None => Ok(()),
    }
}

async fn run_check(probe: &ReachabilityProbe) -> CheckReport {
    let started = Instant::now();
    let result = probe.check().await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let endpoint = probe.endpoint().to_string();

    match result {
        Ok(status) => CheckReport {
            endpoint,
            reachable: true,
            status: Some(status.as_u16()),
            elapsed_ms,
            error: None,
        },
        Err(e) => CheckReport {
            endpoint,
            reachable: false,
            status: e.status(),
            elapsed_ms,
            error: Some(e.to_string()),
        },
    }
}
