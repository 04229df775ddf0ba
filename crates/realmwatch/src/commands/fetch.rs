//! `fetch`: read the realm from a realm probe server once.

use serde::Serialize;

use realmwatch_api::RealmProbeClient;
use realmwatch_config::Config;
use realmwatch_core::ProbeRealmConfig;

use crate::cli::{FetchArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct FetchReport {
    url: String,
    realm: String,
}

pub async fn handle(args: FetchArgs, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let configured = config.probe_realm_config()?;

    let url = match (&args.url, &configured) {
        (Some(raw), _) => util::parse_url("url", raw)?,
        (None, Some(probe)) => probe.url.clone(),
        (None, None) => {
            let server = config.server_config()?;
            util::parse_url("url", &format!("http://127.0.0.1:{}/realm", server.port))?
        }
    };

    let mut settings = configured.unwrap_or_else(|| ProbeRealmConfig::new(url.clone()));
    settings.url = url;
    if let Some(timeout) = util::timeout_override(args.timeout_ms)? {
        settings.fetch_timeout = timeout;
    }
    settings.tls = util::tls_override(settings.tls, args.insecure);

    let label = settings.url.to_string();
    let client =
        RealmProbeClient::new(&settings.transport()).map_err(|e| CliError::from_api(e, &label))?;
    let realm = client
        .fetch_realm(settings.url.as_str())
        .await
        .map_err(|e| CliError::from_api(e, &label))?;

    let report = FetchReport { url: label, realm };
    let out = output::render_single(
        &global.output,
        &report,
        |r| vec![("URL", r.url.clone()), ("Realm", r.realm.clone())],
        |r| r.realm.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
