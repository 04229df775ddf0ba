//! `serve`: run the realm probe server until Ctrl-C.

use tracing::{info, warn};

use realmwatch_config::Config;

use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;
use crate::server;

pub async fn handle(args: ServeArgs, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let mut settings = config.server_config()?;

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(realm) = args.realm {
        let realm = realm.trim();
        if realm.is_empty() {
            return Err(CliError::Validation {
                field: "realm".into(),
                reason: "must not be empty".into(),
            });
        }
        settings.realm = realm.to_owned();
    }
    if let Some(bind) = args.bind {
        settings.bind = bind.parse().map_err(|_| CliError::Validation {
            field: "bind".into(),
            reason: format!("not an IP address: {bind}"),
        })?;
    }

    server::run(&settings, global.quiet, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
