//! Command dispatch: bridges CLI args -> engine/config -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod fetch;
pub mod serve;
pub mod status;
pub mod util;
pub mod watch;

use realmwatch_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs the loaded configuration.
pub async fn dispatch(cmd: Command, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Serve(args) => serve::handle(args, config, global).await,
        Command::Check(args) => check::handle(args, config, global).await,
        Command::Fetch(args) => fetch::handle(args, config, global).await,
        Command::Status(args) => status::handle(args, config, global).await,
        Command::Watch(args) => watch::handle(args, config, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
