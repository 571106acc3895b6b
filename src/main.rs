use std::path::PathBuf;
use std::process::ExitCode;

use openmrs_server_lib::{init_tracing, ServerManager, ServerResult, ServerSummary};

/// Overrides the default `~/openmrs` servers root.
const SERVERS_DIR_ENV: &str = "OPENMRS_SERVERS_DIR";

fn main() -> ExitCode {
    init_tracing();

    let manager = match std::env::var_os(SERVERS_DIR_ENV) {
        Some(dir) => ServerManager::new(PathBuf::from(dir)),
        None => ServerManager::with_default_root(),
    };
    tracing::debug!("Servers root: {:?}", manager.servers_dir());

    match run(&manager, std::env::args().nth(1).as_deref()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Describe one server, or every server under the root.
fn run(manager: &ServerManager, server_id: Option<&str>) -> ServerResult<String> {
    let json = match server_id {
        Some(id) => serde_json::to_string_pretty(&manager.load(id)?.summary()?)?,
        None => {
            let summaries = manager
                .list()?
                .iter()
                .map(|server| server.summary())
                .collect::<ServerResult<Vec<ServerSummary>>>()?;
            serde_json::to_string_pretty(&summaries)?
        }
    };
    Ok(json)
}
