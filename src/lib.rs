pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{ServerError, ServerResult};
pub use crate::core::maven::{Artifact, ArtifactType};
pub use crate::core::project::Project;
pub use crate::core::server::{Server, ServerBuilder, ServerKey, ServerManager, ServerSummary};

/// Initialize structured logging. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,openmrs_server_lib=debug")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
