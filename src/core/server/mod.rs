pub mod manager;
pub mod model;
mod modules;
mod summary;
mod watch;

pub use manager::{default_servers_dir, ServerManager, DEFAULT_SERVERS_DIR_NAME};
pub use model::{
    Server, ServerBuilder, ServerKey, ServerPaths, BACKUP_PROPERTIES_FILE_NAME, MODULES_DIR_NAME,
    PROPERTIES_FILE_NAME, TMP_DIR_NAME,
};
pub use summary::ServerSummary;
