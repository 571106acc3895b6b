use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::model::Server;
use crate::core::error::{ServerError, ServerResult};

/// Directory under the user's home that holds all SDK servers.
pub const DEFAULT_SERVERS_DIR_NAME: &str = "openmrs";

/// `~/openmrs`, or `./openmrs` when the home directory is unknown.
pub fn default_servers_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_SERVERS_DIR_NAME)
}

/// Locates servers by id under a single root directory.
#[derive(Debug, Clone)]
pub struct ServerManager {
    /// Root directory where all servers live.
    servers_dir: PathBuf,
}

impl ServerManager {
    pub fn new(servers_dir: impl Into<PathBuf>) -> Self {
        Self {
            servers_dir: servers_dir.into(),
        }
    }

    pub fn with_default_root() -> Self {
        Self::new(default_servers_dir())
    }

    pub fn servers_dir(&self) -> &Path {
        &self.servers_dir
    }

    pub fn server_dir(&self, server_id: &str) -> PathBuf {
        self.servers_dir.join(server_id)
    }

    pub fn has_server_config(&self, server_id: &str) -> bool {
        Server::has_server_config(&self.server_dir(server_id))
    }

    /// A new, unsaved server with its id set.
    pub fn create(&self, server_id: &str) -> ServerResult<Server> {
        let dir = self.server_dir(server_id);
        if Server::has_server_config(&dir) {
            return Err(ServerError::ServerAlreadyExists(server_id.to_string()));
        }

        let mut server = Server::create(dir);
        server.set_server_id(server_id);
        info!("Created server '{}'", server_id);
        Ok(server)
    }

    pub fn load(&self, server_id: &str) -> ServerResult<Server> {
        Server::load(&self.server_dir(server_id))
    }

    /// Ids of every directory under the root that holds a server config.
    pub fn server_ids(&self) -> ServerResult<Vec<String>> {
        let mut ids = Vec::new();

        if !self.servers_dir.exists() {
            return Ok(ids);
        }

        let entries = std::fs::read_dir(&self.servers_dir)
            .map_err(|e| ServerError::io(&self.servers_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| ServerError::io(&self.servers_dir, e))?;
            let path = entry.path();
            if !path.is_dir() || !Server::has_server_config(&path) {
                continue;
            }
            if let Some(id) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(id.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Load every server. Unreadable configurations are skipped.
    pub fn list(&self) -> ServerResult<Vec<Server>> {
        let mut servers = Vec::new();
        for id in self.server_ids()? {
            match self.load(&id) {
                Ok(server) => servers.push(server),
                Err(e) => warn!("Cannot load server '{}': {}", id, e),
            }
        }
        Ok(servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_load() {
        let root = tempfile::tempdir().unwrap();
        let manager = ServerManager::new(root.path());

        let mut server = manager.create("demo").unwrap();
        assert_eq!(server.server_id(), Some("demo"));
        assert!(!manager.has_server_config("demo"));

        server.save().unwrap();
        assert!(manager.has_server_config("demo"));
        assert_eq!(manager.load("demo").unwrap().server_id(), Some("demo"));

        assert!(matches!(
            manager.create("demo"),
            Err(ServerError::ServerAlreadyExists(_))
        ));
    }

    #[test]
    fn list_skips_directories_without_config() {
        let root = tempfile::tempdir().unwrap();
        let manager = ServerManager::new(root.path());
        for id in ["b", "a"] {
            manager.create(id).unwrap().save().unwrap();
        }
        std::fs::create_dir_all(root.path().join("not-a-server")).unwrap();
        std::fs::write(root.path().join("stray.txt"), b"x").unwrap();

        assert_eq!(manager.server_ids().unwrap(), vec!["a", "b"]);
        let servers = manager.list().unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].server_id(), Some("a"));
    }

    #[test]
    fn missing_root_lists_nothing() {
        let root = tempfile::tempdir().unwrap();
        let manager = ServerManager::new(root.path().join("absent"));
        assert!(manager.list().unwrap().is_empty());
        assert!(matches!(
            manager.load("demo"),
            Err(ServerError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn default_root_is_under_home() {
        assert!(default_servers_dir().ends_with(DEFAULT_SERVERS_DIR_NAME));
    }
}
