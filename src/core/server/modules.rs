use std::path::Path;

use tracing::{debug, warn};

use crate::core::error::ServerResult;
use crate::core::maven::{classify_file, Artifact};
use crate::core::properties::{decode_list, encode_record};

use super::model::{Server, ServerKey};

impl Server {
    /// Record a user-requested module, stored by its bare module id.
    pub fn save_user_module(&mut self, artifact: &Artifact) {
        let record = Artifact::new(
            artifact.group_id.as_str(),
            artifact.module_id(),
            artifact.version.as_str(),
        );
        self.add_to_value_list(ServerKey::UserModules.as_str(), &encode_record(&record));
    }

    /// Remove a user module. Returns whether it was recorded.
    pub fn remove_user_module(&mut self, artifact: &Artifact) -> ServerResult<bool> {
        let wanted = Artifact::new(
            artifact.group_id.as_str(),
            artifact.module_id(),
            artifact.version.as_str(),
        );
        let mut modules = self.user_modules()?;
        let Some(idx) = modules.iter().position(|m| *m == wanted) else {
            return Ok(false);
        };
        modules.remove(idx);
        self.set_user_modules(&modules);
        Ok(true)
    }

    /// Replace the user module list.
    pub fn set_user_modules<'a, I>(&mut self, artifacts: I)
    where
        I: IntoIterator<Item = &'a Artifact>,
    {
        self.remove_param(ServerKey::UserModules.as_str());
        for artifact in artifacts {
            self.save_user_module(artifact);
        }
    }

    pub fn user_modules(&self) -> ServerResult<Vec<Artifact>> {
        match self.get(ServerKey::UserModules) {
            Some(raw) => decode_list(raw),
            None => Ok(Vec::new()),
        }
    }

    /// Artifacts installed in the server directory and its `modules/` folder.
    pub fn server_modules(&self) -> Vec<Artifact> {
        let mut artifacts = Vec::new();
        if let Some(server_dir) = self.server_directory() {
            artifacts.extend(artifacts_in_dir(server_dir));
        }
        if let Some(modules_dir) = self.server_modules_directory() {
            artifacts.extend(artifacts_in_dir(&modules_dir));
        }
        artifacts
    }
}

fn artifacts_in_dir(dir: &Path) -> Vec<Artifact> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping artifact scan of {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error reading an entry in {:?}: {}. Skipping.", dir, e);
                continue;
            }
        };
        if !entry.path().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(artifact) = classify_file(&file_name).into_installed_artifact(&file_name) {
            artifacts.push(artifact);
        }
    }

    artifacts.sort_by(|a, b| a.dest_file_name.cmp(&b.dest_file_name));
    debug!("Found {} artifacts in {:?}", artifacts.len(), dir);
    artifacts
}
