use std::path::PathBuf;

use serde::Serialize;

use super::model::Server;
use crate::core::error::ServerResult;
use crate::core::maven::Artifact;
use crate::core::project::Project;

/// Read-only snapshot of a server for display.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSummary {
    pub server_id: Option<String>,
    pub server_dir: Option<PathBuf>,
    pub version: Option<String>,
    pub platform_version: Option<String>,
    pub distro: Option<String>,
    pub db_driver: Option<String>,
    pub db_uri: Option<String>,
    pub include_demo_data: bool,
    pub user_modules: Vec<Artifact>,
    pub installed_artifacts: Vec<Artifact>,
    pub watched_projects: Vec<Project>,
}

impl Server {
    pub fn summary(&self) -> ServerResult<ServerSummary> {
        let distro = match (self.distro_group_id(), self.distro_artifact_id()) {
            (Some(group), Some(artifact)) => Some(format!("{group}:{artifact}")),
            (None, Some(artifact)) => Some(artifact.to_string()),
            _ => None,
        };

        Ok(ServerSummary {
            server_id: self.server_id().map(str::to_string),
            server_dir: self.server_directory().map(|p| p.to_path_buf()),
            version: self.version().map(str::to_string),
            platform_version: self.platform_version().map(str::to_string),
            distro,
            db_driver: self.db_driver().map(str::to_string),
            db_uri: self.db_uri().map(str::to_string),
            include_demo_data: self.is_include_demo_data(),
            user_modules: self.user_modules()?,
            installed_artifacts: self.server_modules(),
            watched_projects: self.watched_projects()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_to_json() {
        let mut server = Server::create("/servers/demo");
        server.set_server_id("demo");
        server.set_distro_group_id("org.openmrs.distro");
        server.set_distro_artifact_id("referenceapplication-package");
        server.save_user_module(&Artifact::module("atlas", "1.9"));
        server
            .add_watched_project(Project::new("org.openmrs.module", "appui", "/src/appui"))
            .unwrap();

        let summary = server.summary().unwrap();
        assert_eq!(
            summary.distro.as_deref(),
            Some("org.openmrs.distro:referenceapplication-package")
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["server_id"], "demo");
        assert_eq!(json["user_modules"][0]["artifact_id"], "atlas");
        assert_eq!(json["user_modules"][0]["artifact_type"], "jar");
        assert_eq!(json["watched_projects"][0]["path"], "/src/appui");
        assert_eq!(json["installed_artifacts"], serde_json::json!([]));
    }
}
