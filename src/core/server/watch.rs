use tracing::debug;

use crate::core::error::ServerResult;
use crate::core::project::Project;
use crate::core::properties::{decode_list, encode_list};

use super::model::{Server, ServerKey};

impl Server {
    /// Watched projects in insertion order, without duplicates.
    pub fn watched_projects(&self) -> ServerResult<Vec<Project>> {
        let Some(raw) = self.get(ServerKey::WatchedProjects) else {
            return Ok(Vec::new());
        };

        let mut projects: Vec<Project> = Vec::new();
        for project in decode_list::<Project>(raw)? {
            if !projects.contains(&project) {
                projects.push(project);
            }
        }
        Ok(projects)
    }

    pub fn has_watched_projects(&self) -> ServerResult<bool> {
        Ok(!self.watched_projects()?.is_empty())
    }

    /// Returns `false` if the exact project was already watched.
    pub fn add_watched_project(&mut self, project: Project) -> ServerResult<bool> {
        let mut projects = self.watched_projects()?;
        if projects.contains(&project) {
            return Ok(false);
        }
        debug!("Watching project {}", project);
        projects.push(project);
        self.set_watched_projects(&projects);
        Ok(true)
    }

    /// Remove the exact project if watched, otherwise the first one with the
    /// same group and artifact id. Returns the removed entry.
    pub fn remove_watched_project_by_example(
        &mut self,
        example: &Project,
    ) -> ServerResult<Option<Project>> {
        let mut projects = self.watched_projects()?;
        let idx = projects
            .iter()
            .position(|p| p == example)
            .or_else(|| projects.iter().position(|p| p.matches(example)));

        let Some(idx) = idx else {
            return Ok(None);
        };
        let removed = projects.remove(idx);
        self.set_watched_projects(&projects);
        debug!("Stopped watching project {}", removed);
        Ok(Some(removed))
    }

    pub fn clear_watched_projects(&mut self) {
        self.set_watched_projects(&[]);
    }

    fn set_watched_projects(&mut self, projects: &[Project]) {
        if projects.is_empty() {
            self.remove_param(ServerKey::WatchedProjects.as_str());
        } else {
            self.set(ServerKey::WatchedProjects, encode_list(projects));
        }
    }
}
