use serde::{Deserialize, Serialize};
use std::fmt;

/// A local source project watched for rebuild-and-redeploy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Project {
    pub group_id: String,
    pub artifact_id: String,
    pub path: String,
}

impl Project {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            path: path.into(),
        }
    }

    /// Same group and artifact id, wherever the project lives on disk.
    pub fn matches(&self, other: &Project) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.group_id, self.artifact_id, self.path)
    }
}
