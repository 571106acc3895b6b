// ─── Filename Classifier ───
// Derives artifact identity from the `<artifactId>-<version>.<type>` naming
// convention used for files dropped into a server directory.

use super::artifact::{Artifact, ArtifactType, GROUP_WEB, WEBAPP_ARTIFACT_ID};
use super::version::parse_version_from_file;

/// Result of classifying a single file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassification {
    pub artifact_id: String,
    pub artifact_type: ArtifactType,
    pub version: Option<String>,
}

/// Substring after the last `.`, or the whole name if there is none.
pub fn artifact_type(file_name: &str) -> ArtifactType {
    let ext = match file_name.rfind('.') {
        Some(idx) => &file_name[idx + 1..],
        None => file_name,
    };
    ArtifactType::from_extension(ext)
}

/// Substring before the first `-`, or the whole name if there is none.
///
/// The core web archive is shipped as `openmrs-<version>.war`, so the `openmrs`
/// prefix maps to the web application id instead.
pub fn artifact_id(file_name: &str) -> String {
    match file_name.split_once('-') {
        None => file_name.to_string(),
        Some(("openmrs", _)) => WEBAPP_ARTIFACT_ID.to_string(),
        Some((id, _)) => id.to_string(),
    }
}

pub fn classify_file(file_name: &str) -> FileClassification {
    FileClassification {
        artifact_id: artifact_id(file_name),
        artifact_type: artifact_type(file_name),
        version: parse_version_from_file(file_name),
    }
}

impl FileClassification {
    /// Build the installed artifact for `file_name`, or `None` when its
    /// extension is not one a server installs.
    pub fn into_installed_artifact(self, file_name: &str) -> Option<Artifact> {
        if !self.artifact_type.is_supported() {
            return None;
        }

        let artifact = Artifact::module(self.artifact_id, self.version.unwrap_or_default())
            .with_type(self.artifact_type)
            .with_dest_file_name(file_name);

        if artifact.is_webapp() {
            Some(artifact.with_group(GROUP_WEB))
        } else {
            Some(artifact)
        }
    }
}
