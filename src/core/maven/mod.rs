mod artifact;
mod classify;
mod version;

pub use artifact::{Artifact, ArtifactType, GROUP_MODULE, GROUP_WEB, WEBAPP_ARTIFACT_ID};
pub use classify::{artifact_id, artifact_type, classify_file, FileClassification};
pub use version::parse_version_from_file;
