use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Default group for OpenMRS modules.
pub const GROUP_MODULE: &str = "org.openmrs.module";
/// Group assigned to web archives found in a server directory.
pub const GROUP_WEB: &str = "org.openmrs.web";
/// Artifact id of the core web application (`openmrs-<version>.war`).
pub const WEBAPP_ARTIFACT_ID: &str = "openmrs-webapp";

/// Packaging type of an installed artifact, derived from its file extension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Jar,
    War,
    Omod,
    Zip,
    /// Any extension without a dedicated variant, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

impl ArtifactType {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "jar" => ArtifactType::Jar,
            "war" => ArtifactType::War,
            "omod" => ArtifactType::Omod,
            "zip" => ArtifactType::Zip,
            other => ArtifactType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ArtifactType::Jar => "jar",
            ArtifactType::War => "war",
            ArtifactType::Omod => "omod",
            ArtifactType::Zip => "zip",
            ArtifactType::Other(ext) => ext.as_str(),
        }
    }

    /// Extensions a server directory scan reports as installed artifacts.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            ArtifactType::Jar | ArtifactType::War | ArtifactType::Omod
        )
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an installable unit: the core web application or a module.
///
/// Two artifacts are equal when group id, artifact id and version match.
/// `artifact_type` and `dest_file_name` describe how the artifact is
/// installed and take no part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub artifact_type: ArtifactType,
    pub dest_file_name: Option<String>,
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            artifact_type: ArtifactType::Jar,
            dest_file_name: None,
        }
    }

    /// An artifact in the default module group.
    pub fn module(artifact_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(GROUP_MODULE, artifact_id, version)
    }

    /// Return a new artifact with the group changed.
    pub fn with_group(&self, group_id: &str) -> Self {
        let mut clone = self.clone();
        clone.group_id = group_id.to_string();
        clone
    }

    /// Return a new artifact with the packaging type changed.
    pub fn with_type(&self, artifact_type: ArtifactType) -> Self {
        let mut clone = self.clone();
        clone.artifact_type = artifact_type;
        clone
    }

    /// Return a new artifact recording the file name it is installed under.
    pub fn with_dest_file_name(&self, file_name: &str) -> Self {
        let mut clone = self.clone();
        clone.dest_file_name = Some(file_name.to_string());
        clone
    }

    /// Artifact id with the `-omod` packaging suffix removed.
    ///
    /// Module projects publish `<name>-omod` artifacts, while the server
    /// records modules by their bare name.
    pub fn module_id(&self) -> &str {
        self.artifact_id
            .strip_suffix("-omod")
            .unwrap_or(&self.artifact_id)
    }

    /// Whether the artifact is the core web application archive.
    pub fn is_webapp(&self) -> bool {
        self.artifact_type == ArtifactType::War
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}@{}",
            self.group_id, self.artifact_id, self.version, self.artifact_type
        )
    }
}
