use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::error::{ServerError, ServerResult};
use crate::core::properties::{self, PropertyMap};

/// Name of the per-server configuration file.
pub const PROPERTIES_FILE_NAME: &str = "openmrs-server.properties";
/// Copy of the configuration kept while an upgrade is in progress.
pub const BACKUP_PROPERTIES_FILE_NAME: &str = "backup.properties";
pub const MODULES_DIR_NAME: &str = "modules";
pub const TMP_DIR_NAME: &str = "tmp";

const DB_NAME_PLACEHOLDER: &str = "@DBNAME@";

/// Configuration keys the typed accessors read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerKey {
    ServerId,
    DbDriver,
    DbUser,
    DbPassword,
    DbUri,
    Version,
    PlatformVersion,
    DbName,
    UserModules,
    DemoData,
    DistroArtifactId,
    DistroGroupId,
    WatchedProjects,
}

impl ServerKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ServerKey::ServerId => "server.id",
            ServerKey::DbDriver => "connection.driver_class",
            ServerKey::DbUser => "connection.username",
            ServerKey::DbPassword => "connection.password",
            ServerKey::DbUri => "connection.url",
            ServerKey::Version => "openmrs.version",
            ServerKey::PlatformVersion => "openmrs.platform.version",
            ServerKey::DbName => "database_name",
            ServerKey::UserModules => "user_modules",
            ServerKey::DemoData => "add_demo_data",
            ServerKey::DistroArtifactId => "distro.artifactId",
            ServerKey::DistroGroupId => "distro.groupId",
            ServerKey::WatchedProjects => "watched.projects",
        }
    }
}

impl fmt::Display for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defaults for a server that runs its own in-process H2 database.
const DATABASE_DEFAULTS: &[(&str, &str)] = &[
    (
        "connection.url",
        "jdbc:h2:@APPLICATIONDATADIR@/database/@DBNAME@;AUTO_RECONNECT=TRUE;DB_CLOSE_DELAY=-1",
    ),
    ("connection.driver_class", "org.h2.Driver"),
    ("connection.username", "sa"),
    ("connection.password", "sa"),
    ("database_name", "openmrs"),
    ("has_current_openmrs_database", "true"),
    ("create_database_user", "false"),
    ("create_tables", "true"),
    ("add_demo_data", "false"),
    ("auto_update_database", "false"),
];

const INSTALLATION_DEFAULTS: &[(&str, &str)] = &[
    ("module_web_admin", "true"),
    ("install_method", "auto"),
    ("admin_user_password", "Admin123"),
];

/// Where a server lives on disk. Both paths are always known together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPaths {
    pub server_dir: PathBuf,
    pub properties_file: PathBuf,
}

impl ServerPaths {
    pub fn new(server_dir: impl Into<PathBuf>) -> Self {
        let server_dir = server_dir.into();
        let properties_file = server_dir.join(PROPERTIES_FILE_NAME);
        Self {
            server_dir,
            properties_file,
        }
    }
}

/// Configuration of one OpenMRS SDK server.
///
/// The property map is the single source of truth; the typed accessors are
/// views over [`ServerKey`] entries. A server directory contains:
/// - `openmrs-server.properties` — the persisted map
/// - `openmrs-<version>.war`     — the core web application
/// - `modules/`                  — installed module archives
/// - `tmp/`                      — scratch space, deleted freely
#[derive(Debug, Clone, Default)]
pub struct Server {
    properties: PropertyMap,
    paths: Option<ServerPaths>,
    /// Not persisted.
    interactive_mode: Option<String>,
}

impl Server {
    /// A fresh, empty configuration rooted at `dir`. Nothing is written.
    pub fn create(dir: impl Into<PathBuf>) -> Self {
        Self {
            properties: PropertyMap::new(),
            paths: Some(ServerPaths::new(dir)),
            interactive_mode: None,
        }
    }

    /// Whether `dir` holds a server configuration file.
    pub fn has_server_config(dir: &Path) -> bool {
        dir.join(PROPERTIES_FILE_NAME).is_file()
    }

    /// Load the configuration stored in `dir`.
    pub fn load(dir: &Path) -> ServerResult<Self> {
        let paths = ServerPaths::new(dir);
        if !paths.properties_file.is_file() {
            return Err(ServerError::ConfigNotFound {
                path: paths.properties_file,
            });
        }

        let properties = properties::read_properties(&paths.properties_file)?;
        debug!("Loaded server configuration from {:?}", paths.properties_file);

        Ok(Self {
            properties,
            paths: Some(paths),
            interactive_mode: None,
        })
    }

    /// Persist to the server's own properties file.
    pub fn save(&mut self) -> ServerResult<()> {
        let path = self.bound_paths()?.properties_file.clone();
        self.save_to(&path)
    }

    /// Persist to `path`, creating its parent directory if needed.
    pub fn save_to(&mut self, path: &Path) -> ServerResult<()> {
        self.replace_db_name_in_db_uri();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ServerError::io(parent, source))?;
        }

        properties::write_properties(path, &self.properties)
    }

    /// Keep a copy of the current configuration next to it so a failed
    /// upgrade can be rolled back by hand.
    pub fn save_backup_properties(&mut self) -> ServerResult<()> {
        let path = self.backup_properties_file()?;
        self.save_to(&path)?;
        info!("Saved backup properties to {:?}", path);
        Ok(())
    }

    pub fn delete_backup_properties(&self) -> ServerResult<()> {
        let path = self.backup_properties_file()?;
        remove_file_if_exists(&path)
    }

    /// Remove the properties file. The rest of the server directory is left alone.
    pub fn delete(&self) -> ServerResult<()> {
        let path = &self.bound_paths()?.properties_file;
        remove_file_if_exists(path)?;
        info!("Deleted server configuration {:?}", path);
        Ok(())
    }

    /// Fill in defaults for every key that is not set yet.
    ///
    /// Database defaults only apply once a driver has been chosen; a server
    /// without a driver uses an externally configured database.
    pub fn set_unspecified_to_default(&mut self) {
        if self.db_driver().is_some() {
            for (key, value) in DATABASE_DEFAULTS {
                self.set_param_if_absent(key, value);
            }
        }
        for (key, value) in INSTALLATION_DEFAULTS {
            self.set_param_if_absent(key, value);
        }
    }

    fn set_param_if_absent(&mut self, key: &str, value: &str) {
        self.properties
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    // OpenMRS does not substitute @DBNAME@ in the connection url itself, so
    // the stored url is rewritten whenever the configuration is written out.
    fn replace_db_name_in_db_uri(&mut self) {
        let Some(uri) = self.db_uri() else {
            return;
        };
        if !uri.contains(DB_NAME_PLACEHOLDER) {
            return;
        }
        let Some(db_name) = self.db_name() else {
            return;
        };
        let replaced = uri.replace(DB_NAME_PLACEHOLDER, db_name);
        self.set(ServerKey::DbUri, replaced);
    }

    // ── Raw access ──────────────────────────────────────

    pub fn param(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn remove_param(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    pub fn params(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn get(&self, key: ServerKey) -> Option<&str> {
        self.param(key.as_str())
    }

    pub fn set(&mut self, key: ServerKey, value: impl Into<String>) {
        self.set_param(key.as_str(), value);
    }

    /// Append to a comma-separated value list, skipping duplicates.
    pub fn add_to_value_list(&mut self, key: &str, value: &str) {
        properties::add_to_value_list(&mut self.properties, key, value);
    }

    /// Drop the `group/artifactId/version` entry for `artifact_id`.
    pub fn remove_from_value_list(&mut self, key: &str, artifact_id: &str) {
        properties::remove_from_value_list(&mut self.properties, key, artifact_id);
    }

    // ── Typed accessors ─────────────────────────────────

    pub fn server_id(&self) -> Option<&str> {
        self.get(ServerKey::ServerId)
    }

    pub fn set_server_id(&mut self, server_id: impl Into<String>) {
        self.set(ServerKey::ServerId, server_id);
    }

    pub fn db_driver(&self) -> Option<&str> {
        self.get(ServerKey::DbDriver)
    }

    pub fn set_db_driver(&mut self, driver: impl Into<String>) {
        self.set(ServerKey::DbDriver, driver);
    }

    pub fn db_uri(&self) -> Option<&str> {
        self.get(ServerKey::DbUri)
    }

    pub fn set_db_uri(&mut self, uri: impl Into<String>) {
        self.set(ServerKey::DbUri, uri);
    }

    pub fn db_user(&self) -> Option<&str> {
        self.get(ServerKey::DbUser)
    }

    pub fn set_db_user(&mut self, user: impl Into<String>) {
        self.set(ServerKey::DbUser, user);
    }

    pub fn db_password(&self) -> Option<&str> {
        self.get(ServerKey::DbPassword)
    }

    pub fn set_db_password(&mut self, password: impl Into<String>) {
        self.set(ServerKey::DbPassword, password);
    }

    pub fn db_name(&self) -> Option<&str> {
        self.get(ServerKey::DbName)
    }

    pub fn set_db_name(&mut self, name: impl Into<String>) {
        self.set(ServerKey::DbName, name);
    }

    /// OpenMRS core version.
    pub fn version(&self) -> Option<&str> {
        self.get(ServerKey::Version)
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.set(ServerKey::Version, version);
    }

    pub fn platform_version(&self) -> Option<&str> {
        self.get(ServerKey::PlatformVersion)
    }

    pub fn set_platform_version(&mut self, version: impl Into<String>) {
        self.set(ServerKey::PlatformVersion, version);
    }

    /// Anything but a case-insensitive `true` reads as `false`.
    pub fn is_include_demo_data(&self) -> bool {
        self.get(ServerKey::DemoData)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn set_include_demo_data(&mut self, include: bool) {
        self.set(ServerKey::DemoData, include.to_string());
    }

    pub fn distro_artifact_id(&self) -> Option<&str> {
        self.get(ServerKey::DistroArtifactId)
    }

    pub fn set_distro_artifact_id(&mut self, artifact_id: impl Into<String>) {
        self.set(ServerKey::DistroArtifactId, artifact_id);
    }

    pub fn distro_group_id(&self) -> Option<&str> {
        self.get(ServerKey::DistroGroupId)
    }

    pub fn set_distro_group_id(&mut self, group_id: impl Into<String>) {
        self.set(ServerKey::DistroGroupId, group_id);
    }

    pub fn interactive_mode(&self) -> Option<&str> {
        self.interactive_mode.as_deref()
    }

    pub fn set_interactive_mode(&mut self, mode: impl Into<String>) {
        self.interactive_mode = Some(mode.into());
    }

    // ── Directories ─────────────────────────────────────

    pub fn set_server_directory(&mut self, dir: impl Into<PathBuf>) {
        self.paths = Some(ServerPaths::new(dir));
    }

    pub fn server_directory(&self) -> Option<&Path> {
        self.paths.as_ref().map(|p| p.server_dir.as_path())
    }

    pub fn properties_file(&self) -> Option<&Path> {
        self.paths.as_ref().map(|p| p.properties_file.as_path())
    }

    pub fn server_modules_directory(&self) -> Option<PathBuf> {
        self.server_directory().map(|dir| dir.join(MODULES_DIR_NAME))
    }

    pub fn server_tmp_directory(&self) -> Option<PathBuf> {
        self.server_directory().map(|dir| dir.join(TMP_DIR_NAME))
    }

    /// Best-effort removal of `tmp/`. Failures are logged and ignored.
    pub fn delete_server_tmp_directory(&self) {
        let Some(tmp_dir) = self.server_tmp_directory() else {
            return;
        };
        if !tmp_dir.exists() {
            return;
        }
        match std::fs::remove_dir_all(&tmp_dir) {
            Ok(()) => debug!("Deleted tmp directory {:?}", tmp_dir),
            Err(e) => warn!("Could not delete tmp directory {:?}: {}", tmp_dir, e),
        }
    }

    fn bound_paths(&self) -> ServerResult<&ServerPaths> {
        self.paths.as_ref().ok_or(ServerError::Unbound)
    }

    fn backup_properties_file(&self) -> ServerResult<PathBuf> {
        Ok(self
            .bound_paths()?
            .server_dir
            .join(BACKUP_PROPERTIES_FILE_NAME))
    }
}

fn remove_file_if_exists(path: &Path) -> ServerResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ServerError::io(path, source)),
    }
}

/// Accumulates settings for a server before it is first persisted.
#[derive(Debug, Default)]
pub struct ServerBuilder {
    server: Server,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a copy of another server's properties.
    pub fn from_server(server: &Server) -> Self {
        Self {
            server: Server {
                properties: server.properties.clone(),
                ..Server::default()
            },
        }
    }

    pub fn server_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.server.set_server_directory(dir);
        self
    }

    pub fn interactive_mode(mut self, mode: impl Into<String>) -> Self {
        self.server.set_interactive_mode(mode);
        self
    }

    pub fn server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server.set_server_id(server_id);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.server.set_version(version);
        self
    }

    pub fn db_driver(mut self, driver: impl Into<String>) -> Self {
        self.server.set_db_driver(driver);
        self
    }

    pub fn db_uri(mut self, uri: impl Into<String>) -> Self {
        self.server.set_db_uri(uri);
        self
    }

    pub fn db_user(mut self, user: impl Into<String>) -> Self {
        self.server.set_db_user(user);
        self
    }

    pub fn db_password(mut self, password: impl Into<String>) -> Self {
        self.server.set_db_password(password);
        self
    }

    pub fn demo_data(mut self, include: bool) -> Self {
        self.server.set_include_demo_data(include);
        self
    }

    pub fn build(self) -> Server {
        self.server
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_binds_paths_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::create(dir.path().join("demo"));

        assert_eq!(server.server_directory(), Some(dir.path().join("demo").as_path()));
        assert_eq!(
            server.properties_file(),
            Some(dir.path().join("demo").join(PROPERTIES_FILE_NAME).as_path())
        );
        assert!(!dir.path().join("demo").exists());
    }

    #[test]
    fn load_missing_config_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Server::load(dir.path()).unwrap_err();
        assert!(matches!(err, ServerError::ConfigNotFound { .. }));
        assert!(!Server::has_server_config(dir.path()));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::create(dir.path());
        server.set_server_id("demo");
        server.set_version("2.3.0");
        server.set_param("custom.key", "custom value");
        server.save().unwrap();

        assert!(Server::has_server_config(dir.path()));
        let loaded = Server::load(dir.path()).unwrap();
        assert_eq!(loaded.server_id(), Some("demo"));
        assert_eq!(loaded.version(), Some("2.3.0"));
        assert_eq!(loaded.param("custom.key"), Some("custom value"));
    }

    #[test]
    fn db_name_is_substituted_only_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::create(dir.path());
        server.set_db_uri("jdbc:mysql://localhost:3306/@DBNAME@?autoReconnect=true");
        server.set_db_name("demo_db");
        assert_eq!(
            server.db_uri(),
            Some("jdbc:mysql://localhost:3306/@DBNAME@?autoReconnect=true")
        );

        let path = dir.path().join("copy.properties");
        server.save_to(&path).unwrap();

        let loaded = properties::read_properties(&path).unwrap();
        assert_eq!(
            loaded.get("connection.url").map(String::as_str),
            Some("jdbc:mysql://localhost:3306/demo_db?autoReconnect=true")
        );
    }

    #[test]
    fn placeholder_is_kept_without_db_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::create(dir.path());
        server.set_db_uri("jdbc:mysql://localhost:3306/@DBNAME@");
        server.save().unwrap();

        assert_eq!(server.db_uri(), Some("jdbc:mysql://localhost:3306/@DBNAME@"));
        let loaded = Server::load(dir.path()).unwrap();
        assert_eq!(loaded.db_uri(), Some("jdbc:mysql://localhost:3306/@DBNAME@"));
    }

    #[test]
    fn save_unbound_server_fails() {
        let mut server = ServerBuilder::new().server_id("demo").build();
        assert!(matches!(server.save(), Err(ServerError::Unbound)));
    }

    #[test]
    fn defaults_never_overwrite() {
        let mut server = Server::default();
        server.set_param("install_method", "manual");
        server.set_unspecified_to_default();

        assert_eq!(server.param("install_method"), Some("manual"));
        assert_eq!(server.param("module_web_admin"), Some("true"));
        assert_eq!(server.param("admin_user_password"), Some("Admin123"));
        assert_eq!(server.db_uri(), None);
        assert_eq!(server.db_user(), None);
    }

    #[test]
    fn database_defaults_need_a_driver() {
        let mut server = Server::default();
        server.set_db_driver("com.mysql.jdbc.Driver");
        server.set_db_user("openmrs");
        server.set_unspecified_to_default();

        assert_eq!(server.db_driver(), Some("com.mysql.jdbc.Driver"));
        assert_eq!(server.db_user(), Some("openmrs"));
        assert_eq!(server.db_password(), Some("sa"));
        assert_eq!(server.db_name(), Some("openmrs"));
        assert!(server.db_uri().unwrap().starts_with("jdbc:h2:"));
        assert!(!server.is_include_demo_data());
    }

    #[test]
    fn demo_data_is_lenient() {
        let mut server = Server::default();
        assert!(!server.is_include_demo_data());
        server.set_param("add_demo_data", "TRUE");
        assert!(server.is_include_demo_data());
        server.set_param("add_demo_data", "yes");
        assert!(!server.is_include_demo_data());
        server.set_include_demo_data(true);
        assert_eq!(server.param("add_demo_data"), Some("true"));
    }

    #[test]
    fn backup_properties_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::create(dir.path());
        server.set_version("2.3.0");
        let backup = dir.path().join(BACKUP_PROPERTIES_FILE_NAME);

        server.save_backup_properties().unwrap();
        assert!(backup.is_file());

        server.delete_backup_properties().unwrap();
        assert!(!backup.exists());
        server.delete_backup_properties().unwrap();
    }

    #[test]
    fn delete_removes_properties_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::create(dir.path());
        server.save().unwrap();
        server.delete().unwrap();
        assert!(!Server::has_server_config(dir.path()));
    }

    #[test]
    fn tmp_directory_is_deleted_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::create(dir.path());
        let tmp = server.server_tmp_directory().unwrap();
        std::fs::create_dir_all(tmp.join("nested")).unwrap();
        std::fs::write(tmp.join("nested").join("file"), b"x").unwrap();

        server.delete_server_tmp_directory();
        assert!(!tmp.exists());
        server.delete_server_tmp_directory();
        Server::default().delete_server_tmp_directory();
    }

    #[test]
    fn builder_copies_properties_only() {
        let mut original = Server::create("/servers/demo");
        original.set_server_id("demo");
        original.set_interactive_mode("false");

        let copy = ServerBuilder::from_server(&original)
            .version("2.4.0")
            .interactive_mode("true")
            .build();
        assert_eq!(copy.server_id(), Some("demo"));
        assert_eq!(copy.version(), Some("2.4.0"));
        assert_eq!(copy.interactive_mode(), Some("true"));
        assert_eq!(copy.server_directory(), None);
        assert_eq!(original.version(), None);
    }
}
