use std::sync::OnceLock;

use regex::Regex;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `<name>-<version>.<ext>`: the version starts at the first `-` followed by
    // a digit and runs up to the extension.
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*?-(\d[^/\\]*)\.[A-Za-z][A-Za-z0-9]*$").expect("valid version pattern")
    })
}

/// Extract the version embedded in an artifact file name.
///
/// ```
/// use openmrs_server_lib::core::maven::parse_version_from_file;
/// assert_eq!(parse_version_from_file("openmrs-2.3.war").as_deref(), Some("2.3"));
/// ```
pub fn parse_version_from_file(file_name: &str) -> Option<String> {
    version_pattern()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_versions() {
        assert_eq!(parse_version_from_file("openmrs-2.3.war").as_deref(), Some("2.3"));
        assert_eq!(
            parse_version_from_file("atlasmodule-1.9.omod").as_deref(),
            Some("1.9")
        );
    }

    #[test]
    fn hyphenated_names_and_qualifiers() {
        assert_eq!(
            parse_version_from_file("legacy-ui-1.0.0-SNAPSHOT.omod").as_deref(),
            Some("1.0.0-SNAPSHOT")
        );
        assert_eq!(
            parse_version_from_file("appui-omod-1.7.0.omod").as_deref(),
            Some("1.7.0")
        );
    }

    #[test]
    fn no_version_token() {
        assert_eq!(parse_version_from_file("openmrs.war"), None);
        assert_eq!(parse_version_from_file("openmrs-server.properties"), None);
        assert_eq!(parse_version_from_file("README"), None);
    }
}
