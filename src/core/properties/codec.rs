// ─── Delimited-List Codec ───
// Repeating records packed into a single property value with two delimiter
// levels: one between the fields of a record, one between records.

use crate::core::error::{ServerError, ServerResult};
use crate::core::maven::Artifact;
use crate::core::project::Project;

use super::format::PropertyMap;

const COMMA: &str = ",";
const SLASH: &str = "/";

/// A record that can be stored in a delimited list property.
pub trait ListRecord: Sized {
    /// Joins the fields of one record.
    const FIELD_SEPARATOR: &'static str;
    /// Joins records.
    const RECORD_SEPARATOR: &'static str;
    /// Used in parse errors.
    const LIST_NAME: &'static str;

    fn fields(&self) -> [&str; 3];

    fn from_fields(fields: [&str; 3]) -> Self;
}

/// `group/artifactId/version`, records joined by `,`.
impl ListRecord for Artifact {
    const FIELD_SEPARATOR: &'static str = SLASH;
    const RECORD_SEPARATOR: &'static str = COMMA;
    const LIST_NAME: &'static str = "module list";

    fn fields(&self) -> [&str; 3] {
        [
            self.group_id.as_str(),
            self.artifact_id.as_str(),
            self.version.as_str(),
        ]
    }

    fn from_fields([group_id, artifact_id, version]: [&str; 3]) -> Self {
        Artifact::new(group_id, artifact_id, version)
    }
}

/// `group,artifactId,path`, records joined by `;`.
impl ListRecord for Project {
    const FIELD_SEPARATOR: &'static str = COMMA;
    const RECORD_SEPARATOR: &'static str = ";";
    const LIST_NAME: &'static str = "watched projects list";

    fn fields(&self) -> [&str; 3] {
        [
            self.group_id.as_str(),
            self.artifact_id.as_str(),
            self.path.as_str(),
        ]
    }

    fn from_fields([group_id, artifact_id, path]: [&str; 3]) -> Self {
        Project::new(group_id, artifact_id, path)
    }
}

pub fn encode_record<R: ListRecord>(record: &R) -> String {
    record.fields().join(R::FIELD_SEPARATOR)
}

/// Encode records in iteration order, replacing nothing but the returned value.
pub fn encode_list<'a, R, I>(records: I) -> String
where
    R: ListRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    records
        .into_iter()
        .map(encode_record)
        .collect::<Vec<_>>()
        .join(R::RECORD_SEPARATOR)
}

/// Decode a list value. Blank records are skipped; a record that does not
/// have exactly three fields fails the whole list.
pub fn decode_list<R: ListRecord>(raw: &str) -> ServerResult<Vec<R>> {
    raw.split(R::RECORD_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let fields: Vec<&str> = entry.split(R::FIELD_SEPARATOR).collect();
            match fields.as_slice() {
                &[a, b, c] => Ok(R::from_fields([a, b, c])),
                _ => Err(ServerError::Parse(format!(
                    "cannot read {}: {:?}",
                    R::LIST_NAME,
                    entry
                ))),
            }
        })
        .collect()
}

/// Append `value` to the comma-separated list under `key` unless it is
/// already present.
pub fn add_to_value_list(properties: &mut PropertyMap, key: &str, value: &str) {
    let updated = match properties.get(key) {
        Some(before) if !before.trim().is_empty() => {
            let mut values = split_value_list(before);
            if values.contains(&value) {
                return;
            }
            values.push(value);
            values.join(COMMA)
        }
        _ => value.to_string(),
    };
    properties.insert(key.to_string(), updated);
}

/// Remove the first `group/artifactId/version` entry whose artifact id is
/// `artifact_id`. The key is dropped once the list is empty.
pub fn remove_from_value_list(properties: &mut PropertyMap, key: &str, artifact_id: &str) {
    let Some(before) = properties.get(key) else {
        return;
    };

    let mut values = split_value_list(before);
    if let Some(idx) = values
        .iter()
        .position(|value| value.split(SLASH).nth(1) == Some(artifact_id))
    {
        values.remove(idx);
    }

    let remaining = values.join(COMMA);
    if values.is_empty() {
        properties.remove(key);
    } else {
        properties.insert(key.to_string(), remaining);
    }
}

/// Comma-separated entries with trailing empty entries dropped.
fn split_value_list(value: &str) -> Vec<&str> {
    let mut values: Vec<&str> = value.split(COMMA).collect();
    while values.last() == Some(&"") {
        values.pop();
    }
    values
}
