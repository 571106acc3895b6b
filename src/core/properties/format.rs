// ─── Properties File Format ───
// Reader and writer for the `key=value` files the OpenMRS SDK keeps per
// server. Files are ISO-8859-1; characters outside printable ASCII are
// written as `\uXXXX` escapes so the output is plain ASCII.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::Local;
use tracing::debug;

use crate::core::error::{ServerError, ServerResult};

/// Property map with stable (sorted) key order.
pub type PropertyMap = BTreeMap<String, String>;

/// Read and parse a properties file.
pub fn read_properties(path: &Path) -> ServerResult<PropertyMap> {
    let bytes = std::fs::read(path).map_err(|source| ServerError::io(path, source))?;
    let text: String = bytes.iter().map(|&b| b as char).collect();
    let properties = parse_properties(&text);
    debug!("Read {} properties from {:?}", properties.len(), path);
    Ok(properties)
}

/// Serialize and write a properties file, replacing any existing content.
pub fn write_properties(path: &Path, properties: &PropertyMap) -> ServerResult<()> {
    let text = render_properties(properties);
    std::fs::write(path, text).map_err(|source| ServerError::io(path, source))?;
    debug!("Wrote {} properties to {:?}", properties.len(), path);
    Ok(())
}

/// Parse properties text. Malformed lines never fail: like the JDK loader,
/// whatever can be read as a key and value is kept.
pub fn parse_properties(text: &str) -> PropertyMap {
    let mut properties = PropertyMap::new();
    for line in logical_lines(text) {
        let (key, value) = split_key_value(&line);
        properties.insert(key, value);
    }
    properties
}

/// Render properties text with a timestamp comment header.
pub fn render_properties(properties: &PropertyMap) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{}", Local::now().format("%a %b %d %H:%M:%S %Z %Y"));
    for (key, value) in properties {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Joins continuation lines and drops comments and blank lines.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for raw in physical_lines(text) {
        let trimmed = raw.trim_start_matches(is_blank);

        let segment = match current.take() {
            Some(mut pending) => {
                pending.push_str(trimmed);
                pending
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        let trailing = segment.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            current = Some(segment[..segment.len() - 1].to_string());
        } else {
            lines.push(segment);
        }
    }

    if let Some(pending) = current {
        if !pending.is_empty() {
            lines.push(pending);
        }
    }
    lines
}

fn split_key_value(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    let mut key_end = chars.len();
    let mut value_start = chars.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (idx, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = idx;
                value_start = idx + 1;
                has_separator = true;
                break;
            }
            c if is_blank(c) => {
                key_end = idx;
                value_start = idx + 1;
                break;
            }
            _ => {}
        }
    }

    while value_start < chars.len() && is_blank(chars[value_start]) {
        value_start += 1;
    }
    if !has_separator && value_start < chars.len() && matches!(chars[value_start], '=' | ':') {
        value_start += 1;
        while value_start < chars.len() && is_blank(chars[value_start]) {
            value_start += 1;
        }
    }

    let key: String = chars[..key_end].iter().collect();
    let value: String = chars[value_start.min(chars.len())..].iter().collect();
    (unescape(&key), unescape(&value))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut pending_high: Option<u16> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            break;
        };
        match next {
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                match u16::from_str_radix(&hex, 16) {
                    Ok(unit) => push_utf16_unit(&mut out, &mut pending_high, unit),
                    Err(_) => {
                        flush_surrogate(&mut out, &mut pending_high);
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            't' => push_plain(&mut out, &mut pending_high, '\t'),
            'n' => push_plain(&mut out, &mut pending_high, '\n'),
            'r' => push_plain(&mut out, &mut pending_high, '\r'),
            'f' => push_plain(&mut out, &mut pending_high, '\u{c}'),
            other => push_plain(&mut out, &mut pending_high, other),
        }
    }
    flush_surrogate(&mut out, &mut pending_high);
    out
}

fn push_plain(out: &mut String, pending_high: &mut Option<u16>, c: char) {
    flush_surrogate(out, pending_high);
    out.push(c);
}

fn push_utf16_unit(out: &mut String, pending_high: &mut Option<u16>, unit: u16) {
    if let Some(high) = pending_high.take() {
        if (0xDC00..0xE000).contains(&unit) {
            let decoded = char::decode_utf16([high, unit])
                .next()
                .and_then(Result::ok)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            out.push(decoded);
            return;
        }
        out.push(char::REPLACEMENT_CHARACTER);
    }
    if (0xD800..0xDC00).contains(&unit) {
        *pending_high = Some(unit);
    } else {
        out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
}

fn flush_surrogate(out: &mut String, pending_high: &mut Option<u16>) {
    if pending_high.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (idx, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if idx == 0 || is_key => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if (' '..='~').contains(&c) => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separators_and_comments() {
        let props = parse_properties(
            "# comment\n! other comment\n\nserver.id=demo\nopenmrs.version : 2.3.0\ndb_name openmrs\n",
        );
        assert_eq!(props.get("server.id").map(String::as_str), Some("demo"));
        assert_eq!(props.get("openmrs.version").map(String::as_str), Some("2.3.0"));
        assert_eq!(props.get("db_name").map(String::as_str), Some("openmrs"));
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn joins_continuation_lines() {
        let props = parse_properties("user_modules=a/b/1.0,\\\n    c/d/2.0\r\nnext=x\r\n");
        assert_eq!(
            props.get("user_modules").map(String::as_str),
            Some("a/b/1.0,c/d/2.0")
        );
        assert_eq!(props.get("next").map(String::as_str), Some("x"));
    }

    #[test]
    fn unescapes_values() {
        let props =
            parse_properties("connection.url=jdbc\\:mysql\\://localhost\\:3306/@DBNAME@\nname=caf\\u00e9\n");
        assert_eq!(
            props.get("connection.url").map(String::as_str),
            Some("jdbc:mysql://localhost:3306/@DBNAME@")
        );
        assert_eq!(props.get("name").map(String::as_str), Some("café"));
    }

    #[test]
    fn key_without_value() {
        let props = parse_properties("lonely\n");
        assert_eq!(props.get("lonely").map(String::as_str), Some(""));
    }

    #[test]
    fn escapes_survive_render_and_parse() {
        let mut props = PropertyMap::new();
        props.insert("key with spaces".into(), "a=b:c #d !e".into());
        props.insert("unicode".into(), "ñandú 🦀".into());
        props.insert("leading".into(), "  padded".into());
        props.insert("path".into(), "C:\\openmrs\\server".into());

        let text = render_properties(&props);
        assert!(text.starts_with('#'));
        assert!(text.is_ascii());
        assert_eq!(parse_properties(&text), props);
    }

    #[test]
    fn read_and_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.properties");
        let mut props = PropertyMap::new();
        props.insert("server.id".into(), "demo".into());

        write_properties(&path, &props).unwrap();
        assert_eq!(read_properties(&path).unwrap(), props);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.properties");
        let err = read_properties(&missing).unwrap_err();
        assert!(matches!(err, ServerError::Io { ref path, .. } if *path == missing));
    }
}
