use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Section name -> key -> raw string value.
///
/// A `BTreeMap` keeps section iteration deterministic (alphabetical), which in
/// turn fixes the order channels are created in on the device.
pub type ConfigMapping = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read configuration file {path}: {source}")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration line {line} in {path}: {text:?}")]
    Parse {
        path: String,
        line: usize,
        text: String,
    },
}

/// Load an INI-style configuration file into a nested section/key/value map.
///
/// Lines are `[section]` headers, `key=value` pairs, `;`/`#` comments or
/// blank. Pairs seen before any header land in a section with the empty name.
/// Duplicate keys overwrite (last write wins), duplicate headers merge. No
/// schema is enforced here; values stay verbatim strings.
pub fn load(path: impl AsRef<Path>) -> Result<ConfigMapping, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::NotFound {
        path: path.display().to_string(),
        source,
    })?;
    parse(path, &text)
}

fn parse(path: &Path, text: &str) -> Result<ConfigMapping, ConfigError> {
    let mut mapping = ConfigMapping::new();
    let mut current_section = String::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        let malformed = || ConfigError::Parse {
            path: path.display().to_string(),
            line: idx + 1,
            text: raw.to_owned(),
        };

        if let Some(inner) = line.strip_prefix('[') {
            let name = inner.strip_suffix(']').ok_or_else(malformed)?;
            current_section = name.trim().to_owned();
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(malformed)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(malformed());
        }
        // A section only materializes once a key is attributed to it.
        mapping
            .entry(current_section.clone())
            .or_default()
            .insert(key.to_owned(), value.trim().to_owned());
    }

    debug!(
        "loaded {} configuration sections from {}",
        mapping.len(),
        path.display()
    );
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> ConfigMapping {
        parse(Path::new("test.ini"), text).unwrap()
    }

    #[test]
    fn parses_sections_ignoring_comments_and_blanks() {
        let mapping = parse_ok(
            "; leading comment\n\
             [DAQmxChannel0]\n\
             ChanType = Analog Input\n\
             \n\
             # another comment\n\
             PhysicalChanName = Dev1/ai0\n",
        );
        let section = &mapping["DAQmxChannel0"];
        assert_eq!(section["ChanType"], "Analog Input");
        assert_eq!(section["PhysicalChanName"], "Dev1/ai0");
    }

    #[test]
    fn last_write_wins_for_duplicate_keys() {
        let mapping = parse_ok("[a]\nkey=first\nkey=second\nkey=third\n");
        assert_eq!(mapping["a"]["key"], "third");
    }

    #[test]
    fn duplicate_headers_merge_into_one_section() {
        let mapping = parse_ok("[a]\nx=1\n[b]\ny=2\n[a]\nz=3\n");
        assert_eq!(mapping["a"]["x"], "1");
        assert_eq!(mapping["a"]["z"], "3");
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn keys_before_any_header_land_in_unnamed_section() {
        let mapping = parse_ok("orphan = value\n[a]\nx = 1\n");
        assert_eq!(mapping[""]["orphan"], "value");
    }

    #[test]
    fn header_without_keys_materializes_no_section() {
        let mapping = parse_ok("[empty]\n[a]\nx=1\n");
        assert!(!mapping.contains_key("empty"));
    }

    #[test]
    fn rejects_line_without_separator() {
        let err = parse(Path::new("test.ini"), "[a]\nnot a pair\n").unwrap_err();
        match err {
            ConfigError::Parse { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "not a pair");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unterminated_header() {
        assert!(matches!(
            parse(Path::new("test.ini"), "[broken\n"),
            Err(ConfigError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        assert!(matches!(
            load("definitely/not/here.ini"),
            Err(ConfigError::NotFound { .. })
        ));
    }
}
