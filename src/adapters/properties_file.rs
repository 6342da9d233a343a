// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value settings file format and file system backend.
//!
//! Group files are line based:
//!
//! ```text
//! # myapp settings: Client
//! # Connection
//! #Socket timeout in seconds (default = 30)
//! timeout=30
//! #Server host name (default = localhost)
//! host="example.org"
//! ```
//!
//! String values are wrapped in double quotes, every other kind is written
//! bare. Backslashes, line feeds and carriage returns inside values are
//! escaped as `\\`, `\n` and `\r`. Lines starting with `#` or `!` are
//! comments.

use crate::domain::{Result, SettingKind, SettingsError};
use crate::ports::{SettingsBackend, SettingsParser};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum allowed size of a settings file (10MB).
/// This prevents denial of service attacks via extremely large files
const MAX_SETTINGS_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Escapes the characters that cannot appear verbatim on a value line.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::properties_file::escape;
///
/// assert_eq!(escape("line1\nline2"), "line1\\nline2");
/// assert_eq!(escape("C:\\temp"), "C:\\\\temp");
/// ```
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Reverses [`escape`].
///
/// Unknown escape sequences and a trailing backslash are kept as written.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::properties_file::unescape;
///
/// assert_eq!(unescape("line1\\nline2"), "line1\nline2");
/// assert_eq!(unescape("C:\\path"), "C:\\path");
/// ```
pub fn unescape(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('\\') => value.push('\\'),
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }
    value
}

/// Renders a value the way it is written after `key=`.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::properties_file::render_value;
/// use propcfg::domain::SettingKind;
///
/// assert_eq!(render_value(SettingKind::String, "localhost"), "\"localhost\"");
/// assert_eq!(render_value(SettingKind::String, "a\nb"), "\"a\\nb\"");
/// assert_eq!(render_value(SettingKind::Integer, "30"), "30");
/// ```
pub fn render_value(kind: SettingKind, value: &str) -> String {
    let value = escape(value);
    if kind.is_quoted() {
        format!("\"{}\"", value)
    } else {
        value
    }
}

/// Renders `text` as comment lines, one per line of `text`.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::properties_file::render_comment;
///
/// assert_eq!(render_comment("# ", "Connection"), "# Connection\n");
/// assert_eq!(render_comment("#", "one\r\ntwo"), "#one\n#two\n");
/// ```
pub fn render_comment(prefix: &str, text: &str) -> String {
    text.split("\r\n")
        .flat_map(|part| part.split(['\n', '\r']))
        .map(|line| format!("{}{}\n", prefix, line))
        .collect()
}

/// Removes one pair of surrounding double quotes, if present.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::properties_file::strip_quotes;
///
/// assert_eq!(strip_quotes("\"a b\""), "a b");
/// assert_eq!(strip_quotes("bare"), "bare");
/// assert_eq!(strip_quotes("\"\"x\"\""), "\"x\"");
/// ```
pub fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Parser for `key=value` settings files.
///
/// Blank lines and comment lines are skipped. The first `=` separates the key
/// from the value; both are trimmed. A later duplicate key replaces an earlier
/// one. Any other line makes the whole file invalid.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::PropertiesParser;
/// use propcfg::ports::SettingsParser;
///
/// let parser = PropertiesParser::new();
/// let result = parser.parse("# header\ntimeout=30\nhost=\"example.org\"\n").unwrap();
/// assert_eq!(result.get("timeout"), Some(&"30".to_string()));
/// assert_eq!(result.get("host"), Some(&"\"example.org\"".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }
}

impl Default for PropertiesParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsParser for PropertiesParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let mut result = HashMap::new();
        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| SettingsError::ParseError {
                path: None,
                line: i + 1,
                message: "expected 'key=value'".to_string(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(SettingsError::ParseError {
                    path: None,
                    line: i + 1,
                    message: "empty key".to_string(),
                });
            }
            result.insert(key.to_string(), value.trim().to_string());
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties", "cfg"]
    }
}

/// Backend that reads and writes settings files on the local file system.
///
/// Writes go to a sibling temporary file that is flushed, synced and then
/// renamed over the target, so readers never see a half-written file.
#[derive(Debug, Clone, Default)]
pub struct FileBackend;

impl FileBackend {
    /// Creates a new file backend.
    pub fn new() -> Self {
        FileBackend
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    fn write_temp(temp_path: &Path, lines: &[String]) -> Result<()> {
        let file = fs::File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writer.write_all(line.as_bytes())?;
        }
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| SettingsError::Io(e.into_error()))?
            .sync_all()?;
        Ok(())
    }
}

impl SettingsBackend for FileBackend {
    fn read(&self, path: &Path) -> Result<String> {
        // Check file size before reading to prevent DoS via large files
        let metadata = fs::metadata(path)?;
        if metadata.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(SettingsError::FileTooLarge {
                size: metadata.len(),
                max: MAX_SETTINGS_FILE_SIZE,
            });
        }
        Ok(fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, lines: &[String]) -> Result<()> {
        let temp_path = Self::temp_path(path);
        let result = Self::write_temp(&temp_path, lines)
            .and_then(|()| fs::rename(&temp_path, path).map_err(SettingsError::from));
        if result.is_err() {
            match fs::remove_file(&temp_path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                    debug!("Cannot remove {}: {}", temp_path.display(), e);
                }
                _ => {}
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parser_simple() {
        let parser = PropertiesParser::new();
        let result = parser.parse("key=value").unwrap();
        assert_eq!(result.get("key"), Some(&"value".to_string()));
    }

    #[test]
    fn test_parser_skips_comments_and_blanks() {
        let parser = PropertiesParser::new();
        let content = "# header\n\n! legacy comment\n  # indented\nkey = value \n";
        let result = parser.parse(content).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("key"), Some(&"value".to_string()));
    }

    #[test]
    fn test_parser_splits_on_first_equals() {
        let parser = PropertiesParser::new();
        let result = parser.parse("url=\"a=b\"").unwrap();
        assert_eq!(result.get("url"), Some(&"\"a=b\"".to_string()));
    }

    #[test]
    fn test_parser_empty_value() {
        let parser = PropertiesParser::new();
        let result = parser.parse("name=").unwrap();
        assert_eq!(result.get("name"), Some(&String::new()));
    }

    #[test]
    fn test_parser_last_duplicate_wins() {
        let parser = PropertiesParser::new();
        let result = parser.parse("a=1\na=2").unwrap();
        assert_eq!(result.get("a"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parser_rejects_line_without_equals() {
        let parser = PropertiesParser::new();
        let result = parser.parse("a=1\ngarbage\n");
        assert!(matches!(
            result,
            Err(SettingsError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_parser_rejects_empty_key() {
        let parser = PropertiesParser::new();
        assert!(parser.parse("=1").is_err());
    }

    #[test]
    fn test_parser_supported_extensions() {
        let parser = PropertiesParser::default();
        assert!(parser.supported_extensions().contains(&"properties"));
    }

    #[test]
    fn test_escape_round_trip() {
        let text = "first\nsecond\r\nthird \\ end\\";
        let escaped = escape(text);
        assert!(!escaped.contains(['\n', '\r']));
        assert_eq!(unescape(&escaped), text);
    }

    #[test]
    fn test_unescape_keeps_unknown_sequences() {
        assert_eq!(unescape("a\\tb"), "a\\tb");
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn test_render_comment_splits_lines() {
        assert_eq!(render_comment("# ", "a\nb\rc"), "# a\n# b\n# c\n");
        assert_eq!(render_comment("#", ""), "#\n");
    }

    #[test]
    fn test_multi_line_value_parses_back() {
        let line = format!("motd={}\n", render_value(SettingKind::String, "line1\nline2"));
        let result = PropertiesParser::new().parse(&line).unwrap();
        let raw = result.get("motd").unwrap();
        assert_eq!(unescape(strip_quotes(raw)), "line1\nline2");
    }

    #[test]
    fn test_render_and_strip_quotes() {
        assert_eq!(render_value(SettingKind::String, ""), "\"\"");
        assert_eq!(strip_quotes("\"\""), "");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(render_value(SettingKind::Boolean, "true"), "true");
        assert_eq!(render_value(SettingKind::Enum, "High"), "High");
    }

    #[test]
    fn test_file_backend_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Client.properties");
        let backend = FileBackend::new();

        backend
            .write(&path, &["# header\n".to_string(), "a=1\n".to_string()])
            .unwrap();
        assert_eq!(backend.read(&path).unwrap(), "# header\na=1\n");
        assert!(!FileBackend::temp_path(&path).exists());
    }

    #[test]
    fn test_file_backend_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Client.properties");
        let backend = FileBackend::new();

        backend.write(&path, &["a=1\n".to_string()]).unwrap();
        backend.write(&path, &["b=2\n".to_string()]).unwrap();
        assert_eq!(backend.read(&path).unwrap(), "b=2\n");
    }

    #[test]
    fn test_file_backend_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = FileBackend::new().read(&dir.path().join("missing.properties"));
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }

    #[test]
    fn test_file_backend_failed_write_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Client.properties");
        // A non-empty directory cannot be replaced by a file
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let result = FileBackend::new().write(&path, &["a=1\n".to_string()]);

        assert!(matches!(result, Err(SettingsError::Io(_))));
        assert!(!FileBackend::temp_path(&path).exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_file_backend_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no").join("such").join("dir.properties");
        let result = FileBackend::new().write(&path, &["a=1\n".to_string()]);
        assert!(result.is_err());
    }
}
