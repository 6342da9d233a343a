// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings file parser trait definition.
//!
//! This module defines the `SettingsParser` trait, which turns the content of a
//! persisted group file into a flat map of raw keys and values.

use crate::domain::Result;
use std::collections::HashMap;

/// A trait for parsing persisted settings files.
///
/// Parsers only split the content into raw `key -> value` strings. Removing
/// the quotes around String values is left to the storage engine, which knows
/// each setting's kind.
///
/// # Examples
///
/// ```rust
/// use propcfg::ports::SettingsParser;
/// use propcfg::domain::Result;
/// use std::collections::HashMap;
///
/// struct SingleKeyParser;
///
/// impl SettingsParser for SingleKeyParser {
///     fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
///         let mut map = HashMap::new();
///         map.insert("content".to_string(), content.to_string());
///         Ok(map)
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["txt"]
///     }
/// }
/// ```
pub trait SettingsParser: Send + Sync {
    /// Parses file content into raw key-value pairs.
    ///
    /// # Arguments
    ///
    /// * `content` - The raw content of the settings file
    ///
    /// # Returns
    ///
    /// * `Ok(HashMap<String, String>)` - The raw values by key
    /// * `Err(SettingsError)` - The content is corrupt
    fn parse(&self, content: &str) -> Result<HashMap<String, String>>;

    /// Returns the file extensions (without the leading dot) this parser reads.
    fn supported_extensions(&self) -> &[&str];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SettingsError;

    struct StrictParser;

    impl SettingsParser for StrictParser {
        fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
            content
                .lines()
                .enumerate()
                .map(|(i, line)| {
                    line.split_once(':')
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .ok_or_else(|| SettingsError::ParseError {
                            path: None,
                            line: i + 1,
                            message: "missing ':'".to_string(),
                        })
                })
                .collect()
        }

        fn supported_extensions(&self) -> &[&str] {
            &["strict"]
        }
    }

    #[test]
    fn test_parser_parse() {
        let parser = StrictParser;
        let result = parser.parse("a:1\nb:2").unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parser_error() {
        let parser = StrictParser;
        let result = parser.parse("a:1\nbroken");
        assert!(matches!(
            result,
            Err(SettingsError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_parser_supported_extensions() {
        let parser = StrictParser;
        assert_eq!(parser.supported_extensions(), &["strict"]);
    }

    #[test]
    fn test_parser_is_object_safe() {
        let parser: Box<dyn SettingsParser> = Box::new(StrictParser);
        assert!(parser.parse("").unwrap().is_empty());
    }
}
