//! Minimal INI reader for client config files.
//!
//! Supports `[section]` headers, `key = value` pairs, full-line `;` and `#`
//! comments and blank lines. Keys that appear before the first header belong
//! to the root section. Later duplicates overwrite earlier ones.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::error::Error as CoreError;

/// Errors that can occur while parsing an INI document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IniError {
    /// A `[section` header was not closed.
    #[error("line {0}: unterminated section header")]
    UnterminatedSection(usize),
    /// A section header had no name.
    #[error("line {0}: empty section name")]
    EmptySection(usize),
    /// A line was neither a header, a comment nor a `key = value` pair.
    #[error("line {line}: expected `key = value`, found `{content}`")]
    InvalidLine {
        /// 1-based line number
        line: usize,
        /// Offending line, trimmed
        content: String,
    },
    /// A pair had nothing to the left of the `=`.
    #[error("line {0}: missing key before `=`")]
    MissingKey(usize),
}

impl From<IniError> for CoreError {
    fn from(err: IniError) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}

/// Parsed INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    /// Parse an INI document from text.
    ///
    /// # Errors
    ///
    /// Returns [`IniError`] for malformed headers or lines.
    pub fn parse(input: &str) -> std::result::Result<Self, IniError> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current = String::new();

        for (index, raw) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .ok_or(IniError::UnterminatedSection(line_no))?
                    .trim();
                if name.is_empty() {
                    return Err(IniError::EmptySection(line_no));
                }
                current = name.to_string();
                sections.entry(current.clone()).or_default();
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| IniError::InvalidLine {
                line: line_no,
                content: line.to_string(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(IniError::MissingKey(line_no));
            }

            sections
                .entry(current.clone())
                .or_default()
                .insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Ok(Self { sections })
    }

    /// Look up `key` inside `section` (use `""` for the root section).
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|pairs| pairs.get(key))
            .map(String::as_str)
    }

    /// Returns true if the document holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(BTreeMap::is_empty)
    }
}

/// Parse a boolean config value (`1/0`, `true/false`, `yes/no`, `on/off`).
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
