//! Convenience builder for HTTP query parameters.
//!
//! Every nodegroups request carries `outputFormat=json`; [`with_output_format`]
//! appends it so callers only describe their own parameters.

use std::fmt::Display;

/// Query key selecting the response format.
pub const OUTPUT_FORMAT_KEY: &str = "outputFormat";

/// The only response format this client decodes.
pub const OUTPUT_FORMAT_JSON: &str = "json";

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: ToString,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Append a comma-joined list under a single key. Empty lists are skipped.
    pub fn push_list<I, T>(&mut self, key: &'static str, values: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.pairs.push((key, joined));
        }
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Copy `params` and append `outputFormat=json`, replacing any caller-supplied
/// output format.
#[must_use]
pub fn with_output_format(params: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
    let mut pairs: Vec<_> = params
        .iter()
        .filter(|(key, _)| *key != OUTPUT_FORMAT_KEY)
        .cloned()
        .collect();
    pairs.push((OUTPUT_FORMAT_KEY, OUTPUT_FORMAT_JSON.to_string()));
    pairs
}
