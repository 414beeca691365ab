//! Configuration for nodegroups clients.
//!
//! A [`NodegroupsConfig`] is resolved from three layers, later layers
//! winning: built-in defaults, an optional INI config file, and explicit
//! [`ClientOptions`]. The config file uses the `[uri]` section for the API
//! base URIs and the `[perl]` section for transport settings, the layout
//! shared with the other nodegroups client implementations.

use crate::ini::{parse_bool, IniDocument};
use crate::types::Endpoint;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;
use validator::Validate;

/// Default base URI for both the read-only and read-write APIs.
pub const DEFAULT_URI: &str = "http://localhost/api/";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("nodegroups-client/", env!("CARGO_PKG_VERSION"));

/// Config file section holding transport settings.
pub const TRANSPORT_SECTION: &str = "perl";

/// Every parameter name accepted by [`NodegroupsConfig::param`].
pub const PARAMETER_NAMES: [&str; 6] = [
    "uri.ro",
    "uri.rw",
    "ssl_cafile",
    "ssl_capath",
    "ssl_verify_hostname",
    "user_agent",
];

/// Explicit constructor options. Any field left as `None` falls through to
/// the config file and then to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Read-only API base URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_ro: Option<String>,

    /// Read-write API base URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_rw: Option<String>,

    /// PEM file with CA certificates to trust
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_cafile: Option<PathBuf>,

    /// Directory of PEM CA certificates to trust
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_capath: Option<PathBuf>,

    /// Whether to verify the server hostname against its certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_verify_hostname: Option<bool>,

    /// `User-Agent` header value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ClientOptions {
    /// Create an empty set of options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the read-only base URI.
    #[must_use]
    pub fn with_uri_ro(mut self, uri: impl Into<String>) -> Self {
        self.uri_ro = Some(uri.into());
        self
    }

    /// Set the read-write base URI.
    #[must_use]
    pub fn with_uri_rw(mut self, uri: impl Into<String>) -> Self {
        self.uri_rw = Some(uri.into());
        self
    }

    /// Set the CA file.
    #[must_use]
    pub fn with_ssl_cafile(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_cafile = Some(path.into());
        self
    }

    /// Set the CA directory.
    #[must_use]
    pub fn with_ssl_capath(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_capath = Some(path.into());
        self
    }

    /// Enable or disable hostname verification.
    #[must_use]
    pub const fn with_ssl_verify_hostname(mut self, verify: bool) -> Self {
        self.ssl_verify_hostname = Some(verify);
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NodegroupsConfig {
    /// Read-only API base URI
    #[validate(url)]
    pub uri_ro: String,

    /// Read-write API base URI
    #[validate(url)]
    pub uri_rw: String,

    /// PEM file with CA certificates to trust
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_cafile: Option<PathBuf>,

    /// Directory of PEM CA certificates to trust
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_capath: Option<PathBuf>,

    /// Whether to verify the server hostname against its certificate
    #[serde(default = "default_verify_hostname")]
    pub ssl_verify_hostname: bool,

    /// `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_verify_hostname() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for NodegroupsConfig {
    fn default() -> Self {
        Self {
            uri_ro: DEFAULT_URI.to_string(),
            uri_rw: DEFAULT_URI.to_string(),
            ssl_cafile: None,
            ssl_capath: None,
            ssl_verify_hostname: default_verify_hostname(),
            user_agent: default_user_agent(),
        }
    }
}

impl NodegroupsConfig {
    /// Resolve a configuration from defaults, an optional config file and
    /// explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file cannot be read or parsed or a
    /// base URI uses a scheme other than http(s), and
    /// [`Error::ValidationError`] if a base URI is not a URL at all.
    pub fn resolve(file: Option<&Path>, options: &ClientOptions) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = file {
            config.apply_file(path)?;
        }
        config.apply_options(options);
        config.normalize();
        config.check()?;

        Ok(config)
    }

    /// Resolve a configuration from a config file alone.
    ///
    /// # Errors
    ///
    /// See [`NodegroupsConfig::resolve`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::resolve(Some(path.as_ref()), &ClientOptions::default())
    }

    /// Resolve a configuration from explicit options over the defaults.
    ///
    /// # Errors
    ///
    /// See [`NodegroupsConfig::resolve`].
    pub fn from_options(options: &ClientOptions) -> Result<Self> {
        Self::resolve(None, options)
    }

    /// Look up a parameter by its dotted name.
    ///
    /// Unset optional parameters yield `Ok(None)`; booleans render as
    /// `"true"`/`"false"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for names outside
    /// [`PARAMETER_NAMES`].
    pub fn param(&self, name: &str) -> Result<Option<String>> {
        let value = match name {
            "uri.ro" => Some(self.uri_ro.clone()),
            "uri.rw" => Some(self.uri_rw.clone()),
            "ssl_cafile" => self.ssl_cafile.as_ref().map(|p| p.display().to_string()),
            "ssl_capath" => self.ssl_capath.as_ref().map(|p| p.display().to_string()),
            "ssl_verify_hostname" => Some(self.ssl_verify_hostname.to_string()),
            "user_agent" => Some(self.user_agent.clone()),
            _ => {
                return Err(Error::UnknownParameter(format!(
                    "{name} (expected one of: {})",
                    PARAMETER_NAMES.join(", ")
                )))
            }
        };
        Ok(value)
    }

    /// Base URI string for an endpoint.
    #[must_use]
    pub fn uri(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Ro => &self.uri_ro,
            Endpoint::Rw => &self.uri_rw,
        }
    }

    /// Parse the base URI for an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the URI is not an absolute
    /// http(s) URL.
    pub fn base_url(&self, endpoint: Endpoint) -> Result<Url> {
        let raw = self.uri(endpoint);
        let url = Url::parse(raw).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid {} URI `{raw}`: {err}", endpoint.parameter()))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::InvalidEndpoint(format!(
                "Unsupported scheme `{scheme}` for {}",
                endpoint.parameter()
            ))),
        }
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        debug!("loading nodegroups config from {}", path.display());

        let text = fs::read_to_string(path).map_err(|err| {
            Error::ConfigError(format!(
                "Failed to read config file {}: {err}",
                path.display()
            ))
        })?;
        let doc = IniDocument::parse(&text).map_err(|err| {
            Error::ConfigError(format!("Invalid config file {}: {err}", path.display()))
        })?;

        if doc.is_empty() {
            debug!("config file {} holds no settings", path.display());
        }
        self.apply_document(&doc)
    }

    fn apply_document(&mut self, doc: &IniDocument) -> Result<()> {
        if let Some(uri) = doc.get("uri", Endpoint::Ro.name()) {
            self.uri_ro = uri.to_string();
        }
        if let Some(uri) = doc.get("uri", Endpoint::Rw.name()) {
            self.uri_rw = uri.to_string();
        }
        if let Some(path) = doc.get(TRANSPORT_SECTION, "ssl_cafile") {
            self.ssl_cafile = non_empty_path(path);
        }
        if let Some(path) = doc.get(TRANSPORT_SECTION, "ssl_capath") {
            self.ssl_capath = non_empty_path(path);
        }
        if let Some(raw) = doc.get(TRANSPORT_SECTION, "ssl_verify_hostname") {
            self.ssl_verify_hostname = parse_bool(raw).ok_or_else(|| {
                Error::ConfigError(format!(
                    "Invalid boolean `{raw}` for {TRANSPORT_SECTION}.ssl_verify_hostname"
                ))
            })?;
        }
        if let Some(user_agent) = doc.get(TRANSPORT_SECTION, "user_agent") {
            self.user_agent = user_agent.to_string();
        }
        Ok(())
    }

    fn apply_options(&mut self, options: &ClientOptions) {
        if let Some(uri) = &options.uri_ro {
            self.uri_ro.clone_from(uri);
        }
        if let Some(uri) = &options.uri_rw {
            self.uri_rw.clone_from(uri);
        }
        if let Some(path) = &options.ssl_cafile {
            self.ssl_cafile = Some(path.clone());
        }
        if let Some(path) = &options.ssl_capath {
            self.ssl_capath = Some(path.clone());
        }
        if let Some(verify) = options.ssl_verify_hostname {
            self.ssl_verify_hostname = verify;
        }
        if let Some(user_agent) = &options.user_agent {
            self.user_agent.clone_from(user_agent);
        }
    }

    // Base URI paths must end in `/` so `Url::join` keeps their last segment.
    fn normalize(&mut self) {
        for uri in [&mut self.uri_ro, &mut self.uri_rw] {
            let trimmed = uri.trim();
            *uri = match Url::parse(trimmed) {
                Ok(mut url) if !url.cannot_be_a_base() => {
                    if !url.path().ends_with('/') {
                        let path = format!("{}/", url.path());
                        url.set_path(&path);
                    }
                    url.into()
                }
                _ => trimmed.to_string(),
            };
        }
    }

    fn check(&self) -> Result<()> {
        self.validate()?;
        for endpoint in Endpoint::all() {
            self.base_url(*endpoint)
                .map_err(|e| Error::ConfigError(e.detail().to_string()))?;
        }
        Ok(())
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = NodegroupsConfig::default();
        assert_eq!(config.param("uri.ro").unwrap().as_deref(), Some(DEFAULT_URI));
        assert_eq!(config.param("uri.rw").unwrap().as_deref(), Some(DEFAULT_URI));
        assert_eq!(config.param("ssl_cafile").unwrap(), None);
        assert_eq!(config.param("ssl_capath").unwrap(), None);
        assert_eq!(
            config.param("ssl_verify_hostname").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(
            config.param("user_agent").unwrap().as_deref(),
            Some(DEFAULT_USER_AGENT)
        );
        assert!(DEFAULT_USER_AGENT.starts_with("nodegroups-client/"));
    }

    #[test]
    fn test_resolve_without_layers_matches_defaults() {
        let config = NodegroupsConfig::resolve(None, &ClientOptions::default()).unwrap();
        assert_eq!(config, NodegroupsConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            "[uri]\nro = https://ro.example.com/api\n\n[perl]\nssl_verify_hostname = 0\nuser_agent = ops/2\n",
        );

        let config = NodegroupsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.uri_ro, "https://ro.example.com/api/");
        assert_eq!(config.uri_rw, DEFAULT_URI);
        assert!(!config.ssl_verify_hostname);
        assert_eq!(config.user_agent, "ops/2");
    }

    #[test]
    fn test_options_override_file() {
        let file = write_config(
            "[uri]\nro = https://file-ro.example.com/\nrw = https://file-rw.example.com/\n[perl]\nssl_cafile = /etc/file-ca.pem\n",
        );
        let options = ClientOptions::new()
            .with_uri_ro("https://opt-ro.example.com/")
            .with_ssl_cafile("/etc/opt-ca.pem");

        let config = NodegroupsConfig::resolve(Some(file.path()), &options).unwrap();
        assert_eq!(config.uri_ro, "https://opt-ro.example.com/");
        assert_eq!(config.uri_rw, "https://file-rw.example.com/");
        assert_eq!(config.ssl_cafile, Some(PathBuf::from("/etc/opt-ca.pem")));
    }

    #[test]
    fn test_options_override_defaults() {
        let options = ClientOptions::new()
            .with_uri_rw("http://rw.local:8080/api")
            .with_ssl_verify_hostname(false)
            .with_ssl_capath("/etc/ssl/certs")
            .with_user_agent("tests");

        let config = NodegroupsConfig::from_options(&options).unwrap();
        assert_eq!(config.uri_ro, DEFAULT_URI);
        assert_eq!(config.uri_rw, "http://rw.local:8080/api/");
        assert!(!config.ssl_verify_hostname);
        assert_eq!(config.ssl_capath, Some(PathBuf::from("/etc/ssl/certs")));
        assert_eq!(config.user_agent, "tests");
    }

    #[test]
    fn test_unknown_parameter() {
        let config = NodegroupsConfig::default();
        let err = config.param("uri.admin").unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(_)));
        assert!(err.to_string().starts_with("Unknown parameter: uri.admin"));
        assert!(err.detail().contains("expected one of: uri.ro"));
    }

    #[test]
    fn test_missing_file_reports_os_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nodegroups.ini");

        let err = NodegroupsConfig::from_file(&missing).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
        assert!(
            err.detail().contains("No such file or directory"),
            "unexpected message: {}",
            err.detail()
        );
    }

    #[test]
    fn test_invalid_file_syntax() {
        let file = write_config("[uri\nro = http://x/\n");
        let err = NodegroupsConfig::from_file(file.path()).unwrap_err();
        assert!(err.detail().contains("line 1: unterminated section header"));
    }

    #[test]
    fn test_invalid_boolean_in_file() {
        let file = write_config("[perl]\nssl_verify_hostname = sometimes\n");
        let err = NodegroupsConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
        assert!(err.detail().contains("sometimes"));
    }

    #[test]
    fn test_rejects_invalid_uri() {
        let options = ClientOptions::new().with_uri_ro("not a uri");
        let err = NodegroupsConfig::from_options(&options).unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(err.detail().contains("uri_ro"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let options = ClientOptions::new().with_uri_rw("ftp://files.example.com/");
        let err = NodegroupsConfig::from_options(&options).unwrap_err();
        assert!(err.detail().contains("Unsupported scheme `ftp`"));
    }

    #[test]
    fn test_base_url_keeps_path_segment() {
        let options = ClientOptions::new().with_uri_ro("http://ng.example.com/nodegroups/api");
        let config = NodegroupsConfig::from_options(&options).unwrap();
        let url = config
            .base_url(Endpoint::Ro)
            .unwrap()
            .join("v1/list_nodes")
            .unwrap();
        assert_eq!(url.as_str(), "http://ng.example.com/nodegroups/api/v1/list_nodes");
    }

    #[test]
    fn test_normalize_keeps_query_out_of_path() {
        let options = ClientOptions::new().with_uri_ro("http://h/api?x=1");
        let config = NodegroupsConfig::from_options(&options).unwrap();
        assert_eq!(config.uri_ro, "http://h/api/?x=1");

        let url = config
            .base_url(Endpoint::Ro)
            .unwrap()
            .join("v1/list_nodes")
            .unwrap();
        assert_eq!(url.as_str(), "http://h/api/v1/list_nodes");
    }

    #[test]
    fn test_normalize_host_only_uri() {
        let options = ClientOptions::new().with_uri_rw("  http://ng.example.com  ");
        let config = NodegroupsConfig::from_options(&options).unwrap();
        assert_eq!(config.uri_rw, "http://ng.example.com/");
    }

    #[test]
    fn test_empty_file_paths_clear_setting() {
        let file = write_config("[perl]\nssl_cafile =\n");
        let options = ClientOptions::new();
        let config = NodegroupsConfig::resolve(Some(file.path()), &options).unwrap();
        assert_eq!(config.ssl_cafile, None);
    }
}
