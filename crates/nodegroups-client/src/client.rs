//! Asynchronous nodegroups client implementation.

use crate::models::{
    nodegroup_pairs, ListNodegroupsParams, ListNodesParams, Nodegroup, SetNodegroupRequest,
    DELETE_NODEGROUP_PATH, GET_NODEGROUP_PATH, LIST_NODEGROUPS_PATH, LIST_NODES_PATH,
    NODEGROUP_FIELD, NODE_FIELD, SET_NODEGROUP_PATH,
};
use crate::Result;
use nodegroups_core::client::HttpConfig;
use nodegroups_core::config::{ClientOptions, NodegroupsConfig};
use nodegroups_core::error::status_line;
use nodegroups_core::query::{with_output_format, OUTPUT_FORMAT_JSON, OUTPUT_FORMAT_KEY};
use nodegroups_core::response::{field_values, ApiResponse, Record};
use nodegroups_core::types::Endpoint;
use nodegroups_core::Error;
use reqwest::{Certificate, Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Builder for [`NodegroupsClient`].
#[derive(Debug, Clone)]
pub struct NodegroupsClientBuilder {
    config: NodegroupsConfig,
    http_config: HttpConfig,
}

impl NodegroupsClientBuilder {
    /// Create a builder from an already resolved configuration.
    #[must_use]
    pub fn new(config: NodegroupsConfig) -> Self {
        Self {
            config,
            http_config: HttpConfig::new(),
        }
    }

    /// Resolve the configuration from an optional config file and explicit
    /// options, then start a builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the config file is missing, unreadable
    /// or invalid.
    pub fn from_options(config_file: Option<&Path>, options: &ClientOptions) -> Result<Self> {
        Ok(Self::new(NodegroupsConfig::resolve(config_file, options)?))
    }

    /// Override the HTTP transport configuration.
    #[must_use]
    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Set a total request timeout. Without one, requests wait as long as
    /// the transport does.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config = self.http_config.with_timeout(timeout);
        self
    }

    /// Finalise the builder and create the [`NodegroupsClient`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if a CA certificate cannot be loaded or
    /// the HTTP client cannot be built, and [`Error::InvalidEndpoint`] for an
    /// unusable base URI.
    pub fn build(self) -> Result<NodegroupsClient> {
        let ro_url = self.config.base_url(Endpoint::Ro)?;
        let rw_url = self.config.base_url(Endpoint::Rw)?;

        if !self.http_config.is_transport_default() {
            debug!(http_config = ?self.http_config, "applying nodegroups transport overrides");
        }
        let mut builder = self
            .http_config
            .apply(ClientBuilder::new().user_agent(self.config.user_agent.as_str()));

        if !self.config.ssl_verify_hostname {
            warn!("TLS hostname verification disabled for nodegroups client");
            builder = builder.danger_accept_invalid_hostnames(true);
        }

        if let Some(cafile) = &self.config.ssl_cafile {
            for cert in load_ca_file(cafile)? {
                builder = builder.add_root_certificate(cert);
            }
        }

        if let Some(capath) = &self.config.ssl_capath {
            for cert in load_ca_dir(capath)? {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build nodegroups HTTP client: {err}"))
        })?;

        Ok(NodegroupsClient {
            http,
            ro_url,
            rw_url,
            config: Arc::new(self.config),
            last_error: Arc::new(RwLock::new(None)),
        })
    }
}

/// Asynchronous nodegroups API client.
///
/// Clones share the HTTP connection pool and the last-error slot.
#[derive(Clone)]
pub struct NodegroupsClient {
    http: Client,
    ro_url: Url,
    rw_url: Url,
    config: Arc<NodegroupsConfig>,
    last_error: Arc<RwLock<Option<String>>>,
}

impl NodegroupsClient {
    /// Construct a client from defaults, an optional config file and explicit
    /// options.
    ///
    /// # Errors
    ///
    /// See [`NodegroupsClientBuilder::from_options`] and
    /// [`NodegroupsClientBuilder::build`].
    pub fn from_options(config_file: Option<&Path>, options: &ClientOptions) -> Result<Self> {
        NodegroupsClientBuilder::from_options(config_file, options)?.build()
    }

    /// Construct a client from a resolved configuration.
    ///
    /// # Errors
    ///
    /// See [`NodegroupsClientBuilder::build`].
    pub fn from_config(config: NodegroupsConfig) -> Result<Self> {
        NodegroupsClientBuilder::new(config).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: NodegroupsConfig) -> NodegroupsClientBuilder {
        NodegroupsClientBuilder::new(config)
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &NodegroupsConfig {
        &self.config
    }

    /// Look up a configuration parameter by its dotted name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for unknown names; the failure is
    /// also recorded as the last error.
    pub fn param(&self, name: &str) -> Result<Option<String>> {
        self.record(self.config.param(name))
    }

    /// Base URL of an endpoint.
    #[must_use]
    pub fn base_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Ro => &self.ro_url,
            Endpoint::Rw => &self.rw_url,
        }
    }

    /// Detail of the most recent failure on this client or any of its clones.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .map(|slot| slot.clone())
            .unwrap_or_default()
    }

    /// Forget the recorded failure.
    pub fn clear_error(&self) {
        if let Ok(mut slot) = self.last_error.write() {
            *slot = None;
        }
    }

    /// List the nodegroups containing any of `nodes`, optionally restricted
    /// to an application's ordering.
    pub async fn list_nodegroups_from_nodes<I, S>(
        &self,
        nodes: I,
        app: Option<&str>,
    ) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut params = ListNodegroupsParams::new(nodes);
        params.app = app.map(str::to_string);
        self.list_nodegroups(&params).await
    }

    /// List the nodegroups containing a single node.
    pub async fn list_nodegroups_from_node(
        &self,
        node: &str,
        app: Option<&str>,
    ) -> Result<Vec<String>> {
        self.list_nodegroups_from_nodes([node], app).await
    }

    /// List nodegroup names using explicit parameters.
    pub async fn list_nodegroups(&self, params: &ListNodegroupsParams) -> Result<Vec<String>> {
        let pairs = self.record(params.to_pairs())?;
        self.get_field(LIST_NODEGROUPS_PATH, &pairs, NODEGROUP_FIELD)
            .await
    }

    /// List the nodes matching a nodegroup expression.
    pub async fn list_nodes(&self, expression: &str) -> Result<Vec<String>> {
        self.list_nodes_with(&ListNodesParams::Expression(expression.to_string()))
            .await
    }

    /// List the member nodes of a nodegroup.
    pub async fn list_nodes_from_nodegroup(&self, nodegroup: &str) -> Result<Vec<String>> {
        self.list_nodes_with(&ListNodesParams::Nodegroup(nodegroup.to_string()))
            .await
    }

    /// List node names using explicit parameters.
    pub async fn list_nodes_with(&self, params: &ListNodesParams) -> Result<Vec<String>> {
        let pairs = self.record(params.to_pairs())?;
        self.get_field(LIST_NODES_PATH, &pairs, NODE_FIELD).await
    }

    /// Fetch a single nodegroup definition.
    pub async fn get_nodegroup(&self, name: &str) -> Result<Nodegroup> {
        let pairs = self.record(nodegroup_pairs(name))?;
        let response = self
            .get::<Nodegroup>(Endpoint::Ro, GET_NODEGROUP_PATH, &pairs)
            .await?;

        let found = response.into_records().into_iter().next().ok_or_else(|| {
            Error::DecodeError(format!("get_nodegroup returned no record for `{name}`"))
        });
        self.record(found)
    }

    /// Create or update a nodegroup on the read-write API and return the
    /// stored definition.
    pub async fn set_nodegroup(&self, request: &SetNodegroupRequest) -> Result<Nodegroup> {
        let pairs = self.record(request.to_pairs())?;
        let response = self
            .post::<Nodegroup>(Endpoint::Rw, SET_NODEGROUP_PATH, &pairs)
            .await?;

        let stored = response.into_records().into_iter().next().ok_or_else(|| {
            Error::DecodeError(format!(
                "set_nodegroup returned no record for `{}`",
                request.nodegroup
            ))
        });
        self.record(stored)
    }

    /// Delete a nodegroup on the read-write API.
    pub async fn delete_nodegroup(&self, name: &str) -> Result<()> {
        let pairs = self.record(nodegroup_pairs(name))?;
        self.post::<Record>(Endpoint::Rw, DELETE_NODEGROUP_PATH, &pairs)
            .await
            .map(|_| ())
    }

    /// Issue a GET and decode the response envelope.
    ///
    /// `params` are sent in the query string together with `outputFormat=json`.
    pub async fn get<T>(
        &self,
        endpoint: Endpoint,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let result = self.execute(Method::GET, endpoint, path, params).await;
        self.record(result)
    }

    /// Issue a POST and decode the response envelope.
    ///
    /// `params` are sent as a form body; the query string carries
    /// `outputFormat=json`.
    pub async fn post<T>(
        &self,
        endpoint: Endpoint,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let result = self.execute(Method::POST, endpoint, path, params).await;
        self.record(result)
    }

    async fn get_field(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        field: &str,
    ) -> Result<Vec<String>> {
        let response = self.get::<Record>(Endpoint::Ro, path, params).await?;
        Ok(field_values(&response.into_records(), field))
    }

    fn build_url(&self, endpoint: Endpoint, path: &str) -> Result<Url> {
        self.base_url(endpoint)
            .join(path.trim_start_matches('/'))
            .map_err(|err| {
                Error::InvalidEndpoint(format!("Invalid nodegroups path `{path}`: {err}"))
            })
    }

    fn record<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            if let Ok(mut slot) = self.last_error.write() {
                *slot = Some(error.detail().to_string());
            }
        }
        result
    }

    async fn execute<T>(
        &self,
        method: Method,
        endpoint: Endpoint,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(endpoint, path)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header("Accept", "application/json");
        request = if method == Method::GET {
            request.query(&with_output_format(params))
        } else {
            request
                .query(&[(OUTPUT_FORMAT_KEY, OUTPUT_FORMAT_JSON)])
                .form(params)
        };

        info!(%method, %endpoint, path = %path, "Sending nodegroups request");

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %body, "nodegroups request failed");
            return Err(map_status_to_error(status));
        }

        let body = response.bytes().await?;
        ApiResponse::decode(&body)
    }
}

fn map_status_to_error(status: StatusCode) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => Error::ServiceUnavailable(status_line(status)),
        _ => Error::from_status(status),
    }
}

fn load_ca_file(path: &Path) -> Result<Vec<Certificate>> {
    debug!("loading nodegroups CA certificates from {}", path.display());
    let bytes = fs::read(path).map_err(|err| {
        Error::ConfigError(format!(
            "Failed to read CA file {}: {err}",
            path.display()
        ))
    })?;
    let certs = Certificate::from_pem_bundle(&bytes).map_err(|err| {
        Error::ConfigError(format!("Invalid CA file {}: {err}", path.display()))
    })?;
    if certs.is_empty() {
        return Err(Error::ConfigError(format!(
            "No certificates found in CA file {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_ca_dir(dir: &Path) -> Result<Vec<Certificate>> {
    let entries = fs::read_dir(dir).map_err(|err| {
        Error::ConfigError(format!(
            "Failed to read CA directory {}: {err}",
            dir.display()
        ))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_cert = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "pem" | "crt" | "cer"));
        if is_cert && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut certs = Vec::new();
    for path in paths {
        certs.extend(load_ca_file(&path)?);
    }
    Ok(certs)
}
