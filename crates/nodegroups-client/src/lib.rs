//! Nodegroups API client.
//!
//! Resolves nodegroups to their member nodes and nodes to the nodegroups
//! containing them, over the read-only (`ro`) API, and manages nodegroup
//! definitions over the read-write (`rw`) API.
//!
//! ```no_run
//! use nodegroups_client::{ClientOptions, NodegroupsClient};
//!
//! # async fn run() -> nodegroups_client::Result<()> {
//! let options = ClientOptions::new().with_uri_ro("https://nodegroups.example.com/api/");
//! let client = NodegroupsClient::from_options(None, &options)?;
//! let nodes = client.list_nodes_from_nodegroup("web").await?;
//! # let _ = nodes;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{NodegroupsClient, NodegroupsClientBuilder};
pub use models::{ListNodegroupsParams, ListNodesParams, Nodegroup, SetNodegroupRequest};
pub use nodegroups_core::config::{ClientOptions, NodegroupsConfig};
pub use nodegroups_core::types::Endpoint;
pub use nodegroups_core::Error;

/// Convenient result alias that reuses the shared nodegroups error type.
pub type Result<T> = nodegroups_core::Result<T>;
