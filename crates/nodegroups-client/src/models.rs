//! Nodegroups API models and request parameters.

use nodegroups_core::query::QueryParams;
use nodegroups_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Path of the nodegroups-for-nodes lookup.
pub const LIST_NODEGROUPS_PATH: &str = "v1/list_nodegroups";
/// Path of the nodes lookup (by expression or nodegroup).
pub const LIST_NODES_PATH: &str = "v1/list_nodes";
/// Path of the single nodegroup lookup.
pub const GET_NODEGROUP_PATH: &str = "v1/get_nodegroup";
/// Path used to create or update a nodegroup.
pub const SET_NODEGROUP_PATH: &str = "v1/set_nodegroup";
/// Path used to delete a nodegroup.
pub const DELETE_NODEGROUP_PATH: &str = "v1/delete_nodegroup";

/// Record field holding a nodegroup name.
pub const NODEGROUP_FIELD: &str = "nodegroup";
/// Record field holding a node name.
pub const NODE_FIELD: &str = "node";

/// A nodegroup definition as returned by `get_nodegroup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Nodegroup {
    /// Nodegroup name.
    pub nodegroup: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expression the membership is computed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Current member nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,
}

/// Query parameters for listing the nodegroups that contain some nodes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListNodegroupsParams {
    /// Nodes to look up.
    pub nodes: Vec<String>,
    /// Restrict to nodegroups ordered for this application.
    pub app: Option<String>,
}

impl ListNodegroupsParams {
    /// Build parameters for a set of nodes.
    #[must_use]
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            app: None,
        }
    }

    /// Restrict the lookup to an application.
    #[must_use]
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Convert to URL query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if no non-blank node was given.
    pub fn to_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = QueryParams::new();
        params.push_list("node", &self.nodes);
        if params.is_empty() {
            return Err(Error::InvalidRequest(
                "at least one node is required".to_string(),
            ));
        }
        params.push_opt("app", non_blank(self.app.as_deref()));
        Ok(params.into_pairs())
    }
}

/// Query parameters for listing nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListNodesParams {
    /// Nodes matching a nodegroup expression (e.g. `@web & @prod`).
    Expression(String),
    /// Members of a named nodegroup.
    Nodegroup(String),
}

impl ListNodesParams {
    /// Convert to URL query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the expression or name is blank.
    pub fn to_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        let (key, value) = match self {
            Self::Expression(expression) => ("expression", expression),
            Self::Nodegroup(name) => ("nodegroup", name),
        };
        let value = non_blank(Some(value.as_str()))
            .ok_or_else(|| Error::InvalidRequest(format!("{key} must not be empty")))?;

        let mut params = QueryParams::new();
        params.push(key, value);
        Ok(params.into_pairs())
    }
}

/// Form payload for creating or updating a nodegroup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetNodegroupRequest {
    /// Nodegroup name.
    pub nodegroup: String,
    /// Membership expression.
    pub expression: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SetNodegroupRequest {
    /// Create a request for a nodegroup defined by `expression`.
    #[must_use]
    pub fn new(nodegroup: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            nodegroup: nodegroup.into(),
            expression: expression.into(),
            description: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Convert to form pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the nodegroup name is blank.
    pub fn to_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        let name = non_blank(Some(self.nodegroup.as_str()))
            .ok_or_else(|| Error::InvalidRequest("nodegroup must not be empty".to_string()))?;

        let mut params = QueryParams::new();
        params.push("nodegroup", name);
        params.push("expression", &self.expression);
        params.push_opt("description", self.description.as_ref());
        Ok(params.into_pairs())
    }
}

/// Form pairs naming a single nodegroup.
pub(crate) fn nodegroup_pairs(name: &str) -> Result<Vec<(&'static str, String)>> {
    ListNodesParams::Nodegroup(name.to_string()).to_pairs()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
