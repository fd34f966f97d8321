//! Kubernetes - Cluster exploration tools
//!
//! The cluster agent works through a fixed plan: pick a resource type, pick a
//! namespace, pick an operation, find the object name, then act. The tools here
//! answer each of those questions against a [`ClusterClient`].
//!
//! [`RestClusterClient`] talks to the API server over HTTPS with a bearer token.
//! [`ClusterConfig::discover`] finds credentials from the environment, a GKE
//! cluster description or the in-cluster service account.

mod catalogue;
mod client;
mod render;
mod rest;
mod tools;


pub use catalogue::{operation_names, resource_type_names, ResourceKind, CATALOGUE, OPERATIONS};
pub use client::{object_name, pod_phase, ClusterClient, LOG_TAIL_LINES};
pub use render::render_resource;
pub use rest::{ClusterConfig, RestClusterClient};
pub use tools::{
    CreateNamespaceTool, GetResourceTool, NamespacesTool, ObjectNamesTool, OperationsTool,
    PodLogsTool, PodNameLikeTool, ResourceTypesTool,
};

use crate::toolkit::Toolkit;
use std::sync::Arc;

/// Every cluster tool, in the order the planner sees them
#[must_use]
pub fn toolkit(client: Arc<dyn ClusterClient>) -> Toolkit {
    Toolkit::new("k8s")
        .with_tool(Arc::new(ResourceTypesTool::new()))
        .with_tool(Arc::new(NamespacesTool::new(Arc::clone(&client))))
        .with_tool(Arc::new(ObjectNamesTool::new(Arc::clone(&client))))
        .with_tool(Arc::new(PodNameLikeTool::new(Arc::clone(&client))))
        .with_tool(Arc::new(PodLogsTool::new(Arc::clone(&client))))
        .with_tool(Arc::new(OperationsTool::new()))
        .with_tool(Arc::new(GetResourceTool::new(Arc::clone(&client))))
        .with_tool(Arc::new(CreateNamespaceTool::new(client)))
}
