//! Cluster client interface

use super::catalogue::ResourceKind;
use crate::error::Result;
use serde_json::Value;

/// Lines of log returned by the logs tool
pub const LOG_TAIL_LINES: u32 = 50;

/// Operations the cluster tools need from a Kubernetes API
#[async_trait::async_trait]
pub trait ClusterClient: Send + Sync {
    /// Names of all namespaces
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// All objects of a kind; `namespace` is ignored for cluster-scoped kinds
    async fn list(&self, kind: &ResourceKind, namespace: &str) -> Result<Vec<Value>>;

    /// One object
    async fn get(&self, kind: &ResourceKind, namespace: &str, name: &str) -> Result<Value>;

    /// The last `tail_lines` lines of a pod's log
    async fn pod_logs(&self, namespace: &str, pod: &str, tail_lines: u32) -> Result<String>;

    /// Create a namespace, returning the created object
    async fn create_namespace(&self, name: &str) -> Result<Value>;
}

/// `metadata.name` of an object
#[must_use]
pub fn object_name(object: &Value) -> Option<&str> {
    object.pointer("/metadata/name").and_then(Value::as_str)
}

/// `status.phase` of a pod
#[must_use]
pub fn pod_phase(object: &Value) -> Option<&str> {
    object.pointer("/status/phase").and_then(Value::as_str)
}
