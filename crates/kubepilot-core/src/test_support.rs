//! Fakes shared by the unit tests

use kubepilot_tools::builtins::k8s::ResourceKind;
use kubepilot_tools::builtins::{ClusterClient, MessageSink, MessageTarget, OutgoingMessage};
use kubepilot_tools::{Error, Result};
use serde_json::{json, Value};
use std::sync::Mutex;

/// Cluster with fixed namespaces and nothing else
pub(crate) struct FakeCluster {
    pub(crate) namespaces: Vec<String>,
}

impl FakeCluster {
    pub(crate) fn new(namespaces: &[&str]) -> Self {
        Self {
            namespaces: namespaces.iter().map(|n| n.to_string()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl ClusterClient for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(self.namespaces.clone())
    }

    async fn list(&self, _kind: &ResourceKind, _namespace: &str) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn get(&self, kind: &ResourceKind, namespace: &str, name: &str) -> Result<Value> {
        Err(Error::NotFound(format!("{} {}/{}", kind.name, namespace, name)))
    }

    async fn pod_logs(&self, _namespace: &str, _pod: &str, _tail_lines: u32) -> Result<String> {
        Ok(String::new())
    }

    async fn create_namespace(&self, name: &str) -> Result<Value> {
        Ok(json!({"metadata": {"name": name}}))
    }
}

/// Keeps every posted message
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) posts: Mutex<Vec<(MessageTarget, OutgoingMessage)>>,
}

#[async_trait::async_trait]
impl MessageSink for RecordingSink {
    async fn post(&self, target: &MessageTarget, message: OutgoingMessage) -> Result<()> {
        self.posts.lock().unwrap().push((target.clone(), message));
        Ok(())
    }
}
