//! Cluster tools

use super::catalogue::{operation_names, resource_type_names, ResourceKind};
use super::client::{object_name, pod_phase, ClusterClient, LOG_TAIL_LINES};
use super::render::render_resource;
use crate::args::{ArgSchema, ParsedArgs};
use crate::error::{Error, Result};
use crate::registry::{RiskLevel, Tool, ToolCategory, ToolDefinition};
use std::sync::Arc;
use tracing::debug;

fn cluster_tool(name: &str, description: &str, args: ArgSchema) -> ToolDefinition {
    ToolDefinition::new(name, description)
        .with_args(args)
        .with_category(ToolCategory::Cluster)
}

fn resolve_kind(name: &str) -> Result<&'static ResourceKind> {
    ResourceKind::lookup(name).ok_or_else(|| {
        Error::InvalidInput(format!(
            "invalid resource type '{}', use one of {}",
            name,
            resource_type_names()
        ))
    })
}

async fn pod_names(
    client: &dyn ClusterClient,
    namespace: &str,
    running_only: bool,
) -> Result<Vec<String>> {
    let pods = client
        .list(&ResourceKind::POD, namespace)
        .await
        .map_err(|e| Error::Upstream(format!("failed to list pods in {}: {}", namespace, e)))?;
    Ok(pods
        .iter()
        .filter(|pod| !running_only || pod_phase(pod) == Some("Running"))
        .filter_map(|pod| object_name(pod).map(str::to_string))
        .collect())
}

fn no_pod_like(prefix: &str) -> String {
    format!("No pod found with name like: {}", prefix)
}

/// Lists the supported resource kinds
pub struct ResourceTypesTool {
    definition: ToolDefinition,
}

impl ResourceTypesTool {
    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            definition: cluster_tool(
                "k8s_get_available_resource_types",
                "Can be used to list all resource types available to the tool. \
                 Returns a comma separated list of resource types.",
                ArgSchema::none(),
            ),
        }
    }
}

impl Default for ResourceTypesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for ResourceTypesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, _args: ParsedArgs) -> Result<String> {
        Ok(resource_type_names())
    }
}

/// Lists the operations the cluster agent can plan with
pub struct OperationsTool {
    definition: ToolDefinition,
}

impl OperationsTool {
    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            definition: cluster_tool(
                "k8s_determine_operations",
                "Can be used to determine which operations are available. \
                 Before calling this, you should know the resource you want to operate on.",
                ArgSchema::none(),
            ),
        }
    }
}

impl Default for OperationsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for OperationsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, _args: ParsedArgs) -> Result<String> {
        Ok(operation_names())
    }
}

/// Lists namespaces
pub struct NamespacesTool {
    definition: ToolDefinition,
    client: Arc<dyn ClusterClient>,
}

impl NamespacesTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            definition: cluster_tool(
                "k8s_get_available_namespaces",
                "Can be used to list all available namespaces. \
                 Returns a comma separated list of namespaces.",
                ArgSchema::none(),
            ),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for NamespacesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, _args: ParsedArgs) -> Result<String> {
        let namespaces = self
            .client
            .list_namespaces()
            .await
            .map_err(|e| Error::Upstream(format!("failed to list namespaces: {}", e)))?;
        Ok(namespaces.join(","))
    }
}

/// Lists object names of one kind
pub struct ObjectNamesTool {
    definition: ToolDefinition,
    client: Arc<dyn ClusterClient>,
}

impl ObjectNamesTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            definition: cluster_tool(
                "k8s_get_object_names",
                "You should know the resource type and namespace before calling this tool. \
                 Can be used to list the names of resources with a given resource type in a given namespace. \
                 Returns a comma separated list of resource names.",
                ArgSchema::none()
                    .name("namespace", "the namespace")
                    .name("resource_type", "the resource type"),
            ),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for ObjectNamesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let namespace = args.str("namespace")?;
        let kind = resolve_kind(args.str("resource_type")?)?;

        let objects = self.client.list(kind, namespace).await.map_err(|e| {
            Error::Upstream(format!(
                "failed to list {} in {}: {}",
                kind.plural, namespace, e
            ))
        })?;

        let names: Vec<&str> = objects.iter().filter_map(object_name).collect();
        if names.is_empty() {
            return Ok(format!("No {} found in {}", kind.plural, namespace));
        }
        Ok(names.join(","))
    }
}

/// Resolves a pod prefix to a full pod name
pub struct PodNameLikeTool {
    definition: ToolDefinition,
    client: Arc<dyn ClusterClient>,
}

impl PodNameLikeTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            definition: cluster_tool(
                "k8s_get_pod_name_like",
                "You should know the namespace and the start of the pod name before calling this tool. \
                 Returns the full name of the first pod whose name starts with the given prefix.",
                ArgSchema::none()
                    .name("namespace", "the namespace")
                    .name("pod_prefix", "the start of the pod name"),
            ),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for PodNameLikeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let namespace = args.str("namespace")?;
        let prefix = args.str("pod_prefix")?;

        let names = pod_names(self.client.as_ref(), namespace, false).await?;
        Ok(names
            .into_iter()
            .find(|name| name.starts_with(prefix))
            .unwrap_or_else(|| no_pod_like(prefix)))
    }
}

/// Tails the log of a running pod
pub struct PodLogsTool {
    definition: ToolDefinition,
    client: Arc<dyn ClusterClient>,
}

impl PodLogsTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            definition: cluster_tool(
                "k8s_get_pod_logs",
                "You should call the k8s_get_pod_name_like tool first to get the name of the pod. \
                 You should know the namespace and pod name before calling this tool. \
                 Returns the last 50 lines of the logs of the first running pod whose name starts with the given name.",
                ArgSchema::none()
                    .name("namespace", "the namespace")
                    .name("pod_name", "the pod name or its prefix"),
            ),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for PodLogsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let namespace = args.str("namespace")?;
        let prefix = args.str("pod_name")?;

        let running = pod_names(self.client.as_ref(), namespace, true).await?;
        let Some(pod) = running.into_iter().find(|name| name.starts_with(prefix)) else {
            return Ok(no_pod_like(prefix));
        };

        debug!(pod = %pod, namespace = %namespace, "Fetching pod logs");
        self.client
            .pod_logs(namespace, &pod, LOG_TAIL_LINES)
            .await
            .map_err(|e| {
                Error::Upstream(format!(
                    "failed to get logs for pod {} in {}: {}",
                    pod, namespace, e
                ))
            })
    }
}

/// Reads one object as YAML
pub struct GetResourceTool {
    definition: ToolDefinition,
    client: Arc<dyn ClusterClient>,
}

impl GetResourceTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            definition: cluster_tool(
                "k8s_get_resource",
                "You should know the namespace, resource type, and object name before calling this tool. \
                 Executes a get in the specified namespace for the specified resource type, with the specified name. \
                 Returns a yaml string containing the spec.",
                ArgSchema::none()
                    .name("namespace", "the namespace")
                    .name("resource_type", "the resource type")
                    .name("name", "the object name"),
            ),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for GetResourceTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let namespace = args.str("namespace")?;
        let kind = resolve_kind(args.str("resource_type")?)?;
        let name = args.str("name")?;

        let object = self.client.get(kind, namespace, name).await.map_err(|e| {
            Error::Upstream(format!(
                "failed to get {}/{} in {}: {}",
                kind.name, name, namespace, e
            ))
        })?;
        render_resource(&object)
    }
}

/// Creates a namespace
pub struct CreateNamespaceTool {
    definition: ToolDefinition,
    client: Arc<dyn ClusterClient>,
}

impl CreateNamespaceTool {
    /// Create the tool
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            definition: cluster_tool(
                "k8s_create_namespace",
                "Can be used to create a new namespace. \
                 Returns a string indicating success or failure.",
                ArgSchema::none().name("name", "the name of the namespace to create"),
            )
            .with_risk_level(RiskLevel::Medium),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Tool for CreateNamespaceTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let name = args.str("name")?;
        self.client
            .create_namespace(name)
            .await
            .map_err(|e| Error::Upstream(format!("failed to create namespace {}: {}", name, e)))?;
        Ok(format!("Namespace {} created", name))
    }
}
