//! Resource catalogue
//!
//! The fixed set of kinds the cluster tools understand, with the REST coordinates
//! needed to address them.

/// Operations the cluster agent may plan with
pub const OPERATIONS: &[&str] = &["create", "read", "list", "update", "delete", "logs"];

/// One supported resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// Lowercase singular name (`deployment`)
    pub name: &'static str,
    /// Lowercase plural, as used in REST paths (`deployments`)
    pub plural: &'static str,
    /// API group, empty for the core group
    pub group: &'static str,
    /// API version
    pub version: &'static str,
    /// Whether objects live inside a namespace
    pub namespaced: bool,
}

const fn kind(
    name: &'static str,
    plural: &'static str,
    group: &'static str,
    namespaced: bool,
) -> ResourceKind {
    ResourceKind {
        name,
        plural,
        group,
        version: "v1",
        namespaced,
    }
}

/// Every supported kind
pub const CATALOGUE: &[ResourceKind] = &[
    kind("configmap", "configmaps", "", true),
    kind("namespace", "namespaces", "", false),
    kind("persistentvolume", "persistentvolumes", "", false),
    kind("persistentvolumeclaim", "persistentvolumeclaims", "", true),
    kind("pod", "pods", "", true),
    kind("secret", "secrets", "", true),
    kind("serviceaccount", "serviceaccounts", "", true),
    kind("service", "services", "", true),
    kind("node", "nodes", "", false),
    kind("daemonset", "daemonsets", "apps", true),
    kind("deployment", "deployments", "apps", true),
    kind("replicaset", "replicasets", "apps", true),
    kind("statefulset", "statefulsets", "apps", true),
    kind("job", "jobs", "batch", true),
    kind("cronjob", "cronjobs", "batch", true),
    kind("ingress", "ingresses", "networking.k8s.io", true),
    kind("clusterrole", "clusterroles", "rbac.authorization.k8s.io", false),
    kind(
        "clusterrolebinding",
        "clusterrolebindings",
        "rbac.authorization.k8s.io",
        false,
    ),
    kind("role", "roles", "rbac.authorization.k8s.io", true),
    kind("rolebinding", "rolebindings", "rbac.authorization.k8s.io", true),
];

impl ResourceKind {
    /// The pod kind
    pub const POD: ResourceKind = kind("pod", "pods", "", true);

    /// The namespace kind
    pub const NAMESPACE: ResourceKind = kind("namespace", "namespaces", "", false);

    /// Resolve a user-supplied type name.
    ///
    /// Singular or plural, any case, whitespace ignored.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static ResourceKind> {
        let wanted: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        CATALOGUE
            .iter()
            .find(|k| k.name == wanted || k.plural == wanted)
    }

    fn api_prefix(&self) -> String {
        if self.group.is_empty() {
            format!("/api/{}", self.version)
        } else {
            format!("/apis/{}/{}", self.group, self.version)
        }
    }

    /// Path of the collection; the namespace is ignored for cluster-scoped kinds
    #[must_use]
    pub fn collection_path(&self, namespace: &str) -> String {
        if self.namespaced {
            format!(
                "{}/namespaces/{}/{}",
                self.api_prefix(),
                namespace,
                self.plural
            )
        } else {
            format!("{}/{}", self.api_prefix(), self.plural)
        }
    }

    /// Path of one object
    #[must_use]
    pub fn item_path(&self, namespace: &str, name: &str) -> String {
        format!("{}/{}", self.collection_path(namespace), name)
    }
}

/// Comma separated list of supported kinds
#[must_use]
pub fn resource_type_names() -> String {
    CATALOGUE
        .iter()
        .map(|k| k.name)
        .collect::<Vec<_>>()
        .join(",")
}

/// Comma separated list of operations
#[must_use]
pub fn operation_names() -> String {
    OPERATIONS.join(",")
}
