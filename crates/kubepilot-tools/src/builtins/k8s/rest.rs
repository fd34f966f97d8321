//! Kubernetes REST client
//!
//! A thin reqwest client over the Kubernetes API. Endpoint and credentials are
//! resolved once at startup by [`ClusterConfig::discover`]:
//!
//! 1. `KUBE_API_SERVER` and `KUBE_TOKEN` (optional `KUBE_CA_CERT` PEM path)
//! 2. a GKE cluster named by `GOOGLE_PROJECT_ID`, `GOOGLE_REGION`, `GOOGLE_CLUSTER_ID`
//! 3. the in-cluster service account

use super::catalogue::ResourceKind;
use super::client::ClusterClient;
use crate::error::{Error, Result};
use base64::Engine;
use kubepilot_llm::util::mask_api_key;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
const GKE_API: &str = "https://container.googleapis.com/v1";

/// Where and how to reach the cluster
#[derive(Clone)]
pub struct ClusterConfig {
    /// API server base URL, e.g. `https://34.1.2.3`
    pub api_server: String,
    /// Bearer token
    pub token: String,
    /// PEM encoded CA certificate for the API server
    pub ca_cert_pem: Option<Vec<u8>>,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("api_server", &self.api_server)
            .field("token", &mask_api_key(&self.token))
            .field("ca_cert_pem", &self.ca_cert_pem.as_ref().map(|c| c.len()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GkeCluster {
    endpoint: String,
    master_auth: GkeMasterAuth,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GkeMasterAuth {
    cluster_ca_certificate: String,
}

impl ClusterConfig {
    /// Explicit endpoint and token
    #[must_use]
    pub fn new(api_server: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_server: api_server.into().trim_end_matches('/').to_string(),
            token: token.into(),
            ca_cert_pem: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Trust the given PEM CA certificate
    #[must_use]
    pub fn with_ca_cert(mut self, pem: Vec<u8>) -> Self {
        self.ca_cert_pem = Some(pem);
        self
    }

    /// Resolve endpoint and credentials from the environment
    pub async fn discover() -> Result<Self> {
        if let (Ok(server), Ok(token)) = (
            std::env::var("KUBE_API_SERVER"),
            std::env::var("KUBE_TOKEN"),
        ) {
            let mut config = Self::new(server, token);
            if let Ok(ca_path) = std::env::var("KUBE_CA_CERT") {
                config = config.with_ca_cert(tokio::fs::read(ca_path).await?);
            }
            info!(api_server = %config.api_server, "Using explicit cluster endpoint");
            return Ok(config);
        }

        if let (Ok(project), Ok(region), Ok(cluster)) = (
            std::env::var("GOOGLE_PROJECT_ID"),
            std::env::var("GOOGLE_REGION"),
            std::env::var("GOOGLE_CLUSTER_ID"),
        ) {
            let token = google_access_token().await?;
            return Self::from_gke(GKE_API, &project, &region, &cluster, token).await;
        }

        Self::in_cluster().await
    }

    /// Look up a GKE cluster and authenticate with a Google access token
    #[instrument(skip(api_base, token))]
    pub async fn from_gke(
        api_base: &str,
        project: &str,
        region: &str,
        cluster: &str,
        token: String,
    ) -> Result<Self> {
        let url = format!(
            "{}/projects/{}/locations/{}/clusters/{}",
            api_base.trim_end_matches('/'),
            project,
            region,
            cluster
        );
        let response = Client::new()
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to reach GKE API: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::NotConfigured(format!(
                "GKE cluster {} lookup returned status {}",
                cluster,
                response.status()
            )));
        }

        let gke: GkeCluster = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("unexpected GKE cluster response: {}", e)))?;
        let ca = base64::engine::general_purpose::STANDARD
            .decode(gke.master_auth.cluster_ca_certificate.trim())
            .map_err(|e| Error::Upstream(format!("invalid cluster CA certificate: {}", e)))?;

        info!(endpoint = %gke.endpoint, "Discovered GKE cluster");
        Ok(Self::new(format!("https://{}", gke.endpoint), token).with_ca_cert(ca))
    }

    async fn in_cluster() -> Result<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            Error::NotConfigured(
                "no cluster configured: set KUBE_API_SERVER/KUBE_TOKEN or GOOGLE_* variables"
                    .to_string(),
            )
        })?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());
        let token = tokio::fs::read_to_string(format!("{}/token", SERVICE_ACCOUNT_DIR)).await?;
        let ca = tokio::fs::read(format!("{}/ca.crt", SERVICE_ACCOUNT_DIR)).await?;

        info!("Using in-cluster service account");
        Ok(Self::new(format!("https://{}:{}", host, port), token.trim()).with_ca_cert(ca))
    }
}

async fn google_access_token() -> Result<String> {
    if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
        return Ok(token);
    }

    let output = tokio::process::Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .await
        .map_err(|e| Error::NotConfigured(format!("gcloud is not available: {}", e)))?;

    if !output.status.success() {
        return Err(Error::NotConfigured(
            "gcloud auth print-access-token failed; run gcloud auth login".to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// [`ClusterClient`] over the Kubernetes REST API
pub struct RestClusterClient {
    client: Client,
    config: ClusterConfig,
}

impl fmt::Debug for RestClusterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClusterClient")
            .field("config", &self.config)
            .finish()
    }
}

impl RestClusterClient {
    /// Build a client for the given cluster
    pub fn new(config: ClusterConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(pem) = &config.ca_cert_pem {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| Error::NotConfigured(format!("invalid CA certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.config.api_server, path))
            .bearer_auth(&self.config.token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no details");
        Err(Error::Upstream(format!("{} ({})", message, status)))
    }

    async fn json(&self, request: RequestBuilder) -> Result<Value> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid response from cluster: {}", e)))
    }
}

#[async_trait::async_trait]
impl ClusterClient for RestClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let list = self.list(&ResourceKind::NAMESPACE, "").await?;
        Ok(list
            .iter()
            .filter_map(|ns| super::client::object_name(ns).map(str::to_string))
            .collect())
    }

    #[instrument(skip(self), fields(kind = kind.name))]
    async fn list(&self, kind: &ResourceKind, namespace: &str) -> Result<Vec<Value>> {
        let body = self
            .json(self.request(Method::GET, &kind.collection_path(namespace)))
            .await?;
        let items = match body.get("items") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        debug!(count = items.len(), "Listed objects");
        Ok(items)
    }

    #[instrument(skip(self), fields(kind = kind.name))]
    async fn get(&self, kind: &ResourceKind, namespace: &str, name: &str) -> Result<Value> {
        self.json(self.request(Method::GET, &kind.item_path(namespace, name)))
            .await
    }

    #[instrument(skip(self))]
    async fn pod_logs(&self, namespace: &str, pod: &str, tail_lines: u32) -> Result<String> {
        let path = format!("{}/log", ResourceKind::POD.item_path(namespace, pod));
        let request = self
            .request(Method::GET, &path)
            .query(&[("tailLines", tail_lines.to_string())]);
        self.send(request)
            .await?
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn create_namespace(&self, name: &str) -> Result<Value> {
        let body = serde_json::json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {"name": name}
        });
        let request = self
            .request(Method::POST, &ResourceKind::NAMESPACE.collection_path(""))
            .json(&body);
        self.json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> RestClusterClient {
        RestClusterClient::new(ClusterConfig::new(server.uri(), "test-token-123456")).unwrap()
    }

    #[tokio::test]
    async fn test_list_namespaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces"))
            .and(header("authorization", "Bearer test-token-123456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"metadata": {"name": "default"}},
                    {"metadata": {"name": "kube-system"}}
                ]
            })))
            .mount(&server)
            .await;

        let names = client(&server).await.list_namespaces().await.unwrap();
        assert_eq!(names, vec!["default", "kube-system"]);
    }

    #[tokio::test]
    async fn test_get_namespaced_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/apps/v1/namespaces/web/deployments/frontend"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "Deployment",
                "metadata": {"name": "frontend"}
            })))
            .mount(&server)
            .await;

        let kind = ResourceKind::lookup("deployment").unwrap();
        let object = client(&server)
            .await
            .get(kind, "web", "frontend")
            .await
            .unwrap();
        assert_eq!(object["kind"], "Deployment");
    }

    #[tokio::test]
    async fn test_error_status_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/web/pods/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "kind": "Status",
                "message": "pods \"missing\" not found"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .get(&ResourceKind::POD, "web", "missing")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("pods \"missing\" not found"));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_pod_logs_tail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/test-bed/pods/review-3-abc/log"))
            .and(query_param("tailLines", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_string("line 1\nline 2\n"))
            .mount(&server)
            .await;

        let logs = client(&server)
            .await
            .pod_logs("test-bed", "review-3-abc", 50)
            .await
            .unwrap();
        assert_eq!(logs, "line 1\nline 2\n");
    }

    #[tokio::test]
    async fn test_create_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/namespaces"))
            .and(body_partial_json(json!({"metadata": {"name": "test-1"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "metadata": {"name": "test-1"}
            })))
            .mount(&server)
            .await;

        let created = client(&server).await.create_namespace("test-1").await.unwrap();
        assert_eq!(created["metadata"]["name"], "test-1");
    }

    #[tokio::test]
    async fn test_gke_discovery() {
        let server = MockServer::start().await;
        let ca = base64::engine::general_purpose::STANDARD.encode("not a real pem");
        Mock::given(method("GET"))
            .and(path("/projects/p1/locations/us-central1/clusters/c1"))
            .and(header("authorization", "Bearer gcp-token-abcdef"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "endpoint": "34.1.2.3",
                "masterAuth": {"clusterCaCertificate": ca}
            })))
            .mount(&server)
            .await;

        let config = ClusterConfig::from_gke(
            &server.uri(),
            "p1",
            "us-central1",
            "c1",
            "gcp-token-abcdef".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(config.api_server, "https://34.1.2.3");
        assert_eq!(config.ca_cert_pem.as_deref(), Some(&b"not a real pem"[..]));
        assert!(!format!("{:?}", config).contains("gcp-token-abcdef"));
    }
}
