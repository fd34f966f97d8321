//! GitLab REST v4 client

use super::client::{
    Group, Issue, IssueTracker, MergeRequest, MergeRequestDraft, Note, Noteable, Pipeline,
    Project,
};
use crate::error::{Error, Result};
use kubepilot_llm::util::mask_api_key;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default GitLab instance
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

const PER_PAGE: &str = "100";

/// GitLab instance and access token
#[derive(Clone)]
pub struct GitLabConfig {
    /// Instance URL, without `/api/v4`
    pub url: String,
    /// Personal or project access token
    pub private_token: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("url", &self.url)
            .field("private_token", &mask_api_key(&self.private_token))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GitLabConfig {
    /// Create a configuration
    #[must_use]
    pub fn new(url: impl Into<String>, private_token: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            private_token: private_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// `GITLAB_PRIVATE_TOKEN`, with the URL from `GITLAB_URL` or `default_url`
    pub fn from_env(default_url: &str) -> Result<Self> {
        let token = std::env::var("GITLAB_PRIVATE_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::NotConfigured("GITLAB_PRIVATE_TOKEN is not set".to_string()))?;
        let url = std::env::var("GITLAB_URL").unwrap_or_else(|_| default_url.to_string());
        Ok(Self::new(url, token))
    }
}

#[derive(Deserialize)]
struct Discussion {
    id: String,
    #[serde(default)]
    notes: Vec<Note>,
}

/// [`IssueTracker`] over the GitLab REST API
pub struct GitLabClient {
    client: Client,
    config: GitLabConfig,
}

impl fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabClient")
            .field("config", &self.config)
            .finish()
    }
}

impl GitLabClient {
    /// Build a client
    pub fn new(config: GitLabConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/api/v4{}", self.config.url, path))
            .header("PRIVATE-TOKEN", &self.config.private_token)
    }

    fn list_request(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
            .query(&[("per_page", PER_PAGE)])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = match body.get("message").or_else(|| body.get("error")) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "no details".to_string(),
            };
            return Err(Error::Upstream(format!("{} ({})", message, status)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid response from GitLab: {}", e)))
    }

    async fn update_issue(&self, project_id: i64, issue_iid: i64, body: Value) -> Result<Issue> {
        let path = format!("/projects/{}/issues/{}", project_id, issue_iid);
        self.send(self.request(Method::PUT, &path).json(&body)).await
    }
}

#[async_trait::async_trait]
impl IssueTracker for GitLabClient {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.send(self.list_request("/groups")).await
    }

    async fn list_projects(&self, group_id: i64) -> Result<Vec<Project>> {
        self.send(self.list_request(&format!("/groups/{}/projects", group_id)))
            .await
    }

    async fn list_issues(&self, project_id: i64) -> Result<Vec<Issue>> {
        self.send(self.list_request(&format!("/projects/{}/issues", project_id)))
            .await
    }

    async fn list_merge_requests(&self, project_id: i64) -> Result<Vec<MergeRequest>> {
        self.send(self.list_request(&format!("/projects/{}/merge_requests", project_id)))
            .await
    }

    #[instrument(skip(self, description))]
    async fn create_issue(
        &self,
        project_id: i64,
        title: &str,
        description: &str,
    ) -> Result<Issue> {
        let path = format!("/projects/{}/issues", project_id);
        let body = json!({"title": title, "description": description});
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    #[instrument(skip(self))]
    async fn change_issue_label(
        &self,
        project_id: i64,
        issue_iid: i64,
        label: &str,
    ) -> Result<Issue> {
        self.update_issue(project_id, issue_iid, json!({"labels": label}))
            .await
    }

    #[instrument(skip(self))]
    async fn close_issue(&self, project_id: i64, issue_iid: i64) -> Result<Issue> {
        self.update_issue(project_id, issue_iid, json!({"state_event": "close"}))
            .await
    }

    #[instrument(skip(self))]
    async fn reopen_issue(&self, project_id: i64, issue_iid: i64) -> Result<Issue> {
        self.update_issue(project_id, issue_iid, json!({"state_event": "reopen"}))
            .await
    }

    #[instrument(skip(self, body))]
    async fn comment(
        &self,
        project_id: i64,
        target: Noteable,
        iid: i64,
        body: &str,
    ) -> Result<Note> {
        let path = format!("/projects/{}/{}/{}/notes", project_id, target.segment(), iid);
        self.send(self.request(Method::POST, &path).json(&json!({"body": body})))
            .await
    }

    #[instrument(skip(self, body))]
    async fn reply_to_comment(
        &self,
        project_id: i64,
        target: Noteable,
        iid: i64,
        note_id: i64,
        body: &str,
    ) -> Result<Note> {
        let base = format!("/projects/{}/{}/{}/discussions", project_id, target.segment(), iid);
        let discussions: Vec<Discussion> = self.send(self.list_request(&base)).await?;

        let discussion = discussions
            .into_iter()
            .find(|d| d.notes.iter().any(|n| n.id == note_id))
            .ok_or_else(|| {
                Error::Upstream(format!(
                    "comment {} not found on {} {}",
                    note_id,
                    target.label(),
                    iid
                ))
            })?;
        debug!(discussion = %discussion.id, "Replying in discussion");

        let path = format!("{}/{}/notes", base, discussion.id);
        self.send(self.request(Method::POST, &path).json(&json!({"body": body})))
            .await
    }

    #[instrument(skip(self, draft), fields(source = %draft.source_branch, target = %draft.target_branch))]
    async fn create_merge_request(
        &self,
        project_id: i64,
        draft: &MergeRequestDraft,
    ) -> Result<MergeRequest> {
        let path = format!("/projects/{}/merge_requests", project_id);
        self.send(self.request(Method::POST, &path).json(draft)).await
    }

    #[instrument(skip(self))]
    async fn run_pipeline(&self, project_id: i64, git_ref: &str) -> Result<Pipeline> {
        let path = format!("/projects/{}/pipeline", project_id);
        self.send(self.request(Method::POST, &path).json(&json!({"ref": git_ref})))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GitLabClient {
        GitLabClient::new(GitLabConfig::new(server.uri(), "glpat-test-token")).unwrap()
    }

    #[tokio::test]
    async fn test_list_groups_sends_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/groups"))
            .and(header("PRIVATE-TOKEN", "glpat-test-token"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "platform", "path": "platform"},
                {"id": 2, "name": "apps", "path": "apps"}
            ])))
            .mount(&server)
            .await;

        let groups = client(&server).list_groups().await.unwrap();
        assert_eq!(
            groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            vec!["platform", "apps"]
        );
    }

    #[tokio::test]
    async fn test_close_issue() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/projects/42/issues/7"))
            .and(body_json(json!({"state_event": "close"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "iid": 7, "title": "Runner is down", "state": "closed", "labels": []
            })))
            .mount(&server)
            .await;

        let issue = client(&server).close_issue(42, 7).await.unwrap();
        assert_eq!(issue.state, "closed");
    }

    #[tokio::test]
    async fn test_reply_finds_discussion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/merge_requests/3/discussions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "aaa", "notes": [{"id": 10, "body": "first"}]},
                {"id": "bbb", "notes": [{"id": 11, "body": "second"}, {"id": 12, "body": "reply"}]}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/42/merge_requests/3/discussions/bbb/notes"))
            .and(body_json(json!({"body": "on it"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": 13, "body": "on it"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let note = client(&server)
            .reply_to_comment(42, Noteable::MergeRequest, 3, 12, "on it")
            .await
            .unwrap();
        assert_eq!(note.body, "on it");
    }

    #[tokio::test]
    async fn test_reply_to_unknown_comment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/issues/7/discussions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client(&server)
            .reply_to_comment(42, Noteable::Issue, 7, 99, "hello")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "comment 99 not found on issue 7");
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/42/pipeline"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"message": {"base": ["Reference not found"]}})),
            )
            .mount(&server)
            .await;

        let err = client(&server).run_pipeline(42, "nope").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Reference not found"));
        assert!(message.contains("400"));
    }

    #[test]
    fn test_config_debug_masks_token() {
        let config = GitLabConfig::new("https://gitlab.example.com/", "glpat-abcdefghijklmnop");
        assert_eq!(config.url, "https://gitlab.example.com");
        assert!(!format!("{:?}", config).contains("abcdefghijklmnop"));
    }
}
