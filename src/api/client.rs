//! JIRA API client implementation.
//!
//! This module provides the client for interacting with the JIRA REST API
//! v3. Every public operation is one authenticated HTTP request. Failures
//! never escape as errors: each operation logs the fault through `tracing`
//! and returns its sentinel value (empty vec, empty map, `None`, `false`),
//! which is the only failure channel callers get.

use std::collections::BTreeMap;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::types::{
    Component, CreateMeta, CreatedIssue, CurrentUser, FieldMeta, FieldSuggestions, Issue,
    IssueTypeStatuses, NewIssue, Project, SearchResult, Transition, TransitionsResponse, User,
    Version,
};

/// Default maximum number of search results per query.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// The JIRA API client.
///
/// Holds a base endpoint, the derived versioned API root, and a
/// precomputed authorization header. No mutable per-call state exists, so
/// the client can be shared freely between call sites.
#[derive(Debug)]
pub struct JiraClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the JIRA instance.
    base_url: String,
    /// The versioned API root, `<base>/rest/api/3`.
    api_root: String,
    /// Authentication credentials.
    auth: Auth,
}

impl JiraClient {
    /// Create a new JIRA client.
    ///
    /// Normalizes the base URL and precomputes the authorization header.
    /// No network I/O happens here; use [`test_connection`] to verify
    /// reachability and credentials.
    ///
    /// [`test_connection`]: JiraClient::test_connection
    pub fn new(base_url: &str, identifier: &str, token: &str) -> Self {
        let base_url = normalize_base_url(base_url);
        let api_root = format!("{}/rest/api/3", base_url);
        Self {
            client: Client::new(),
            base_url,
            api_root,
            auth: Auth::new(identifier, token),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check connectivity and credentials against `GET /myself`.
    ///
    /// Returns `true` iff the server answered 200; any other status or a
    /// transport fault is logged and yields `false`.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> bool {
        match self.fetch_current_user().await {
            Ok(user) => {
                info!(user = %user.display_name, "connected to JIRA");
                true
            }
            Err(e) => {
                warn!("connection check failed: {}", e);
                false
            }
        }
    }

    async fn fetch_current_user(&self) -> Result<CurrentUser> {
        self.get_json(&self.api_url("/myself")).await
    }

    /// List all visible projects.
    ///
    /// Empty on any failure.
    #[instrument(skip(self))]
    pub async fn get_projects(&self) -> Vec<Project> {
        match self.get_json::<Vec<Project>>(&self.api_url("/project")).await {
            Ok(projects) => projects,
            Err(e) => {
                warn!("failed to list projects: {}", e);
                Vec::new()
            }
        }
    }

    /// List the issue types of a project together with their statuses.
    ///
    /// Empty on any failure.
    #[instrument(skip(self))]
    pub async fn get_issue_statuses(&self, project_key: &str) -> Vec<IssueTypeStatuses> {
        let url = self.api_url(&format!("/project/{}/statuses", project_key));
        match self.get_json::<Vec<IssueTypeStatuses>>(&url).await {
            Ok(statuses) => statuses,
            Err(e) => {
                warn!("failed to list issue statuses: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch issue-creation metadata for a project, optionally filtered to
    /// one issue-type name.
    ///
    /// The per-type field definitions are expanded. An empty document is
    /// returned on any failure.
    #[instrument(skip(self))]
    pub async fn get_create_meta(
        &self,
        project_key: &str,
        issue_type: Option<&str>,
    ) -> CreateMeta {
        match self.fetch_create_meta(project_key, issue_type).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("failed to fetch creation metadata: {}", e);
                CreateMeta::default()
            }
        }
    }

    async fn fetch_create_meta(
        &self,
        project_key: &str,
        issue_type: Option<&str>,
    ) -> Result<CreateMeta> {
        let mut url = format!(
            "{}?projectKeys={}&expand=projects.issuetypes.fields",
            self.api_url("/issue/createmeta"),
            urlencoding::encode(project_key)
        );
        if let Some(issue_type) = issue_type {
            url.push_str("&issuetypeNames=");
            url.push_str(&urlencoding::encode(issue_type));
        }
        self.get_json(&url).await
    }

    /// Get the field descriptors for creating one issue type in a project.
    ///
    /// Walks the creation metadata: first project entry, then the issue
    /// type whose name matches exactly (case-sensitive). Empty when the
    /// metadata is absent, malformed, or no name matches.
    #[instrument(skip(self))]
    pub async fn get_fields_for_issue_type(
        &self,
        project_key: &str,
        issue_type: &str,
    ) -> BTreeMap<String, FieldMeta> {
        let meta = self.get_create_meta(project_key, Some(issue_type)).await;
        let Some(project) = meta.projects.first() else {
            return BTreeMap::new();
        };
        for issuetype in &project.issuetypes {
            if issuetype.name == issue_type {
                return issuetype.fields.clone();
            }
        }
        debug!("issue type not present in creation metadata");
        BTreeMap::new()
    }

    /// Aggregate suggested values for common creation fields.
    ///
    /// Composes three independent lookups; one failing or coming back
    /// empty omits its entry without failing the others.
    #[instrument(skip(self))]
    pub async fn get_field_suggestions(&self, project_key: &str) -> FieldSuggestions {
        let mut suggestions = FieldSuggestions::default();

        let users = self.get_assignable_users(project_key).await;
        if !users.is_empty() {
            suggestions.assignee = Some(users);
        }
        let components = self.get_project_components(project_key).await;
        if !components.is_empty() {
            suggestions.components = Some(components);
        }
        let versions = self.get_project_versions(project_key).await;
        if !versions.is_empty() {
            suggestions.versions = Some(versions);
        }

        suggestions
    }

    /// List the users an issue in the project can be assigned to.
    ///
    /// Empty on any failure.
    #[instrument(skip(self))]
    pub async fn get_assignable_users(&self, project_key: &str) -> Vec<User> {
        let url = format!(
            "{}?project={}",
            self.api_url("/user/assignable/search"),
            urlencoding::encode(project_key)
        );
        match self.get_json::<Vec<User>>(&url).await {
            Ok(users) => users,
            Err(e) => {
                warn!("failed to list assignable users: {}", e);
                Vec::new()
            }
        }
    }

    /// List the components of a project. Empty on any failure.
    #[instrument(skip(self))]
    pub async fn get_project_components(&self, project_key: &str) -> Vec<Component> {
        let url = self.api_url(&format!("/project/{}/components", project_key));
        match self.get_json::<Vec<Component>>(&url).await {
            Ok(components) => components,
            Err(e) => {
                warn!("failed to list components: {}", e);
                Vec::new()
            }
        }
    }

    /// List the versions of a project. Empty on any failure.
    #[instrument(skip(self))]
    pub async fn get_project_versions(&self, project_key: &str) -> Vec<Version> {
        let url = self.api_url(&format!("/project/{}/versions", project_key));
        match self.get_json::<Vec<Version>>(&url).await {
            Ok(versions) => versions,
            Err(e) => {
                warn!("failed to list versions: {}", e);
                Vec::new()
            }
        }
    }

    /// Validate a candidate field value against creation metadata before
    /// submitting it.
    ///
    /// Fails closed when the field is unknown for the issue type, when a
    /// required field is empty, or when the candidate is not in the
    /// field's allowed-value set (the allowed labels are logged as
    /// guidance).
    #[instrument(skip(self, value))]
    pub async fn validate_field_value(
        &self,
        project_key: &str,
        issue_type: &str,
        field_id: &str,
        value: &Value,
    ) -> bool {
        let fields = self.get_fields_for_issue_type(project_key, issue_type).await;

        let Some(meta) = fields.get(field_id) else {
            warn!("field {} does not exist for {}", field_id, issue_type);
            return false;
        };

        if meta.required && is_empty_value(value) {
            warn!("field {} is required", meta.display_name(field_id));
            return false;
        }

        if meta.has_allowed_values() {
            let allowed = meta.allowed_labels();
            let candidate = match value {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                _ => None,
            };
            if let Some(candidate) = candidate {
                if !allowed.iter().any(|label| label == candidate) {
                    warn!(
                        "value {} not permitted for {}; allowed: {}",
                        candidate,
                        meta.display_name(field_id),
                        allowed.join(", ")
                    );
                    return false;
                }
            }
        }

        true
    }

    /// Create an issue from a prepared draft.
    ///
    /// The created resource on HTTP 201; `None` on anything else.
    #[instrument(skip(self, issue), fields(project_key = %issue.project_key))]
    pub async fn create_issue(&self, issue: &NewIssue) -> Option<CreatedIssue> {
        match self.submit_issue(issue.to_fields()).await {
            Ok(created) => {
                info!(key = %created.key, "issue created");
                Some(created)
            }
            Err(e) => {
                warn!("failed to create issue: {}", e);
                None
            }
        }
    }

    /// POST an assembled field map to `/issue`, expecting 201.
    pub(crate) async fn submit_issue(
        &self,
        fields: serde_json::Map<String, Value>,
    ) -> Result<CreatedIssue> {
        let body = serde_json::json!({ "fields": fields });
        let response = self
            .request(Method::POST, &self.api_url("/issue"))
            .json(&body)
            .send()
            .await?;
        let response = expect_status(response, StatusCode::CREATED).await?;
        parse_json(response).await
    }

    /// Get a single issue by key.
    ///
    /// The full representation on 200; `None` on anything else, not-found
    /// included.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_issue(&self, key: &str) -> Option<Issue> {
        let url = self.api_url(&format!("/issue/{}", key));
        match self.get_json::<Issue>(&url).await {
            Ok(issue) => Some(issue),
            Err(e) => {
                warn!("failed to fetch issue: {}", e);
                None
            }
        }
    }

    /// Update an issue's fields.
    ///
    /// `true` iff the server answered 204.
    #[instrument(skip(self, fields), fields(issue_key = %key))]
    pub async fn update_issue(
        &self,
        key: &str,
        fields: serde_json::Map<String, Value>,
    ) -> bool {
        let url = self.api_url(&format!("/issue/{}", key));
        let body = serde_json::json!({ "fields": fields });
        match self.send_no_content(Method::PUT, &url, Some(&body)).await {
            Ok(()) => {
                info!("issue updated");
                true
            }
            Err(e) => {
                warn!("failed to update issue: {}", e);
                false
            }
        }
    }

    /// Delete an issue by key.
    ///
    /// `true` iff the server answered 204. No confirmation, pure
    /// passthrough.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn delete_issue(&self, key: &str) -> bool {
        let url = self.api_url(&format!("/issue/{}", key));
        match self.send_no_content(Method::DELETE, &url, None).await {
            Ok(()) => {
                info!("issue deleted");
                true
            }
            Err(e) => {
                warn!("failed to delete issue: {}", e);
                false
            }
        }
    }

    /// Search issues with a JQL query.
    ///
    /// Returns the `issues` array in server order; empty on any failure.
    /// One page only, no cursor handling.
    #[instrument(skip(self), fields(jql = %jql))]
    pub async fn search_issues(&self, jql: &str, max_results: u32) -> Vec<Issue> {
        let body = serde_json::json!({ "jql": jql, "maxResults": max_results });
        match self.post_json::<SearchResult>(&self.api_url("/search"), &body).await {
            Ok(result) => {
                debug!("found {} issues", result.issues.len());
                result.issues
            }
            Err(e) => {
                warn!("search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Add a comment to an issue.
    ///
    /// The text is wrapped in the ADF envelope. `true` iff the server
    /// answered 201.
    #[instrument(skip(self, comment), fields(issue_key = %key))]
    pub async fn add_comment(&self, key: &str, comment: &str) -> bool {
        let url = self.api_url(&format!("/issue/{}/comment", key));
        let body = serde_json::json!({
            "body": super::types::AtlassianDoc::from_text(comment).to_value()
        });
        let result: Result<()> = async {
            let response = self.request(Method::POST, &url).json(&body).send().await?;
            expect_status(response, StatusCode::CREATED).await?;
            Ok(())
        }
        .await;
        match result {
            Ok(()) => {
                info!("comment added");
                true
            }
            Err(e) => {
                warn!("failed to add comment: {}", e);
                false
            }
        }
    }

    /// List the transitions available to an issue in its current status.
    ///
    /// Empty on any failure.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_transitions(&self, key: &str) -> Vec<Transition> {
        let url = self.api_url(&format!("/issue/{}/transitions", key));
        match self.get_json::<TransitionsResponse>(&url).await {
            Ok(response) => response.transitions,
            Err(e) => {
                warn!("failed to list transitions: {}", e);
                Vec::new()
            }
        }
    }

    /// Apply a transition to an issue by transition ID.
    ///
    /// `true` iff the server answered 204.
    #[instrument(skip(self), fields(issue_key = %key, transition_id = %transition_id))]
    pub async fn transition_issue(&self, key: &str, transition_id: &str) -> bool {
        let url = self.api_url(&format!("/issue/{}/transitions", key));
        let body = serde_json::json!({ "transition": { "id": transition_id } });
        match self.send_no_content(Method::POST, &url, Some(&body)).await {
            Ok(()) => {
                info!("transition applied");
                true
            }
            Err(e) => {
                warn!("failed to transition issue: {}", e);
                false
            }
        }
    }

    /// Join a path onto the versioned API root.
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.request(Method::GET, url).send().await?;
        let response = expect_status(response, StatusCode::OK).await?;
        parse_json(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<T> {
        let response = self.request(Method::POST, url).json(body).send().await?;
        let response = expect_status(response, StatusCode::OK).await?;
        parse_json(response).await
    }

    async fn send_no_content(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<()> {
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }
}

/// Check the response against the single status code the operation's
/// contract documents as success. Any other status, another 2xx included,
/// is a fault carrying the response body.
async fn expect_status(response: Response, expected: StatusCode) -> Result<Response> {
    let status = response.status();
    if status == expected {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        debug!("error response body: {}", body);
        Err(ApiError::from_status(status, &body))
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Malformed(e.to_string()))
}

/// Whether a candidate value counts as absent for required-field checks.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    // Warn if not HTTPS (but don't enforce for local testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}
