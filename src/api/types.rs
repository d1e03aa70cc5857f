//! JIRA API request and response types.
//!
//! These types model the slices of the JIRA REST API v3 responses this
//! crate actually consumes. Deserialization is defensive: anything the
//! server may omit is `Option` or defaulted, and issue field maps are kept
//! as raw JSON so arbitrary custom fields pass through untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The current authenticated user.
///
/// Returned by `GET /rest/api/3/myself`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// The user's account ID.
    #[serde(default)]
    pub account_id: String,
    /// The user's display name.
    pub display_name: String,
    /// The user's email address (may be hidden).
    #[serde(default)]
    pub email_address: Option<String>,
}

/// A JIRA project.
///
/// Returned by `GET /rest/api/3/project`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// The project ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The project key (e.g., "PROJ").
    pub key: String,
    /// The project name.
    pub name: String,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.name)
    }
}

/// A status, as referenced from transitions and per-project status lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRef {
    /// The status ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The status name (e.g., "To Do", "In Progress", "Done").
    pub name: String,
}

/// An issue type together with the statuses its workflow allows.
///
/// Returned by `GET /rest/api/3/project/{key}/statuses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTypeStatuses {
    /// The issue type ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The issue type name.
    pub name: String,
    /// The statuses available to this issue type.
    #[serde(default)]
    pub statuses: Vec<StatusRef>,
}

/// A JIRA user, as returned by the assignable-user search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's account ID.
    #[serde(default)]
    pub account_id: String,
    /// The user's display name.
    pub display_name: String,
    /// The user's email address (may be hidden).
    #[serde(default)]
    pub email_address: Option<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// A project component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// The component ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The component name.
    pub name: String,
    /// The component description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A project version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    /// The version ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The version name.
    pub name: String,
    /// Whether the version has been released.
    #[serde(default)]
    pub released: bool,
}

/// Issue-creation metadata.
///
/// Returned by `GET /rest/api/3/issue/createmeta` with
/// `expand=projects.issuetypes.fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMeta {
    /// The projects matching the query.
    #[serde(default)]
    pub projects: Vec<MetaProject>,
}

impl CreateMeta {
    /// Whether the document carries no usable metadata.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// A project entry within creation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaProject {
    /// The project key.
    #[serde(default)]
    pub key: Option<String>,
    /// The issue types creatable in this project.
    #[serde(default)]
    pub issuetypes: Vec<MetaIssueType>,
}

/// An issue-type entry within creation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaIssueType {
    /// The issue type name.
    pub name: String,
    /// The issue type description.
    #[serde(default)]
    pub description: Option<String>,
    /// The field descriptors for creating an issue of this type,
    /// keyed by field identifier.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldMeta>,
}

/// A field descriptor from creation metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldMeta {
    /// The field's display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the field is required to create the issue.
    #[serde(default)]
    pub required: bool,
    /// The field's declared schema.
    #[serde(default)]
    pub schema: Option<FieldSchema>,
    /// Closed set of permitted values, when the field declares one.
    #[serde(default, rename = "allowedValues")]
    pub allowed_values: Vec<AllowedValue>,
}

impl FieldMeta {
    /// The display name, falling back to the field identifier.
    pub fn display_name<'a>(&'a self, field_id: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(field_id)
    }

    /// The declared schema type, or "unknown".
    pub fn schema_type(&self) -> &str {
        self.schema
            .as_ref()
            .and_then(|s| s.field_type.as_deref())
            .unwrap_or("unknown")
    }

    /// Whether the field declares an allowed-value enumeration.
    pub fn has_allowed_values(&self) -> bool {
        !self.allowed_values.is_empty()
    }

    /// The display labels of all allowed values.
    pub fn allowed_labels(&self) -> Vec<String> {
        self.allowed_values.iter().map(AllowedValue::label).collect()
    }
}

/// The schema declaration of a field descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    /// The declared type (e.g., "string", "priority", "array").
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
}

/// One permitted value of an enumerated field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowedValue {
    /// The value's ID, when the server assigns one.
    #[serde(default)]
    pub id: Option<String>,
    /// The value's name (priorities, components, ...).
    #[serde(default)]
    pub name: Option<String>,
    /// The bare value (option-style custom fields).
    #[serde(default)]
    pub value: Option<String>,
}

impl AllowedValue {
    /// Human-readable label: name, else value, else id, else empty.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.value.clone())
            .or_else(|| self.id.clone())
            .unwrap_or_default()
    }

    /// The reference to submit when this value is selected: `{"id": ...}`
    /// when an ID exists, otherwise `{"name": ...}`.
    pub fn as_field_value(&self) -> Value {
        if let Some(id) = &self.id {
            serde_json::json!({ "id": id })
        } else {
            serde_json::json!({ "name": self.label() })
        }
    }
}

/// Suggested values for common creation fields, aggregated per project.
///
/// A lookup that failed or came back empty omits its entry; the others are
/// still populated.
#[derive(Debug, Clone, Default)]
pub struct FieldSuggestions {
    /// Users the issue can be assigned to.
    pub assignee: Option<Vec<User>>,
    /// Components defined in the project.
    pub components: Option<Vec<Component>>,
    /// Versions defined in the project.
    pub versions: Option<Vec<Version>>,
}

impl FieldSuggestions {
    /// Whether no lookup produced anything.
    pub fn is_empty(&self) -> bool {
        self.assignee.is_none() && self.components.is_none() && self.versions.is_none()
    }
}

/// A JIRA issue.
///
/// Returned by `GET /rest/api/3/issue/{issueKey}` and inside search
/// results. Fields are kept as raw JSON so custom fields survive verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// The issue ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The issue key (e.g., "PROJ-123").
    pub key: String,
    /// URL of the issue resource.
    #[serde(default, rename = "self")]
    pub self_url: Option<String>,
    /// The issue field map, custom fields included.
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

impl Issue {
    /// The issue summary, if present.
    pub fn summary(&self) -> Option<&str> {
        self.fields.get("summary").and_then(Value::as_str)
    }

    /// The issue status name, if present.
    pub fn status_name(&self) -> Option<&str> {
        self.fields
            .get("status")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
    }

    /// The description as plain text, or empty when absent.
    pub fn description_text(&self) -> String {
        self.fields
            .get("description")
            .map(|d| {
                if let Ok(doc) = serde_json::from_value::<AtlassianDoc>(d.clone()) {
                    doc.to_plain_text()
                } else if let Some(s) = d.as_str() {
                    s.to_string()
                } else {
                    String::new()
                }
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.summary().unwrap_or(""))
    }
}

/// The resource returned by a successful issue creation (HTTP 201).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// The new issue's ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The new issue's key.
    pub key: String,
    /// URL of the issue resource.
    #[serde(default, rename = "self")]
    pub self_url: Option<String>,
}

/// Search result from a JQL query.
///
/// Returned by `POST /rest/api/3/search`; only the `issues` array is
/// consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matching issues, in server order.
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Response of `GET /rest/api/3/issue/{key}/transitions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionsResponse {
    /// The transitions available to the issue in its current status.
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// An available status change for an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// The transition ID, submitted to apply the transition.
    pub id: String,
    /// The transition name.
    #[serde(default)]
    pub name: Option<String>,
    /// The status the transition leads to.
    #[serde(default)]
    pub to: Option<StatusRef>,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self
            .to
            .as_ref()
            .map(|s| s.name.as_str())
            .or(self.name.as_deref())
            .unwrap_or("?");
        write!(f, "{}: {}", self.id, target)
    }
}

/// Atlassian Document Format (ADF) content.
///
/// JIRA requires ADF for rich-text fields (descriptions, comments) instead
/// of plain strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlassianDoc {
    /// The document type (always "doc" for root documents).
    #[serde(rename = "type")]
    pub doc_type: String,
    /// The document version (typically 1).
    #[serde(default)]
    pub version: Option<u32>,
    /// The content nodes within the document.
    #[serde(default)]
    pub content: Vec<Value>,
}

impl AtlassianDoc {
    /// Wrap plain text into the one-paragraph document envelope JIRA
    /// expects for descriptions and comments.
    pub fn from_text(text: &str) -> Self {
        Self {
            doc_type: "doc".to_string(),
            version: Some(1),
            content: vec![serde_json::json!({
                "type": "paragraph",
                "content": [{ "type": "text", "text": text }]
            })],
        }
    }

    /// The envelope as a raw JSON value, ready to embed in a field map.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Convert ADF content to plain text for display.
    ///
    /// Extracts text nodes recursively, keeping paragraph and hard-break
    /// boundaries as newlines.
    pub fn to_plain_text(&self) -> String {
        let mut result = String::new();
        for node in &self.content {
            Self::extract_text(node, &mut result);
        }
        result.trim().to_string()
    }

    fn extract_text(node: &Value, result: &mut String) {
        match node {
            Value::Object(obj) => {
                let node_type = obj.get("type").and_then(|t| t.as_str());
                match node_type {
                    Some("text") => {
                        if let Some(text) = obj.get("text").and_then(|t| t.as_str()) {
                            result.push_str(text);
                        }
                    }
                    Some("hardBreak") => result.push('\n'),
                    Some("paragraph") | Some("heading") => {
                        Self::extract_children(obj, result);
                        if !result.is_empty() && !result.ends_with('\n') {
                            result.push('\n');
                        }
                    }
                    _ => Self::extract_children(obj, result),
                }
            }
            Value::Array(items) => {
                for item in items {
                    Self::extract_text(item, result);
                }
            }
            _ => {}
        }
    }

    fn extract_children(obj: &serde_json::Map<String, Value>, result: &mut String) {
        if let Some(Value::Array(items)) = obj.get("content") {
            for item in items {
                Self::extract_text(item, result);
            }
        }
    }
}

impl Default for AtlassianDoc {
    fn default() -> Self {
        Self {
            doc_type: "doc".to_string(),
            version: Some(1),
            content: vec![],
        }
    }
}

/// Parameters for the non-interactive issue creation path.
///
/// Defaults mirror the most common case: a Medium-priority Task. Custom
/// fields are merged into the payload last and win over every other key.
#[derive(Debug, Clone)]
pub struct NewIssue {
    /// The key of the project to create the issue in.
    pub project_key: String,
    /// The issue summary.
    pub summary: String,
    /// The issue description; always submitted, wrapped in ADF, even when
    /// empty.
    pub description: String,
    /// The issue type name.
    pub issue_type: String,
    /// The priority name.
    pub priority: String,
    /// Assignee name, when the issue should start assigned.
    pub assignee: Option<String>,
    /// Labels to attach.
    pub labels: Vec<String>,
    /// Custom fields merged last into the payload (last-wins).
    pub custom_fields: serde_json::Map<String, Value>,
}

impl NewIssue {
    /// Create a draft with default issue type "Task" and priority "Medium".
    pub fn new(project_key: &str, summary: &str, description: &str) -> Self {
        Self {
            project_key: project_key.to_string(),
            summary: summary.to_string(),
            description: description.to_string(),
            issue_type: "Task".to_string(),
            priority: "Medium".to_string(),
            assignee: None,
            labels: Vec::new(),
            custom_fields: serde_json::Map::new(),
        }
    }

    /// Set the issue type name.
    pub fn issue_type(mut self, issue_type: &str) -> Self {
        self.issue_type = issue_type.to_string();
        self
    }

    /// Set the priority name.
    pub fn priority(mut self, priority: &str) -> Self {
        self.priority = priority.to_string();
        self
    }

    /// Set the assignee name.
    pub fn assignee(mut self, assignee: &str) -> Self {
        self.assignee = Some(assignee.to_string());
        self
    }

    /// Set the labels.
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Add a custom field, merged into the payload after everything else.
    pub fn custom_field(mut self, field_id: &str, value: Value) -> Self {
        self.custom_fields.insert(field_id.to_string(), value);
        self
    }

    /// Assemble the `fields` map submitted to `POST /issue`.
    pub fn to_fields(&self) -> serde_json::Map<String, Value> {
        let mut fields = serde_json::Map::new();
        fields.insert(
            "project".to_string(),
            serde_json::json!({ "key": self.project_key }),
        );
        fields.insert("summary".to_string(), Value::String(self.summary.clone()));
        fields.insert(
            "description".to_string(),
            AtlassianDoc::from_text(&self.description).to_value(),
        );
        fields.insert(
            "issuetype".to_string(),
            serde_json::json!({ "name": self.issue_type }),
        );
        fields.insert(
            "priority".to_string(),
            serde_json::json!({ "name": self.priority }),
        );
        if let Some(assignee) = &self.assignee {
            fields.insert("assignee".to_string(), serde_json::json!({ "name": assignee }));
        }
        if !self.labels.is_empty() {
            fields.insert(
                "labels".to_string(),
                serde_json::json!(self.labels.clone()),
            );
        }
        // Custom fields win over anything set above.
        for (key, value) in &self.custom_fields {
            fields.insert(key.clone(), value.clone());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_issue() {
        let json = r#"{
            "id": "10001",
            "key": "PROJ-123",
            "self": "https://company.atlassian.net/rest/api/3/issue/10001",
            "fields": {
                "summary": "Test issue",
                "status": {"id": "1", "name": "To Do"}
            }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.key, "PROJ-123");
        assert_eq!(issue.summary(), Some("Test issue"));
        assert_eq!(issue.status_name(), Some("To Do"));
    }

    #[test]
    fn test_issue_keeps_custom_fields_verbatim() {
        let json = r#"{
            "key": "PROJ-7",
            "fields": {
                "summary": "Custom",
                "customfield_10016": 5.0
            }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.fields["customfield_10016"], serde_json::json!(5.0));
    }

    #[test]
    fn test_parse_current_user() {
        let json = r#"{
            "accountId": "abc123",
            "displayName": "Test User",
            "emailAddress": "test@example.com"
        }"#;

        let user: CurrentUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.account_id, "abc123");
        assert_eq!(user.display_name, "Test User");
    }

    #[test]
    fn test_parse_create_meta() {
        let json = r#"{
            "projects": [{
                "key": "PROJ",
                "issuetypes": [{
                    "name": "Bug",
                    "fields": {
                        "summary": {
                            "name": "Summary",
                            "required": true,
                            "schema": {"type": "string"}
                        },
                        "priority": {
                            "name": "Priority",
                            "required": false,
                            "schema": {"type": "priority"},
                            "allowedValues": [
                                {"id": "1", "name": "High"},
                                {"id": "3", "name": "Low"}
                            ]
                        }
                    }
                }]
            }]
        }"#;

        let meta: CreateMeta = serde_json::from_str(json).unwrap();
        assert!(!meta.is_empty());
        let issuetype = &meta.projects[0].issuetypes[0];
        assert_eq!(issuetype.name, "Bug");

        let summary = &issuetype.fields["summary"];
        assert!(summary.required);
        assert_eq!(summary.schema_type(), "string");
        assert!(!summary.has_allowed_values());

        let priority = &issuetype.fields["priority"];
        assert_eq!(priority.allowed_labels(), vec!["High", "Low"]);
    }

    #[test]
    fn test_allowed_value_label_falls_back_to_value() {
        let allowed = AllowedValue {
            id: None,
            name: None,
            value: Some("Blue".to_string()),
        };
        assert_eq!(allowed.label(), "Blue");
    }

    #[test]
    fn test_allowed_value_as_field_value_prefers_id() {
        let with_id = AllowedValue {
            id: Some("42".to_string()),
            name: Some("High".to_string()),
            value: None,
        };
        assert_eq!(with_id.as_field_value(), serde_json::json!({"id": "42"}));

        let without_id = AllowedValue {
            id: None,
            name: Some("High".to_string()),
            value: None,
        };
        assert_eq!(
            without_id.as_field_value(),
            serde_json::json!({"name": "High"})
        );
    }

    #[test]
    fn test_parse_transitions() {
        let json = r#"{
            "transitions": [
                {"id": "11", "name": "Start", "to": {"id": "3", "name": "In Progress"}},
                {"id": "21", "name": "Finish", "to": {"name": "Done"}}
            ]
        }"#;

        let response: TransitionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.transitions.len(), 2);
        assert_eq!(response.transitions[0].id, "11");
        assert_eq!(format!("{}", response.transitions[1]), "21: Done");
    }

    #[test]
    fn test_atlassian_doc_from_text() {
        let doc = AtlassianDoc::from_text("Hello, world!");
        assert_eq!(
            doc.to_value(),
            serde_json::json!({
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{"type": "text", "text": "Hello, world!"}]
                }]
            })
        );
    }

    #[test]
    fn test_atlassian_doc_round_trip_plain_text() {
        let doc = AtlassianDoc::from_text("Something broke");
        assert_eq!(doc.to_plain_text(), "Something broke");
    }

    #[test]
    fn test_atlassian_doc_hard_break() {
        let json = r#"{
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "Line one"},
                    {"type": "hardBreak"},
                    {"type": "text", "text": "Line two"}
                ]
            }]
        }"#;

        let doc: AtlassianDoc = serde_json::from_str(json).unwrap();
        assert_eq!(doc.to_plain_text(), "Line one\nLine two");
    }

    #[test]
    fn test_issue_description_text_from_adf() {
        let json = r#"{
            "key": "PROJ-1",
            "fields": {
                "summary": "x",
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [{
                        "type": "paragraph",
                        "content": [{"type": "text", "text": "The description."}]
                    }]
                }
            }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.description_text(), "The description.");
    }

    #[test]
    fn test_new_issue_defaults() {
        let fields = NewIssue::new("PROJ", "A summary", "").to_fields();
        assert_eq!(fields["issuetype"], serde_json::json!({"name": "Task"}));
        assert_eq!(fields["priority"], serde_json::json!({"name": "Medium"}));
        assert!(!fields.contains_key("assignee"));
        assert!(!fields.contains_key("labels"));
    }

    #[test]
    fn test_new_issue_empty_description_still_has_envelope() {
        // The parameterized path always emits the ADF envelope, empty
        // paragraph included; only the interactive path omits it.
        let fields = NewIssue::new("PROJ", "A summary", "").to_fields();
        assert_eq!(
            fields["description"],
            serde_json::json!({
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{"type": "text", "text": ""}]
                }]
            })
        );
    }

    #[test]
    fn test_new_issue_custom_fields_win_last() {
        let fields = NewIssue::new("PROJ", "Original summary", "")
            .custom_field("summary", serde_json::json!("Overridden"))
            .custom_field("customfield_10010", serde_json::json!(3))
            .to_fields();
        assert_eq!(fields["summary"], serde_json::json!("Overridden"));
        assert_eq!(fields["customfield_10010"], serde_json::json!(3));
    }

    #[test]
    fn test_new_issue_optional_parts() {
        let fields = NewIssue::new("PROJ", "s", "d")
            .issue_type("Bug")
            .priority("High")
            .assignee("jdoe")
            .labels(vec!["urgent".to_string()])
            .to_fields();
        assert_eq!(fields["issuetype"], serde_json::json!({"name": "Bug"}));
        assert_eq!(fields["priority"], serde_json::json!({"name": "High"}));
        assert_eq!(fields["assignee"], serde_json::json!({"name": "jdoe"}));
        assert_eq!(fields["labels"], serde_json::json!(["urgent"]));
    }

    #[test]
    fn test_field_suggestions_empty() {
        let suggestions = FieldSuggestions::default();
        assert!(suggestions.is_empty());
    }
}
