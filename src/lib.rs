//! jiraops - a thin client for the JIRA Cloud REST API v3.
//!
//! The crate wraps the hosted issue-tracker API: authenticate, discover
//! project and issue-type metadata, create and mutate issues, search via
//! JQL, comment, and drive status transitions. Every operation is one
//! authenticated HTTP request; failures degrade to empty/false/absent
//! sentinel values and are reported through `tracing`.
//!
//! ```no_run
//! use jiraops::{JiraClient, NewIssue};
//!
//! # async fn run() {
//! let jira = JiraClient::new(
//!     "https://your-domain.atlassian.net",
//!     "you@example.com",
//!     "api-token",
//! );
//!
//! if jira.test_connection().await {
//!     let draft = NewIssue::new("PROJ", "Bug in login", "Steps to reproduce...")
//!         .issue_type("Bug")
//!         .priority("High");
//!     if let Some(created) = jira.create_issue(&draft).await {
//!         jira.add_comment(&created.key, "Filed from the API").await;
//!     }
//! }
//! # }
//! ```

pub mod api;
pub mod interactive;
pub mod logging;

pub use api::types::{FieldSuggestions, Issue, NewIssue, Project, Transition};
pub use api::{JiraClient, DEFAULT_MAX_RESULTS};
pub use interactive::{Console, Prompt};
