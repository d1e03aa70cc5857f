//! Interactive, field-driven issue creation.
//!
//! Looks up the required fields for a project and issue type from the
//! creation metadata, elicits a value for each through a blocking,
//! line-oriented prompt, and submits the assembled payload. The console
//! is behind the [`Prompt`] trait so the flow is testable with scripted
//! input.

use std::io::{self, BufRead, Write};

use serde_json::Value;
use tracing::warn;

use crate::api::types::AtlassianDoc;
use crate::api::types::CreatedIssue;
use crate::api::JiraClient;

/// A line-oriented console for the interactive creation flow.
pub trait Prompt {
    /// Print one line of output.
    fn show(&mut self, line: &str);

    /// Print a label and read one line of input.
    fn ask(&mut self, label: &str) -> String;
}

/// Stdin/stdout implementation of [`Prompt`].
#[derive(Debug, Default)]
pub struct Console;

impl Prompt for Console {
    fn show(&mut self, line: &str) {
        println!("{}", line);
    }

    fn ask(&mut self, label: &str) -> String {
        print!("{}", label);
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return String::new();
        }
        line.trim_end_matches(&['\r', '\n'][..]).to_string()
    }
}

impl JiraClient {
    /// Create an issue interactively, prompting for each required field.
    ///
    /// With no issue type given, the project's available issue types are
    /// listed instead and nothing is created (a discovery shortcut, not an
    /// error). When the issue type cannot be found in the creation
    /// metadata, the failure is reported and nothing is created.
    ///
    /// Per-field policy: `summary` is stored verbatim; `description` is
    /// wrapped in the ADF envelope and omitted when left empty; fields
    /// with an allowed-value set offer a numbered selection and are
    /// skipped on invalid input; everything else is a free-text prompt
    /// stored only when non-empty.
    pub async fn create_issue_interactive(
        &self,
        project_key: &str,
        issue_type: Option<&str>,
        prompt: &mut dyn Prompt,
    ) -> Option<CreatedIssue> {
        let Some(issue_type) = issue_type else {
            self.show_issue_types(project_key, prompt).await;
            return None;
        };

        let field_metas = self.get_fields_for_issue_type(project_key, issue_type).await;
        if field_metas.is_empty() {
            warn!("no fields found for {} in {}", issue_type, project_key);
            prompt.show(&format!(
                "No fields found for {} in project {}",
                issue_type, project_key
            ));
            return None;
        }

        prompt.show(&format!("Creating a new {} issue", issue_type));

        let mut fields = serde_json::Map::new();
        fields.insert(
            "project".to_string(),
            serde_json::json!({ "key": project_key }),
        );
        fields.insert(
            "issuetype".to_string(),
            serde_json::json!({ "name": issue_type }),
        );

        for (field_id, meta) in &field_metas {
            if !meta.required {
                continue;
            }
            // Already seeded above.
            if field_id == "project" || field_id == "issuetype" {
                continue;
            }

            prompt.show(&format!("{} (required):", meta.display_name(field_id)));

            match field_id.as_str() {
                "summary" => {
                    let value = prompt.ask("  Summary: ");
                    fields.insert("summary".to_string(), Value::String(value));
                }
                "description" => {
                    let value = prompt.ask("  Description: ");
                    if !value.is_empty() {
                        fields.insert(
                            "description".to_string(),
                            AtlassianDoc::from_text(&value).to_value(),
                        );
                    }
                }
                _ if meta.has_allowed_values() => {
                    prompt.show("  Available values:");
                    for (i, option) in meta.allowed_values.iter().enumerate() {
                        prompt.show(&format!("    {}. {}", i + 1, option.label()));
                    }
                    let choice = prompt.ask("  Select a number: ");
                    match choice.trim().parse::<usize>() {
                        Ok(n) if (1..=meta.allowed_values.len()).contains(&n) => {
                            let selected = &meta.allowed_values[n - 1];
                            fields.insert(field_id.clone(), selected.as_field_value());
                        }
                        _ => prompt.show("  Invalid selection, skipping field"),
                    }
                }
                _ => {
                    let value = prompt.ask(&format!(
                        "  Enter a value for {}: ",
                        meta.display_name(field_id)
                    ));
                    if !value.is_empty() {
                        fields.insert(field_id.clone(), Value::String(value));
                    }
                }
            }
        }

        match self.submit_issue(fields).await {
            Ok(created) => {
                prompt.show(&format!("Issue created: {}", created.key));
                Some(created)
            }
            Err(e) => {
                warn!("failed to create issue: {}", e);
                prompt.show(&format!("Failed to create issue: {}", e));
                None
            }
        }
    }

    async fn show_issue_types(&self, project_key: &str, prompt: &mut dyn Prompt) {
        let meta = self.get_create_meta(project_key, None).await;
        let Some(project) = meta.projects.first() else {
            prompt.show(&format!("No creation metadata for project {}", project_key));
            return;
        };
        prompt.show(&format!("Available issue types in {}:", project_key));
        for issuetype in &project.issuetypes {
            let description = issuetype.description.as_deref().unwrap_or("no description");
            prompt.show(&format!("  {} - {}", issuetype.name, description));
        }
    }
}
