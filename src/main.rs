//! jiraops demo CLI.
//!
//! A thin driver around [`jiraops::JiraClient`]: constructs one client
//! from the provided credentials, runs a single operation, and prints the
//! result. The exit code is 1 whenever the operation's sentinel value
//! signals failure.

use anyhow::Result;
use clap::{Parser, Subcommand};

use jiraops::interactive::Console;
use jiraops::{JiraClient, NewIssue, DEFAULT_MAX_RESULTS};

#[derive(Parser)]
#[command(name = "jiraops", version, about = "JIRA Cloud REST v3 issue client")]
struct Cli {
    /// Base URL of the JIRA instance (e.g. https://your-domain.atlassian.net)
    #[arg(long, env = "JIRA_URL")]
    url: String,

    /// Account identifier (usually the email address)
    #[arg(long, env = "JIRA_USER")]
    user: String,

    /// API token
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check connectivity and credentials
    Check,
    /// List visible projects
    Projects,
    /// Show creation fields for an issue type, or list issue types
    Fields {
        /// Project key
        project: String,
        /// Issue type name; omit to list the available issue types
        #[arg(long)]
        issue_type: Option<String>,
    },
    /// Create an issue from flags
    Create {
        /// Project key
        project: String,
        /// Issue summary
        summary: String,
        /// Issue description
        #[arg(long, default_value = "")]
        description: String,
        /// Issue type name
        #[arg(long, default_value = "Task")]
        issue_type: String,
        /// Priority name
        #[arg(long, default_value = "Medium")]
        priority: String,
        /// Assignee name
        #[arg(long)]
        assignee: Option<String>,
        /// Labels (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,
    },
    /// Create an issue interactively, field by field
    New {
        /// Project key
        project: String,
        /// Issue type name; omit to list the available issue types
        #[arg(long)]
        issue_type: Option<String>,
    },
    /// Show one issue
    Show {
        /// Issue key (e.g. PROJ-123)
        key: String,
    },
    /// Update issue fields from a JSON object
    Update {
        /// Issue key
        key: String,
        /// Field map as JSON, e.g. '{"labels":["urgent"]}'
        fields: String,
    },
    /// Delete an issue
    Delete {
        /// Issue key
        key: String,
    },
    /// Search issues with JQL
    Search {
        /// JQL query
        jql: String,
        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: u32,
    },
    /// Add a comment to an issue
    Comment {
        /// Issue key
        key: String,
        /// Comment text
        text: String,
    },
    /// List the transitions available to an issue
    Transitions {
        /// Issue key
        key: String,
    },
    /// Apply a transition to an issue
    Move {
        /// Issue key
        key: String,
        /// Transition ID (see `transitions`)
        transition_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    jiraops::logging::init()?;

    let cli = Cli::parse();
    let jira = JiraClient::new(&cli.url, &cli.user, &cli.token);

    let ok = run(&jira, cli.command).await?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(jira: &JiraClient, command: Command) -> Result<bool> {
    match command {
        Command::Check => {
            let ok = jira.test_connection().await;
            println!("{}", if ok { "Connection OK" } else { "Connection failed" });
            Ok(ok)
        }
        Command::Projects => {
            let projects = jira.get_projects().await;
            for project in &projects {
                println!("{}", project);
            }
            Ok(!projects.is_empty())
        }
        Command::Fields { project, issue_type } => match issue_type {
            Some(issue_type) => Ok(print_fields(jira, &project, &issue_type).await),
            None => Ok(print_issue_types(jira, &project).await),
        },
        Command::Create {
            project,
            summary,
            description,
            issue_type,
            priority,
            assignee,
            labels,
        } => {
            let mut draft = NewIssue::new(&project, &summary, &description)
                .issue_type(&issue_type)
                .priority(&priority)
                .labels(labels);
            if let Some(assignee) = assignee {
                draft = draft.assignee(&assignee);
            }
            match jira.create_issue(&draft).await {
                Some(created) => {
                    println!("Created {}", created.key);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        Command::New { project, issue_type } => {
            let mut console = Console;
            let created = jira
                .create_issue_interactive(&project, issue_type.as_deref(), &mut console)
                .await;
            Ok(created.is_some() || issue_type.is_none())
        }
        Command::Show { key } => match jira.get_issue(&key).await {
            Some(issue) => {
                println!("{}", issue);
                if let Some(status) = issue.status_name() {
                    println!("Status: {}", status);
                }
                let description = issue.description_text();
                if !description.is_empty() {
                    println!("{}", description);
                }
                Ok(true)
            }
            None => Ok(false),
        },
        Command::Update { key, fields } => {
            let fields: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&fields)?;
            Ok(jira.update_issue(&key, fields).await)
        }
        Command::Delete { key } => Ok(jira.delete_issue(&key).await),
        Command::Search { jql, max_results } => {
            let issues = jira.search_issues(&jql, max_results).await;
            for issue in &issues {
                println!("{}", issue);
            }
            println!("{} issue(s) found", issues.len());
            Ok(true)
        }
        Command::Comment { key, text } => Ok(jira.add_comment(&key, &text).await),
        Command::Transitions { key } => {
            let transitions = jira.get_transitions(&key).await;
            for transition in &transitions {
                println!("{}", transition);
            }
            Ok(!transitions.is_empty())
        }
        Command::Move { key, transition_id } => {
            Ok(jira.transition_issue(&key, &transition_id).await)
        }
    }
}

/// Print the required and optional creation fields for an issue type.
async fn print_fields(jira: &JiraClient, project: &str, issue_type: &str) -> bool {
    let fields = jira.get_fields_for_issue_type(project, issue_type).await;
    if fields.is_empty() {
        println!("No fields found for {} in project {}", issue_type, project);
        return false;
    }

    println!("Fields for {} in project {}:", issue_type, project);

    let mut required = Vec::new();
    let mut optional = Vec::new();
    for (field_id, meta) in &fields {
        let mut line = format!(
            "{} ({}) - type: {}",
            meta.display_name(field_id),
            field_id,
            meta.schema_type()
        );
        if meta.has_allowed_values() {
            let labels = meta.allowed_labels();
            line.push_str(&format!(" - values: {}", labels[..labels.len().min(5)].join(", ")));
            if labels.len() > 5 {
                line.push_str(&format!(" and {} more", labels.len() - 5));
            }
        }
        if meta.required {
            required.push(line);
        } else {
            optional.push(line);
        }
    }

    if !required.is_empty() {
        println!("Required:");
        for line in required {
            println!("  {}", line);
        }
    }
    if !optional.is_empty() {
        println!("Optional:");
        for line in optional {
            println!("  {}", line);
        }
    }
    true
}

/// Print the issue types creatable in a project.
async fn print_issue_types(jira: &JiraClient, project: &str) -> bool {
    let meta = jira.get_create_meta(project, None).await;
    let Some(entry) = meta.projects.first() else {
        println!("No creation metadata for project {}", project);
        return false;
    };
    println!("Issue types in project {}:", project);
    for issuetype in &entry.issuetypes {
        let description = issuetype.description.as_deref().unwrap_or("no description");
        println!("  {} - {}", issuetype.name, description);
    }
    true
}
