//! JIRA API client and types.
//!
//! This module provides the interface for communicating with the JIRA
//! REST API v3.

mod auth;
mod client;
pub(crate) mod error;
pub mod types;

pub use auth::Auth;
pub use client::{JiraClient, DEFAULT_MAX_RESULTS};
