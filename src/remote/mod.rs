//! Admin REST API access.
//!
//! This module defines the collection endpoint seam the list controller talks
//! to, the query and page types that cross it, and the reqwest-backed
//! implementation in [`http`].

pub mod error;
pub mod http;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resources::Resource;

pub use error::ErrorBody;
pub use http::HttpCollection;

/// Parameters for one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Free-text search. `None` means no search constraint.
    pub search: Option<String>,
    /// Resource-specific criteria, already rendered to query values
    pub filters: Vec<(String, String)>,
    /// Sort key; a leading `-` means descending
    pub ordering: String,
    pub page: u32,
    pub page_size: u32,
}

impl ListQuery {
    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs.extend(self.filters.iter().cloned());
        if !self.ordering.is_empty() {
            pairs.push(("ordering".to_string(), self.ordering.clone()));
        }
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("page_size".to_string(), self.page_size.to_string()));
        pairs
    }
}

/// One page of a remote collection plus the total item count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "results")]
    pub items: Vec<T>,
    #[serde(alias = "total")]
    pub count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, count: u64) -> Self {
        Self { items, count }
    }
}

/// Status transitions used by the approve/reject and activation workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Reject { reason: String },
    Activate,
    Deactivate,
}

impl Transition {
    /// URL segment the backend exposes for this action
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Approve => "approve",
            Transition::Reject { .. } => "reject",
            Transition::Activate => "activate",
            Transition::Deactivate => "deactivate",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Transition::Reject { reason } => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Past-tense verb for success notifications
    pub fn past_tense(&self) -> &'static str {
        match self {
            Transition::Approve => "approved",
            Transition::Reject { .. } => "rejected",
            Transition::Activate => "activated",
            Transition::Deactivate => "deactivated",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action())
    }
}

/// Body sent with a transition call
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransitionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
}

/// Field-level messages returned alongside a rejection
pub type FieldErrors = BTreeMap<String, String>;

/// Remote collection for one resource type.
///
/// Implementations perform exactly one backend call per method and never
/// touch controller state; the token is supplied by the caller.
#[async_trait]
pub trait CollectionEndpoint<R: Resource>: Send + Sync {
    async fn list(&self, token: &SecretString, query: &ListQuery) -> Result<Page<R::Item>>;

    async fn create(&self, token: &SecretString, draft: &R::Draft) -> Result<R::Item>;

    async fn update(&self, token: &SecretString, id: &str, patch: &R::Patch) -> Result<R::Item>;

    async fn delete(&self, token: &SecretString, id: &str) -> Result<()>;

    async fn transition(
        &self,
        token: &SecretString,
        id: &str,
        transition: &Transition,
    ) -> Result<R::Item>;
}
