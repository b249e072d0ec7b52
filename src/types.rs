use serde::Deserialize;

use crate::error::{HarvestError, Result};

/// One repository observation taken from a search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarRecord {
    pub owner: String,
    pub name: String,
    pub stars: u32,
}

impl StarRecord {
    /// A record without both halves of its identity cannot be stored.
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_empty() {
            return Err(HarvestError::ValidationFailed(format!(
                "repository '{}' has no owner login",
                self.name
            )));
        }
        if self.name.is_empty() {
            return Err(HarvestError::ValidationFailed(format!(
                "repository owned by '{}' has no name",
                self.owner
            )));
        }
        Ok(())
    }
}

/// A fetched page plus the pagination state needed to request the next one.
#[derive(Debug, Clone)]
pub struct RepoPage {
    pub records: Vec<StarRecord>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

// GraphQL search response structures

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: Option<SearchData>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchResults,
}

#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    pub nodes: Vec<RepoNode>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct RepoNode {
    pub name: String,
    pub owner: OwnerNode,
    #[serde(rename = "stargazerCount")]
    pub stargazer_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct OwnerNode {
    pub login: String,
}
