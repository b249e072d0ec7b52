use crate::error::{HarvestError, Result};
use crate::harvest::PageFetch;
use crate::types::{RepoPage, SearchResponse, StarRecord};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const GRAPHQL_URL: &str = "https://api.github.com/graphql";

const SEARCH_DOCUMENT: &str = r#"
query ($query: String!, $first: Int!, $after: String) {
  search(query: $query, type: REPOSITORY, first: $first, after: $after) {
    pageInfo {
      endCursor
      hasNextPage
    }
    nodes {
      ... on Repository {
        name
        owner { login }
        stargazerCount
      }
    }
  }
}
"#;

pub struct GitHubClient {
    client: Client,
    token: String,
    search_query: String,
}

impl GitHubClient {
    pub fn new(token: String, search_query: String) -> Result<Self> {
        if token.is_empty() {
            return Err(HarvestError::EnvError(
                "GITHUB_TOKEN is empty; a bearer credential is required".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent("github-stars-harvester/0.1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            token,
            search_query,
        })
    }

    /// Fetch one page of repository search results. `after` is the cursor
    /// returned by the previous page, or `None` for the first page.
    pub async fn search_stars_page(&self, after: Option<&str>, page_size: u32) -> Result<RepoPage> {
        let body = json!({
            "query": SEARCH_DOCUMENT,
            "variables": {
                "query": self.search_query,
                "first": page_size,
                "after": after,
            },
        });

        let response = self
            .client
            .post(GRAPHQL_URL)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(HarvestError::FetchFailed(format!(
                "GitHub API returned {}: {}",
                status, detail
            )));
        }

        let parsed: SearchResponse = response.json().await?;

        if let Some(errors) = parsed.errors {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(HarvestError::FetchFailed(format!(
                "GraphQL errors: {}",
                messages.join("; ")
            )));
        }

        let search = parsed
            .data
            .ok_or_else(|| {
                HarvestError::FetchFailed("response contained neither data nor errors".to_string())
            })?
            .search;

        debug!(
            nodes = search.nodes.len(),
            has_next = search.page_info.has_next_page,
            "fetched search page"
        );

        let records = search
            .nodes
            .into_iter()
            .map(|node| StarRecord {
                owner: node.owner.login,
                name: node.name,
                stars: node.stargazer_count,
            })
            .collect();

        Ok(RepoPage {
            records,
            end_cursor: search.page_info.end_cursor,
            has_next_page: search.page_info.has_next_page,
        })
    }
}

impl PageFetch for GitHubClient {
    async fn fetch_page(&self, after: Option<&str>, page_size: u32) -> Result<RepoPage> {
        self.search_stars_page(after, page_size).await
    }
}
