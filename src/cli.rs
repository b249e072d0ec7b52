use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "github-stars-harvester")]
#[command(about = "Harvests repository star counts from GitHub search into SurrealDB")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub API token used as the bearer credential
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// SurrealDB connection URL
    #[arg(long, env = "DB_URL", default_value = "ws://localhost:8000")]
    pub db_url: String,

    /// SurrealDB username
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    /// SurrealDB password
    #[arg(long, env = "DB_PASS", default_value = "root")]
    pub db_pass: String,

    /// SurrealDB namespace
    #[arg(long, env = "DB_NAMESPACE", default_value = "gitstars")]
    pub db_namespace: String,

    /// SurrealDB database
    #[arg(long, env = "DB_DATABASE", default_value = "stars")]
    pub db_database: String,

    /// Use a local SurrealDB instance (overrides --db-url)
    #[arg(long)]
    pub local: bool,

    /// Stop fetching once this many repositories have been seen
    #[arg(long, env = "TARGET_REPOS", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub target_repos: u64,

    /// Repositories requested per search page
    #[arg(long, env = "PAGE_SIZE", default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Search predicate passed to the repository search
    #[arg(long, env = "SEARCH_QUERY", default_value = "stars:>1")]
    pub search_query: String,

    /// Seconds to wait between successful pages
    #[arg(long, env = "PAGE_DELAY_SECS", default_value_t = 1)]
    pub page_delay_secs: u64,

    /// Seconds to wait before retrying a failed fetch
    #[arg(long, env = "RETRY_DELAY_SECS", default_value_t = 10)]
    pub retry_delay_secs: u64,

    /// Give up after this many consecutive failed fetches
    #[arg(long, env = "MAX_FETCH_RETRIES", default_value_t = 5)]
    pub max_fetch_retries: u32,

    /// Path of the CSV snapshot artifact
    #[arg(long, env = "CSV_PATH", default_value = "repos_data.csv")]
    pub csv_path: PathBuf,

    /// Path of the JSON snapshot artifact
    #[arg(long, env = "JSON_PATH", default_value = "repos_data.json")]
    pub json_path: PathBuf,
}
