use anyhow::{Context, Result};
use chrono::Utc;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::sql::Datetime;
use surrealdb::{RecordId, Surreal};
use tracing::{debug, info, warn};

use crate::error::HarvestError;
use crate::harvest::RecordSink;
use crate::models::SnapshotRow;
use crate::types::StarRecord;

#[derive(Clone, Debug)]
pub struct StarStore {
    pub db: Surreal<Any>,
}

impl StarStore {
    /// Open one SurrealDB session. It is reused for every write and for
    /// the final snapshot read.
    pub async fn new(
        connection_url: &str,
        username: &str,
        password: &str,
        namespace: &str,
        database: &str,
    ) -> Result<Self> {
        info!("Connecting to SurrealDB at {}", connection_url);

        let db: Surreal<Any> = Surreal::init();

        db.connect(connection_url)
            .await
            .context("Failed to connect to SurrealDB")?;

        db.signin(Root { username, password })
            .await
            .context("Failed to authenticate with SurrealDB")?;

        db.use_ns(namespace)
            .use_db(database)
            .await
            .context("Failed to select namespace and database")?;

        info!("Successfully connected to SurrealDB");
        Ok(Self { db })
    }

    /// Idempotent schema setup: the repo table, its fields, and the unique
    /// index on the (repo_name, owner) identity.
    pub async fn ensure_schema(&self) -> Result<()> {
        let ddl = r#"
            DEFINE TABLE IF NOT EXISTS repo SCHEMAFULL;
            DEFINE FIELD IF NOT EXISTS repo_name ON TABLE repo TYPE string;
            DEFINE FIELD IF NOT EXISTS owner ON TABLE repo TYPE string;
            DEFINE FIELD IF NOT EXISTS stars ON TABLE repo TYPE int;
            DEFINE FIELD IF NOT EXISTS last_updated ON TABLE repo TYPE datetime;
            DEFINE INDEX IF NOT EXISTS repo_identity ON TABLE repo FIELDS repo_name, owner UNIQUE;
        "#;

        self.db
            .query(ddl)
            .await
            .context("Failed to define repo schema")?
            .check()
            .context("Schema definition rejected")?;

        Ok(())
    }

    /// Merge a batch of observations into the repo table. Each record is
    /// one UPSERT keyed by its identity, committed before the next, so the
    /// whole batch is durable when this returns. Records with a missing
    /// owner or name are skipped with a warning. Returns the number
    /// written.
    pub async fn merge_records(&self, records: &[StarRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut written = 0;
        for record in records {
            if let Err(err) = record.validate() {
                warn!("{err}; skipping record");
                continue;
            }

            let record_id = RecordId::from(("repo", format!("{}/{}", record.owner, record.name)));

            let query = r#"
                UPSERT $id SET
                    repo_name = $name,
                    owner = $owner,
                    stars = $stars,
                    last_updated = $now
            "#;

            self.db
                .query(query)
                .bind(("id", record_id.clone()))
                .bind(("name", record.name.clone()))
                .bind(("owner", record.owner.clone()))
                .bind(("stars", record.stars))
                .bind(("now", Datetime::from(Utc::now())))
                .await
                .with_context(|| format!("Failed to upsert {}", record_id))?
                .check()
                .with_context(|| format!("Upsert rejected for {}", record_id))?;

            debug!(repo = %record_id, stars = record.stars, "upserted");
            written += 1;
        }

        Ok(written)
    }

    /// Number of stored repositories.
    pub async fn count(&self) -> Result<usize> {
        let mut result = self
            .db
            .query("SELECT count() FROM repo GROUP ALL")
            .await
            .context("Failed to count repos")?;

        #[derive(Debug, serde::Deserialize)]
        struct CountRow {
            count: usize,
        }

        let row: Option<CountRow> = result.take(0).context("Failed to read repo count")?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Read back every stored repo in ascending id order, flattened into
    /// the five-column snapshot layout.
    pub async fn snapshot_rows(&self) -> Result<Vec<SnapshotRow>> {
        let query = r#"
            SELECT
                record::id(id) AS id,
                repo_name,
                owner,
                stars,
                type::string(last_updated) AS last_updated
            FROM repo
            ORDER BY id ASC
        "#;

        let mut result = self
            .db
            .query(query)
            .await
            .context("Failed to read repos for snapshot")?;

        let rows: Vec<SnapshotRow> = result.take(0).context("Failed to decode snapshot rows")?;
        Ok(rows)
    }
}

impl RecordSink for StarStore {
    async fn upsert_batch(&self, records: &[StarRecord]) -> crate::error::Result<usize> {
        self.merge_records(records)
            .await
            .map_err(|e| HarvestError::WriteFailed(format!("{e:#}")))
    }
}
