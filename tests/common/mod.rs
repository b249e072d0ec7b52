use github_stars_harvester::store::StarStore;

pub struct TestContext {
    pub store: StarStore,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        // Use environment variables or defaults for a dev database
        let db_url = std::env::var("DB_URL").unwrap_or_else(|_| "ws://localhost:8000".to_string());
        let db_user = std::env::var("DB_USER").unwrap_or_else(|_| "root".to_string());
        let db_pass = std::env::var("DB_PASS").unwrap_or_else(|_| "root".to_string());
        let db_namespace =
            std::env::var("DB_NAMESPACE").unwrap_or_else(|_| "gitstars_test".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or_else(|_| "stars_test".to_string());

        let store = match tokio::time::timeout(
            std::time::Duration::from_secs(5),
            StarStore::new(&db_url, &db_user, &db_pass, &db_namespace, &db_database),
        )
        .await
        {
            Ok(Ok(store)) => store,
            Ok(Err(e)) => {
                eprintln!("Failed to connect to SurrealDB: {}", e);
                eprintln!(
                    "Example: surreal start --bind 0.0.0.0:8000 --user root --pass root file://./test.db --allow-all"
                );
                return Err(e);
            }
            Err(_) => {
                let err = anyhow::anyhow!("Connection to SurrealDB timed out");
                eprintln!("{}", err);
                return Err(err);
            }
        };

        store.ensure_schema().await?;
        Ok(TestContext { store })
    }
}
