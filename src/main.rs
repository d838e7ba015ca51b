use course_acl::{AppConfig, PostgresRepository, init_tracing, repository::Repository};

/// main
///
/// Operational entry point: validates configuration, installs logging and
/// brings the course graph schema up to date. Request transport is left to the
/// embedding service.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    // Fail-fast on missing DATABASE_URL / production JWT_SECRET.
    let config = AppConfig::load();
    init_tracing(&config);

    tracing::info!("Starting in {:?} mode", config.env);

    let repo = PostgresRepository::connect(&config)
        .await
        .expect("FATAL: Failed to connect to Postgres or apply migrations. Check DATABASE_URL.");

    match repo.list_profiles().await {
        Ok(profiles) => tracing::info!(profiles = profiles.len(), "Course graph ready."),
        Err(e) => {
            tracing::error!("Schema check failed: {}", e);
            std::process::exit(1);
        }
    }
}
