use tastetable::{AppState, Config, app, auth, db, store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // An unreachable store at boot aborts startup; there is no point
    // serving requests against it.
    let db_pool = db::connect(&config.database_url).await?;

    // First master: moderation routes are master-gated, so the account has
    // to be seeded from the environment rather than minted over HTTP.
    if let Some(seed) = &config.master_seed {
        let hash = auth::hash_password(&seed.password)?;
        let master = store::ensure_master(&db_pool, &seed.username, &seed.email, &hash).await?;
        tracing::info!(username = %master.username, "master account ensured");
    }

    let port = config.port;
    let state = AppState::new(db_pool, config);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
