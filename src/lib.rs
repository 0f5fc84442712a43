pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

pub use api::{create_router, AppState};
pub use error::ServiceError;
pub use logic::{DealRoomService, PublishOutcome, ResolveOutcome, SaveStatus};
pub use model::*;
pub use store::{JsonFileStore, Store};

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tower_http::services::ServeDir;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = crate::config::AppConfig::load()?;

    let store = crate::store::JsonFileStore::new(&config.storage.data_dir).await?;
    let state = AppState {
        store: Arc::new(store),
        uploads_dir: PathBuf::from(&config.storage.uploads_dir),
    };

    let app = create_router()
        .with_state(state)
        .nest_service("/uploads", ServeDir::new(&config.storage.uploads_dir));

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    serve(listener, app).await?;

    Ok(())
}
