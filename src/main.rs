use std::path::PathBuf;
use std::sync::Arc;

use axum::serve;
use dealroom_rs::api::{create_router, AppState};
use dealroom_rs::config::AppConfig;
use dealroom_rs::logic::DealRoomService;
use dealroom_rs::store::JsonFileStore;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new().filter_level(LevelFilter::Info).init();

    println!("Deal Room Editing Service");

    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}, data={}",
        config.server.host, config.server.port, config.storage.data_dir
    );

    let store = JsonFileStore::new(&config.storage.data_dir).await?;

    // Sweep drafts that expired while the server was down; expiry is
    // otherwise enforced lazily on read.
    let removed = DealRoomService::cleanup_expired_drafts(&store).await?;
    if removed > 0 {
        println!("Removed {removed} expired drafts");
    }

    let state = AppState {
        store: Arc::new(store),
        uploads_dir: PathBuf::from(&config.storage.uploads_dir),
    };

    let app = create_router()
        .with_state(state)
        .nest_service("/uploads", ServeDir::new(&config.storage.uploads_dir));

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("Deal room server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
