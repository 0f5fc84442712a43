pub mod draft_handlers;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
