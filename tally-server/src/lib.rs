//! HTTP API for the Tally general-ledger backend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod schemas;
pub mod seed;

pub use config::{PaginationConfig, ServerConfig, StoreBackend, StoreConfig};
pub use handlers::AppState;
pub use routes::build_router;
