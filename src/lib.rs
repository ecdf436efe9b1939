pub mod app;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;

pub use app::router;
pub use config::AppConfig;
pub use service::LedgerService;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageKey};
