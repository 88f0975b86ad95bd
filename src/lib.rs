pub mod achievements;
pub mod api;
pub mod app;
pub mod calendar;
pub mod config;
pub mod datekey;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod streak;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore};
pub use streak::record_checkin;
