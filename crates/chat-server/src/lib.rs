pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod session;
pub mod startup;

pub use app::{router, AppState};
pub use config::Config;
