// Core infrastructure module
// Provides foundational systems that other modules depend on

pub mod app;
pub mod app_config;
pub mod error;
pub mod events;
pub mod layout;
pub mod project_config;

pub use app::{App, Plan, SyncRequest};
pub use app_config::AppConfig;
pub use error::SyncError;
pub use events::{EventHandler, PromptEvent};
pub use layout::Layout;
pub use project_config::ProjectConfig;
