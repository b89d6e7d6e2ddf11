pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod storage;
pub mod store;
pub mod sync;
pub mod tracker;
pub mod ui;
pub mod state;

pub use app::router;
pub use state::AppState;
pub use storage::{load_config, resolve_settings_path};
pub use sync::{HabitRemote, SheetClient};
pub use tracker::HabitTracker;
