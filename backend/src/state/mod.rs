// State management module
// Holds the storage handle shared by every request

pub mod app_state;

pub use app_state::AppState;
