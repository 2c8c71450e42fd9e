//! Chat API Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
/// Application state management
///
/// Owns the storage handle shared by request handlers.
pub mod state;
