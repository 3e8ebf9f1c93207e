// ==========================================
// LAGA Lagerverwaltung - Anwendungsschicht
// ==========================================
// Zuständigkeit: Verdrahtung und (optional) die Tauri-Brücke
// ==========================================

pub mod commands;
pub mod state;

pub use state::{AppOptions, AppState};

#[cfg(feature = "tauri-app")]
pub use commands::*;
