// ==========================================
// Logging-Initialisierung
// ==========================================
// tracing + tracing-subscriber,
// Log-Level über Umgebungsvariable steuerbar
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Logging initialisieren
///
/// # Umgebungsvariablen
/// - RUST_LOG: Filter für das Log-Level (Standard: info)
///   z.B. RUST_LOG=debug oder RUST_LOG=laga=trace
///
/// # Beispiel
/// ```no_run
/// use laga::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Logging für Tests initialisieren
///
/// Detaillierteres Level, Ausgabe über den Test-Writer
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
