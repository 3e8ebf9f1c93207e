// ==========================================
// LAGA Lagerverwaltung - Konfigurationsschicht
// ==========================================
// Zuständigkeit: Einstellungsdateien und Pfadauflösung.
// Konfiguration wird explizit konstruiert und durchgereicht,
// nicht als globaler Zustand referenziert.
// ==========================================

pub mod settings;

pub use settings::{
    default_data_dir, default_db_path, default_movement_log_path, BackupPathSettings,
    PrinterSettings, SettingsError, SettingsResult, SettingsStore, DEFAULT_PRINTER,
};
