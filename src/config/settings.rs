// ==========================================
// LAGA Lagerverwaltung - Einstellungsdateien
// ==========================================
// Zwei kleine JSON-Dateien im Datenverzeichnis:
// - backup_settings.json  { "customPath", "lastChanged" }
// - printer_settings.json { "selectedPrinter", "lastChanged" }
// Fehlt eine Datei, gilt der jeweilige Standard.
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Druckername, wenn keine Auswahl hinterlegt ist
pub const DEFAULT_PRINTER: &str = "Zebra GK420d";

const BACKUP_SETTINGS_FILE: &str = "backup_settings.json";
const PRINTER_SETTINGS_FILE: &str = "printer_settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Einstellungsdatei nicht lesbar/schreibbar: {0}")]
    Io(#[from] std::io::Error),

    #[error("Einstellungsdatei beschädigt: {0}")]
    Format(#[from] serde_json::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

// ==========================================
// Dateiformate
// ==========================================

/// Überschriebener Sicherungspfad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPathSettings {
    pub custom_path: String,
    pub last_changed: NaiveDateTime,
}

/// Gewählter Etikettendrucker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterSettings {
    pub selected_printer: String,
    pub last_changed: NaiveDateTime,
}

// ==========================================
// SettingsStore
// ==========================================

/// Liest und schreibt die Einstellungsdateien eines Datenverzeichnisses.
///
/// Explizit konstruiert und durchgereicht; es gibt keinen globalen
/// Zustand dahinter.
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn read_json<T: DeserializeOwned>(&self, file_name: &str) -> SettingsResult<Option<T>> {
        let path = self.dir.join(file_name);
        if !path.exists() {
            // Fehlende Datei heißt: Standard verwenden
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> SettingsResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        let raw = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, raw)?;
        debug!(datei = %path.display(), "Einstellungsdatei geschrieben");
        Ok(())
    }

    // ==========================================
    // Sicherungspfad
    // ==========================================

    pub fn backup_path(&self) -> SettingsResult<Option<BackupPathSettings>> {
        self.read_json(BACKUP_SETTINGS_FILE)
    }

    pub fn set_backup_path(&self, custom_path: &str) -> SettingsResult<BackupPathSettings> {
        let settings = BackupPathSettings {
            custom_path: custom_path.to_string(),
            last_changed: Utc::now().naive_utc(),
        };
        self.write_json(BACKUP_SETTINGS_FILE, &settings)?;
        Ok(settings)
    }

    /// Überschreibung entfernen; danach gilt wieder der Standardpfad
    pub fn clear_backup_path(&self) -> SettingsResult<()> {
        let path = self.dir.join(BACKUP_SETTINGS_FILE);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Wirksames Sicherungsverzeichnis: Überschreibung oder Standard
    /// (Unterordner "backup" des Datenverzeichnisses)
    pub fn effective_backup_dir(&self) -> SettingsResult<PathBuf> {
        match self.backup_path()? {
            Some(settings) => Ok(PathBuf::from(settings.custom_path)),
            None => Ok(self.dir.join("backup")),
        }
    }

    // ==========================================
    // Druckerauswahl
    // ==========================================

    pub fn printer(&self) -> SettingsResult<Option<PrinterSettings>> {
        self.read_json(PRINTER_SETTINGS_FILE)
    }

    pub fn set_printer(&self, printer_name: &str) -> SettingsResult<PrinterSettings> {
        let settings = PrinterSettings {
            selected_printer: printer_name.to_string(),
            last_changed: Utc::now().naive_utc(),
        };
        self.write_json(PRINTER_SETTINGS_FILE, &settings)?;
        Ok(settings)
    }

    /// Gewählter Drucker oder Standardgerät
    pub fn selected_printer(&self) -> SettingsResult<String> {
        Ok(self
            .printer()?
            .map(|s| s.selected_printer)
            .unwrap_or_else(|| DEFAULT_PRINTER.to_string()))
    }
}

// ==========================================
// Datenverzeichnis
// ==========================================

/// Datenverzeichnis der Anwendung auflösen.
///
/// Reihenfolge:
/// 1. Umgebungsvariable LAGA_DATA_DIR (Debug/Test/CI)
/// 2. Benutzer-Datenverzeichnis des Systems, Unterordner "laga"
///    (im Debug-Bau "laga-dev", damit Entwicklung den Produktivstand
///    nicht anfasst)
/// 3. Rückfall auf das Arbeitsverzeichnis
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LAGA_DATA_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("laga-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("laga");

        std::fs::create_dir_all(&dir).ok();
        return dir;
    }

    PathBuf::from(".")
}

/// Standardpfad der Datenbankdatei im Datenverzeichnis
pub fn default_db_path() -> String {
    default_data_dir().join("laga.db").display().to_string()
}

/// Standardpfad der Bewegungsdatei im Datenverzeichnis
pub fn default_movement_log_path() -> PathBuf {
    default_data_dir().join("bewegungen.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_mean_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        assert!(store.backup_path().unwrap().is_none());
        assert!(store.printer().unwrap().is_none());
        assert_eq!(store.selected_printer().unwrap(), DEFAULT_PRINTER);
        assert_eq!(
            store.effective_backup_dir().unwrap(),
            dir.path().join("backup")
        );
    }

    #[test]
    fn test_backup_path_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        store.set_backup_path("/mnt/sicherung/laga").unwrap();
        let loaded = store.backup_path().unwrap().unwrap();
        assert_eq!(loaded.custom_path, "/mnt/sicherung/laga");
        assert_eq!(
            store.effective_backup_dir().unwrap(),
            PathBuf::from("/mnt/sicherung/laga")
        );

        // Dateiformat: camelCase-Schlüssel wie vereinbart
        let raw =
            std::fs::read_to_string(dir.path().join("backup_settings.json")).unwrap();
        assert!(raw.contains("\"customPath\""));
        assert!(raw.contains("\"lastChanged\""));

        store.clear_backup_path().unwrap();
        assert!(store.backup_path().unwrap().is_none());
        // Doppeltes Entfernen bleibt still
        store.clear_backup_path().unwrap();
    }

    #[test]
    fn test_printer_selection_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        store.set_printer("Zebra LP2824 Plus").unwrap();
        assert_eq!(store.selected_printer().unwrap(), "Zebra LP2824 Plus");

        let raw =
            std::fs::read_to_string(dir.path().join("printer_settings.json")).unwrap();
        assert!(raw.contains("\"selectedPrinter\""));
    }

    #[test]
    fn test_corrupt_settings_file_is_an_error_not_a_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("printer_settings.json"), "{kaputt").unwrap();

        let store = SettingsStore::new(dir.path());
        assert!(matches!(store.printer(), Err(SettingsError::Format(_))));
    }
}
