// ==========================================
// LAGA Lagerverwaltung - Einstellungs-API
// ==========================================
// Zuständigkeit: die beiden Einstellungsmasken (Druckerauswahl und
// Sicherungspfad) über den JSON-Einstellungsdateien.
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::settings::{BackupPathSettings, PrinterSettings, SettingsStore};

pub struct SettingsApi {
    store: Arc<SettingsStore>,
}

impl SettingsApi {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self { store }
    }

    /// Gewählter Drucker oder Standardgerät
    pub fn selected_printer(&self) -> ApiResult<String> {
        Ok(self.store.selected_printer()?)
    }

    pub fn set_printer(&self, printer_name: &str) -> ApiResult<PrinterSettings> {
        let printer_name = printer_name.trim();
        if printer_name.is_empty() {
            return Err(ApiError::Validation(
                "Druckername darf nicht leer sein".to_string(),
            ));
        }
        let saved = self.store.set_printer(printer_name)?;
        info!(drucker = %saved.selected_printer, "Druckerauswahl gespeichert");
        Ok(saved)
    }

    /// Hinterlegte Pfad-Überschreibung; None heißt Standardpfad
    pub fn backup_path(&self) -> ApiResult<Option<BackupPathSettings>> {
        Ok(self.store.backup_path()?)
    }

    pub fn set_backup_path(&self, custom_path: &str) -> ApiResult<BackupPathSettings> {
        let custom_path = custom_path.trim();
        if custom_path.is_empty() {
            return Err(ApiError::Validation(
                "Sicherungspfad darf nicht leer sein".to_string(),
            ));
        }
        let saved = self.store.set_backup_path(custom_path)?;
        info!(pfad = %saved.custom_path, "Sicherungspfad gespeichert");
        Ok(saved)
    }

    /// Überschreibung entfernen, zurück zum Standardpfad
    pub fn clear_backup_path(&self) -> ApiResult<()> {
        self.store.clear_backup_path()?;
        info!("Sicherungspfad auf Standard zurückgesetzt");
        Ok(())
    }
}
