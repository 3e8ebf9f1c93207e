// ==========================================
// LAGA Lagerverwaltung - Kernbibliothek
// ==========================================
// Bestandsführung für ein einzelnes Lager: Artikel, barcodierte
// Einheiten, Stammdaten, Ein-/Auslagern, Mindestbestandswarnung per
// Mail und Etikettendruck. Technikstapel: Tauri (optional) + Rust +
// SQLite.
// ==========================================

// ==========================================
// Modul-Deklarationen
// ==========================================

// Domänenschicht - Entitäten und Werttypen
pub mod domain;

// Repository-Schicht - Datenzugriff
pub mod repository;

// Engine-Schicht - Geschäftsregeln
pub mod engine;

// Konfigurationsschicht - Einstellungsdateien und Pfade
pub mod config;

// Datenbank-Infrastruktur (Verbindungsaufbau/PRAGMA/Schema)
pub mod db;

// Logging
pub mod logging;

// API-Schicht - Geschäftsschnittstellen der Masken
pub mod api;

// Anwendungsschicht - Verdrahtung und Tauri-Brücke
pub mod app;

// ==========================================
// Re-Exporte der Kerntypen
// ==========================================

pub use domain::{
    Article, ArticleDraft, BusinessPartner, CostCenter, MovementEntry, MovementKind, PartnerDraft,
    PartnerRole, Recipient, StorageLocation, Unit, UnitKind,
};

pub use engine::{
    InventoryLedger, MovementLogger, NotificationDispatcher, StockInOperation, StockMonitor,
    StockOutOperation,
};

pub use api::{
    ApiError, ApiResult, ArticleApi, MasterDataApi, RecipientApi, SettingsApi, StockApi,
    WarningApi,
};

pub use app::{AppOptions, AppState};

// ==========================================
// Konstanten
// ==========================================

/// Systemversion
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Systemname
pub const APP_NAME: &str = "LAGA Lagerverwaltung";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
