// ==========================================
// LAGA Lagerverwaltung - Repository-Schicht
// ==========================================
// Zuständigkeit: Datenzugriff und Zeilen-Mapping,
// keine Geschäftslogik
// ==========================================

pub mod article_repo;
pub mod error;
pub mod master_data_repo;
pub mod partner_repo;
pub mod recipient_repo;
pub mod unit_repo;

pub use article_repo::ArticleRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use master_data_repo::{CostCenterRepository, StorageLocationRepository};
pub use partner_repo::PartnerRepository;
pub use recipient_repo::RecipientRepository;
pub use unit_repo::UnitRepository;

use chrono::NaiveDateTime;

/// Speicherformat für Zeitstempel (Textspalten)
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub(crate) fn parse_ts(raw: &str) -> RepositoryResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT).map_err(|e| {
        RepositoryError::ValidationError(format!("Zeitstempel '{}' unlesbar: {}", raw, e))
    })
}
