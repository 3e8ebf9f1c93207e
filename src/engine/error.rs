// ==========================================
// LAGA Lagerverwaltung - Fehler der Engine-Schicht
// ==========================================

use thiserror::Error;

use crate::repository::error::RepositoryError;

#[derive(Error, Debug)]
pub enum EngineError {
    // ===== Geschäftsregeln =====
    #[error("Eingabe ungültig: {0}")]
    Validation(String),

    #[error("Nicht gefunden: {entity} mit id={id}")]
    NotFound { entity: String, id: String },

    /// Der Barcode-Raum umfasst neun Milliarden Werte; wiederholte
    /// Kollisionen deuten auf einen korrupten Bestand hin. Lieber laut
    /// scheitern als endlos weiterziehen.
    #[error("Kein freier Barcode nach {attempts} Versuchen")]
    BarcodeSpaceExhausted { attempts: u32 },

    // ===== Nachgelagerte Dienste =====
    #[error("Bewegungsprotokoll nicht schreibbar: {0}")]
    MovementLog(String),

    #[error("Etikettendruck fehlgeschlagen: {0}")]
    Label(String),

    #[error("Mail-Versand fehlgeschlagen: {0}")]
    Mail(String),

    // ===== Durchgereicht =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
