// ==========================================
// LAGA Lagerverwaltung - Fehler der Repository-Schicht
// ==========================================
// Werkzeug: thiserror-Ableitung
// ==========================================

use thiserror::Error;

/// Fehlertyp der Repository-Schicht
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Datenbankfehler =====
    #[error("Datensatz nicht gefunden: {entity} mit id={id}")]
    NotFound { entity: String, id: String },

    #[error("Datenbankverbindung fehlgeschlagen: {0}")]
    DatabaseConnectionError(String),

    #[error("Datenbanksperre nicht erhalten: {0}")]
    LockError(String),

    #[error("Datenbanktransaktion fehlgeschlagen: {0}")]
    DatabaseTransactionError(String),

    #[error("Datenbankabfrage fehlgeschlagen: {0}")]
    DatabaseQueryError(String),

    #[error("Eindeutigkeit verletzt: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fremdschlüssel verletzt: {0}")]
    ForeignKeyViolation(String),

    // ===== Datenqualität =====
    #[error("Datenvalidierung fehlgeschlagen: {0}")]
    ValidationError(String),

    // ===== Allgemein =====
    #[error("Interner Fehler: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// Umsetzung von rusqlite::Error: UNIQUE- und FOREIGN-KEY-Verstöße
// werden klassifiziert, damit die API-Schicht sie als Geschäftsregel
// statt als Technikfehler melden kann.
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unbekannt".to_string(),
                id: "Unbekannt".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result-Alias der Repository-Schicht
pub type RepositoryResult<T> = Result<T, RepositoryError>;
