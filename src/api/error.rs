// ==========================================
// LAGA Lagerverwaltung - Fehler der API-Schicht
// ==========================================
// Zuständigkeit: Technikfehler der unteren Schichten in
// benutzergerechte Meldungen übersetzen. Jede Fehlerklasse hat
// eine feste Behandlungsregel:
// - Validation/NotFound: an der Maske melden, kein Schreibzugriff
// - UniquenessRace: vom Eindeutigkeitsindex abgefangen, kein Teilschreiben
// - StillReferenced: RESTRICT-Fremdschlüssel, Löschen abgelehnt
// - ExternalService: Mail/Druck/Protokoll - melden, nie zurückrollen
// - Unexpected: generisch melden, Prozess läuft weiter
// ==========================================

use thiserror::Error;

use crate::config::settings::SettingsError;
use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Eingabe ungültig: {0}")]
    Validation(String),

    #[error("Bereits vorhanden: {0}")]
    UniquenessRace(String),

    #[error("Nicht gefunden: {0}")]
    NotFound(String),

    #[error("Datensatz wird noch verwendet: {0}")]
    StillReferenced(String),

    /// Die auslösende Bestandsmutation ist zu diesem Zeitpunkt bereits
    /// festgeschrieben und bleibt bestehen.
    #[error("Externer Dienst fehlgeschlagen: {0}")]
    ExternalService(String),

    #[error("Unerwarteter Fehler: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::UniquenessRace(msg),
            RepositoryError::ForeignKeyViolation(_) => ApiError::StillReferenced(
                "Löschen durch bestehende Verweise verhindert".to_string(),
            ),
            RepositoryError::ValidationError(msg) => ApiError::Validation(msg),
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::InternalError(msg) => ApiError::Unexpected(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => ApiError::Validation(msg),
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            EngineError::BarcodeSpaceExhausted { attempts } => ApiError::Unexpected(format!(
                "Kein freier Barcode nach {} Versuchen - Bestand prüfen",
                attempts
            )),
            EngineError::MovementLog(msg) | EngineError::Label(msg) | EngineError::Mail(msg) => {
                ApiError::ExternalService(msg)
            }
            EngineError::Repository(e) => ApiError::from(e),
            EngineError::Other(e) => ApiError::Other(e),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        ApiError::ExternalService(err.to_string())
    }
}

/// Result-Alias der API-Schicht
pub type ApiResult<T> = Result<T, ApiError>;
