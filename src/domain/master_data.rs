// ==========================================
// LAGA Lagerverwaltung - Stammdaten-Domänenmodelle
// ==========================================
// Kostenstelle, Lagerort und Mail-Empfänger. Alle drei sind
// reine Namenslisten mit Eindeutigkeitsregel.
// ==========================================

use serde::{Deserialize, Serialize};

/// Kostenstelle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCenter {
    pub cost_center_id: String, // UUID
    pub name: String,           // eindeutig
}

/// Lagerort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageLocation {
    pub storage_location_id: String, // UUID
    pub name: String,                // eindeutig
}

// ==========================================
// Recipient - Empfänger der Mindestbestandswarnung
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub recipient_id: String, // UUID
    pub email: String,        // eindeutige Adresse
}

/// Formprüfung einer Empfängeradresse vor dem Speichern.
///
/// Die Prüfung läuft über den Adress-Parser des Mail-Stacks, damit
/// Erfassung und Versand dieselbe Vorstellung von "gültig" haben.
pub fn is_valid_email(addr: &str) -> bool {
    let trimmed = addr.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.parse::<lettre::Address>().is_ok()
}
