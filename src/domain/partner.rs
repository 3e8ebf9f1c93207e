// ==========================================
// LAGA Lagerverwaltung - Geschäftspartner-Domänenmodell
// ==========================================
// Lieferant und Hersteller haben dieselbe Form und liegen in
// derselben Tabelle; die Rolle trennt die beiden Listen.
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::PartnerRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessPartner {
    pub partner_id: String, // UUID
    pub role: PartnerRole,
    pub name: String,    // eindeutig je Rolle
    pub website: String, // Pflichtfeld
    pub email: String,   // Pflichtfeld
    pub phone: String,   // Pflichtfeld
}

// ==========================================
// PartnerDraft - Eingabeform aus der Stammdatenmaske
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerDraft {
    pub name: String,
    pub website: String,
    pub email: String,
    pub phone: String,
}

impl PartnerDraft {
    /// Feldprüfung: alle Felder sind Pflichtfelder (nicht leer)
    ///
    /// # Rückgabe
    /// - `Err(feldname)` beim ersten leeren Feld
    pub fn check_required_fields(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Name");
        }
        if self.website.trim().is_empty() {
            return Err("Webseite");
        }
        if self.email.trim().is_empty() {
            return Err("E-Mail");
        }
        if self.phone.trim().is_empty() {
            return Err("Telefon");
        }
        Ok(())
    }
}
