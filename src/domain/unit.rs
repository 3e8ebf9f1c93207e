// ==========================================
// LAGA Lagerverwaltung - Einheiten-Domänenmodell
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Unit - eine physische, barcodierte Einheit eines Artikels
// ==========================================
// Entsteht stapelweise beim Einlagern und wird beim Auslagern
// aus dem Bestand entfernt (kein Kaskadenlöschen über den Artikel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: String,    // UUID
    pub article_id: String, // besitzender Artikel
    pub barcode: String,    // eindeutiger 10-stelliger numerischer Barcode
    pub created_at: NaiveDateTime,
}

/// Untergrenze des Barcode-Raums (erste 10-stellige Zahl)
pub const BARCODE_MIN: u64 = 1_000_000_000;

/// Obergrenze des Barcode-Raums
pub const BARCODE_MAX: u64 = 9_999_999_999;

/// Formprüfung eines Barcodes: genau 10 Ziffern, führende Ziffer != 0
pub fn is_valid_barcode(s: &str) -> bool {
    s.len() == 10 && s.chars().all(|c| c.is_ascii_digit()) && !s.starts_with('0')
}
