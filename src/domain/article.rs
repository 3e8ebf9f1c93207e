// ==========================================
// LAGA Lagerverwaltung - Artikel-Domänenmodell
// ==========================================
// Ein Artikel ist die Katalogposition; der tatsächliche Bestand
// ergibt sich immer aus der Live-Zählung seiner Einheiten
// (niemals aus einem mitgeführten Zähler).
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::UnitKind;

// ==========================================
// Article - Artikelstammsatz
// ==========================================
// Abgleich: Tabelle article (schema in db.rs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    // ===== Identität =====
    pub article_id: String, // UUID
    pub name: String,       // eindeutiger Anzeigename

    // ===== Stammdaten-Verweise (restrict-on-delete) =====
    pub supplier_id: String,
    pub manufacturer_id: String,
    pub cost_center_id: String,
    pub storage_location_id: String,

    // ===== Bestellparameter =====
    pub lead_time_days: i32, // Wiederbeschaffungszeit in Tagen (1..=10)
    pub unit_kind: UnitKind, // Einzelartikel oder Gebinde

    // ===== Bestandsgrenzen =====
    pub min_stock: i64, // Mindestbestand (>= 0)
    pub max_stock: i64, // Maximalbestand (>= min_stock)

    // ===== Warnungslebenszyklus =====
    // warning_created_at: gesetzt sobald der Bestand den Mindestbestand
    //   erreicht/unterschreitet, unabhängig vom Mail-Ausgang
    // last_warning_sent_at: nur bei erfolgreichem Mail-Versand gesetzt
    // Die beiden Zeitstempel kodieren verschiedene Fakten und werden
    // bewusst nicht zusammengelegt.
    pub warning_created_at: Option<NaiveDateTime>,
    pub last_warning_sent_at: Option<NaiveDateTime>,
    pub is_warning_active: bool,

    // ===== Metadaten =====
    pub created_at: NaiveDateTime,
}

impl Article {
    /// Liegt der übergebene Bestand im Warnbereich?
    pub fn is_below_minimum(&self, stock: i64) -> bool {
        stock <= self.min_stock
    }

    /// Benötigte Nachbestellmenge laut Mail-Vorlage: |Maximalbestand - Bestand|
    pub fn quantity_needed(&self, stock: i64) -> i64 {
        (self.max_stock - stock).abs()
    }
}

// ==========================================
// ArticleDraft - Eingabeform aus der Artikelmaske
// ==========================================
// Trägt die beiden Gebinde-Häkchen getrennt, so wie die Maske sie
// liefert; das Validierungstor erzwingt "genau eins gewählt".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub name: String,
    pub supplier_id: String,
    pub manufacturer_id: String,
    pub cost_center_id: String,
    pub storage_location_id: String,
    pub lead_time_days: i32,
    pub is_single_item: bool, // Häkchen "Einzelartikel"
    pub is_box: bool,         // Häkchen "Gebinde"
    pub min_stock: i64,
    pub max_stock: i64,
}

impl ArticleDraft {
    /// Gewählte Gebindeart, sofern genau ein Häkchen gesetzt ist
    pub fn unit_kind(&self) -> Option<UnitKind> {
        match (self.is_single_item, self.is_box) {
            (true, false) => Some(UnitKind::Single),
            (false, true) => Some(UnitKind::Box),
            _ => None,
        }
    }
}
