// ==========================================
// LAGA Lagerverwaltung - Basistypen
// ==========================================
// Zuständigkeit: kleine Aufzählungstypen, die in mehreren
// Schichten gebraucht werden (Domäne, Repository, API)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// PartnerRole - Rolle eines Geschäftspartners
// ==========================================
// Lieferant und Hersteller teilen sich dieselbe Tabellenform,
// die Rolle unterscheidet die beiden Stammdaten-Listen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartnerRole {
    Supplier,     // Lieferant
    Manufacturer, // Hersteller
}

impl PartnerRole {
    /// Datenbank-Repräsentation
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerRole::Supplier => "SUPPLIER",
            PartnerRole::Manufacturer => "MANUFACTURER",
        }
    }

    /// Aus Datenbank-Repräsentation parsen
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUPPLIER" => Some(PartnerRole::Supplier),
            "MANUFACTURER" => Some(PartnerRole::Manufacturer),
            _ => None,
        }
    }

    /// Anzeigename (deutsch, für Meldungen und Mail-Vorlage)
    pub fn label(&self) -> &'static str {
        match self {
            PartnerRole::Supplier => "Lieferant",
            PartnerRole::Manufacturer => "Hersteller",
        }
    }
}

// ==========================================
// UnitKind - Gebindeart eines Artikels
// ==========================================
// Genau eine der beiden Arten muss beim Anlegen gewählt sein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Single, // Einzelartikel
    Box,    // Mehrfachgebinde / Karton
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Single => "SINGLE",
            UnitKind::Box => "BOX",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SINGLE" => Some(UnitKind::Single),
            "BOX" => Some(UnitKind::Box),
            _ => None,
        }
    }
}

// ==========================================
// MovementKind - Art einer Bestandsbewegung
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    StockIn,  // Einlagern
    StockOut, // Auslagern
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::StockIn => "StockIn",
            MovementKind::StockOut => "StockOut",
        }
    }

    /// Deutsches Aktionswort, genau so landet es in der Bewegungsdatei
    pub fn label(&self) -> &'static str {
        match self {
            MovementKind::StockIn => "Einlagern",
            MovementKind::StockOut => "Auslagern",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_role_roundtrip() {
        assert_eq!(PartnerRole::parse("SUPPLIER"), Some(PartnerRole::Supplier));
        assert_eq!(
            PartnerRole::parse(PartnerRole::Manufacturer.as_str()),
            Some(PartnerRole::Manufacturer)
        );
        assert_eq!(PartnerRole::parse("LIEFERANT"), None);
    }

    #[test]
    fn test_movement_kind_labels() {
        assert_eq!(MovementKind::StockIn.label(), "Einlagern");
        assert_eq!(MovementKind::StockOut.label(), "Auslagern");
    }
}
