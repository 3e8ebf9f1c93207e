// ==========================================
// LAGA Lagerverwaltung - Bewegungseintrag
// ==========================================
// Jede Bestandsmutation erzeugt genau einen Eintrag je
// betroffenem Artikel. Das Zeilenformat ist fest und wird von
// nachgelagerter Auswertung zeilenweise geparst - nicht ändern.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::MovementKind;

// ==========================================
// MovementEntry - eine Zeile der Bewegungsdatei
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementEntry {
    pub article_name: String,
    pub kind: MovementKind,
    pub timestamp: NaiveDateTime,
    pub quantity: i64,       // bewegte Menge
    pub stock_before: i64,   // Bestand vor der Mutation
    pub stock_after: i64,    // Bestand nach der Mutation
    pub barcodes: Vec<String>, // betroffene Barcodes
}

impl MovementEntry {
    /// Rendert die Protokollzeile im festen Pipe-Format:
    /// `Artikel: <name> | Aktion: <Einlagern|Auslagern> | Datum: <dd.MM.yyyy HH:mm:ss>
    ///  | Menge: <n> | Bestand vorher: <n> | Bestand nachher: <n> | Barcodes: [<csv>]`
    pub fn format_line(&self) -> String {
        format!(
            "Artikel: {} | Aktion: {} | Datum: {} | Menge: {} | Bestand vorher: {} | Bestand nachher: {} | Barcodes: [{}]",
            self.article_name,
            self.kind.label(),
            self.timestamp.format("%d.%m.%Y %H:%M:%S"),
            self.quantity,
            self.stock_before,
            self.stock_after,
            self.barcodes.join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_line_stock_in() {
        let entry = MovementEntry {
            article_name: "Schraube M6".to_string(),
            kind: MovementKind::StockIn,
            timestamp: NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 5, 30)
                .unwrap(),
            quantity: 2,
            stock_before: 10,
            stock_after: 12,
            barcodes: vec!["1234567890".to_string(), "2345678901".to_string()],
        };

        assert_eq!(
            entry.format_line(),
            "Artikel: Schraube M6 | Aktion: Einlagern | Datum: 14.03.2026 09:05:30 | Menge: 2 | Bestand vorher: 10 | Bestand nachher: 12 | Barcodes: [1234567890,2345678901]"
        );
    }

    #[test]
    fn test_format_line_empty_barcode_list() {
        let entry = MovementEntry {
            article_name: "Mutter M8".to_string(),
            kind: MovementKind::StockOut,
            timestamp: NaiveDate::from_ymd_opt(2026, 1, 2)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
            quantity: 0,
            stock_before: 5,
            stock_after: 5,
            barcodes: vec![],
        };

        assert!(entry.format_line().ends_with("Barcodes: []"));
        assert!(entry.format_line().contains("Aktion: Auslagern"));
    }
}
