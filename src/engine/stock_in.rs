// ==========================================
// LAGA Lagerverwaltung - Einlagern
// ==========================================
// Ablauf je Einlagerung:
// 1. N frische Barcodes ziehen (kollisionfrei gegen Bestand und Stapel)
// 2. N Einheiten als EINEN atomaren Stapel einfügen
// 3. eine Zeile ins Bewegungsprotokoll
// 4. Etiketten drucken (nachgelagert, hält die Einlagerung nie auf)
// Der Aufrufer stößt danach die Monitorbewertung des Artikels an.
// ==========================================

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::movement::MovementEntry;
use crate::domain::types::MovementKind;
use crate::domain::unit::Unit;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::label::{compose_zpl, LabelFormat, LabelPrinter};
use crate::engine::ledger::{InventoryLedger, MAX_BARCODE_ATTEMPTS};
use crate::engine::movement_log::MovementLogger;
use crate::repository::article_repo::ArticleRepository;
use crate::repository::unit_repo::UnitRepository;

// ==========================================
// StockInReport - Ergebnis einer Einlagerung
// ==========================================
#[derive(Debug, Clone)]
pub struct StockInReport {
    pub article_id: String,
    pub article_name: String,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub barcodes: Vec<String>,
    /// false: Einheiten sind eingelagert, die Etiketten brauchen aber
    /// Handarbeit (Nachdruck über die Ansichtsmaske)
    pub labels_printed: bool,
    /// false: Bewegungszeile konnte nicht geschrieben werden
    pub log_written: bool,
}

// ==========================================
// StockInOperation
// ==========================================

pub struct StockInOperation {
    article_repo: Arc<ArticleRepository>,
    unit_repo: Arc<UnitRepository>,
    ledger: Arc<InventoryLedger>,
    movement_log: Arc<MovementLogger>,
    printer: Arc<dyn LabelPrinter>,
    label_format: LabelFormat,
}

impl StockInOperation {
    pub fn new(
        article_repo: Arc<ArticleRepository>,
        unit_repo: Arc<UnitRepository>,
        ledger: Arc<InventoryLedger>,
        movement_log: Arc<MovementLogger>,
        printer: Arc<dyn LabelPrinter>,
        label_format: LabelFormat,
    ) -> Self {
        Self {
            article_repo,
            unit_repo,
            ledger,
            movement_log,
            printer,
            label_format,
        }
    }

    /// N Einheiten eines Artikels einlagern.
    ///
    /// Das Einfügen ist atomar: entweder stehen alle N Einheiten im
    /// Bestand oder keine. Protokoll- und Druckfehler danach werden im
    /// Bericht gemeldet, lassen die Einlagerung aber bestehen.
    pub async fn execute(&self, article_id: &str, quantity: i64) -> EngineResult<StockInReport> {
        if quantity <= 0 {
            return Err(EngineError::Validation(
                "Einlagerungsmenge muss größer als 0 sein".to_string(),
            ));
        }

        let article = self
            .article_repo
            .find_by_id(article_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Artikel".to_string(),
                id: article_id.to_string(),
            })?;

        let stock_before = self.unit_repo.count_by_article(article_id)?;

        // Barcodes ziehen: der Generator prüft gegen den Bestand, der
        // Stapel selbst wird zusätzlich gegen Doppelziehungen geprüft.
        let barcodes = self.draw_batch_barcodes(quantity as usize)?;

        let now = Utc::now().naive_utc();
        let units: Vec<Unit> = barcodes
            .iter()
            .map(|barcode| Unit {
                unit_id: Uuid::new_v4().to_string(),
                article_id: article.article_id.clone(),
                barcode: barcode.clone(),
                created_at: now,
            })
            .collect();

        self.unit_repo.insert_batch(&units)?;
        let stock_after = stock_before + quantity;

        info!(
            artikel = %article.name,
            menge = quantity,
            bestand_vorher = stock_before,
            bestand_nachher = stock_after,
            "Einlagerung verbucht"
        );

        // Ab hier ist die Mutation festgeschrieben; Folgefehler werden
        // nur noch gemeldet.
        let entry = MovementEntry {
            article_name: article.name.clone(),
            kind: MovementKind::StockIn,
            timestamp: now,
            quantity,
            stock_before,
            stock_after,
            barcodes: barcodes.clone(),
        };
        let log_written = match self.movement_log.append(&entry) {
            Ok(()) => true,
            Err(e) => {
                warn!(artikel = %article.name, fehler = %e, "Bewegungszeile nicht geschrieben");
                false
            }
        };

        let mut labels_printed = true;
        for barcode in &barcodes {
            let zpl = compose_zpl(self.label_format, &article.name, barcode);
            if let Err(e) = self.printer.print(&zpl).await {
                warn!(artikel = %article.name, barcode = %barcode, fehler = %e, "Etikett nicht gedruckt");
                labels_printed = false;
            }
        }

        Ok(StockInReport {
            article_id: article.article_id,
            article_name: article.name,
            quantity,
            stock_before,
            stock_after,
            barcodes,
            labels_printed,
            log_written,
        })
    }

    /// Paarweise verschiedene Barcodes für einen Einlagerungsstapel
    /// ziehen. Doppelziehungen innerhalb des Stapels zählen wie
    /// Bestandskollisionen gegen das Ziehbudget.
    fn draw_batch_barcodes(&self, quantity: usize) -> EngineResult<Vec<String>> {
        let mut seen: HashSet<String> = HashSet::with_capacity(quantity);
        let mut barcodes = Vec::with_capacity(quantity);
        let mut budget = quantity as u32 + MAX_BARCODE_ATTEMPTS;

        while barcodes.len() < quantity {
            if budget == 0 {
                return Err(EngineError::BarcodeSpaceExhausted {
                    attempts: quantity as u32 + MAX_BARCODE_ATTEMPTS,
                });
            }
            budget -= 1;

            let candidate = self.ledger.generate_unique_barcode()?;
            if seen.insert(candidate.clone()) {
                barcodes.push(candidate);
            }
        }

        Ok(barcodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::label::LabelFormat;
    use async_trait::async_trait;
    use rusqlite::Connection;
    use std::sync::Mutex;

    struct RecordingPrinter {
        jobs: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl LabelPrinter for RecordingPrinter {
        async fn print(&self, zpl: &str) -> EngineResult<()> {
            if self.fail {
                return Err(EngineError::Label("Drucker aus".to_string()));
            }
            self.jobs.lock().unwrap().push(zpl.to_string());
            Ok(())
        }
    }

    fn setup(fail_printer: bool) -> (StockInOperation, Arc<UnitRepository>, tempfile::TempDir) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO business_partner VALUES ('s1','SUPPLIER','S','https://s.de','s@s.de','1');
            INSERT INTO business_partner VALUES ('m1','MANUFACTURER','M','https://m.de','m@m.de','2');
            INSERT INTO cost_center VALUES ('k1','Instandhaltung');
            INSERT INTO storage_location VALUES ('l1','Regal A1');
            INSERT INTO article VALUES ('a1','Schraube M6','s1','m1','k1','l1',3,'SINGLE',10,50,NULL,NULL,0,'2026-01-01 08:00:00');
            "#,
        )
        .unwrap();

        let conn = Arc::new(Mutex::new(conn));
        let article_repo = Arc::new(ArticleRepository::new(conn.clone()));
        let unit_repo = Arc::new(UnitRepository::new(conn));
        let ledger = Arc::new(InventoryLedger::new(article_repo.clone(), unit_repo.clone()));

        let dir = tempfile::tempdir().unwrap();
        let movement_log = Arc::new(MovementLogger::new(dir.path().join("bewegungen.log")));
        let printer = Arc::new(RecordingPrinter {
            jobs: Mutex::new(Vec::new()),
            fail: fail_printer,
        });

        (
            StockInOperation::new(
                article_repo,
                unit_repo.clone(),
                ledger,
                movement_log,
                printer,
                LabelFormat::Wide57x24,
            ),
            unit_repo,
            dir,
        )
    }

    #[tokio::test]
    async fn test_stock_in_creates_distinct_units_and_logs() {
        let (op, unit_repo, dir) = setup(false);

        let report = op.execute("a1", 5).await.unwrap();

        assert_eq!(report.stock_before, 0);
        assert_eq!(report.stock_after, 5);
        assert_eq!(report.barcodes.len(), 5);
        assert!(report.labels_printed);
        assert!(report.log_written);

        // Paarweise verschieden
        let distinct: HashSet<_> = report.barcodes.iter().collect();
        assert_eq!(distinct.len(), 5);

        assert_eq!(unit_repo.count_by_article("a1").unwrap(), 5);

        let log = std::fs::read_to_string(dir.path().join("bewegungen.log")).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("Aktion: Einlagern"));
        assert!(log.contains("Menge: 5"));
        assert!(log.contains("Bestand vorher: 0"));
        assert!(log.contains("Bestand nachher: 5"));
    }

    #[tokio::test]
    async fn test_stock_in_survives_printer_failure() {
        let (op, unit_repo, _dir) = setup(true);

        let report = op.execute("a1", 2).await.unwrap();

        // Druckfehler lässt die Einlagerung bestehen
        assert!(!report.labels_printed);
        assert_eq!(unit_repo.count_by_article("a1").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stock_in_rejects_non_positive_quantity() {
        let (op, _, _dir) = setup(false);

        assert!(matches!(
            op.execute("a1", 0).await,
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            op.execute("a1", -3).await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_stock_in_unknown_article() {
        let (op, _, _dir) = setup(false);

        assert!(matches!(
            op.execute("fehlt", 1).await,
            Err(EngineError::NotFound { .. })
        ));
    }
}
