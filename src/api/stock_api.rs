// ==========================================
// LAGA Lagerverwaltung - Bestands-API
// ==========================================
// Zuständigkeit: Ein-/Auslagermasken und die Einheitenansicht.
// Je Mutation läuft die feste Kette
//   Verbuchung -> Bewegungszeile -> Monitorbewertung (-> Warnmail)
// in dieser Reihenfolge; die Glieder nach der Verbuchung werden
// gemeldet, rollen die Verbuchung aber nie zurück.
//
// Scan-Eingaben entprellt ein Belegt-Kennzeichen: solange eine
// Scan-Kette läuft, werden weitere Scans verworfen (Schutz gegen
// Doppelverarbeitung schnell feuernder Handscanner).
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::unit::Unit;
use crate::engine::label::{compose_zpl, LabelFormat, LabelPrinter};
use crate::engine::monitor::{MonitorReport, StockMonitor};
use crate::engine::stock_in::StockInOperation;
use crate::engine::stock_out::{ScanInputGuard, ScanSession, StockOutOperation, StockOutReport};
use crate::repository::article_repo::ArticleRepository;
use crate::repository::unit_repo::UnitRepository;

// ==========================================
// DTOs der Bestandsmasken
// ==========================================

/// Ergebnis einer Einlagerung samt anschließender Monitorbewertung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInOutcome {
    pub article_id: String,
    pub article_name: String,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub barcodes: Vec<String>,
    /// false: Einheiten sind verbucht, Etiketten über die
    /// Ansichtsmaske nachdrucken
    pub labels_printed: bool,
    pub log_written: bool,
    pub warning_active: bool,
}

/// Ergebnis einer Auslagerung je betroffenem Artikel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockOutOutcome {
    pub article_id: String,
    pub article_name: String,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub barcodes: Vec<String>,
    pub log_written: bool,
    pub warning_active: bool,
    pub warning_mail_attempted: bool,
    pub warning_mail_sent: bool,
}

/// Eine erfasste Einheit in der Scan-Sitzung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedUnit {
    pub unit_id: String,
    pub article_id: String,
    pub article_name: String,
    pub barcode: String,
}

// ==========================================
// StockApi
// ==========================================

pub struct StockApi {
    stock_in_op: Arc<StockInOperation>,
    stock_out_op: Arc<StockOutOperation>,
    monitor: Arc<StockMonitor>,
    article_repo: Arc<ArticleRepository>,
    unit_repo: Arc<UnitRepository>,
    printer: Arc<dyn LabelPrinter>,
    label_format: LabelFormat,
    scan_guard: ScanInputGuard,
    scan_session: Mutex<Option<ScanSession>>,
}

impl StockApi {
    pub fn new(
        stock_in_op: Arc<StockInOperation>,
        stock_out_op: Arc<StockOutOperation>,
        monitor: Arc<StockMonitor>,
        article_repo: Arc<ArticleRepository>,
        unit_repo: Arc<UnitRepository>,
        printer: Arc<dyn LabelPrinter>,
        label_format: LabelFormat,
    ) -> Self {
        Self {
            stock_in_op,
            stock_out_op,
            monitor,
            article_repo,
            unit_repo,
            printer,
            label_format,
            scan_guard: ScanInputGuard::new(),
            scan_session: Mutex::new(None),
        }
    }

    fn session_lock(&self) -> ApiResult<std::sync::MutexGuard<'_, Option<ScanSession>>> {
        self.scan_session
            .lock()
            .map_err(|e| ApiError::Unexpected(format!("Scan-Sitzung nicht zugreifbar: {}", e)))
    }

    // ==========================================
    // Einlagern
    // ==========================================

    /// N Einheiten einlagern und den Warnzustand des Artikels neu
    /// bewerten (Einlagern kann praktisch nur eine Warnung auflösen).
    pub async fn stock_in(&self, article_id: &str, quantity: i64) -> ApiResult<StockInOutcome> {
        let report = self.stock_in_op.execute(article_id, quantity).await?;
        let monitor = self.monitor.reevaluate(article_id).await?;

        Ok(StockInOutcome {
            article_id: report.article_id,
            article_name: report.article_name,
            quantity: report.quantity,
            stock_before: report.stock_before,
            stock_after: report.stock_after,
            barcodes: report.barcodes,
            labels_printed: report.labels_printed,
            log_written: report.log_written,
            warning_active: monitor.is_warning,
        })
    }

    // ==========================================
    // Auslagern per Scan
    // ==========================================

    /// Neue Scan-Sitzung beginnen (eine evtl. offene wird verworfen)
    pub fn start_scan_session(&self) -> ApiResult<()> {
        let mut slot = self.session_lock()?;
        *slot = Some(ScanSession::new());
        debug!("Scan-Sitzung begonnen");
        Ok(())
    }

    /// Einen Barcode verarbeiten.
    ///
    /// # Rückgabe
    /// - Ok(Some(unit)): erfasst
    /// - Ok(None): verworfen, weil die vorige Scan-Kette noch läuft
    /// - Err(...): unbekannter Barcode, Doppelscan oder keine Sitzung
    pub fn scan_barcode(&self, barcode: &str) -> ApiResult<Option<ScannedUnit>> {
        let _permit = match self.scan_guard.try_begin() {
            Some(permit) => permit,
            None => {
                debug!(barcode = %barcode, "Scan verworfen, Kette noch in Arbeit");
                return Ok(None);
            }
        };

        let mut slot = self.session_lock()?;
        let session = slot
            .as_mut()
            .ok_or_else(|| ApiError::Validation("Keine Scan-Sitzung aktiv".to_string()))?;

        let unit = self.stock_out_op.scan(session, barcode)?;
        let scanned = self.describe_unit(&unit)?;
        Ok(Some(scanned))
    }

    /// Inhalt der laufenden Sitzung (für die Maskenliste)
    pub fn scanned_units(&self) -> ApiResult<Vec<ScannedUnit>> {
        let slot = self.session_lock()?;
        let session = slot
            .as_ref()
            .ok_or_else(|| ApiError::Validation("Keine Scan-Sitzung aktiv".to_string()))?;

        session
            .queued()
            .iter()
            .map(|unit| self.describe_unit(unit))
            .collect()
    }

    /// Sitzung verwerfen; Rückgabe: Anzahl verworfener Einheiten
    pub fn cancel_scan_session(&self) -> ApiResult<usize> {
        let mut slot = self.session_lock()?;
        let dropped = slot.take().map(|s| s.len()).unwrap_or(0);
        debug!(verworfen = dropped, "Scan-Sitzung abgebrochen");
        Ok(dropped)
    }

    /// Sitzung bestätigen: Einheiten ausbuchen, je betroffenem Artikel
    /// protokollieren und den Warnzustand neu bewerten.
    pub async fn commit_scan_session(&self) -> ApiResult<Vec<StockOutOutcome>> {
        let _permit = self.scan_guard.try_begin().ok_or_else(|| {
            ApiError::Validation(
                "Eine Scan-Verarbeitung läuft noch, bitte erneut bestätigen".to_string(),
            )
        })?;

        let session = {
            let mut slot = self.session_lock()?;
            slot.take()
                .ok_or_else(|| ApiError::Validation("Keine Scan-Sitzung aktiv".to_string()))?
        };

        let reports = self.stock_out_op.commit_scan(session)?;
        self.finish_stock_out(reports).await
    }

    // ==========================================
    // Auslagern per manueller Auswahl
    // ==========================================

    /// Konkret ausgewählte Einheiten eines Artikels ausbuchen
    pub async fn stock_out_selected(
        &self,
        article_id: &str,
        unit_ids: &[String],
    ) -> ApiResult<Vec<StockOutOutcome>> {
        let reports = self.stock_out_op.remove_selected(article_id, unit_ids)?;
        self.finish_stock_out(reports).await
    }

    /// Gemeinsamer Abschluss beider Auslagerwege: Monitorbewertung je
    /// betroffenem Artikel, Ergebniszeilen für die Maske.
    async fn finish_stock_out(
        &self,
        reports: Vec<StockOutReport>,
    ) -> ApiResult<Vec<StockOutOutcome>> {
        let mut outcomes = Vec::with_capacity(reports.len());

        for report in reports {
            let monitor: MonitorReport = self.monitor.reevaluate(&report.article_id).await?;

            info!(
                artikel = %report.article_name,
                bestand = report.stock_after,
                warnung = monitor.is_warning,
                "Auslagerung abgeschlossen"
            );

            outcomes.push(StockOutOutcome {
                article_id: report.article_id,
                article_name: report.article_name,
                quantity: report.quantity,
                stock_before: report.stock_before,
                stock_after: report.stock_after,
                barcodes: report.barcodes,
                log_written: report.log_written,
                warning_active: monitor.is_warning,
                warning_mail_attempted: monitor.dispatch_attempted,
                warning_mail_sent: monitor.dispatch_succeeded,
            });
        }

        Ok(outcomes)
    }

    // ==========================================
    // Einheiten-Abfragen der beiden Masken
    // ==========================================

    /// Volle Einheitenliste eines Artikels für das manuelle Auslagern.
    /// Die Maske selektiert hier bewusst NICHTS vor.
    pub fn units_for_article(&self, article_id: &str) -> ApiResult<Vec<Unit>> {
        Ok(self.unit_repo.list_by_article(article_id)?)
    }

    /// Jüngster Einlagerungsstapel eines Artikels. Die Ansichts- und
    /// Nachdruckmaske selektiert genau diesen Stapel vor.
    pub fn newest_batch(&self, article_id: &str) -> ApiResult<Vec<Unit>> {
        Ok(self.unit_repo.newest_batch(article_id)?)
    }

    /// Etiketten für bestehende Einheiten nachdrucken
    pub async fn reprint_labels(&self, unit_ids: &[String]) -> ApiResult<usize> {
        let mut printed = 0;
        let mut failed = 0;

        for unit_id in unit_ids {
            let unit = self
                .unit_repo
                .find_by_id(unit_id)?
                .ok_or_else(|| ApiError::NotFound(format!("Einheit (id={})", unit_id)))?;
            let scanned = self.describe_unit(&unit)?;

            let zpl = compose_zpl(self.label_format, &scanned.article_name, &unit.barcode);
            match self.printer.print(&zpl).await {
                Ok(()) => printed += 1,
                Err(_) => failed += 1,
            }
        }

        if failed > 0 {
            return Err(ApiError::ExternalService(format!(
                "{} von {} Etiketten nicht gedruckt",
                failed,
                unit_ids.len()
            )));
        }
        Ok(printed)
    }

    fn describe_unit(&self, unit: &Unit) -> ApiResult<ScannedUnit> {
        let article = self
            .article_repo
            .find_by_id(&unit.article_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Artikel (id={})", unit.article_id)))?;

        Ok(ScannedUnit {
            unit_id: unit.unit_id.clone(),
            article_id: unit.article_id.clone(),
            article_name: article.name,
            barcode: unit.barcode.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::{MailTransport, NotificationDispatcher};
    use crate::engine::error::EngineResult;
    use crate::engine::ledger::InventoryLedger;
    use crate::engine::movement_log::MovementLogger;
    use crate::repository::master_data_repo::CostCenterRepository;
    use crate::repository::partner_repo::PartnerRepository;
    use crate::repository::recipient_repo::RecipientRepository;
    use async_trait::async_trait;
    use rusqlite::Connection;

    struct SilentTransport;

    #[async_trait]
    impl MailTransport for SilentTransport {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> EngineResult<()> {
            Ok(())
        }
    }

    struct SilentPrinter;

    #[async_trait]
    impl LabelPrinter for SilentPrinter {
        async fn print(&self, _zpl: &str) -> EngineResult<()> {
            Ok(())
        }
    }

    fn setup() -> (StockApi, tempfile::TempDir) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO business_partner VALUES ('s1','SUPPLIER','S','https://s.de','s@s.de','1');
            INSERT INTO business_partner VALUES ('m1','MANUFACTURER','M','https://m.de','m@m.de','2');
            INSERT INTO cost_center VALUES ('k1','Instandhaltung');
            INSERT INTO storage_location VALUES ('l1','Regal A1');
            INSERT INTO article VALUES ('a1','Schraube M6','s1','m1','k1','l1',3,'SINGLE',2,10,NULL,NULL,0,'2026-01-01 08:00:00');
            INSERT INTO recipient VALUES ('r1','lager@example.de');
            "#,
        )
        .unwrap();

        let conn = Arc::new(Mutex::new(conn));
        let article_repo = Arc::new(ArticleRepository::new(conn.clone()));
        let unit_repo = Arc::new(UnitRepository::new(conn.clone()));
        let ledger = Arc::new(InventoryLedger::new(article_repo.clone(), unit_repo.clone()));

        let dir = tempfile::tempdir().unwrap();
        let movement_log = Arc::new(MovementLogger::new(dir.path().join("bewegungen.log")));
        let printer: Arc<dyn LabelPrinter> = Arc::new(SilentPrinter);

        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::new(RecipientRepository::new(conn.clone())),
            Arc::new(PartnerRepository::new(conn.clone())),
            Arc::new(CostCenterRepository::new(conn)),
            Arc::new(SilentTransport),
        ));
        let monitor = Arc::new(StockMonitor::new(
            article_repo.clone(),
            ledger.clone(),
            dispatcher,
        ));

        let stock_in_op = Arc::new(StockInOperation::new(
            article_repo.clone(),
            unit_repo.clone(),
            ledger.clone(),
            movement_log.clone(),
            printer.clone(),
            LabelFormat::Wide57x24,
        ));
        let stock_out_op = Arc::new(StockOutOperation::new(
            article_repo.clone(),
            unit_repo.clone(),
            movement_log,
        ));

        (
            StockApi::new(
                stock_in_op,
                stock_out_op,
                monitor,
                article_repo,
                unit_repo,
                printer,
                LabelFormat::Wide57x24,
            ),
            dir,
        )
    }

    #[tokio::test]
    async fn test_stock_in_then_scan_out_full_chain() {
        let (api, _dir) = setup();

        let inbound = api.stock_in("a1", 3).await.unwrap();
        assert_eq!(inbound.stock_after, 3);
        assert!(!inbound.warning_active);

        api.start_scan_session().unwrap();
        let scanned = api
            .scan_barcode(&inbound.barcodes[0])
            .unwrap()
            .expect("Kette frei");
        assert_eq!(scanned.article_name, "Schraube M6");

        // Doppelscan derselben Sitzung wird abgewiesen
        assert!(api.scan_barcode(&inbound.barcodes[0]).is_err());
        assert_eq!(api.scanned_units().unwrap().len(), 1);

        let outcomes = api.commit_scan_session().await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].stock_after, 2);
        // Mindestbestand 2 erreicht: Warnung samt Mail-Versuch
        assert!(outcomes[0].warning_active);
        assert!(outcomes[0].warning_mail_attempted);
        assert!(outcomes[0].warning_mail_sent);
    }

    #[tokio::test]
    async fn test_scan_without_session_is_an_error() {
        let (api, _dir) = setup();
        assert!(matches!(
            api.scan_barcode("1234567890"),
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_manual_selection_has_no_preselection_semantics() {
        let (api, _dir) = setup();

        let inbound = api.stock_in("a1", 4).await.unwrap();
        let all = api.units_for_article("a1").unwrap();
        assert_eq!(all.len(), 4);

        // Zweiter Stapel: Ansichtsmaske bekommt nur den jüngsten
        let second = api.stock_in("a1", 2).await.unwrap();
        let newest = api.newest_batch("a1").unwrap();
        if newest.len() != 2 {
            // Beide Stapel im selben Sekundenraster: dann umfasst der
            // jüngste Stapel alle sechs
            assert_eq!(newest.len(), 6);
        }

        let picked: Vec<String> = all.iter().take(2).map(|u| u.unit_id.clone()).collect();
        let outcomes = api.stock_out_selected("a1", &picked).await.unwrap();
        assert_eq!(outcomes[0].quantity, 2);
        assert_eq!(
            api.units_for_article("a1").unwrap().len(),
            (inbound.quantity + second.quantity - 2) as usize
        );
    }

    #[tokio::test]
    async fn test_reprint_labels_for_newest_batch() {
        let (api, _dir) = setup();

        api.stock_in("a1", 2).await.unwrap();
        let newest = api.newest_batch("a1").unwrap();
        let ids: Vec<String> = newest.iter().map(|u| u.unit_id.clone()).collect();

        assert_eq!(api.reprint_labels(&ids).await.unwrap(), 2);
    }
}
