// ==========================================
// LAGA Lagerverwaltung - Auslagern
// ==========================================
// Zwei Erfassungswege, ein Verbuchungsweg:
// - Scan-Modus: Einheiten einzeln per Barcode in eine Sitzung legen
//   (unbekannter Barcode und Doppelscan werden abgewiesen)
// - manuelle Auswahl: konkrete Einheiten EINES Artikels aus der
//   vollen Liste (dort wird bewusst nichts vorselektiert)
// Beim Bestätigen werden alle Einheiten in einem atomaren Stapel
// gelöscht; je betroffenem Artikel entsteht eine Protokollzeile, und
// die betroffenen Artikel-Ids gehen an den Aufrufer zurück, damit der
// Bestandsmonitor jeden davon neu bewertet.
// ==========================================

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::movement::MovementEntry;
use crate::domain::types::MovementKind;
use crate::domain::unit::Unit;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::movement_log::MovementLogger;
use crate::repository::article_repo::ArticleRepository;
use crate::repository::unit_repo::UnitRepository;

// ==========================================
// ScanSession - Erfassungssitzung des Scan-Modus
// ==========================================
// Hält die gescannten Einheiten bis zur Bestätigung. Eine Sitzung
// kann Einheiten MEHRERER Artikel enthalten.
#[derive(Debug, Default)]
pub struct ScanSession {
    queued: Vec<Unit>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self { queued: Vec::new() }
    }

    pub fn queued(&self) -> &[Unit] {
        &self.queued
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    fn contains_barcode(&self, barcode: &str) -> bool {
        self.queued.iter().any(|u| u.barcode == barcode)
    }
}

// ==========================================
// ScanInputGuard - Entprellung der Scannereingabe
// ==========================================
// Ein Handscanner feuert schneller, als die Kette
// Suche -> Sitzung -> Anzeige abgearbeitet ist. Solange eine Kette
// läuft, werden neue Scans verworfen statt doppelt verarbeitet.
#[derive(Debug, Default)]
pub struct ScanInputGuard {
    in_flight: AtomicBool,
}

impl ScanInputGuard {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
        }
    }

    /// Verarbeitung beginnen.
    ///
    /// # Rückgabe
    /// - Some(permit): frei, Kette darf laufen; Freigabe beim Drop
    /// - None: eine frühere Kette ist noch unterwegs, Scan verwerfen
    pub fn try_begin(&self) -> Option<ScanPermit<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            Some(ScanPermit { guard: self })
        } else {
            None
        }
    }
}

pub struct ScanPermit<'a> {
    guard: &'a ScanInputGuard,
}

impl Drop for ScanPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::Release);
    }
}

// ==========================================
// StockOutReport - Ergebnis je betroffenem Artikel
// ==========================================
#[derive(Debug, Clone)]
pub struct StockOutReport {
    pub article_id: String,
    pub article_name: String,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub barcodes: Vec<String>,
    /// false: Bewegungszeile konnte nicht geschrieben werden
    pub log_written: bool,
}

// ==========================================
// StockOutOperation
// ==========================================

pub struct StockOutOperation {
    article_repo: Arc<ArticleRepository>,
    unit_repo: Arc<UnitRepository>,
    movement_log: Arc<MovementLogger>,
}

impl StockOutOperation {
    pub fn new(
        article_repo: Arc<ArticleRepository>,
        unit_repo: Arc<UnitRepository>,
        movement_log: Arc<MovementLogger>,
    ) -> Self {
        Self {
            article_repo,
            unit_repo,
            movement_log,
        }
    }

    /// Einen Barcode in die Sitzung aufnehmen (Scan-Modus).
    ///
    /// Unbekannter Barcode und Doppelscan innerhalb derselben Sitzung
    /// werden ohne Zustandsänderung abgewiesen.
    pub fn scan(&self, session: &mut ScanSession, barcode: &str) -> EngineResult<Unit> {
        let barcode = barcode.trim();

        if session.contains_barcode(barcode) {
            return Err(EngineError::Validation(format!(
                "Barcode '{}' ist in dieser Sitzung bereits erfasst",
                barcode
            )));
        }

        let unit = self
            .unit_repo
            .find_by_barcode(barcode)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Barcode".to_string(),
                id: barcode.to_string(),
            })?;

        session.queued.push(unit.clone());
        Ok(unit)
    }

    /// Sitzung bestätigen: alle erfassten Einheiten ausbuchen.
    ///
    /// Eine Sitzung kann Einheiten mehrerer Artikel enthalten; der
    /// Bericht trägt je Artikel eine Zeile, in Scan-Reihenfolge.
    pub fn commit_scan(&self, session: ScanSession) -> EngineResult<Vec<StockOutReport>> {
        self.remove_units(session.queued)
    }

    /// Manuelle Auswahl bestätigen: konkrete Einheiten eines Artikels.
    ///
    /// Jede angegebene Einheit muss existieren und dem genannten
    /// Artikel gehören; andernfalls wird nichts entfernt.
    pub fn remove_selected(
        &self,
        article_id: &str,
        unit_ids: &[String],
    ) -> EngineResult<Vec<StockOutReport>> {
        let mut units = Vec::with_capacity(unit_ids.len());
        for unit_id in unit_ids {
            let unit = self
                .unit_repo
                .find_by_id(unit_id)?
                .ok_or_else(|| EngineError::NotFound {
                    entity: "Einheit".to_string(),
                    id: unit_id.clone(),
                })?;
            if unit.article_id != article_id {
                return Err(EngineError::Validation(format!(
                    "Einheit {} gehört nicht zum gewählten Artikel",
                    unit.barcode
                )));
            }
            units.push(unit);
        }

        self.remove_units(units)
    }

    /// Gemeinsamer Verbuchungsweg beider Modi.
    fn remove_units(&self, units: Vec<Unit>) -> EngineResult<Vec<StockOutReport>> {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        // Je Artikel gruppieren, Reihenfolge des ersten Auftretens
        let mut groups: Vec<(String, Vec<Unit>)> = Vec::new();
        for unit in units {
            match groups.iter_mut().find(|(id, _)| *id == unit.article_id) {
                Some((_, list)) => list.push(unit),
                None => groups.push((unit.article_id.clone(), vec![unit])),
            }
        }

        // Bestand vorher je Artikel festhalten, bevor gelöscht wird
        let mut prepared = Vec::with_capacity(groups.len());
        for (article_id, list) in groups {
            let article = self
                .article_repo
                .find_by_id(&article_id)?
                .ok_or_else(|| EngineError::NotFound {
                    entity: "Artikel".to_string(),
                    id: article_id.clone(),
                })?;
            let stock_before = self.unit_repo.count_by_article(&article_id)?;
            prepared.push((article, stock_before, list));
        }

        // EIN atomarer Stapel über alle Artikel hinweg. Trifft eine
        // Einheit nicht mehr (paralleles Auslagern), bricht alles ab.
        let all_ids: Vec<String> = prepared
            .iter()
            .flat_map(|(_, _, list)| list.iter().map(|u| u.unit_id.clone()))
            .collect();
        self.unit_repo.delete_batch(&all_ids)?;

        let now = Utc::now().naive_utc();
        let mut reports = Vec::with_capacity(prepared.len());

        for (article, stock_before, list) in prepared {
            let quantity = list.len() as i64;
            let stock_after = stock_before - quantity;
            let barcodes: Vec<String> = list.into_iter().map(|u| u.barcode).collect();

            info!(
                artikel = %article.name,
                menge = quantity,
                bestand_vorher = stock_before,
                bestand_nachher = stock_after,
                "Auslagerung verbucht"
            );

            let entry = MovementEntry {
                article_name: article.name.clone(),
                kind: MovementKind::StockOut,
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

            reports.push(StockOutReport {
                article_id: article.article_id,
                article_name: article.name,
                quantity,
                stock_before,
                stock_after,
                barcodes,
                log_written,
            });
        }

        Ok(reports)
    }
}
