// ==========================================
// LAGA Lagerverwaltung - Warnungs-API
// ==========================================
// Zuständigkeit: Warnübersicht, Sammel-Neuversand fehlgeschlagener
// Warnmails und der Startabgleich des Bestandsmonitors.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiResult;
use crate::engine::monitor::StockMonitor;

// ==========================================
// DTOs der Warnmaske
// ==========================================

/// Zeile der Übersicht "Artikel im Warnzustand"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningRow {
    pub article_id: String,
    pub article_name: String,
    pub current_stock: i64,
    pub min_stock: i64,
    /// true: mindestens ein erfolgreicher Mail-Versand liegt vor
    pub notified: bool,
    /// Versanddatum + Wiederbeschaffungszeit; None solange kein
    /// erfolgreicher Versand vorliegt ("unbekannt" in der Maske)
    pub expected_delivery: Option<NaiveDateTime>,
}

/// Ergebniszeile des Sammel-Neuversands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryRow {
    pub article_id: String,
    pub article_name: String,
    pub succeeded: bool,
}

/// Zusammenfassung des Startabgleichs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub evaluated: usize,
    pub warnings_active: usize,
    pub mails_attempted: usize,
    pub mails_sent: usize,
}

// ==========================================
// WarningApi
// ==========================================

pub struct WarningApi {
    monitor: Arc<StockMonitor>,
}

impl WarningApi {
    pub fn new(monitor: Arc<StockMonitor>) -> Self {
        Self { monitor }
    }

    /// Alle Artikel im Warnzustand, mit Live-Bestand und
    /// rechnerischem Lieferdatum.
    pub fn active_warnings(&self) -> ApiResult<Vec<WarningRow>> {
        let rows = self.monitor.active_warnings()?;
        Ok(rows
            .into_iter()
            .map(|r| WarningRow {
                article_id: r.article_id,
                article_name: r.article_name,
                current_stock: r.current_stock,
                min_stock: r.min_stock,
                notified: r.notified,
                expected_delivery: r.expected_delivery,
            })
            .collect())
    }

    /// Sammel-Neuversand: je Artikel mit aktiver Warnung ohne
    /// erfolgreichen Versand genau ein frischer Versuch.
    pub async fn retry_unsent(&self) -> ApiResult<Vec<RetryRow>> {
        let outcomes = self.monitor.retry_failed().await?;

        let sent = outcomes.iter().filter(|o| o.succeeded).count();
        info!(
            versucht = outcomes.len(),
            erfolgreich = sent,
            "Sammel-Neuversand abgeschlossen"
        );

        Ok(outcomes
            .into_iter()
            .map(|o| RetryRow {
                article_id: o.article_id,
                article_name: o.article_name,
                succeeded: o.succeeded,
            })
            .collect())
    }

    /// Startabgleich: jeden Artikel einmal frisch bewerten.
    ///
    /// Idempotent; der Endzustand ist derselbe wie nach fortlaufender
    /// Einzelbewertung.
    pub async fn reconcile(&self) -> ApiResult<ReconcileSummary> {
        let reports = self.monitor.sweep().await?;

        let summary = ReconcileSummary {
            evaluated: reports.len(),
            warnings_active: reports.iter().filter(|r| r.is_warning).count(),
            mails_attempted: reports.iter().filter(|r| r.dispatch_attempted).count(),
            mails_sent: reports.iter().filter(|r| r.dispatch_succeeded).count(),
        };

        info!(
            bewertet = summary.evaluated,
            warnungen = summary.warnings_active,
            "Startabgleich abgeschlossen"
        );
        Ok(summary)
    }
}
