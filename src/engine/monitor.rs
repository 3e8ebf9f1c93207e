// ==========================================
// LAGA Lagerverwaltung - Bestandsmonitor
// ==========================================
// Zustandsautomat je Artikel: Normal <-> Warnung, getragen von
// is_warning_active plus den beiden Zeitstempeln.
//
// Der Übergang selbst ist eine reine Funktion (Zustand + Bestand +
// Zeitpunkt -> neue Felder + Seiteneffektliste); das Anwenden der
// Seiteneffekte (Mail, Persistenz) macht der Monitor-Dienst.
// Kernregel: im Warnzustand löst ein weiterer Bestandsrückgang KEINE
// neue Mail aus.
// ==========================================

use chrono::{Duration, NaiveDateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::article::Article;
use crate::engine::dispatch::NotificationDispatcher;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger::InventoryLedger;
use crate::repository::article_repo::ArticleRepository;

// ==========================================
// Reiner Übergang
// ==========================================

/// Warnungsfelder eines Artikels, wie sie nach einem Übergang
/// zu persistieren sind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningFields {
    pub warning_created_at: Option<NaiveDateTime>,
    pub last_warning_sent_at: Option<NaiveDateTime>,
    pub is_warning_active: bool,
}

impl WarningFields {
    pub fn of(article: &Article) -> Self {
        Self {
            warning_created_at: article.warning_created_at,
            last_warning_sent_at: article.last_warning_sent_at,
            is_warning_active: article.is_warning_active,
        }
    }
}

/// Seiteneffekt, den der Dienst nach dem Übergang auszuführen hat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEffect {
    /// Genau ein Warnmail-Versuch (nur beim Eintritt in den Warnzustand)
    SendWarning,
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub fields: WarningFields,
    pub effects: Vec<MonitorEffect>,
    /// Muss persistiert werden?
    pub changed: bool,
}

/// Übergangsfunktion des Zustandsautomaten.
///
/// # Parameter
/// - article: aktueller Zustand (Warnungsfelder + Mindestbestand)
/// - stock: Live-Bestand
/// - now: Zeitpunkt des Übergangs (explizit, damit testbar)
pub fn evaluate_transition(article: &Article, stock: i64, now: NaiveDateTime) -> TransitionOutcome {
    let mut fields = WarningFields::of(article);
    let below = article.is_below_minimum(stock);

    match (below, article.is_warning_active) {
        // Normal -> Warnung: Zeitstempel setzen, genau ein Mail-Versuch.
        // last_warning_sent_at wird hier NICHT angefasst; das macht der
        // Dienst nur bei erfolgreichem Versand.
        (true, false) => {
            fields.warning_created_at = Some(now);
            fields.is_warning_active = true;
            TransitionOutcome {
                fields,
                effects: vec![MonitorEffect::SendWarning],
                changed: true,
            }
        }
        // Warnung -> Warnung: Drosselung, keine weitere Mail
        (true, true) => TransitionOutcome {
            fields,
            effects: vec![],
            changed: false,
        },
        // Warnung -> Normal: Flagge löschen, Zeitstempel bleiben Historie
        (false, true) => {
            fields.is_warning_active = false;
            TransitionOutcome {
                fields,
                effects: vec![],
                changed: true,
            }
        }
        // Normal -> Normal
        (false, false) => TransitionOutcome {
            fields,
            effects: vec![],
            changed: false,
        },
    }
}

// ==========================================
// Berichte
// ==========================================

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub article_id: String,
    pub article_name: String,
    pub stock: i64,
    pub min_stock: i64,
    pub was_warning: bool,
    pub is_warning: bool,
    pub dispatch_attempted: bool,
    pub dispatch_succeeded: bool,
}

/// Zeile der Abfrage "alle Artikel im Warnzustand"
#[derive(Debug, Clone)]
pub struct WarningOverview {
    pub article_id: String,
    pub article_name: String,
    pub current_stock: i64,
    pub min_stock: i64,
    /// Gab es bereits einen erfolgreichen Versand?
    pub notified: bool,
    /// last_warning_sent_at + Wiederbeschaffungszeit;
    /// None solange kein erfolgreicher Versand vorliegt
    pub expected_delivery: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub article_id: String,
    pub article_name: String,
    pub succeeded: bool,
}

// ==========================================
// StockMonitor - Dienst
// ==========================================

pub struct StockMonitor {
    article_repo: Arc<ArticleRepository>,
    ledger: Arc<InventoryLedger>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl StockMonitor {
    pub fn new(
        article_repo: Arc<ArticleRepository>,
        ledger: Arc<InventoryLedger>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            article_repo,
            ledger,
            dispatcher,
        }
    }

    /// Warnzustand eines Artikels neu bewerten.
    ///
    /// Nach jeder Bestandsmutation für jeden betroffenen Artikel
    /// aufzurufen. Ein fehlgeschlagener Mail-Versand hält den
    /// Zustandsübergang NICHT auf: die Warnung wird trotzdem aktiv,
    /// der Artikel bleibt für den Sammel-Neuversand vorgemerkt.
    pub async fn reevaluate(&self, article_id: &str) -> EngineResult<MonitorReport> {
        let article = self
            .article_repo
            .find_by_id(article_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Artikel".to_string(),
                id: article_id.to_string(),
            })?;

        let stock = self.ledger.compute_stock(article_id)?;
        let now = Utc::now().naive_utc();
        let outcome = evaluate_transition(&article, stock, now);

        let mut fields = outcome.fields.clone();
        let mut dispatch_attempted = false;
        let mut dispatch_succeeded = false;

        for effect in &outcome.effects {
            match effect {
                MonitorEffect::SendWarning => {
                    dispatch_attempted = true;
                    dispatch_succeeded = match self.dispatcher.dispatch(&article, stock).await {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            // Versandfehler nur protokollieren; der
                            // Übergang selbst wird davon nicht berührt
                            warn!(artikel = %article.name, fehler = %e, "Warnmail-Versand fehlgeschlagen");
                            false
                        }
                    };
                    if dispatch_succeeded {
                        fields.last_warning_sent_at = Some(now);
                    }
                }
            }
        }

        if outcome.changed {
            self.article_repo.update_warning_fields(
                &article.article_id,
                fields.warning_created_at,
                fields.last_warning_sent_at,
                fields.is_warning_active,
            )?;

            info!(
                artikel = %article.name,
                bestand = stock,
                mindestbestand = article.min_stock,
                warnung_aktiv = fields.is_warning_active,
                "Warnzustand gewechselt"
            );
        }

        Ok(MonitorReport {
            article_id: article.article_id.clone(),
            article_name: article.name.clone(),
            stock,
            min_stock: article.min_stock,
            was_warning: article.is_warning_active,
            is_warning: fields.is_warning_active,
            dispatch_attempted,
            dispatch_succeeded,
        })
    }

    /// Kompletter Bestandsdurchlauf (Startabgleich).
    ///
    /// Idempotent: liefert denselben Endzustand wie die fortlaufende
    /// Einzelbewertung. Zwischenzeitlich verschwundene Artikel werden
    /// übersprungen.
    pub async fn sweep(&self) -> EngineResult<Vec<MonitorReport>> {
        let ids = self.article_repo.list_ids()?;
        let mut reports = Vec::with_capacity(ids.len());

        for id in ids {
            match self.reevaluate(&id).await {
                Ok(report) => reports.push(report),
                Err(EngineError::NotFound { entity, id }) => {
                    warn!(entity = %entity, id = %id, "Beim Durchlauf nicht mehr vorhanden, übersprungen");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(reports)
    }

    /// Sammel-Neuversand für alle Artikel mit aktiver Warnung ohne
    /// erfolgreichen Versand.
    ///
    /// Umgeht absichtlich die Drosselung des Selbstübergangs: hier wird
    /// je Artikel genau ein frischer Versuch erzwungen. Bei Erfolg wird
    /// last_warning_sent_at gesetzt, bei Fehlschlag bleibt der Artikel
    /// für den nächsten Lauf vorgemerkt.
    pub async fn retry_failed(&self) -> EngineResult<Vec<RetryOutcome>> {
        let candidates = self.article_repo.list_warning_unsent()?;
        let mut outcomes = Vec::with_capacity(candidates.len());

        for article in candidates {
            let stock = self.ledger.compute_stock(&article.article_id)?;
            let succeeded = match self.dispatcher.dispatch(&article, stock).await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(artikel = %article.name, fehler = %e, "Neuversand fehlgeschlagen");
                    false
                }
            };

            if succeeded {
                let now = Utc::now().naive_utc();
                self.article_repo.update_warning_fields(
                    &article.article_id,
                    article.warning_created_at,
                    Some(now),
                    article.is_warning_active,
                )?;
            }

            outcomes.push(RetryOutcome {
                article_id: article.article_id.clone(),
                article_name: article.name.clone(),
                succeeded,
            });
        }

        Ok(outcomes)
    }

    /// Alle Artikel im Warnzustand, angereichert um Live-Bestand und
    /// rechnerisches Lieferdatum.
    pub fn active_warnings(&self) -> EngineResult<Vec<WarningOverview>> {
        let articles = self.article_repo.list_warning_active()?;
        let mut rows = Vec::with_capacity(articles.len());

        for article in articles {
            let current_stock = self.ledger.compute_stock(&article.article_id)?;
            let expected_delivery = article
                .last_warning_sent_at
                .map(|sent| sent + Duration::days(i64::from(article.lead_time_days)));

            rows.push(WarningOverview {
                article_id: article.article_id.clone(),
                article_name: article.name.clone(),
                current_stock,
                min_stock: article.min_stock,
                notified: article.last_warning_sent_at.is_some(),
                expected_delivery,
            });
        }

        Ok(rows)
    }
}
