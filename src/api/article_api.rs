// ==========================================
// LAGA Lagerverwaltung - Artikel-API
// ==========================================
// Zuständigkeit: Artikelmaske (Anlegen, Bearbeiten, Löschen, Listen)
// über dem Validierungstor des Bestandsbuchs.
// ==========================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::article::{Article, ArticleDraft};
use crate::engine::ledger::InventoryLedger;
use crate::repository::article_repo::ArticleRepository;

// ==========================================
// ArticleWithStock - Listenzeile der Artikelmaske
// ==========================================
/// Artikelstammsatz plus Live-Bestand für die Übersichtsliste
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleWithStock {
    #[serde(flatten)]
    pub article: Article,
    pub current_stock: i64,
}

// ==========================================
// ArticleApi
// ==========================================

pub struct ArticleApi {
    article_repo: Arc<ArticleRepository>,
    ledger: Arc<InventoryLedger>,
}

impl ArticleApi {
    pub fn new(article_repo: Arc<ArticleRepository>, ledger: Arc<InventoryLedger>) -> Self {
        Self {
            article_repo,
            ledger,
        }
    }

    /// Artikel anlegen.
    ///
    /// Neue Artikel starten im Normalzustand: Warnflagge aus, beide
    /// Zeitstempel leer.
    pub fn create_article(&self, draft: &ArticleDraft) -> ApiResult<Article> {
        let unit_kind = self.ledger.validate_draft(draft, None)?;

        let article = Article {
            article_id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            supplier_id: draft.supplier_id.clone(),
            manufacturer_id: draft.manufacturer_id.clone(),
            cost_center_id: draft.cost_center_id.clone(),
            storage_location_id: draft.storage_location_id.clone(),
            lead_time_days: draft.lead_time_days,
            unit_kind,
            min_stock: draft.min_stock,
            max_stock: draft.max_stock,
            warning_created_at: None,
            last_warning_sent_at: None,
            is_warning_active: false,
            created_at: Utc::now().naive_utc(),
        };

        self.article_repo.insert(&article)?;
        info!(artikel = %article.name, "Artikel angelegt");
        Ok(article)
    }

    /// Artikel bearbeiten.
    ///
    /// Die Warnungsfelder des Bestandsmonitors bleiben beim Bearbeiten
    /// unangetastet; die Maske schreibt nur Stammfelder.
    pub fn update_article(&self, article_id: &str, draft: &ArticleDraft) -> ApiResult<Article> {
        let existing = self
            .article_repo
            .find_by_id(article_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Artikel (id={})", article_id)))?;

        let unit_kind = self.ledger.validate_draft(draft, Some(article_id))?;

        let updated = Article {
            article_id: existing.article_id.clone(),
            name: draft.name.trim().to_string(),
            supplier_id: draft.supplier_id.clone(),
            manufacturer_id: draft.manufacturer_id.clone(),
            cost_center_id: draft.cost_center_id.clone(),
            storage_location_id: draft.storage_location_id.clone(),
            lead_time_days: draft.lead_time_days,
            unit_kind,
            min_stock: draft.min_stock,
            max_stock: draft.max_stock,
            warning_created_at: existing.warning_created_at,
            last_warning_sent_at: existing.last_warning_sent_at,
            is_warning_active: existing.is_warning_active,
            created_at: existing.created_at,
        };

        self.article_repo.update_master(&updated)?;
        info!(artikel = %updated.name, "Artikel geändert");
        Ok(updated)
    }

    /// Artikel löschen.
    ///
    /// Besitzt der Artikel noch Einheiten, lehnt der
    /// RESTRICT-Fremdschlüssel das Löschen ab; erst auslagern.
    pub fn delete_article(&self, article_id: &str) -> ApiResult<()> {
        self.article_repo.delete(article_id).map_err(|e| {
            match ApiError::from(e) {
                ApiError::StillReferenced(_) => ApiError::StillReferenced(
                    "Artikel besitzt noch eingelagerte Einheiten und kann nicht gelöscht werden"
                        .to_string(),
                ),
                other => other,
            }
        })?;
        info!(artikel_id = %article_id, "Artikel gelöscht");
        Ok(())
    }

    pub fn get_article(&self, article_id: &str) -> ApiResult<Option<Article>> {
        Ok(self.article_repo.find_by_id(article_id)?)
    }

    /// Artikelliste mit Live-Bestand
    pub fn list_articles(&self) -> ApiResult<Vec<ArticleWithStock>> {
        let articles = self.article_repo.list_all()?;
        debug!(anzahl = articles.len(), "Artikelliste geladen");

        let mut rows = Vec::with_capacity(articles.len());
        for article in articles {
            let current_stock = self.ledger.compute_stock(&article.article_id)?;
            rows.push(ArticleWithStock {
                article,
                current_stock,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UnitKind;
    use crate::repository::unit_repo::UnitRepository;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> (ArticleApi, Arc<ArticleRepository>, Arc<UnitRepository>) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO business_partner VALUES ('s1','SUPPLIER','S','https://s.de','s@s.de','1');
            INSERT INTO business_partner VALUES ('m1','MANUFACTURER','M','https://m.de','m@m.de','2');
            INSERT INTO cost_center VALUES ('k1','Instandhaltung');
            INSERT INTO storage_location VALUES ('l1','Regal A1');
            "#,
        )
        .unwrap();

        let conn = Arc::new(Mutex::new(conn));
        let article_repo = Arc::new(ArticleRepository::new(conn.clone()));
        let unit_repo = Arc::new(UnitRepository::new(conn));
        let ledger = Arc::new(InventoryLedger::new(article_repo.clone(), unit_repo.clone()));

        (
            ArticleApi::new(article_repo.clone(), ledger),
            article_repo,
            unit_repo,
        )
    }

    fn draft(name: &str) -> ArticleDraft {
        ArticleDraft {
            name: name.to_string(),
            supplier_id: "s1".to_string(),
            manufacturer_id: "m1".to_string(),
            cost_center_id: "k1".to_string(),
            storage_location_id: "l1".to_string(),
            lead_time_days: 3,
            is_single_item: true,
            is_box: false,
            min_stock: 10,
            max_stock: 50,
        }
    }

    #[test]
    fn test_create_starts_in_normal_state() {
        let (api, _, _) = setup();

        let article = api.create_article(&draft("Schraube M6")).unwrap();

        assert!(!article.is_warning_active);
        assert!(article.warning_created_at.is_none());
        assert!(article.last_warning_sent_at.is_none());
        assert_eq!(article.unit_kind, UnitKind::Single);
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let (api, _, _) = setup();

        api.create_article(&draft("Schraube M6")).unwrap();
        let result = api.create_article(&draft("Schraube M6"));
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_update_preserves_warning_fields() {
        let (api, repo, _) = setup();

        let article = api.create_article(&draft("Schraube M6")).unwrap();

        // Monitor setzt zwischenzeitlich die Warnfelder
        let ts = chrono::NaiveDateTime::parse_from_str("2026-03-01 10:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        repo.update_warning_fields(&article.article_id, Some(ts), Some(ts), true)
            .unwrap();

        let mut changed = draft("Schraube M6 verzinkt");
        changed.min_stock = 12;
        let updated = api.update_article(&article.article_id, &changed).unwrap();

        assert_eq!(updated.name, "Schraube M6 verzinkt");
        assert_eq!(updated.min_stock, 12);

        let reloaded = repo.find_by_id(&article.article_id).unwrap().unwrap();
        assert_eq!(reloaded.warning_created_at, Some(ts));
        assert_eq!(reloaded.last_warning_sent_at, Some(ts));
        assert!(reloaded.is_warning_active);
    }

    #[test]
    fn test_delete_with_units_is_rejected() {
        let (api, _, unit_repo) = setup();

        let article = api.create_article(&draft("Schraube M6")).unwrap();

        // Eine Einheit einhängen: Löschen muss am Fremdschlüssel scheitern
        unit_repo
            .insert_batch(&[crate::domain::unit::Unit {
                unit_id: "u1".to_string(),
                article_id: article.article_id.clone(),
                barcode: "1234567890".to_string(),
                created_at: Utc::now().naive_utc(),
            }])
            .unwrap();

        let result = api.delete_article(&article.article_id);
        assert!(matches!(result, Err(ApiError::StillReferenced(_))));

        // Nach dem Auslagern der Einheit klappt das Löschen
        unit_repo.delete_batch(&["u1".to_string()]).unwrap();
        api.delete_article(&article.article_id).unwrap();
        assert!(api.get_article(&article.article_id).unwrap().is_none());
    }

    #[test]
    fn test_list_articles_carries_live_stock() {
        let (api, _, _) = setup();

        api.create_article(&draft("Schraube M6")).unwrap();
        let rows = api.list_articles().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].current_stock, 0);
    }
}
