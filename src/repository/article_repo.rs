// ==========================================
// LAGA Lagerverwaltung - Artikel-Repository
// ==========================================
// Repository macht keine Geschäftslogik, nur Daten-Mapping
// ==========================================

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::article::Article;
use crate::domain::types::UnitKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};

const ARTICLE_COLUMNS: &str = "article_id, name, supplier_id, manufacturer_id, cost_center_id, \
     storage_location_id, lead_time_days, unit_kind, min_stock, max_stock, \
     warning_created_at, last_warning_sent_at, is_warning_active, created_at";

pub struct ArticleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ArticleRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(Article, Option<String>, Option<String>, String)> {
        // Zeitstempel kommen als Text zurück und werden außerhalb des
        // rusqlite-Closures geparst, damit Parsefehler als
        // RepositoryError gemeldet werden können.
        let unit_kind_raw: String = row.get(7)?;
        let article = Article {
            article_id: row.get(0)?,
            name: row.get(1)?,
            supplier_id: row.get(2)?,
            manufacturer_id: row.get(3)?,
            cost_center_id: row.get(4)?,
            storage_location_id: row.get(5)?,
            lead_time_days: row.get(6)?,
            unit_kind: UnitKind::parse(&unit_kind_raw).unwrap_or(UnitKind::Single),
            min_stock: row.get(8)?,
            max_stock: row.get(9)?,
            warning_created_at: None,
            last_warning_sent_at: None,
            is_warning_active: row.get::<_, i64>(12)? != 0,
            created_at: NaiveDateTime::default(),
        };
        let warning_created: Option<String> = row.get(10)?;
        let last_sent: Option<String> = row.get(11)?;
        let created: String = row.get(13)?;
        Ok((article, warning_created, last_sent, created))
    }

    fn finish_row(
        raw: (Article, Option<String>, Option<String>, String),
    ) -> RepositoryResult<Article> {
        let (mut article, warning_created, last_sent, created) = raw;
        article.warning_created_at = warning_created.as_deref().map(parse_ts).transpose()?;
        article.last_warning_sent_at = last_sent.as_deref().map(parse_ts).transpose()?;
        article.created_at = parse_ts(&created)?;
        Ok(article)
    }

    // ==========================================
    // Schreiboperationen
    // ==========================================

    /// Neuen Artikel einfügen
    pub fn insert(&self, article: &Article) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO article (
                article_id, name, supplier_id, manufacturer_id, cost_center_id,
                storage_location_id, lead_time_days, unit_kind, min_stock, max_stock,
                warning_created_at, last_warning_sent_at, is_warning_active, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                article.article_id,
                article.name,
                article.supplier_id,
                article.manufacturer_id,
                article.cost_center_id,
                article.storage_location_id,
                article.lead_time_days,
                article.unit_kind.as_str(),
                article.min_stock,
                article.max_stock,
                article.warning_created_at.map(format_ts),
                article.last_warning_sent_at.map(format_ts),
                article.is_warning_active as i64,
                format_ts(article.created_at),
            ],
        )?;

        Ok(article.article_id.clone())
    }

    /// Stammfelder eines Artikels aktualisieren.
    ///
    /// Die Warnungsfelder bleiben unberührt, die pflegt ausschließlich
    /// der Bestandsmonitor über [`update_warning_fields`].
    ///
    /// [`update_warning_fields`]: ArticleRepository::update_warning_fields
    pub fn update_master(&self, article: &Article) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE article SET
                name = ?2, supplier_id = ?3, manufacturer_id = ?4,
                cost_center_id = ?5, storage_location_id = ?6,
                lead_time_days = ?7, unit_kind = ?8, min_stock = ?9, max_stock = ?10
            WHERE article_id = ?1
            "#,
            params![
                article.article_id,
                article.name,
                article.supplier_id,
                article.manufacturer_id,
                article.cost_center_id,
                article.storage_location_id,
                article.lead_time_days,
                article.unit_kind.as_str(),
                article.min_stock,
                article.max_stock,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Artikel".to_string(),
                id: article.article_id.clone(),
            });
        }
        Ok(())
    }

    /// Warnungsfelder eines Artikels schreiben (nur Bestandsmonitor)
    pub fn update_warning_fields(
        &self,
        article_id: &str,
        warning_created_at: Option<NaiveDateTime>,
        last_warning_sent_at: Option<NaiveDateTime>,
        is_warning_active: bool,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE article SET
                warning_created_at = ?2,
                last_warning_sent_at = ?3,
                is_warning_active = ?4
            WHERE article_id = ?1
            "#,
            params![
                article_id,
                warning_created_at.map(format_ts),
                last_warning_sent_at.map(format_ts),
                is_warning_active as i64,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Artikel".to_string(),
                id: article_id.to_string(),
            });
        }
        Ok(())
    }

    /// Artikel löschen.
    ///
    /// Besitzt der Artikel noch Einheiten, schlägt das Löschen am
    /// RESTRICT-Fremdschlüssel fehl.
    pub fn delete(&self, article_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM article WHERE article_id = ?1",
            params![article_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Artikel".to_string(),
                id: article_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Leseoperationen
    // ==========================================

    pub fn find_by_id(&self, article_id: &str) -> RepositoryResult<Option<Article>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM article WHERE article_id = ?1", ARTICLE_COLUMNS),
                params![article_id],
                Self::map_row,
            )
            .optional()?;
        raw.map(Self::finish_row).transpose()
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Article>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM article WHERE name = ?1", ARTICLE_COLUMNS),
                params![name],
                Self::map_row,
            )
            .optional()?;
        raw.map(Self::finish_row).transpose()
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Article>> {
        self.query_many(
            &format!("SELECT {} FROM article ORDER BY name", ARTICLE_COLUMNS),
            &[],
        )
    }

    /// Alle Artikel-Ids (für den Komplettdurchlauf des Monitors)
    pub fn list_ids(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT article_id FROM article ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Artikel mit aktiver Warnung
    pub fn list_warning_active(&self) -> RepositoryResult<Vec<Article>> {
        self.query_many(
            &format!(
                "SELECT {} FROM article WHERE is_warning_active = 1 ORDER BY name",
                ARTICLE_COLUMNS
            ),
            &[],
        )
    }

    /// Artikel mit aktiver Warnung ohne erfolgreichen Mail-Versand
    /// (Kandidaten für den Sammel-Neuversand)
    pub fn list_warning_unsent(&self) -> RepositoryResult<Vec<Article>> {
        self.query_many(
            &format!(
                "SELECT {} FROM article WHERE is_warning_active = 1 AND last_warning_sent_at IS NULL ORDER BY name",
                ARTICLE_COLUMNS
            ),
            &[],
        )
    }

    /// Gibt es bereits einen Artikel mit diesem Namen (optional einen
    /// bestehenden Datensatz ausgenommen)?
    pub fn name_exists(&self, name: &str, exclude_id: Option<&str>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = match exclude_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM article WHERE name = ?1 AND article_id != ?2",
                params![name, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM article WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }

    fn query_many(
        &self,
        sql: &str,
        params_slice: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<Article>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_slice, Self::map_row)?;

        let mut articles = Vec::new();
        for row in rows {
            articles.push(Self::finish_row(row?)?);
        }
        Ok(articles)
    }
}
