// ==========================================
// LAGA Lagerverwaltung - Einheiten-Repository
// ==========================================
// Trägt die beiden atomaren Stapeloperationen des Bestands:
// Stapel-Einfügen (Einlagern) und Stapel-Löschen (Auslagern).
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::unit::Unit;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};

pub struct UnitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UnitRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(Unit, String)> {
        let unit = Unit {
            unit_id: row.get(0)?,
            article_id: row.get(1)?,
            barcode: row.get(2)?,
            created_at: chrono::NaiveDateTime::default(),
        };
        let created: String = row.get(3)?;
        Ok((unit, created))
    }

    fn finish_row(raw: (Unit, String)) -> RepositoryResult<Unit> {
        let (mut unit, created) = raw;
        unit.created_at = parse_ts(&created)?;
        Ok(unit)
    }

    // ==========================================
    // Schreiboperationen
    // ==========================================

    /// Stapel-Einfügen beim Einlagern: alle Einheiten in einer
    /// Transaktion, entweder alle oder keine.
    pub fn insert_batch(&self, units: &[Unit]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for unit in units {
            tx.execute(
                "INSERT INTO unit (unit_id, article_id, barcode, created_at) VALUES (?, ?, ?, ?)",
                params![
                    unit.unit_id,
                    unit.article_id,
                    unit.barcode,
                    format_ts(unit.created_at),
                ],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    /// Stapel-Löschen beim Auslagern: alle angegebenen Einheiten in
    /// einer Transaktion.
    ///
    /// Trifft ein Löschbefehl keine Zeile (Einheit wurde zwischenzeitlich
    /// anderweitig ausgelagert), bricht die gesamte Transaktion mit
    /// NotFound ab - kein stiller Teilabzug.
    pub fn delete_batch(&self, unit_ids: &[String]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for unit_id in unit_ids {
            let rows = tx.execute("DELETE FROM unit WHERE unit_id = ?1", params![unit_id])?;
            if rows == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "Einheit".to_string(),
                    id: unit_id.clone(),
                });
            }
            count += rows;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    // ==========================================
    // Leseoperationen
    // ==========================================

    /// Live-Bestand eines Artikels: immer frische Zählung, nie ein Zähler
    pub fn count_by_article(&self, article_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM unit WHERE article_id = ?1",
            params![article_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn find_by_id(&self, unit_id: &str) -> RepositoryResult<Option<Unit>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                "SELECT unit_id, article_id, barcode, created_at FROM unit WHERE unit_id = ?1",
                params![unit_id],
                Self::map_row,
            )
            .optional()?;
        raw.map(Self::finish_row).transpose()
    }

    /// Exakte Barcode-Suche (Scan-Modus)
    pub fn find_by_barcode(&self, barcode: &str) -> RepositoryResult<Option<Unit>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                "SELECT unit_id, article_id, barcode, created_at FROM unit WHERE barcode = ?1",
                params![barcode],
                Self::map_row,
            )
            .optional()?;
        raw.map(Self::finish_row).transpose()
    }

    /// Kollisionprüfung für den Barcode-Generator
    pub fn barcode_exists(&self, barcode: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM unit WHERE barcode = ?1",
            params![barcode],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Alle Einheiten eines Artikels (Maske "manuelles Auslagern",
    /// dort wird bewusst nichts vorselektiert)
    pub fn list_by_article(&self, article_id: &str) -> RepositoryResult<Vec<Unit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT unit_id, article_id, barcode, created_at FROM unit \
             WHERE article_id = ?1 ORDER BY created_at, barcode",
        )?;
        let rows = stmt.query_map(params![article_id], Self::map_row)?;

        let mut units = Vec::new();
        for row in rows {
            units.push(Self::finish_row(row?)?);
        }
        Ok(units)
    }

    /// Jüngster Einlagerungsstapel eines Artikels: alle Einheiten mit dem
    /// höchsten Erstellungszeitstempel. Die Ansichts-/Nachdruckmaske
    /// selektiert genau diesen Stapel vor.
    pub fn newest_batch(&self, article_id: &str) -> RepositoryResult<Vec<Unit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT unit_id, article_id, barcode, created_at FROM unit \
             WHERE article_id = ?1 \
               AND created_at = (SELECT MAX(created_at) FROM unit WHERE article_id = ?1) \
             ORDER BY barcode",
        )?;
        let rows = stmt.query_map(params![article_id], Self::map_row)?;

        let mut units = Vec::new();
        for row in rows {
            units.push(Self::finish_row(row?)?);
        }
        Ok(units)
    }
}
