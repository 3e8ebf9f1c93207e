// ==========================================
// LAGA Lagerverwaltung - SQLite-Verbindungsinitialisierung
// ==========================================
// Ziel:
// - einheitliches PRAGMA-Verhalten für alle Connection::open-Stellen
//   (Fremdschlüssel müssen je Verbindung aktiviert werden)
// - einheitlicher busy_timeout gegen sporadische busy-Fehler
// - Schema-Bootstrap beim ersten Start
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Standard-busy_timeout (Millisekunden)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Einheitliche PRAGMAs für eine SQLite-Verbindung setzen
///
/// foreign_keys und busy_timeout gelten je Verbindung und müssen
/// darum bei jedem Öffnen neu konfiguriert werden.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// SQLite-Verbindung öffnen und einheitlich konfigurieren
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Schema anlegen, sofern noch nicht vorhanden (idempotent).
///
/// Die Fremdschlüssel sind durchgängig RESTRICT: Stammdaten, auf die
/// noch ein Artikel zeigt, und Artikel, die noch Einheiten besitzen,
/// dürfen nicht gelöscht werden. Einheiten verschwinden ausschließlich
/// über das Auslagern, nie per Kaskade.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS business_partner (
            partner_id TEXT PRIMARY KEY,
            role       TEXT NOT NULL CHECK (role IN ('SUPPLIER','MANUFACTURER')),
            name       TEXT NOT NULL,
            website    TEXT NOT NULL,
            email      TEXT NOT NULL,
            phone      TEXT NOT NULL,
            UNIQUE (role, name)
        );

        CREATE TABLE IF NOT EXISTS cost_center (
            cost_center_id TEXT PRIMARY KEY,
            name           TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS storage_location (
            storage_location_id TEXT PRIMARY KEY,
            name                TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS recipient (
            recipient_id TEXT PRIMARY KEY,
            email        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS article (
            article_id           TEXT PRIMARY KEY,
            name                 TEXT NOT NULL UNIQUE,
            supplier_id          TEXT NOT NULL REFERENCES business_partner(partner_id) ON DELETE RESTRICT,
            manufacturer_id      TEXT NOT NULL REFERENCES business_partner(partner_id) ON DELETE RESTRICT,
            cost_center_id       TEXT NOT NULL REFERENCES cost_center(cost_center_id) ON DELETE RESTRICT,
            storage_location_id  TEXT NOT NULL REFERENCES storage_location(storage_location_id) ON DELETE RESTRICT,
            lead_time_days       INTEGER NOT NULL CHECK (lead_time_days BETWEEN 1 AND 10),
            unit_kind            TEXT NOT NULL CHECK (unit_kind IN ('SINGLE','BOX')),
            min_stock            INTEGER NOT NULL CHECK (min_stock >= 0),
            max_stock            INTEGER NOT NULL CHECK (max_stock >= 0 AND max_stock >= min_stock),
            warning_created_at   TEXT,
            last_warning_sent_at TEXT,
            is_warning_active    INTEGER NOT NULL DEFAULT 0,
            created_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS unit (
            unit_id    TEXT PRIMARY KEY,
            article_id TEXT NOT NULL REFERENCES article(article_id) ON DELETE RESTRICT,
            barcode    TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        -- Bestandszählung und Stapelabfragen laufen über diese Indizes
        CREATE INDEX IF NOT EXISTS idx_unit_article ON unit(article_id);
        CREATE INDEX IF NOT EXISTS idx_unit_article_created ON unit(article_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_article_warning ON article(is_warning_active);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='article'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
