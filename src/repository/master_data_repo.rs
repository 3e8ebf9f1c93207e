// ==========================================
// LAGA Lagerverwaltung - Stammdaten-Repositories
// ==========================================
// Kostenstellen und Lagerorte: reine Namenslisten, beide mit
// RESTRICT-Schutz gegen das Löschen referenzierter Einträge.
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use crate::domain::master_data::{CostCenter, StorageLocation};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// CostCenterRepository
// ==========================================

pub struct CostCenterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CostCenterRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, cost_center: &CostCenter) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO cost_center (cost_center_id, name) VALUES (?, ?)",
            params![cost_center.cost_center_id, cost_center.name],
        )?;
        Ok(cost_center.cost_center_id.clone())
    }

    pub fn update(&self, cost_center: &CostCenter) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE cost_center SET name = ?2 WHERE cost_center_id = ?1",
            params![cost_center.cost_center_id, cost_center.name],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Kostenstelle".to_string(),
                id: cost_center.cost_center_id.clone(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, cost_center_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM cost_center WHERE cost_center_id = ?1",
            params![cost_center_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Kostenstelle".to_string(),
                id: cost_center_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, cost_center_id: &str) -> RepositoryResult<Option<CostCenter>> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT cost_center_id, name FROM cost_center WHERE cost_center_id = ?1",
                params![cost_center_id],
                |row| {
                    Ok(CostCenter {
                        cost_center_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<CostCenter>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT cost_center_id, name FROM cost_center ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(CostCenter {
                cost_center_id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    pub fn name_exists(&self, name: &str, exclude_id: Option<&str>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = match exclude_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM cost_center WHERE name = ?1 AND cost_center_id != ?2",
                params![name, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM cost_center WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }
}

// ==========================================
// StorageLocationRepository
// ==========================================

pub struct StorageLocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StorageLocationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, location: &StorageLocation) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO storage_location (storage_location_id, name) VALUES (?, ?)",
            params![location.storage_location_id, location.name],
        )?;
        Ok(location.storage_location_id.clone())
    }

    pub fn update(&self, location: &StorageLocation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE storage_location SET name = ?2 WHERE storage_location_id = ?1",
            params![location.storage_location_id, location.name],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Lagerort".to_string(),
                id: location.storage_location_id.clone(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, storage_location_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM storage_location WHERE storage_location_id = ?1",
            params![storage_location_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Lagerort".to_string(),
                id: storage_location_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(
        &self,
        storage_location_id: &str,
    ) -> RepositoryResult<Option<StorageLocation>> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT storage_location_id, name FROM storage_location WHERE storage_location_id = ?1",
                params![storage_location_id],
                |row| {
                    Ok(StorageLocation {
                        storage_location_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<StorageLocation>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT storage_location_id, name FROM storage_location ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(StorageLocation {
                storage_location_id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    pub fn name_exists(&self, name: &str, exclude_id: Option<&str>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = match exclude_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM storage_location WHERE name = ?1 AND storage_location_id != ?2",
                params![name, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM storage_location WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_storage_location_delete_blocked_while_referenced() {
        let conn = setup_test_db();
        let repo = StorageLocationRepository::new(conn.clone());

        repo.insert(&StorageLocation {
            storage_location_id: "l1".to_string(),
            name: "Regal A1".to_string(),
        })
        .unwrap();

        {
            let c = conn.lock().unwrap();
            c.execute_batch(
                r#"
                INSERT INTO business_partner VALUES ('s1','SUPPLIER','S','https://s.de','s@s.de','1');
                INSERT INTO business_partner VALUES ('m1','MANUFACTURER','M','https://m.de','m@m.de','2');
                INSERT INTO cost_center VALUES ('k1','Instandhaltung');
                INSERT INTO article VALUES ('a1','Schraube M6','s1','m1','k1','l1',3,'SINGLE',10,50,NULL,NULL,0,'2026-01-01 08:00:00');
                "#,
            )
            .unwrap();
        }

        // Referenziert -> abgelehnt
        assert!(matches!(
            repo.delete("l1"),
            Err(RepositoryError::ForeignKeyViolation(_))
        ));

        // Nach Entfernen des Artikels -> erlaubt
        {
            let c = conn.lock().unwrap();
            c.execute("DELETE FROM article WHERE article_id = 'a1'", []).unwrap();
        }
        repo.delete("l1").unwrap();
        assert!(repo.find_by_id("l1").unwrap().is_none());
    }

    #[test]
    fn test_cost_center_unique_name() {
        let conn = setup_test_db();
        let repo = CostCenterRepository::new(conn);

        repo.insert(&CostCenter {
            cost_center_id: "k1".to_string(),
            name: "Instandhaltung".to_string(),
        })
        .unwrap();

        let dup = repo.insert(&CostCenter {
            cost_center_id: "k2".to_string(),
            name: "Instandhaltung".to_string(),
        });
        assert!(matches!(
            dup,
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));

        assert!(repo.name_exists("Instandhaltung", None).unwrap());
        assert!(!repo.name_exists("Instandhaltung", Some("k1")).unwrap());
    }
}
