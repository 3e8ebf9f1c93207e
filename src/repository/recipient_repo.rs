// ==========================================
// LAGA Lagerverwaltung - Empfänger-Repository
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use crate::domain::master_data::Recipient;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct RecipientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecipientRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, recipient: &Recipient) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO recipient (recipient_id, email) VALUES (?, ?)",
            params![recipient.recipient_id, recipient.email],
        )?;
        Ok(recipient.recipient_id.clone())
    }

    pub fn delete(&self, recipient_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM recipient WHERE recipient_id = ?1",
            params![recipient_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Empfänger".to_string(),
                id: recipient_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, recipient_id: &str) -> RepositoryResult<Option<Recipient>> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT recipient_id, email FROM recipient WHERE recipient_id = ?1",
                params![recipient_id],
                |row| {
                    Ok(Recipient {
                        recipient_id: row.get(0)?,
                        email: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Recipient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT recipient_id, email FROM recipient ORDER BY email")?;
        let rows = stmt.query_map([], |row| {
            Ok(Recipient {
                recipient_id: row.get(0)?,
                email: row.get(1)?,
            })
        })?;

        let mut recipients = Vec::new();
        for row in rows {
            recipients.push(row?);
        }
        Ok(recipients)
    }

    pub fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipient WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
