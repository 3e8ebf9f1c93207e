// ==========================================
// LAGA Lagerverwaltung - Geschäftspartner-Repository
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::partner::BusinessPartner;
use crate::domain::types::PartnerRole;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct PartnerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartnerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<BusinessPartner> {
        let role_raw: String = row.get(1)?;
        Ok(BusinessPartner {
            partner_id: row.get(0)?,
            role: PartnerRole::parse(&role_raw).unwrap_or(PartnerRole::Supplier),
            name: row.get(2)?,
            website: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
        })
    }

    pub fn insert(&self, partner: &BusinessPartner) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO business_partner (partner_id, role, name, website, email, phone) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                partner.partner_id,
                partner.role.as_str(),
                partner.name,
                partner.website,
                partner.email,
                partner.phone,
            ],
        )?;
        Ok(partner.partner_id.clone())
    }

    pub fn update(&self, partner: &BusinessPartner) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE business_partner SET name = ?2, website = ?3, email = ?4, phone = ?5 \
             WHERE partner_id = ?1",
            params![
                partner.partner_id,
                partner.name,
                partner.website,
                partner.email,
                partner.phone,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: partner.role.label().to_string(),
                id: partner.partner_id.clone(),
            });
        }
        Ok(())
    }

    /// Löschen schlägt am RESTRICT-Fremdschlüssel fehl, solange noch
    /// ein Artikel auf den Partner verweist.
    pub fn delete(&self, partner_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM business_partner WHERE partner_id = ?1",
            params![partner_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Geschäftspartner".to_string(),
                id: partner_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, partner_id: &str) -> RepositoryResult<Option<BusinessPartner>> {
        let conn = self.get_conn()?;
        let partner = conn
            .query_row(
                "SELECT partner_id, role, name, website, email, phone \
                 FROM business_partner WHERE partner_id = ?1",
                params![partner_id],
                Self::map_row,
            )
            .optional()?;
        Ok(partner)
    }

    pub fn list_by_role(&self, role: PartnerRole) -> RepositoryResult<Vec<BusinessPartner>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT partner_id, role, name, website, email, phone \
             FROM business_partner WHERE role = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![role.as_str()], Self::map_row)?;

        let mut partners = Vec::new();
        for row in rows {
            partners.push(row?);
        }
        Ok(partners)
    }

    pub fn name_exists(
        &self,
        role: PartnerRole,
        name: &str,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = match exclude_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM business_partner WHERE role = ?1 AND name = ?2 AND partner_id != ?3",
                params![role.as_str(), name, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM business_partner WHERE role = ?1 AND name = ?2",
                params![role.as_str(), name],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }
}
