// ==========================================
// LAGA Lagerverwaltung - Stammdaten-API
// ==========================================
// Zuständigkeit: die Stammdaten-Listen der Anwendung - Lieferanten,
// Hersteller (gemeinsame Partnerform), Kostenstellen und Lagerorte.
// Löschversuche auf noch verwendete Datensätze weist der
// RESTRICT-Fremdschlüssel ab; hier wird das als Geschäftsregel
// gemeldet, nicht als Technikfehler.
// ==========================================

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::master_data::{CostCenter, StorageLocation};
use crate::domain::partner::{BusinessPartner, PartnerDraft};
use crate::domain::types::PartnerRole;
use crate::repository::master_data_repo::{CostCenterRepository, StorageLocationRepository};
use crate::repository::partner_repo::PartnerRepository;

pub struct MasterDataApi {
    partner_repo: Arc<PartnerRepository>,
    cost_center_repo: Arc<CostCenterRepository>,
    storage_location_repo: Arc<StorageLocationRepository>,
}

impl MasterDataApi {
    pub fn new(
        partner_repo: Arc<PartnerRepository>,
        cost_center_repo: Arc<CostCenterRepository>,
        storage_location_repo: Arc<StorageLocationRepository>,
    ) -> Self {
        Self {
            partner_repo,
            cost_center_repo,
            storage_location_repo,
        }
    }

    // ==========================================
    // Lieferanten / Hersteller
    // ==========================================

    fn validate_partner(
        &self,
        role: PartnerRole,
        draft: &PartnerDraft,
        exclude_id: Option<&str>,
    ) -> ApiResult<()> {
        if let Err(field) = draft.check_required_fields() {
            return Err(ApiError::Validation(format!(
                "{} ist ein Pflichtfeld",
                field
            )));
        }
        if self
            .partner_repo
            .name_exists(role, draft.name.trim(), exclude_id)?
        {
            return Err(ApiError::Validation(format!(
                "{} '{}' ist bereits angelegt",
                role.label(),
                draft.name.trim()
            )));
        }
        Ok(())
    }

    pub fn create_partner(
        &self,
        role: PartnerRole,
        draft: &PartnerDraft,
    ) -> ApiResult<BusinessPartner> {
        self.validate_partner(role, draft, None)?;

        let partner = BusinessPartner {
            partner_id: Uuid::new_v4().to_string(),
            role,
            name: draft.name.trim().to_string(),
            website: draft.website.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
        };
        self.partner_repo.insert(&partner)?;
        info!(rolle = role.label(), name = %partner.name, "Geschäftspartner angelegt");
        Ok(partner)
    }

    pub fn update_partner(
        &self,
        partner_id: &str,
        draft: &PartnerDraft,
    ) -> ApiResult<BusinessPartner> {
        let existing = self
            .partner_repo
            .find_by_id(partner_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Geschäftspartner (id={})", partner_id)))?;

        self.validate_partner(existing.role, draft, Some(partner_id))?;

        let updated = BusinessPartner {
            partner_id: existing.partner_id.clone(),
            role: existing.role,
            name: draft.name.trim().to_string(),
            website: draft.website.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
        };
        self.partner_repo.update(&updated)?;
        Ok(updated)
    }

    pub fn delete_partner(&self, partner_id: &str) -> ApiResult<()> {
        self.partner_repo
            .delete(partner_id)
            .map_err(|e| match ApiError::from(e) {
                ApiError::StillReferenced(_) => ApiError::StillReferenced(
                    "Geschäftspartner wird noch von mindestens einem Artikel verwendet".to_string(),
                ),
                other => other,
            })
    }

    pub fn list_partners(&self, role: PartnerRole) -> ApiResult<Vec<BusinessPartner>> {
        Ok(self.partner_repo.list_by_role(role)?)
    }

    // ==========================================
    // Kostenstellen
    // ==========================================

    pub fn create_cost_center(&self, name: &str) -> ApiResult<CostCenter> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "Name der Kostenstelle darf nicht leer sein".to_string(),
            ));
        }
        if self.cost_center_repo.name_exists(name, None)? {
            return Err(ApiError::Validation(format!(
                "Kostenstelle '{}' ist bereits angelegt",
                name
            )));
        }

        let cost_center = CostCenter {
            cost_center_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.cost_center_repo.insert(&cost_center)?;
        info!(name = %cost_center.name, "Kostenstelle angelegt");
        Ok(cost_center)
    }

    pub fn rename_cost_center(&self, cost_center_id: &str, name: &str) -> ApiResult<CostCenter> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "Name der Kostenstelle darf nicht leer sein".to_string(),
            ));
        }
        if self.cost_center_repo.name_exists(name, Some(cost_center_id))? {
            return Err(ApiError::Validation(format!(
                "Kostenstelle '{}' ist bereits angelegt",
                name
            )));
        }

        let updated = CostCenter {
            cost_center_id: cost_center_id.to_string(),
            name: name.to_string(),
        };
        self.cost_center_repo.update(&updated)?;
        Ok(updated)
    }

    pub fn delete_cost_center(&self, cost_center_id: &str) -> ApiResult<()> {
        self.cost_center_repo
            .delete(cost_center_id)
            .map_err(|e| match ApiError::from(e) {
                ApiError::StillReferenced(_) => ApiError::StillReferenced(
                    "Kostenstelle wird noch von mindestens einem Artikel verwendet".to_string(),
                ),
                other => other,
            })
    }

    pub fn list_cost_centers(&self) -> ApiResult<Vec<CostCenter>> {
        Ok(self.cost_center_repo.list_all()?)
    }

    // ==========================================
    // Lagerorte
    // ==========================================

    pub fn create_storage_location(&self, name: &str) -> ApiResult<StorageLocation> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "Name des Lagerorts darf nicht leer sein".to_string(),
            ));
        }
        if self.storage_location_repo.name_exists(name, None)? {
            return Err(ApiError::Validation(format!(
                "Lagerort '{}' ist bereits angelegt",
                name
            )));
        }

        let location = StorageLocation {
            storage_location_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.storage_location_repo.insert(&location)?;
        info!(name = %location.name, "Lagerort angelegt");
        Ok(location)
    }

    pub fn rename_storage_location(
        &self,
        storage_location_id: &str,
        name: &str,
    ) -> ApiResult<StorageLocation> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "Name des Lagerorts darf nicht leer sein".to_string(),
            ));
        }
        if self
            .storage_location_repo
            .name_exists(name, Some(storage_location_id))?
        {
            return Err(ApiError::Validation(format!(
                "Lagerort '{}' ist bereits angelegt",
                name
            )));
        }

        let updated = StorageLocation {
            storage_location_id: storage_location_id.to_string(),
            name: name.to_string(),
        };
        self.storage_location_repo.update(&updated)?;
        Ok(updated)
    }

    pub fn delete_storage_location(&self, storage_location_id: &str) -> ApiResult<()> {
        self.storage_location_repo
            .delete(storage_location_id)
            .map_err(|e| match ApiError::from(e) {
                ApiError::StillReferenced(_) => ApiError::StillReferenced(
                    "Lagerort wird noch von mindestens einem Artikel verwendet".to_string(),
                ),
                other => other,
            })
    }

    pub fn list_storage_locations(&self) -> ApiResult<Vec<StorageLocation>> {
        Ok(self.storage_location_repo.list_all()?)
    }
}
