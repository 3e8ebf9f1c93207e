// ==========================================
// LAGA Lagerverwaltung - Empfänger-API
// ==========================================
// Zuständigkeit: die Liste der Warnmail-Empfänger. Adressen werden
// vor dem Speichern auf Form geprüft; die Eindeutigkeit sichert
// zusätzlich der Index der Tabelle.
// ==========================================

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::master_data::{is_valid_email, Recipient};
use crate::repository::recipient_repo::RecipientRepository;

pub struct RecipientApi {
    recipient_repo: Arc<RecipientRepository>,
}

impl RecipientApi {
    pub fn new(recipient_repo: Arc<RecipientRepository>) -> Self {
        Self { recipient_repo }
    }

    pub fn add_recipient(&self, email: &str) -> ApiResult<Recipient> {
        let email = email.trim();

        if !is_valid_email(email) {
            return Err(ApiError::Validation(format!(
                "'{}' ist keine gültige E-Mail-Adresse",
                email
            )));
        }
        if self.recipient_repo.email_exists(email)? {
            return Err(ApiError::Validation(format!(
                "Empfänger '{}' ist bereits eingetragen",
                email
            )));
        }

        let recipient = Recipient {
            recipient_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };
        self.recipient_repo.insert(&recipient)?;
        info!(empfaenger = %recipient.email, "Warnmail-Empfänger eingetragen");
        Ok(recipient)
    }

    pub fn delete_recipient(&self, recipient_id: &str) -> ApiResult<()> {
        self.recipient_repo.delete(recipient_id)?;
        Ok(())
    }

    pub fn list_recipients(&self) -> ApiResult<Vec<Recipient>> {
        Ok(self.recipient_repo.list_all()?)
    }
}
