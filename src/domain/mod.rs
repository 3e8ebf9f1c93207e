// ==========================================
// LAGA Lagerverwaltung - Domänenschicht
// ==========================================
// Zuständigkeit: Entitäten und Werttypen, keine Datenbankzugriffe
// ==========================================

pub mod article;
pub mod master_data;
pub mod movement;
pub mod partner;
pub mod types;
pub mod unit;

// Re-Exporte der Kernentitäten
pub use article::{Article, ArticleDraft};
pub use master_data::{is_valid_email, CostCenter, Recipient, StorageLocation};
pub use movement::MovementEntry;
pub use partner::{BusinessPartner, PartnerDraft};
pub use types::{MovementKind, PartnerRole, UnitKind};
pub use unit::{is_valid_barcode, Unit, BARCODE_MAX, BARCODE_MIN};
