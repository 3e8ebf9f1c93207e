// ==========================================
// LAGA Lagerverwaltung - API-Schicht
// ==========================================
// Zuständigkeit: Geschäftsschnittstellen für die Masken der
// Oberfläche. Jede Maske ruft genau eine API-Operation; die
// Oberfläche selbst trägt keine Geschäftslogik.
// ==========================================

pub mod article_api;
pub mod error;
pub mod master_data_api;
pub mod recipient_api;
pub mod settings_api;
pub mod stock_api;
pub mod warning_api;

pub use article_api::{ArticleApi, ArticleWithStock};
pub use error::{ApiError, ApiResult};
pub use master_data_api::MasterDataApi;
pub use recipient_api::RecipientApi;
pub use settings_api::SettingsApi;
pub use stock_api::{ScannedUnit, StockApi, StockInOutcome, StockOutOutcome};
pub use warning_api::{ReconcileSummary, RetryRow, WarningApi, WarningRow};
