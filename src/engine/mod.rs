// ==========================================
// LAGA Lagerverwaltung - Engine-Schicht
// ==========================================
// Zuständigkeit: Geschäftsregeln über den Repositories.
// Bestandsbuch, Ein-/Auslagern, Bestandsmonitor, Warnmail-Versand,
// Bewegungsprotokoll und Etikettenerzeugung.
// ==========================================

pub mod dispatch;
pub mod error;
pub mod label;
pub mod ledger;
pub mod monitor;
pub mod movement_log;
pub mod stock_in;
pub mod stock_out;

pub use dispatch::{DisabledMailer, MailTransport, NotificationDispatcher, SmtpConfig, SmtpMailer};
pub use error::{EngineError, EngineResult};
pub use label::{compose_zpl, LabelFormat, LabelPrinter, SpoolDirPrinter};
pub use ledger::InventoryLedger;
pub use monitor::{
    evaluate_transition, MonitorEffect, MonitorReport, RetryOutcome, StockMonitor,
    TransitionOutcome, WarningFields, WarningOverview,
};
pub use movement_log::MovementLogger;
pub use stock_in::{StockInOperation, StockInReport};
pub use stock_out::{ScanInputGuard, ScanSession, StockOutOperation, StockOutReport};
