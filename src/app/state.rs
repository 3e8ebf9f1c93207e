// ==========================================
// LAGA Lagerverwaltung - Anwendungszustand
// ==========================================
// Zuständigkeit: alle Repositories, Engines und APIs explizit
// konstruieren und verdrahten. Es gibt keinen ambienten globalen
// Zustand; die Oberfläche bekommt genau diese eine Struktur.
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::api::{
    ArticleApi, MasterDataApi, RecipientApi, SettingsApi, StockApi, WarningApi,
};
use crate::config::settings::{default_data_dir, SettingsStore};
use crate::engine::dispatch::{
    DisabledMailer, MailTransport, NotificationDispatcher, SmtpConfig, SmtpMailer,
};
use crate::engine::label::{LabelFormat, LabelPrinter, SpoolDirPrinter};
use crate::engine::ledger::InventoryLedger;
use crate::engine::monitor::StockMonitor;
use crate::engine::movement_log::MovementLogger;
use crate::engine::stock_in::StockInOperation;
use crate::engine::stock_out::StockOutOperation;
use crate::repository::article_repo::ArticleRepository;
use crate::repository::master_data_repo::{CostCenterRepository, StorageLocationRepository};
use crate::repository::partner_repo::PartnerRepository;
use crate::repository::recipient_repo::RecipientRepository;
use crate::repository::unit_repo::UnitRepository;

/// Zeitbudget für die Startsicherung; danach wird sie übersprungen,
/// nicht wartend festgehalten.
const STARTUP_BACKUP_TIMEOUT_SECS: u64 = 30;

// ==========================================
// AppOptions - Bauplan des Anwendungszustands
// ==========================================
pub struct AppOptions {
    /// Pfad der SQLite-Datei
    pub db_path: String,
    /// Datenverzeichnis (Einstellungsdateien, Bewegungsdatei, Spool)
    pub data_dir: PathBuf,
    /// SMTP-Zugang; None lässt jeden Versand definiert fehlschlagen,
    /// betroffene Artikel bleiben für den Neuversand vorgemerkt
    pub smtp: Option<SmtpConfig>,
}

impl AppOptions {
    /// Standardaufbau im Datenverzeichnis des Benutzers
    pub fn default_paths(smtp: Option<SmtpConfig>) -> Self {
        let data_dir = default_data_dir();
        Self {
            db_path: data_dir.join("laga.db").display().to_string(),
            data_dir,
            smtp,
        }
    }
}

// ==========================================
// AppState
// ==========================================

/// Anwendungszustand mit allen API-Instanzen
pub struct AppState {
    pub db_path: String,
    pub data_dir: PathBuf,

    pub article_api: Arc<ArticleApi>,
    pub master_data_api: Arc<MasterDataApi>,
    pub recipient_api: Arc<RecipientApi>,
    pub stock_api: Arc<StockApi>,
    pub warning_api: Arc<WarningApi>,
    pub settings_api: Arc<SettingsApi>,
}

impl AppState {
    /// Anwendungszustand mit Standardpfaden aufbauen
    pub fn new(smtp: Option<SmtpConfig>) -> Result<Self, String> {
        Self::with_options(AppOptions::default_paths(smtp))
    }

    /// Anwendungszustand aus expliziten Optionen aufbauen.
    ///
    /// Öffnet die Datenbank, legt das Schema bei Bedarf an und
    /// verdrahtet Repositories, Engines und APIs.
    pub fn with_options(options: AppOptions) -> Result<Self, String> {
        tracing::info!(datenbank = %options.db_path, "Initialisiere Anwendungszustand");

        let conn = crate::db::open_sqlite_connection(&options.db_path)
            .map_err(|e| format!("Datenbank nicht öffenbar: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("Schema nicht anlegbar: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ===== Repository-Schicht =====
        let article_repo = Arc::new(ArticleRepository::new(conn.clone()));
        let unit_repo = Arc::new(UnitRepository::new(conn.clone()));
        let partner_repo = Arc::new(PartnerRepository::new(conn.clone()));
        let cost_center_repo = Arc::new(CostCenterRepository::new(conn.clone()));
        let storage_location_repo = Arc::new(StorageLocationRepository::new(conn.clone()));
        let recipient_repo = Arc::new(RecipientRepository::new(conn));

        // ===== Einstellungen, Drucker, Bewegungsdatei =====
        let settings_store = Arc::new(SettingsStore::new(&options.data_dir));
        let printer_name = settings_store
            .selected_printer()
            .map_err(|e| format!("Druckereinstellung nicht lesbar: {}", e))?;
        let label_format = LabelFormat::for_printer(&printer_name);
        let printer: Arc<dyn LabelPrinter> = Arc::new(SpoolDirPrinter::new(
            options.data_dir.join("spool"),
            printer_name,
        ));
        let movement_log = Arc::new(MovementLogger::new(
            options.data_dir.join("bewegungen.log"),
        ));

        // ===== Mail-Transport =====
        let transport: Arc<dyn MailTransport> = match &options.smtp {
            Some(config) => Arc::new(
                SmtpMailer::new(config).map_err(|e| format!("SMTP-Aufbau fehlgeschlagen: {}", e))?,
            ),
            None => {
                tracing::warn!("Kein SMTP-Zugang hinterlegt, Warnmails schlagen fehl");
                Arc::new(DisabledMailer)
            }
        };

        // ===== Engine-Schicht =====
        let ledger = Arc::new(InventoryLedger::new(article_repo.clone(), unit_repo.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            recipient_repo.clone(),
            partner_repo.clone(),
            cost_center_repo.clone(),
            transport,
        ));
        let monitor = Arc::new(StockMonitor::new(
            article_repo.clone(),
            ledger.clone(),
            dispatcher,
        ));
        let stock_in_op = Arc::new(StockInOperation::new(
            article_repo.clone(),
            unit_repo.clone(),
            ledger.clone(),
            movement_log.clone(),
            printer.clone(),
            label_format,
        ));
        let stock_out_op = Arc::new(StockOutOperation::new(
            article_repo.clone(),
            unit_repo.clone(),
            movement_log,
        ));

        // ===== API-Schicht =====
        let article_api = Arc::new(ArticleApi::new(article_repo.clone(), ledger));
        let master_data_api = Arc::new(MasterDataApi::new(
            partner_repo,
            cost_center_repo,
            storage_location_repo,
        ));
        let recipient_api = Arc::new(RecipientApi::new(recipient_repo));
        let stock_api = Arc::new(StockApi::new(
            stock_in_op,
            stock_out_op,
            monitor.clone(),
            article_repo,
            unit_repo,
            printer,
            label_format,
        ));
        let warning_api = Arc::new(WarningApi::new(monitor));
        let settings_api = Arc::new(SettingsApi::new(settings_store));

        tracing::info!("Anwendungszustand aufgebaut");

        Ok(Self {
            db_path: options.db_path,
            data_dir: options.data_dir,
            article_api,
            master_data_api,
            recipient_api,
            stock_api,
            warning_api,
            settings_api,
        })
    }

    /// Startsicherung: Kopie der Datenbankdatei ins
    /// Sicherungsverzeichnis, mit grobem Zeitbudget.
    ///
    /// Scheitern oder Überschreiten des Budgets wird nur gemeldet;
    /// der Start läuft weiter.
    pub async fn startup_backup(&self) {
        let backup_dir = match SettingsStore::new(&self.data_dir).effective_backup_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(fehler = %e, "Sicherungspfad nicht bestimmbar, Sicherung übersprungen");
                return;
            }
        };

        let source = self.db_path.clone();
        let target = backup_dir.join(format!(
            "laga-{}.db",
            Utc::now().format("%Y%m%d-%H%M%S")
        ));

        let copy = async {
            tokio::fs::create_dir_all(&backup_dir).await?;
            tokio::fs::copy(&source, &target).await
        };

        match tokio::time::timeout(Duration::from_secs(STARTUP_BACKUP_TIMEOUT_SECS), copy).await {
            Ok(Ok(bytes)) => {
                tracing::info!(ziel = %target.display(), bytes, "Startsicherung geschrieben");
            }
            Ok(Err(e)) => {
                tracing::warn!(fehler = %e, "Startsicherung fehlgeschlagen, Start läuft weiter");
            }
            Err(_) => {
                tracing::warn!(
                    budget_s = STARTUP_BACKUP_TIMEOUT_SECS,
                    "Startsicherung überschreitet das Zeitbudget, übersprungen"
                );
            }
        }
    }
}
