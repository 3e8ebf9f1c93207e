// ==========================================
// LAGA Lagerverwaltung - Warnmail-Versand
// ==========================================
// Kontrakt: dispatch() meldet genau dann Erfolg, wenn die Nachricht
// für ALLE hinterlegten Empfänger angenommen wurde. Teilzustellung
// zählt als Fehlschlag, bereits versendete Einzelmails werden aber
// nicht "zurückgeholt". Keine Empfänger hinterlegt = Fehlschlag
// (es wurde nichts versendet).
// ==========================================

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::article::Article;
use crate::domain::master_data::CostCenter;
use crate::domain::partner::BusinessPartner;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::master_data_repo::CostCenterRepository;
use crate::repository::partner_repo::PartnerRepository;
use crate::repository::recipient_repo::RecipientRepository;

/// Zeichenbudget des Artikelnamens in der Betreffzeile
const SUBJECT_NAME_BUDGET: usize = 40;

// ==========================================
// MailTransport - Übergabestelle an den Mail-Stack
// ==========================================
// Anbieter-Anmeldung und Transport liegen außerhalb; Tests hängen
// hier eine Attrappe ein.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Eine einzelne Nachricht an eine Adresse übergeben
    async fn send(&self, to: &str, subject: &str, body: &str) -> EngineResult<()>;
}

// ==========================================
// SmtpMailer - produktiver Transport über lettre
// ==========================================

/// Zugangsdaten und Absender für den SMTP-Versand
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> EngineResult<Self> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| EngineError::Mail(format!("Absenderadresse ungültig: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| EngineError::Mail(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> EngineResult<()> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| EngineError::Mail(format!("Empfängeradresse '{}' ungültig: {}", to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| EngineError::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EngineError::Mail(e.to_string()))?;
        Ok(())
    }
}

// ==========================================
// DisabledMailer - Platzhalter ohne SMTP-Zugang
// ==========================================
// Solange keine Zugangsdaten hinterlegt sind, schlägt jede Übergabe
// definiert fehl; betroffene Artikel bleiben für den
// Sammel-Neuversand vorgemerkt.
pub struct DisabledMailer;

#[async_trait]
impl MailTransport for DisabledMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> EngineResult<()> {
        Err(EngineError::Mail(
            "Kein SMTP-Zugang hinterlegt".to_string(),
        ))
    }
}

// ==========================================
// Vorlage
// ==========================================

/// Artikelname für die Betreffzeile kürzen: höchstens 40 Zeichen,
/// bei Kürzung mit "..." markiert.
pub fn truncate_subject_name(name: &str) -> String {
    if name.chars().count() <= SUBJECT_NAME_BUDGET {
        name.to_string()
    } else {
        let mut shortened: String = name.chars().take(SUBJECT_NAME_BUDGET).collect();
        shortened.push_str("...");
        shortened
    }
}

/// Betreff und Rumpf der Warnmail zusammensetzen (reine Funktion,
/// ohne Datenbank- oder Netzzugriff).
pub fn compose_warning_mail(
    article: &Article,
    current_stock: i64,
    supplier: &BusinessPartner,
    manufacturer: &BusinessPartner,
    cost_center: &CostCenter,
) -> (String, String) {
    let subject = format!(
        "Mindestbestandswarnung: {}",
        truncate_subject_name(&article.name)
    );

    let body = format!(
        "Der Artikel \"{name}\" hat den Mindestbestand erreicht.\n\
         \n\
         Aktueller Bestand: {stock}\n\
         Mindestbestand: {min}\n\
         Maximalbestand: {max}\n\
         Benötigte Menge: {need}\n\
         \n\
         Lieferant: {s_name}\n\
           E-Mail: {s_mail}\n\
           Telefon: {s_phone}\n\
           Webseite: {s_web}\n\
         \n\
         Hersteller: {m_name}\n\
           E-Mail: {m_mail}\n\
           Telefon: {m_phone}\n\
           Webseite: {m_web}\n\
         \n\
         Kostenstelle: {kst}\n\
         \n\
         Diese Nachricht wurde automatisch von LAGA erzeugt.\n",
        name = article.name,
        stock = current_stock,
        min = article.min_stock,
        max = article.max_stock,
        need = article.quantity_needed(current_stock),
        s_name = supplier.name,
        s_mail = supplier.email,
        s_phone = supplier.phone,
        s_web = supplier.website,
        m_name = manufacturer.name,
        m_mail = manufacturer.email,
        m_phone = manufacturer.phone,
        m_web = manufacturer.website,
        kst = cost_center.name,
    );

    (subject, body)
}

// ==========================================
// NotificationDispatcher
// ==========================================

pub struct NotificationDispatcher {
    recipient_repo: Arc<RecipientRepository>,
    partner_repo: Arc<PartnerRepository>,
    cost_center_repo: Arc<CostCenterRepository>,
    transport: Arc<dyn MailTransport>,
}

impl NotificationDispatcher {
    pub fn new(
        recipient_repo: Arc<RecipientRepository>,
        partner_repo: Arc<PartnerRepository>,
        cost_center_repo: Arc<CostCenterRepository>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            recipient_repo,
            partner_repo,
            cost_center_repo,
            transport,
        }
    }

    /// Alle hinterlegten Empfänger über die Bestandsunterschreitung
    /// informieren.
    ///
    /// # Rückgabe
    /// - Ok(true): von allen Empfängern angenommen
    /// - Ok(false): keine Empfänger oder mindestens eine Übergabe
    ///   fehlgeschlagen (Einzelerfolge bleiben bestehen)
    /// - Err(...): Stammdaten zum Artikel nicht ladbar
    pub async fn dispatch(&self, article: &Article, current_stock: i64) -> EngineResult<bool> {
        let recipients = self.recipient_repo.list_all()?;
        if recipients.is_empty() {
            warn!(artikel = %article.name, "Keine Warnmail-Empfänger hinterlegt, Versand gilt als fehlgeschlagen");
            return Ok(false);
        }

        let supplier = self
            .partner_repo
            .find_by_id(&article.supplier_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Lieferant".to_string(),
                id: article.supplier_id.clone(),
            })?;
        let manufacturer = self
            .partner_repo
            .find_by_id(&article.manufacturer_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Hersteller".to_string(),
                id: article.manufacturer_id.clone(),
            })?;
        let cost_center = self
            .cost_center_repo
            .find_by_id(&article.cost_center_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Kostenstelle".to_string(),
                id: article.cost_center_id.clone(),
            })?;

        let (subject, body) =
            compose_warning_mail(article, current_stock, &supplier, &manufacturer, &cost_center);

        let mut all_accepted = true;
        for recipient in &recipients {
            match self.transport.send(&recipient.email, &subject, &body).await {
                Ok(()) => {
                    info!(artikel = %article.name, empfaenger = %recipient.email, "Warnmail übergeben");
                }
                Err(e) => {
                    // Einzelfehlschlag: weiterversenden, Gesamtresultat kippt
                    warn!(
                        artikel = %article.name,
                        empfaenger = %recipient.email,
                        fehler = %e,
                        "Warnmail-Übergabe fehlgeschlagen"
                    );
                    all_accepted = false;
                }
            }
        }

        Ok(all_accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{PartnerRole, UnitKind};
    use chrono::Utc;
    use std::sync::Mutex;

    struct RecordingTransport {
        sent: Mutex<Vec<String>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, to: &str, _subject: &str, _body: &str) -> EngineResult<()> {
            if self.fail_for.as_deref() == Some(to) {
                return Err(EngineError::Mail("Relais nicht erreichbar".to_string()));
            }
            self.sent.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    fn make_article() -> Article {
        Article {
            article_id: "a1".to_string(),
            name: "Schraube M6".to_string(),
            supplier_id: "s1".to_string(),
            manufacturer_id: "m1".to_string(),
            cost_center_id: "k1".to_string(),
            storage_location_id: "l1".to_string(),
            lead_time_days: 3,
            unit_kind: UnitKind::Single,
            min_stock: 10,
            max_stock: 50,
            warning_created_at: None,
            last_warning_sent_at: None,
            is_warning_active: false,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn make_partner(role: PartnerRole) -> BusinessPartner {
        BusinessPartner {
            partner_id: "x".to_string(),
            role,
            name: "Firma".to_string(),
            website: "https://firma.de".to_string(),
            email: "info@firma.de".to_string(),
            phone: "030123".to_string(),
        }
    }

    fn setup_dispatcher(
        recipient_emails: &[&str],
        fail_for: Option<&str>,
    ) -> (NotificationDispatcher, Arc<RecordingTransport>) {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO business_partner VALUES ('s1','SUPPLIER','Schrauben Groß','https://sg.de','info@sg.de','0301234');
            INSERT INTO business_partner VALUES ('m1','MANUFACTURER','Stahlwerk Nord','https://swn.de','kontakt@swn.de','0405678');
            INSERT INTO cost_center VALUES ('k1','Instandhaltung');
            "#,
        )
        .unwrap();
        for (i, email) in recipient_emails.iter().enumerate() {
            conn.execute(
                "INSERT INTO recipient (recipient_id, email) VALUES (?, ?)",
                rusqlite::params![format!("r{}", i), email],
            )
            .unwrap();
        }

        let conn = Arc::new(Mutex::new(conn));
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
            fail_for: fail_for.map(|s| s.to_string()),
        });
        let dispatcher = NotificationDispatcher::new(
            Arc::new(RecipientRepository::new(conn.clone())),
            Arc::new(PartnerRepository::new(conn.clone())),
            Arc::new(CostCenterRepository::new(conn)),
            transport.clone(),
        );
        (dispatcher, transport)
    }

    #[test]
    fn test_truncate_subject_name() {
        assert_eq!(truncate_subject_name("kurz"), "kurz");

        let exactly_40 = "a".repeat(40);
        assert_eq!(truncate_subject_name(&exactly_40), exactly_40);

        let long = "b".repeat(41);
        let truncated = truncate_subject_name(&long);
        assert_eq!(truncated.chars().count(), 43);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_compose_warning_mail_fields() {
        let article = make_article();
        let (subject, body) = compose_warning_mail(
            &article,
            9,
            &make_partner(PartnerRole::Supplier),
            &make_partner(PartnerRole::Manufacturer),
            &CostCenter {
                cost_center_id: "k1".to_string(),
                name: "Instandhaltung".to_string(),
            },
        );

        assert_eq!(subject, "Mindestbestandswarnung: Schraube M6");
        assert!(body.contains("Aktueller Bestand: 9"));
        assert!(body.contains("Mindestbestand: 10"));
        assert!(body.contains("Maximalbestand: 50"));
        // |50 - 9| = 41
        assert!(body.contains("Benötigte Menge: 41"));
        assert!(body.contains("Kostenstelle: Instandhaltung"));
    }

    #[tokio::test]
    async fn test_dispatch_success_requires_all_recipients() {
        let (dispatcher, transport) =
            setup_dispatcher(&["a@example.de", "b@example.de"], None);

        let ok = dispatcher.dispatch(&make_article(), 9).await.unwrap();
        assert!(ok);
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_partial_failure_is_overall_failure() {
        let (dispatcher, transport) =
            setup_dispatcher(&["a@example.de", "b@example.de"], Some("b@example.de"));

        let ok = dispatcher.dispatch(&make_article(), 9).await.unwrap();
        assert!(!ok);
        // Der erfolgreiche Einzelversand wird nicht zurückgenommen
        assert_eq!(transport.sent.lock().unwrap().as_slice(), ["a@example.de"]);
    }

    #[tokio::test]
    async fn test_dispatch_without_recipients_is_failure() {
        let (dispatcher, transport) = setup_dispatcher(&[], None);

        let ok = dispatcher.dispatch(&make_article(), 9).await.unwrap();
        assert!(!ok);
        assert!(transport.sent.lock().unwrap().is_empty());
    }
}
