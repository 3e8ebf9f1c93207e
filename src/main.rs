// ==========================================
// LAGA Lagerverwaltung - Hauptprogramm
// ==========================================
// Mit Feature "tauri-app": Desktop-Anwendung.
// Ohne Feature: kopfloser Start (Schema-Bootstrap, Startsicherung,
// Startabgleich des Bestandsmonitors) - nützlich für Diagnose und CI.
// ==========================================

// Kein Konsolenfenster im Release-Bau (Windows)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(feature = "tauri-app")]
fn main() {
    use laga::app::commands::*;
    use laga::app::AppState;

    laga::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", laga::APP_NAME);
    tracing::info!("Version: {}", laga::VERSION);
    tracing::info!("==================================================");

    // SMTP-Zugang kommt aus der Umgebung; ohne Zugang bleiben
    // Warnmails definiert fehlgeschlagen und werden nachversendet.
    let smtp = smtp_from_env();
    let app_state = AppState::new(smtp).expect("Anwendungszustand nicht aufbaubar");

    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ===== Artikel (4) =====
            list_articles,
            create_article,
            update_article,
            delete_article,
            // ===== Lieferanten / Hersteller (4) =====
            list_partners,
            create_partner,
            update_partner,
            delete_partner,
            // ===== Kostenstellen / Lagerorte (8) =====
            list_cost_centers,
            create_cost_center,
            rename_cost_center,
            delete_cost_center,
            list_storage_locations,
            create_storage_location,
            rename_storage_location,
            delete_storage_location,
            // ===== Empfänger (3) =====
            list_recipients,
            add_recipient,
            delete_recipient,
            // ===== Bestand (10) =====
            stock_in,
            start_scan_session,
            scan_barcode,
            scanned_units,
            cancel_scan_session,
            commit_scan_session,
            stock_out_selected,
            units_for_article,
            newest_batch,
            reprint_labels,
            // ===== Warnungen (3) =====
            active_warnings,
            retry_unsent_warnings,
            reconcile_warnings,
            // ===== Einstellungen (5) =====
            get_selected_printer,
            set_printer,
            get_backup_path,
            set_backup_path,
            clear_backup_path,
        ])
        .run(tauri::generate_context!())
        .expect("Tauri-Anwendung nicht startbar");
}

#[cfg(not(feature = "tauri-app"))]
#[tokio::main]
async fn main() {
    use laga::app::AppState;

    laga::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} (kopfloser Start)", laga::APP_NAME);
    tracing::info!("Version: {}", laga::VERSION);
    tracing::info!("==================================================");

    let smtp = smtp_from_env();
    let app_state = match AppState::new(smtp) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(fehler = %e, "Anwendungszustand nicht aufbaubar");
            std::process::exit(1);
        }
    };

    app_state.startup_backup().await;

    match app_state.warning_api.reconcile().await {
        Ok(summary) => tracing::info!(
            bewertet = summary.evaluated,
            warnungen = summary.warnings_active,
            "Startabgleich fertig"
        ),
        Err(e) => tracing::error!(fehler = %e, "Startabgleich fehlgeschlagen"),
    }

    tracing::info!("Für die Desktop-Anwendung: cargo run --features tauri-app");
}

/// SMTP-Zugang aus der Umgebung lesen; unvollständige Angaben
/// bedeuten "kein Versand konfiguriert".
fn smtp_from_env() -> Option<laga::engine::SmtpConfig> {
    let host = std::env::var("LAGA_SMTP_HOST").ok()?;
    let port = std::env::var("LAGA_SMTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(587);
    let username = std::env::var("LAGA_SMTP_USER").ok()?;
    let password = std::env::var("LAGA_SMTP_PASSWORD").ok()?;
    let from_address = std::env::var("LAGA_SMTP_FROM").ok()?;

    Some(laga::engine::SmtpConfig {
        host,
        port,
        username,
        password,
        from_address,
    })
}
