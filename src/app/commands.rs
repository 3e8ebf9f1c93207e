// ==========================================
// LAGA Lagerverwaltung - Tauri-Kommandos
// ==========================================
// Zuständigkeit: dünne Brücke zwischen Oberfläche und API-Schicht.
// Jedes Kommando ruft genau eine API-Operation und serialisiert das
// Ergebnis; Geschäftslogik liegt ausschließlich dahinter.
// ==========================================

#![cfg(feature = "tauri-app")]

use serde::Serialize;

use crate::api::ApiError;
use crate::app::state::AppState;
use crate::domain::article::ArticleDraft;
use crate::domain::partner::PartnerDraft;
use crate::domain::types::PartnerRole;

fn map_api_error(e: ApiError) -> String {
    e.to_string()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialisierung fehlgeschlagen: {}", e))
}

fn parse_role(role: &str) -> Result<PartnerRole, String> {
    PartnerRole::parse(role).ok_or_else(|| format!("Unbekannte Partnerrolle: {}", role))
}

// ==========================================
// Artikel
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn list_articles(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let rows = state.article_api.list_articles().map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn create_article(
    state: tauri::State<'_, AppState>,
    draft: ArticleDraft,
) -> Result<String, String> {
    let article = state
        .article_api
        .create_article(&draft)
        .map_err(map_api_error)?;
    to_json(&article)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_article(
    state: tauri::State<'_, AppState>,
    article_id: String,
    draft: ArticleDraft,
) -> Result<String, String> {
    let article = state
        .article_api
        .update_article(&article_id, &draft)
        .map_err(map_api_error)?;
    to_json(&article)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_article(
    state: tauri::State<'_, AppState>,
    article_id: String,
) -> Result<(), String> {
    state
        .article_api
        .delete_article(&article_id)
        .map_err(map_api_error)
}

// ==========================================
// Stammdaten: Lieferanten / Hersteller
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn list_partners(
    state: tauri::State<'_, AppState>,
    role: String,
) -> Result<String, String> {
    let partners = state
        .master_data_api
        .list_partners(parse_role(&role)?)
        .map_err(map_api_error)?;
    to_json(&partners)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn create_partner(
    state: tauri::State<'_, AppState>,
    role: String,
    draft: PartnerDraft,
) -> Result<String, String> {
    let partner = state
        .master_data_api
        .create_partner(parse_role(&role)?, &draft)
        .map_err(map_api_error)?;
    to_json(&partner)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_partner(
    state: tauri::State<'_, AppState>,
    partner_id: String,
    draft: PartnerDraft,
) -> Result<String, String> {
    let partner = state
        .master_data_api
        .update_partner(&partner_id, &draft)
        .map_err(map_api_error)?;
    to_json(&partner)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_partner(
    state: tauri::State<'_, AppState>,
    partner_id: String,
) -> Result<(), String> {
    state
        .master_data_api
        .delete_partner(&partner_id)
        .map_err(map_api_error)
}

// ==========================================
// Stammdaten: Kostenstellen / Lagerorte
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn list_cost_centers(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let rows = state
        .master_data_api
        .list_cost_centers()
        .map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn create_cost_center(
    state: tauri::State<'_, AppState>,
    name: String,
) -> Result<String, String> {
    let row = state
        .master_data_api
        .create_cost_center(&name)
        .map_err(map_api_error)?;
    to_json(&row)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn rename_cost_center(
    state: tauri::State<'_, AppState>,
    cost_center_id: String,
    name: String,
) -> Result<String, String> {
    let row = state
        .master_data_api
        .rename_cost_center(&cost_center_id, &name)
        .map_err(map_api_error)?;
    to_json(&row)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_cost_center(
    state: tauri::State<'_, AppState>,
    cost_center_id: String,
) -> Result<(), String> {
    state
        .master_data_api
        .delete_cost_center(&cost_center_id)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_storage_locations(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let rows = state
        .master_data_api
        .list_storage_locations()
        .map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn create_storage_location(
    state: tauri::State<'_, AppState>,
    name: String,
) -> Result<String, String> {
    let row = state
        .master_data_api
        .create_storage_location(&name)
        .map_err(map_api_error)?;
    to_json(&row)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn rename_storage_location(
    state: tauri::State<'_, AppState>,
    storage_location_id: String,
    name: String,
) -> Result<String, String> {
    let row = state
        .master_data_api
        .rename_storage_location(&storage_location_id, &name)
        .map_err(map_api_error)?;
    to_json(&row)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_storage_location(
    state: tauri::State<'_, AppState>,
    storage_location_id: String,
) -> Result<(), String> {
    state
        .master_data_api
        .delete_storage_location(&storage_location_id)
        .map_err(map_api_error)
}

// ==========================================
// Empfänger
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn list_recipients(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let rows = state.recipient_api.list_recipients().map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn add_recipient(
    state: tauri::State<'_, AppState>,
    email: String,
) -> Result<String, String> {
    let row = state
        .recipient_api
        .add_recipient(&email)
        .map_err(map_api_error)?;
    to_json(&row)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_recipient(
    state: tauri::State<'_, AppState>,
    recipient_id: String,
) -> Result<(), String> {
    state
        .recipient_api
        .delete_recipient(&recipient_id)
        .map_err(map_api_error)
}

// ==========================================
// Bestand
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn stock_in(
    state: tauri::State<'_, AppState>,
    article_id: String,
    quantity: i64,
) -> Result<String, String> {
    let outcome = state
        .stock_api
        .stock_in(&article_id, quantity)
        .await
        .map_err(map_api_error)?;
    to_json(&outcome)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn start_scan_session(state: tauri::State<'_, AppState>) -> Result<(), String> {
    state.stock_api.start_scan_session().map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn scan_barcode(
    state: tauri::State<'_, AppState>,
    barcode: String,
) -> Result<String, String> {
    let scanned = state
        .stock_api
        .scan_barcode(&barcode)
        .map_err(map_api_error)?;
    to_json(&scanned)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn scanned_units(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let rows = state.stock_api.scanned_units().map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn cancel_scan_session(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let dropped = state
        .stock_api
        .cancel_scan_session()
        .map_err(map_api_error)?;
    to_json(&dropped)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn commit_scan_session(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let outcomes = state
        .stock_api
        .commit_scan_session()
        .await
        .map_err(map_api_error)?;
    to_json(&outcomes)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn stock_out_selected(
    state: tauri::State<'_, AppState>,
    article_id: String,
    unit_ids: Vec<String>,
) -> Result<String, String> {
    let outcomes = state
        .stock_api
        .stock_out_selected(&article_id, &unit_ids)
        .await
        .map_err(map_api_error)?;
    to_json(&outcomes)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn units_for_article(
    state: tauri::State<'_, AppState>,
    article_id: String,
) -> Result<String, String> {
    let rows = state
        .stock_api
        .units_for_article(&article_id)
        .map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn newest_batch(
    state: tauri::State<'_, AppState>,
    article_id: String,
) -> Result<String, String> {
    let rows = state
        .stock_api
        .newest_batch(&article_id)
        .map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn reprint_labels(
    state: tauri::State<'_, AppState>,
    unit_ids: Vec<String>,
) -> Result<String, String> {
    let printed = state
        .stock_api
        .reprint_labels(&unit_ids)
        .await
        .map_err(map_api_error)?;
    to_json(&printed)
}

// ==========================================
// Warnungen
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn active_warnings(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let rows = state.warning_api.active_warnings().map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn retry_unsent_warnings(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let rows = state
        .warning_api
        .retry_unsent()
        .await
        .map_err(map_api_error)?;
    to_json(&rows)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn reconcile_warnings(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let summary = state
        .warning_api
        .reconcile()
        .await
        .map_err(map_api_error)?;
    to_json(&summary)
}

// ==========================================
// Einstellungen
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_selected_printer(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let printer = state
        .settings_api
        .selected_printer()
        .map_err(map_api_error)?;
    to_json(&printer)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn set_printer(
    state: tauri::State<'_, AppState>,
    printer_name: String,
) -> Result<String, String> {
    let saved = state
        .settings_api
        .set_printer(&printer_name)
        .map_err(map_api_error)?;
    to_json(&saved)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_backup_path(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let settings = state.settings_api.backup_path().map_err(map_api_error)?;
    to_json(&settings)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn set_backup_path(
    state: tauri::State<'_, AppState>,
    custom_path: String,
) -> Result<String, String> {
    let saved = state
        .settings_api
        .set_backup_path(&custom_path)
        .map_err(map_api_error)?;
    to_json(&saved)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn clear_backup_path(state: tauri::State<'_, AppState>) -> Result<(), String> {
    state.settings_api.clear_backup_path().map_err(map_api_error)
}
