// ==========================================
// Integrationstest: Stammdaten und Löschschutz
// ==========================================
// RESTRICT-Fremdschlüssel: Stammdaten, auf die noch ein Artikel
// zeigt, sind nicht löschbar; nach dem Entfernen der Verweise schon.
// ==========================================


use laga::api::ApiError;
use test_helpers::{article_draft, build_stack, seed_master_data};

#[tokio::test]
async fn test_referenced_storage_location_cannot_be_deleted() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    let article = stack
        .article_api
        .create_article(&article_draft(&seed, "Schraube M6", 2, 30))
        .unwrap();

    // Noch referenziert: Löschen abgelehnt
    let result = stack
        .master_data_api
        .delete_storage_location(&seed.storage_location_id);
    assert!(matches!(result, Err(ApiError::StillReferenced(_))));

    // Nach dem Löschen des Artikels klappt es
    stack.article_api.delete_article(&article.article_id).unwrap();
    stack
        .master_data_api
        .delete_storage_location(&seed.storage_location_id)
        .unwrap();
    assert!(stack
        .master_data_api
        .list_storage_locations()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_referenced_partner_and_cost_center_protected() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    stack
        .article_api
        .create_article(&article_draft(&seed, "Schraube M6", 2, 30))
        .unwrap();

    assert!(matches!(
        stack.master_data_api.delete_partner(&seed.supplier_id),
        Err(ApiError::StillReferenced(_))
    ));
    assert!(matches!(
        stack.master_data_api.delete_partner(&seed.manufacturer_id),
        Err(ApiError::StillReferenced(_))
    ));
    assert!(matches!(
        stack.master_data_api.delete_cost_center(&seed.cost_center_id),
        Err(ApiError::StillReferenced(_))
    ));
}

#[tokio::test]
async fn test_article_with_units_cannot_be_deleted() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    let article = stack
        .article_api
        .create_article(&article_draft(&seed, "Schraube M6", 2, 30))
        .unwrap();
    stack.stock_api.stock_in(&article.article_id, 1).await.unwrap();

    // Einheiten hängen am Artikel: erst auslagern, dann löschen
    assert!(matches!(
        stack.article_api.delete_article(&article.article_id),
        Err(ApiError::StillReferenced(_))
    ));

    let units = stack.stock_api.units_for_article(&article.article_id).unwrap();
    let ids: Vec<String> = units.iter().map(|u| u.unit_id.clone()).collect();
    stack
        .stock_api
        .stock_out_selected(&article.article_id, &ids)
        .await
        .unwrap();

    stack.article_api.delete_article(&article.article_id).unwrap();
}

#[tokio::test]
async fn test_article_validation_gate_end_to_end() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    // Grenzen verdreht
    let mut bad = article_draft(&seed, "Schraube M6", 30, 10);
    assert!(matches!(
        stack.article_api.create_article(&bad),
        Err(ApiError::Validation(_))
    ));

    // Beide Gebinde-Häkchen gesetzt
    bad = article_draft(&seed, "Schraube M6", 2, 30);
    bad.is_box = true;
    assert!(matches!(
        stack.article_api.create_article(&bad),
        Err(ApiError::Validation(_))
    ));

    // Wiederbeschaffungszeit außerhalb 1..=10
    bad = article_draft(&seed, "Schraube M6", 2, 30);
    bad.lead_time_days = 11;
    assert!(matches!(
        stack.article_api.create_article(&bad),
        Err(ApiError::Validation(_))
    ));

    // Gültig geht durch
    stack
        .article_api
        .create_article(&article_draft(&seed, "Schraube M6", 2, 30))
        .unwrap();
}
