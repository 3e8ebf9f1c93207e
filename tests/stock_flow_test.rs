// ==========================================
// Integrationstest: Ein- und Auslagern
// ==========================================
// Deckt beide Auslagerwege (Scan und manuelle Auswahl), die
// Bewegungsdatei und die Etikettenseite über den kompletten Stapel ab.
// ==========================================


use std::collections::HashSet;

use test_helpers::{article_draft, build_stack, seed_master_data};

#[tokio::test]
async fn test_stock_in_creates_units_labels_and_log_line() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    let article = stack
        .article_api
        .create_article(&article_draft(&seed, "Schraube M6", 2, 30))
        .unwrap();

    let outcome = stack.stock_api.stock_in(&article.article_id, 7).await.unwrap();

    assert_eq!(outcome.stock_before, 0);
    assert_eq!(outcome.stock_after, 7);
    assert!(outcome.log_written);
    assert!(outcome.labels_printed);

    // Sieben paarweise verschiedene 10-stellige Barcodes
    let distinct: HashSet<&String> = outcome.barcodes.iter().collect();
    assert_eq!(distinct.len(), 7);
    assert!(outcome
        .barcodes
        .iter()
        .all(|b| b.len() == 10 && b.chars().all(|c| c.is_ascii_digit())));

    // Live-Zählung deckt sich mit dem Bericht
    let listed = stack.article_api.list_articles().unwrap();
    assert_eq!(listed[0].current_stock, 7);

    // Je Einheit ein Etikett mit Code128-Block
    assert_eq!(stack.printer.job_count(), 7);
    assert!(stack.printer.jobs.lock().unwrap()[0].contains("^BC"));

    // Eine Bewegungszeile im festen Pipe-Format
    let log = stack.movement_log_content();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Artikel: Schraube M6 | Aktion: Einlagern | Datum: "));
    assert!(lines[0].contains("| Menge: 7 | Bestand vorher: 0 | Bestand nachher: 7 | Barcodes: ["));
}

#[tokio::test]
async fn test_printer_failure_reports_but_keeps_units() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    let article = stack
        .article_api
        .create_article(&article_draft(&seed, "Schraube M6", 2, 30))
        .unwrap();

    stack.printer.set_fail(true);
    let outcome = stack.stock_api.stock_in(&article.article_id, 3).await.unwrap();

    // Einlagerung bleibt bestehen, nur die Etiketten fehlen
    assert!(!outcome.labels_printed);
    assert_eq!(outcome.stock_after, 3);
    assert_eq!(
        stack
            .stock_api
            .units_for_article(&article.article_id)
            .unwrap()
            .len(),
        3
    );

    // Nachdruck über die Ansichtsmaske, sobald der Drucker wieder da ist
    stack.printer.set_fail(false);
    let newest = stack.stock_api.newest_batch(&article.article_id).unwrap();
    let ids: Vec<String> = newest.iter().map(|u| u.unit_id.clone()).collect();
    assert_eq!(stack.stock_api.reprint_labels(&ids).await.unwrap(), 3);
}

#[tokio::test]
async fn test_scan_session_spanning_articles_logs_per_article() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);
    stack.recipient_api.add_recipient("lager@example.de").unwrap();

    let bolts = stack
        .article_api
        .create_article(&article_draft(&seed, "Bolt-M6", 1, 20))
        .unwrap();
    let nuts = stack
        .article_api
        .create_article(&article_draft(&seed, "Mutter M8", 1, 20))
        .unwrap();

    let bolt_in = stack.stock_api.stock_in(&bolts.article_id, 3).await.unwrap();
    let nut_in = stack.stock_api.stock_in(&nuts.article_id, 2).await.unwrap();

    // Gemischte Scan-Sitzung über beide Artikel
    stack.stock_api.start_scan_session().unwrap();
    stack
        .stock_api
        .scan_barcode(&bolt_in.barcodes[0])
        .unwrap()
        .expect("Kette frei");
    stack
        .stock_api
        .scan_barcode(&nut_in.barcodes[0])
        .unwrap()
        .expect("Kette frei");
    stack
        .stock_api
        .scan_barcode(&bolt_in.barcodes[1])
        .unwrap()
        .expect("Kette frei");

    // Unbekannter Barcode ändert nichts an der Sitzung
    assert!(stack.stock_api.scan_barcode("1111111111").is_err());
    assert_eq!(stack.stock_api.scanned_units().unwrap().len(), 3);

    let outcomes = stack.stock_api.commit_scan_session().await.unwrap();

    // Je betroffenem Artikel ein Ergebnis und eine Protokollzeile
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].article_name, "Bolt-M6");
    assert_eq!(outcomes[0].quantity, 2);
    assert_eq!(outcomes[0].stock_after, 1);
    assert_eq!(outcomes[1].article_name, "Mutter M8");
    assert_eq!(outcomes[1].quantity, 1);
    assert_eq!(outcomes[1].stock_after, 1);

    let log = stack.movement_log_content();
    let out_lines: Vec<&str> = log
        .lines()
        .filter(|l| l.contains("Aktion: Auslagern"))
        .collect();
    assert_eq!(out_lines.len(), 2);

    // Nach dem Bestätigen ist die Sitzung weg
    assert!(stack.stock_api.scanned_units().is_err());
}

#[tokio::test]
async fn test_manual_selection_never_touches_other_articles() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    let bolts = stack
        .article_api
        .create_article(&article_draft(&seed, "Bolt-M6", 1, 20))
        .unwrap();
    let nuts = stack
        .article_api
        .create_article(&article_draft(&seed, "Mutter M8", 1, 20))
        .unwrap();

    stack.stock_api.stock_in(&bolts.article_id, 2).await.unwrap();
    let nut_in = stack.stock_api.stock_in(&nuts.article_id, 2).await.unwrap();

    // Eine fremde Einheit in der Auswahl bricht alles ab
    let nut_units = stack.stock_api.units_for_article(&nuts.article_id).unwrap();
    assert_eq!(nut_units.len(), nut_in.quantity as usize);

    let bolt_units = stack.stock_api.units_for_article(&bolts.article_id).unwrap();
    let mixed = vec![bolt_units[0].unit_id.clone(), nut_units[0].unit_id.clone()];
    assert!(stack
        .stock_api
        .stock_out_selected(&bolts.article_id, &mixed)
        .await
        .is_err());

    // Beide Bestände unverändert
    assert_eq!(
        stack
            .stock_api
            .units_for_article(&bolts.article_id)
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        stack
            .stock_api
            .units_for_article(&nuts.article_id)
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_double_stock_out_of_same_unit_is_a_conflict() {
    let stack = build_stack();
    let seed = seed_master_data(&stack);

    let article = stack
        .article_api
        .create_article(&article_draft(&seed, "Schraube M6", 1, 20))
        .unwrap();
    stack.stock_api.stock_in(&article.article_id, 3).await.unwrap();

    let units = stack.stock_api.units_for_article(&article.article_id).unwrap();
    let first = vec![units[0].unit_id.clone()];
    stack
        .stock_api
        .stock_out_selected(&article.article_id, &first)
        .await
        .unwrap();

    // Zweiter Dialog mit derselben Einheit: harter Abbruch, der
    // Restbestand bleibt unangetastet
    let stale = vec![units[0].unit_id.clone(), units[1].unit_id.clone()];
    assert!(stack
        .stock_api
        .stock_out_selected(&article.article_id, &stale)
        .await
        .is_err());
    assert_eq!(
        stack
            .stock_api
            .units_for_article(&article.article_id)
            .unwrap()
            .len(),
        2
    );
}
