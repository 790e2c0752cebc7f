use std::collections::BTreeSet;

use allocation_buddy::{
    entities::{AllocationSettings, AutoConfirm, TotalsSortMode},
    session::AllocationSession,
    util::AllocationBuddy,
};

fn triples<C, A, E>(session: &AllocationSession<C, A, E>) -> BTreeSet<(String, String, u32)>
where
    C: allocation_buddy::entities::ConfirmationHandler,
    A: allocation_buddy::session::ArchiveRepository,
    E: allocation_buddy::session::EntriesRepository,
{
    session
        .aggregate()
        .locations()
        .iter()
        .flat_map(|l| {
            l.items
                .iter()
                .map(move |i| (l.location.clone(), i.item_number.clone(), i.quantity))
        })
        .collect()
}

const SHEET: &str = "Location\tLocation Name\tItem Number\tDescription\tQuantity\tSKU\n\
                     101\tMain St, North\tI100\tWidget \"XL\"\t5\t0001\n\
                     101\tMain St, North\tI200\tBolt\t1,200\t\n\
                     102\tHarbor\tI100\tWidget \"XL\"\t3\t0001\n";

#[tokio::test]
async fn test_csv_export_then_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let buddy = AllocationBuddy::new(AllocationSettings::with_data_dir(dir.path()));
    let mut session = buddy.open_session(AutoConfirm);
    session.import_text(SHEET).await.unwrap();
    let before = triples(&session);

    let csv = session.export_csv().unwrap();
    assert!(csv.starts_with("Location,Location Name,Item Number,Description,Quantity,SKU\n"));

    let mut reimported = buddy.open_session(AutoConfirm);
    reimported.import_text(&csv).await.unwrap();
    assert_eq!(triples(&reimported), before);
    assert_eq!(
        reimported.aggregate().location("101").unwrap().location_name.as_deref(),
        Some("Main St, North")
    );
}

#[tokio::test]
async fn test_xlsx_export_file_then_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let buddy = AllocationBuddy::new(AllocationSettings::with_data_dir(dir.path()));
    let mut session = buddy.open_session(AutoConfirm);
    session.import_text(SHEET).await.unwrap();

    let path = dir.path().join("allocations.xlsx");
    session.export_to_file(&path).await.unwrap();

    let mut reimported = buddy.open_session(AutoConfirm);
    let report = reimported.import_files(&[&path]).await;
    assert!(report.is_success(), "{:?}", report);
    assert_eq!(triples(&reimported), triples(&session));
    assert_eq!(reimported.session_name(), Some("allocations"));
}

#[tokio::test]
async fn test_multi_file_import_tolerates_bad_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("north.csv");
    let bad = dir.path().join("broken.csv");
    let unsupported = dir.path().join("notes.pdf");
    let south = dir.path().join("south.tsv");
    std::fs::write(&good, "S1,I100,2\nS1,I200,1\n").unwrap();
    std::fs::write(&bad, "S2,I100,lots\n").unwrap();
    std::fs::write(&unsupported, "whatever").unwrap();
    std::fs::write(&south, "S3\tI100\t4\n").unwrap();

    let buddy = AllocationBuddy::new(AllocationSettings::with_data_dir(dir.path()));
    let mut session = buddy.open_session(AutoConfirm);
    let report = session
        .import_files(&[&bad, &good, &unsupported, &south])
        .await;

    assert_eq!(report.files.len(), 4);
    assert_eq!(report.failed().count(), 2);
    assert_eq!(report.succeeded().map(|f| f.entry_count).sum::<usize>(), 3);
    let message = report.files[0].error.as_deref().unwrap();
    assert!(message.contains("Invalid quantity 'lots'"), "{}", message);
    assert!(!message.contains("ServerError"), "{}", message);
    let summary = report.summary.unwrap();
    assert_eq!(summary.locations, 2);
    assert_eq!(summary.units, 7);
    assert_eq!(session.session_name(), Some("north"));
}

#[tokio::test]
async fn test_multi_file_import_all_failed_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("broken.csv");
    std::fs::write(&bad, "S2,I100,-4\n").unwrap();

    let buddy = AllocationBuddy::new(AllocationSettings::with_data_dir(dir.path()));
    let mut session = buddy.open_session(AutoConfirm);
    session.import_text("S1\tI100\t1\n").await.unwrap();

    let report = session.import_files(&[&bad]).await;
    assert!(!report.is_success());
    assert!(report.files[0].error.is_some());
    assert_eq!(session.aggregate().item_quantity("I100"), 1);
}

#[tokio::test]
async fn test_multi_file_import_with_overflowing_sum_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.tsv");
    let second = dir.path().join("second.tsv");
    std::fs::write(&first, "S1\tI1\t4000000000\n").unwrap();
    std::fs::write(&second, "S1\tI1\t4000000000\n").unwrap();

    let buddy = AllocationBuddy::new(AllocationSettings::with_data_dir(dir.path()));
    let mut session = buddy.open_session(AutoConfirm);
    session.import_text("S1\tI100\t1\n").await.unwrap();

    let report = session.import_files(&[&first, &second]).await;
    assert!(!report.is_success());
    assert!(report.error.is_some());
    assert_eq!(report.failed().count(), 0);
    assert_eq!(session.aggregate().item_quantity("I100"), 1);
    assert_eq!(session.aggregate().item_quantity("I1"), 0);
    assert_eq!(session.session_name(), None);
}

#[tokio::test]
async fn test_store_ids_sharing_a_dictionary_name_survive_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let stores = dir.path().join("stores.csv");
    std::fs::write(&stores, "Code,Name\n101,Main Street\n").unwrap();
    let mut settings = AllocationSettings::with_data_dir(dir.path());
    settings.store_dictionary = Some(stores);
    let buddy = AllocationBuddy::new(settings);
    buddy.load_dictionaries().await.unwrap();

    let mut session = buddy.open_session(AutoConfirm);
    session
        .import_text("Store,Store Name,Item,Qty\nS1,Main Street,I1,2\nS2,Main Street,I1,3\n")
        .await
        .unwrap();
    let codes: Vec<_> = session
        .aggregate()
        .locations()
        .iter()
        .map(|l| l.location.clone())
        .collect();
    assert_eq!(codes, vec!["S1", "S2"]);

    let mut reimported = buddy.open_session(AutoConfirm);
    reimported
        .import_text(&session.export_csv().unwrap())
        .await
        .unwrap();
    assert_eq!(triples(&reimported), triples(&session));
    assert_eq!(
        reimported.aggregate().location("S1").unwrap().location_name.as_deref(),
        Some("Main Street")
    );
}

#[tokio::test]
async fn test_import_uses_loaded_dictionaries() {
    let dir = tempfile::tempdir().unwrap();
    let items = dir.path().join("items.csv");
    let stores = dir.path().join("stores.csv");
    std::fs::write(&items, "ItemNumber,Description,SKU\nI100,Widget,0001\n").unwrap();
    std::fs::write(&stores, "Code,Name\n101,Main Street Market\n").unwrap();

    let mut settings = AllocationSettings::with_data_dir(dir.path());
    settings.item_dictionary = Some(items);
    settings.store_dictionary = Some(stores);
    let buddy = AllocationBuddy::new(settings);
    buddy.load_dictionaries().await.unwrap();

    let mut session = buddy.open_session(AutoConfirm);
    session
        .import_text("Store,Store Name,Item,Qty\n,Main Stret Market,0001,2\n101,,i100,3\n")
        .await
        .unwrap();

    let locations = session.aggregate().locations();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].location, "101");
    assert_eq!(locations[0].location_name.as_deref(), Some("Main Street Market"));
    assert_eq!(locations[0].items.len(), 1);
    assert_eq!(locations[0].items[0].item_number, "I100");
    assert_eq!(locations[0].items[0].description, "Widget");
    assert_eq!(locations[0].items[0].quantity, 5);
}

#[tokio::test]
async fn test_moves_conserve_totals_and_feed_item_totals() {
    let dir = tempfile::tempdir().unwrap();
    let buddy = AllocationBuddy::new(AllocationSettings::with_data_dir(dir.path()));
    let mut session = buddy.open_session(AutoConfirm);
    session
        .import_text("S1\tI100\t3\nS2\tI100\t1\nS2\tI200\t6\n")
        .await
        .unwrap();

    assert!(session.remove_one("S2", "I100"));
    assert!(session.remove_one("S1", "I100"));
    assert!(session.add_one(Some("S1"), "I100"));
    assert_eq!(session.move_from_pool("S3", "I100", 10), 1);
    assert_eq!(session.aggregate().item_quantity("I100"), 4);
    assert!(session.aggregate().location("S2").unwrap().item("I100").is_none());

    let totals = session.item_totals(TotalsSortMode::QuantityDescending);
    assert_eq!(totals[0].item_number, "I200");
    assert_eq!(totals[1].item_number, "I100");
    assert_eq!(totals[1].allocated, 4);
    assert_eq!(totals[1].location_count, 2);
    assert_eq!(totals[1].pool_remaining, 0);

    let filtered = session.filter_totals("i1", TotalsSortMode::default());
    assert_eq!(filtered.len(), 1);
    let views = session.item_views();
    assert_eq!(views.len(), 2);
    assert!(session.status().starts_with("3 location(s) (3 active), 10 allocated, 0 in pool"));
}
