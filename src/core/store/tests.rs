use chrono::NaiveDate;
use tempfile::TempDir;

use super::*;
use crate::core::clock::FixedClock;
use crate::core::metrics::{compute_incline, inclines_match};

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

fn store() -> BathtubStore {
    BathtubStore::open_in_memory()
        .unwrap()
        .with_clock(FixedClock(test_date()))
}

fn siena() -> Measurements {
    Measurements::new(176.0, 128.0, 71.0, 44.0)
}

fn eigenmarke() -> Measurements {
    Measurements::new(174.0, 146.5, 74.0, 42.0)
}

fn assert_validation(err: StoreError, expected_field: &str) {
    match err {
        StoreError::Validation { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected validation error on {expected_field}, got {other:?}"),
    }
}

#[test]
fn test_add_then_get_matches_engine() {
    let mut store = store();
    let added = store.add("Polypex Siena", siena()).unwrap();

    let fetched = store.get(added.id).unwrap();
    assert_eq!(fetched, added);
    assert_eq!(
        fetched.incline_degrees,
        compute_incline(176.0, 128.0, 44.0).unwrap()
    );
    assert!(inclines_match(fetched.incline_degrees, 28.61));
    assert_eq!(fetched.liters, Some(474.8));
    assert_eq!(fetched.created_at, test_date());
}

#[test]
fn test_eigenmarke_incline() {
    let mut store = store();
    let added = store.add("Eigenmarke", eigenmarke()).unwrap();
    assert!(inclines_match(added.incline_degrees, 18.13));
}

#[test]
fn test_name_is_trimmed_and_required() {
    let mut store = store();
    let added = store.add("  Siena  ", siena()).unwrap();
    assert_eq!(added.name, "Siena");

    assert_validation(store.add("   ", siena()).unwrap_err(), "name");
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_name_with_control_characters_rejected() {
    let mut store = store();
    assert_validation(store.add("Siena\tDeluxe", siena()).unwrap_err(), "name");
    assert_validation(store.add("Siena\nDeluxe", siena()).unwrap_err(), "name");

    let added = store.add("Siena", siena()).unwrap();
    let changes = BathtubUpdate {
        name: Some("Two\nlines".to_string()),
        ..Default::default()
    };
    assert_validation(store.update(added.id, &changes).unwrap_err(), "name");
    assert_eq!(store.get(added.id).unwrap().name, "Siena");
}

#[test]
fn test_non_positive_dimensions_rejected() {
    let mut store = store();
    let cases = [
        (Measurements::new(0.0, 128.0, 71.0, 44.0), "top_width"),
        (Measurements::new(176.0, -1.0, 71.0, 44.0), "bottom_width"),
        (Measurements::new(176.0, 128.0, 0.0, 44.0), "width"),
        (Measurements::new(176.0, 128.0, 71.0, 0.0), "height"),
        (Measurements::new(176.0, 128.0, 71.0, f64::NAN), "height"),
    ];
    for (measurements, field) in cases {
        assert_validation(store.add("Bad", measurements).unwrap_err(), field);
    }
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_measurements_the_engine_refuses_never_reach_disk() {
    let mut store = store();
    let added = store.add("Siena", siena()).unwrap();

    let bad = [
        Measurements::new(176.0, 128.0, 71.0, 0.0),
        Measurements::new(176.0, 128.0, 71.0, -44.0),
        Measurements::new(176.0, 128.0, 71.0, f64::INFINITY),
        Measurements::new(f64::INFINITY, 128.0, 71.0, 44.0),
        Measurements::new(176.0, f64::NAN, 71.0, 44.0),
    ];
    for measurements in bad {
        assert!(measurements.derive().is_err());

        let err = store.add("Bad", measurements).unwrap_err();
        assert!(
            matches!(err, StoreError::Validation { .. }),
            "add should fail validation before the engine runs, got {err:?}"
        );

        let changes = BathtubUpdate {
            top_width: Some(measurements.top_width),
            bottom_width: Some(measurements.bottom_width),
            height: Some(measurements.height),
            ..Default::default()
        };
        let err = store.update(added.id, &changes).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }), "got {err:?}");
    }

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.get(added.id).unwrap(), added);

    let engine_err = compute_incline(176.0, 128.0, 0.0).unwrap_err();
    assert!(matches!(
        StoreError::from(engine_err),
        StoreError::InvalidMeasurement(MetricError::InvalidMeasurement { field: "height", .. })
    ));
}

#[test]
fn test_inverted_trapezoid_rejected() {
    let mut store = store();
    let err = store
        .add("Upside down", Measurements::new(128.0, 176.0, 71.0, 44.0))
        .unwrap_err();
    assert_validation(err, "bottom_width");
}

#[test]
fn test_equal_widths_allowed() {
    let mut store = store();
    let added = store
        .add("Box", Measurements::new(150.0, 150.0, 70.0, 45.0))
        .unwrap();
    assert_eq!(added.incline_degrees, 0.0);
}

#[test]
fn test_ids_are_never_reused() {
    let mut store = store();
    let first = store.add("A", siena()).unwrap();
    let second = store.add("B", siena()).unwrap();
    assert!(second.id > first.id);

    store.delete(second.id).unwrap();
    assert!(matches!(
        store.get(second.id),
        Err(StoreError::NotFound { id }) if id == second.id
    ));

    let third = store.add("C", siena()).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn test_ids_not_reused_after_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data/bathtubs.db");

    let deleted_id = {
        let mut store = BathtubStore::open(&path).unwrap();
        store.add("A", siena()).unwrap();
        let b = store.add("B", siena()).unwrap();
        store.delete(b.id).unwrap();
        store.close().unwrap();
        b.id
    };

    let mut store = BathtubStore::open(&path).unwrap();
    assert_eq!(store.path(), Some(path.as_path()));
    let c = store.add("C", siena()).unwrap();
    assert!(c.id > deleted_id);
}

#[test]
fn test_delete_missing_is_not_found() {
    let mut store = store();
    assert!(matches!(
        store.delete(42),
        Err(StoreError::NotFound { id: 42 })
    ));
}

#[test]
fn test_update_recomputes_derived_fields() {
    let mut store = store();
    let added = store.add("Siena", siena()).unwrap();

    let changes = BathtubUpdate {
        bottom_width: Some(146.5),
        ..Default::default()
    };
    let updated = store.update(added.id, &changes).unwrap();

    assert_eq!(updated.id, added.id);
    assert_eq!(updated.name, "Siena");
    assert_eq!(updated.bottom_width, 146.5);
    assert_eq!(
        updated.incline_degrees,
        compute_incline(176.0, 146.5, 44.0).unwrap()
    );
    assert_ne!(updated.incline_degrees, added.incline_degrees);
    assert_ne!(updated.liters, added.liters);
    assert_eq!(updated.created_at, added.created_at);
    assert_eq!(store.get(added.id).unwrap(), updated);
}

#[test]
fn test_update_with_same_values_is_idempotent() {
    let mut store = store();
    let added = store.add("Siena", siena()).unwrap();

    let changes = BathtubUpdate {
        top_width: Some(176.0),
        bottom_width: Some(128.0),
        width: Some(71.0),
        height: Some(44.0),
        ..Default::default()
    };
    let updated = store.update(added.id, &changes).unwrap();
    assert_eq!(updated.incline_degrees, added.incline_degrees);
    assert_eq!(updated.liters, added.liters);
    assert_eq!(updated, added);
}

#[test]
fn test_update_name_only_keeps_metrics() {
    let mut store = store();
    let added = store.add("Siena", siena()).unwrap();

    let changes = BathtubUpdate {
        name: Some("Polypex Siena".to_string()),
        ..Default::default()
    };
    let updated = store.update(added.id, &changes).unwrap();
    assert_eq!(updated.name, "Polypex Siena");
    assert_eq!(updated.incline_degrees, added.incline_degrees);
}

#[test]
fn test_update_rejects_invalid_and_keeps_stored_state() {
    let mut store = store();
    let added = store.add("Siena", siena()).unwrap();

    let changes = BathtubUpdate {
        height: Some(0.0),
        ..Default::default()
    };
    assert_validation(store.update(added.id, &changes).unwrap_err(), "height");

    let changes = BathtubUpdate {
        bottom_width: Some(200.0),
        ..Default::default()
    };
    assert_validation(
        store.update(added.id, &changes).unwrap_err(),
        "bottom_width",
    );

    assert_eq!(store.get(added.id).unwrap(), added);
}

#[test]
fn test_update_missing_and_empty() {
    let mut store = store();
    let changes = BathtubUpdate {
        height: Some(40.0),
        ..Default::default()
    };
    assert!(matches!(
        store.update(7, &changes),
        Err(StoreError::NotFound { id: 7 })
    ));

    let added = store.add("Siena", siena()).unwrap();
    assert_validation(
        store.update(added.id, &BathtubUpdate::default()).unwrap_err(),
        "update",
    );
}

#[test]
fn test_list_is_ordered_by_id() {
    let mut store = store();
    let names = ["Zeta", "Alpha", "Mid"];
    for name in names {
        store.add(name, siena()).unwrap();
    }

    let first = store.list().unwrap();
    let second = store.list().unwrap();
    let ids: Vec<i64> = first.records.iter().map(|r| r.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(
        first.records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        names
    );
    assert_eq!(first.records, second.records);
    assert!(first.skipped.is_empty());
}

#[test]
fn test_search_by_name() {
    let mut store = store();
    store.add("Polypex Siena", siena()).unwrap();
    store.add("Eigenmarke", eigenmarke()).unwrap();
    store.add("polypex Oval", siena()).unwrap();

    let hits = store.search("POLYPEX").unwrap();
    let names: Vec<&str> = hits.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["polypex Oval", "Polypex Siena"]);

    assert!(store.search("kaldewei").unwrap().is_empty());
}

#[test]
fn test_corrupt_rows_are_reported_not_coerced() {
    let mut store = store();
    let good = store.add("Good", siena()).unwrap();
    let tampered = store.add("Tampered", siena()).unwrap();
    let stale = store.add("Stale", eigenmarke()).unwrap();

    store
        .conn
        .execute(
            "UPDATE bathtubs SET height = 'deep' WHERE id = ?1",
            params![tampered.id],
        )
        .unwrap();
    store
        .conn
        .execute(
            "UPDATE bathtubs SET incline_degrees = 45.0 WHERE id = ?1",
            params![stale.id],
        )
        .unwrap();

    let listing = store.list().unwrap();
    assert_eq!(listing.records, vec![good.clone()]);
    let skipped: Vec<Option<i64>> = listing.skipped.iter().map(|c| c.id).collect();
    assert_eq!(skipped, vec![Some(tampered.id), Some(stale.id)]);
    assert!(listing.skipped[0].reason.contains("height"));
    assert!(listing.skipped[1].reason.contains("incline"));

    assert!(matches!(
        store.get(tampered.id),
        Err(StoreError::CorruptRecord { .. })
    ));
    assert_eq!(store.get(good.id).unwrap(), good);
    assert_eq!(store.count().unwrap(), 3);

    // A corrupt row can still be removed
    store.delete(tampered.id).unwrap();
}

#[test]
fn test_inverted_trapezoid_row_is_corrupt() {
    let mut store = store();
    let added = store.add("Siena", siena()).unwrap();

    // Consistent derived values, but the tub widens toward the floor
    let inverted = compute_incline(128.0, 176.0, 44.0).unwrap();
    store
        .conn
        .execute(
            "UPDATE bathtubs SET top_width = 128.0, bottom_width = 176.0, incline_degrees = ?1 \
             WHERE id = ?2",
            params![inverted, added.id],
        )
        .unwrap();

    match store.get(added.id) {
        Err(StoreError::CorruptRecord { reason, .. }) => {
            assert!(reason.contains("bottom_width"), "{reason}");
        }
        other => panic!("expected corrupt record, got {other:?}"),
    }

    let listing = store.list().unwrap();
    assert!(listing.records.is_empty());
    assert_eq!(listing.skipped[0].id, Some(added.id));
}

#[test]
fn test_bad_date_is_corrupt() {
    let mut store = store();
    let added = store.add("Siena", siena()).unwrap();
    store
        .conn
        .execute(
            "UPDATE bathtubs SET created_at = 'yesterday' WHERE id = ?1",
            params![added.id],
        )
        .unwrap();

    match store.get(added.id) {
        Err(StoreError::CorruptRecord { id, reason }) => {
            assert_eq!(id, added.id.to_string());
            assert!(reason.contains("created_at"));
        }
        other => panic!("expected corrupt record, got {other:?}"),
    }
}

#[test]
fn test_newer_schema_is_refused() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bathtubs.db");
    {
        let store = BathtubStore::open(&path).unwrap();
        store
            .conn
            .execute("INSERT INTO schema_version (version) VALUES (99)", [])
            .unwrap();
    }

    assert!(matches!(
        BathtubStore::open(&path),
        Err(StoreError::SchemaVersion { found: 99, .. })
    ));
}

#[test]
fn test_legacy_table_is_migrated() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bathtubs.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE bathtubs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                top_length REAL NOT NULL,
                bottom_length REAL NOT NULL,
                width REAL NOT NULL,
                height REAL NOT NULL,
                side_incline_degrees REAL NOT NULL,
                liters TEXT DEFAULT 'N/A',
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO bathtubs
                (name, top_length, bottom_length, width, height, side_incline_degrees, liters, created_at)
            VALUES
                ('Polypex Siena', 176, 128, 71, 44, 28.61, 'N/A', '2023-11-02 19:44:10'),
                ('Upside down', 128, 176, 71, 44, 28.61, '480', '2023-11-03 08:00:00'),
                ('Gone', 150, 150, 70, 45, 0.0, 'N/A', '2023-11-04 08:00:00');
            DELETE FROM bathtubs WHERE id = 3;
            "#,
        )
        .unwrap();
    }

    let mut store = BathtubStore::open(&path)
        .unwrap()
        .with_clock(FixedClock(test_date()));
    let listing = store.list().unwrap();

    assert_eq!(listing.records.len(), 1);
    let siena_row = &listing.records[0];
    assert_eq!(siena_row.id, 1);
    assert_eq!(siena_row.name, "Polypex Siena");
    assert_eq!(siena_row.top_width, 176.0);
    assert_eq!(
        siena_row.incline_degrees,
        compute_incline(176.0, 128.0, 44.0).unwrap()
    );
    assert_eq!(siena_row.liters, Some(474.8));
    assert_eq!(
        siena_row.created_at,
        NaiveDate::from_ymd_opt(2023, 11, 2).unwrap()
    );

    // The legacy tool accepted tubs that widen toward the floor
    assert_eq!(listing.skipped.len(), 1);
    assert_eq!(listing.skipped[0].id, Some(2));
    assert!(listing.skipped[0].reason.contains("bottom_width"));

    // The deleted legacy id stays retired
    let added = store.add("Eigenmarke", eigenmarke()).unwrap();
    assert_eq!(added.id, 4);
    store.close().unwrap();

    let store = BathtubStore::open(&path).unwrap();
    assert_eq!(store.count().unwrap(), 3);
    let leftover: i64 = store
        .conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'bathtubs_legacy'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(leftover, 0);
}
