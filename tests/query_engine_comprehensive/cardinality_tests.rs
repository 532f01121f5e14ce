//! get / get_or_create cardinality contracts
//!
//! The error messages here are part of the public contract and are pinned
//! verbatim.

use crate::test_utils::{book_db, seeded_book_db};
use reposit::{Error, Value};

#[test]
fn test_e2e_get_exactly_one() {
    let (_db, books) = seeded_book_db();

    let dune = books.get([("title", "Dune")]).unwrap();
    assert_eq!(dune.get("pages"), Some(Value::from(412)));
}

#[test]
fn test_e2e_get_zero_matches() {
    let (_db, books) = seeded_book_db();

    let err = books.get([("title", "Ubik")]).unwrap_err();
    assert!(matches!(err, Error::DoesNotExist { .. }));
    assert_eq!(err.to_string(), "Book object matching query does not exist.");
}

#[test]
fn test_e2e_get_multiple_matches_reports_count() {
    let (_db, books) = seeded_book_db();

    let err = books.get([("lang", "en")]).unwrap_err();
    assert!(matches!(
        err,
        Error::MultipleObjectsReturned { count: 3, .. }
    ));
    assert_eq!(
        err.to_string(),
        "get() returned more than one Book object -- it returned 3!"
    );
}

#[test]
fn test_e2e_get_scoped_to_filtered_set() {
    let (_db, books) = seeded_book_db();

    // Two english books are over 400 pages; scoping first disambiguates
    let hyperion = books
        .filter(("pages__gt", 450))
        .unwrap()
        .get([("lang", "en")])
        .unwrap();
    assert_eq!(hyperion.get("title"), Some(Value::from("Hyperion")));
}

#[test]
fn test_e2e_get_or_create_fetches_existing() {
    let (_db, books) = seeded_book_db();

    let (record, created) = books
        .get_or_create(
            &[("title", Value::from("Dune"))],
            &[("pages", Value::from(9999))],
        )
        .unwrap();

    assert!(!created);
    // Defaults play no part when the record already exists
    assert_eq!(record.get("pages"), Some(Value::from(412)));
    assert_eq!(books.count(), 4);
}

#[test]
fn test_e2e_get_or_create_creates_with_defaults() {
    let (_db, books) = seeded_book_db();

    let (record, created) = books
        .get_or_create(
            &[("title", Value::from("Ubik"))],
            &[("lang", Value::from("en")), ("pages", Value::from(224))],
        )
        .unwrap();

    assert!(created);
    assert_eq!(record.get("lang"), Some(Value::from("en")));
    assert_eq!(record.get("pages"), Some(Value::from(224)));
    assert_eq!(books.count(), 5);
}

#[test]
fn test_e2e_get_or_create_lookup_uses_verbs_creation_does_not() {
    let (_db, books) = book_db();
    books
        .create([("title", Value::from("Dune")), ("pages", Value::from(412))])
        .unwrap();

    // The verb pair participates in the lookup: no book has pages > 500
    let (record, created) = books
        .get_or_create(
            &[
                ("title", Value::from("Dune")),
                ("pages__gt", Value::from(500)),
            ],
            &[],
        )
        .unwrap();

    assert!(created);
    // ... but is excluded from the created attributes
    assert_eq!(record.get("pages"), None);
    assert_eq!(books.count(), 2);
}

#[test]
fn test_e2e_get_or_create_defaults_override_pairs() {
    let (_db, books) = book_db();

    let (record, created) = books
        .get_or_create(
            &[("title", Value::from("draft"))],
            &[("title", Value::from("final"))],
        )
        .unwrap();

    assert!(created);
    assert_eq!(record.get("title"), Some(Value::from("final")));
}

#[test]
fn test_e2e_get_or_create_multiple_matches_propagates() {
    let (_db, books) = seeded_book_db();

    let err = books
        .get_or_create(&[("lang", Value::from("en"))], &[])
        .unwrap_err();
    assert!(matches!(err, Error::MultipleObjectsReturned { .. }));
    assert_eq!(books.count(), 4);
}

#[test]
fn test_e2e_get_or_create_rejects_undeclared_creation_attribute() {
    let (_db, books) = seeded_book_db();

    let err = books
        .get_or_create(&[("publisher", Value::from("Chilton"))], &[])
        .unwrap_err();
    assert!(matches!(err, Error::UndeclaredAttribute { .. }));
    assert_eq!(books.count(), 4);
}
