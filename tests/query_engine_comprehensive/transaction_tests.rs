//! Snapshot rollback over database-resident records
//!
//! The transaction crate's own tests cover detached records; here the
//! records live in stores, so rollback visibility through shared handles
//! and the interplay with deletion are what matter.

use crate::test_utils::book_db;
use reposit::{transactional, Error, Result, Transaction, Value};

// ==== Closure form ====

#[test]
fn test_e2e_failed_scope_rolls_back_for_every_handle() {
    let (_db, books) = book_db();
    books
        .create([("title", Value::from("Dune")), ("pages", Value::from(412))])
        .unwrap();

    let handle = books.get([("title", "Dune")]).unwrap();
    let outcome: Result<()> = transactional(&handle, |r| {
        r.set("pages", 9999)?;
        r.set("title", "Doon")?;
        Err(Error::InvalidOperation("editorial veto".into()))
    });
    assert!(outcome.is_err());

    // The handle and a fresh lookup agree on the restored state
    assert_eq!(handle.get("pages"), Some(Value::from(412)));
    let fresh = books.get([("title", "Dune")]).unwrap();
    assert_eq!(fresh.get("pages"), Some(Value::from(412)));
    assert_eq!(books.filter(("title", "Doon")).unwrap().count(), 0);
}

#[test]
fn test_e2e_mixed_type_update_leaves_value_intact() {
    let (_db, books) = book_db();
    let record = books.create([("pages", Value::from(-1))]).unwrap();

    let outcome: Result<()> = transactional(&record, |r| {
        r.set("pages", "1111")?;
        let pages = r.get("pages");
        match pages.as_ref().and_then(Value::as_int) {
            Some(n) => r.set("pages", n + 1),
            None => Err(Error::InvalidOperation(
                "cannot increment a string page count".into(),
            )),
        }
    });
    assert!(outcome.is_err());

    // Not a string, not a partial write: exactly the pre-scope value
    assert_eq!(record.get("pages"), Some(Value::Int(-1)));
}

#[test]
fn test_e2e_successful_scope_commits_for_every_handle() {
    let (_db, books) = book_db();
    books.create([("title", "Dune")]).unwrap();

    let handle = books.get([("title", "Dune")]).unwrap();
    transactional(&handle, |r| r.set("pages", 412)).unwrap();

    let fresh = books.get([("title", "Dune")]).unwrap();
    assert_eq!(fresh.get("pages"), Some(Value::Int(412)));
}

#[test]
fn test_e2e_scope_failure_does_not_disturb_neighbours() {
    let (_db, books) = book_db();
    let dune = books
        .create([("title", Value::from("Dune")), ("pages", Value::from(412))])
        .unwrap();
    books
        .create([
            ("title", Value::from("Messiah")),
            ("pages", Value::from(256)),
        ])
        .unwrap();

    let outcome: Result<()> = transactional(&dune, |r| {
        r.set("pages", 0)?;
        Err(Error::InvalidOperation("no".into()))
    });
    assert!(outcome.is_err());

    let messiah = books.get([("title", "Messiah")]).unwrap();
    assert_eq!(messiah.get("pages"), Some(Value::Int(256)));
}

#[test]
fn test_e2e_nested_scopes_on_a_store_record() {
    let (_db, books) = book_db();
    let record = books.create([("pages", Value::from(0))]).unwrap();

    let outcome: Result<()> = transactional(&record, |r| {
        r.set("pages", 100)?;

        let inner: Result<()> = transactional(r, |r| {
            r.set("pages", 200)?;
            Err(Error::InvalidOperation("inner".into()))
        });
        assert!(inner.is_err());
        assert_eq!(r.get("pages"), Some(Value::Int(100)));

        // Absorb the inner failure; the outer scope commits
        Ok(())
    });
    assert!(outcome.is_ok());
    assert_eq!(record.get("pages"), Some(Value::Int(100)));
}

// ==== Manual guard ====

#[test]
fn test_e2e_manual_guard_over_store_record() {
    let (_db, books) = book_db();
    let record = books
        .create([("title", Value::from("Dune")), ("pages", Value::from(412))])
        .unwrap();

    let mut txn = Transaction::new(&record);
    txn.begin();
    record.set("pages", 1).unwrap();
    txn.rollback().unwrap();
    assert_eq!(record.get("pages"), Some(Value::Int(412)));

    txn.begin();
    record.set("pages", 500).unwrap();
    txn.commit();
    assert_eq!(
        books.get([("title", "Dune")]).unwrap().get("pages"),
        Some(Value::Int(500))
    );

    // The snapshot went with the commit
    assert!(matches!(
        txn.rollback().unwrap_err(),
        Error::CorruptTransaction
    ));
}

// ==== Deletion interplay ====

#[test]
fn test_e2e_rollback_does_not_resurrect_a_deleted_record() {
    let (_db, books) = book_db();
    let record = books.create([("title", "Dune")]).unwrap();

    let mut txn = Transaction::new(&record);
    txn.begin();
    record.set("title", "Doon").unwrap();
    books.remove(&record).unwrap();

    // State comes back on the detached handle; store membership does not
    txn.rollback().unwrap();
    assert_eq!(record.get("title"), Some(Value::from("Dune")));
    assert_eq!(books.count(), 0);
    assert!(matches!(
        books.get([("title", "Dune")]).unwrap_err(),
        Error::DoesNotExist { .. }
    ));
}

#[test]
fn test_e2e_failed_scope_around_delete_keeps_the_delete() {
    let (_db, books) = book_db();
    let record = books.create([("title", "Dune")]).unwrap();

    let outcome: Result<()> = transactional(&record, |r| {
        books.remove(r)?;
        Err(Error::InvalidOperation("too late".into()))
    });
    assert!(outcome.is_err());

    assert_eq!(books.count(), 0);
    assert_eq!(record.get("title"), Some(Value::from("Dune")));
}
