//! Common fixtures for the comprehensive suite

use reposit::{Database, EntityType, Manager, Value};

/// A database with a plain three-attribute entity type, empty
pub fn book_db() -> (Database, Manager) {
    let db = Database::new();
    let books = db
        .register(
            EntityType::new("Book")
                .attribute("title")
                .attribute("pages")
                .attribute("lang"),
        )
        .unwrap();
    (db, books)
}

/// `book_db` populated with a fixed shelf
///
/// Insertion order: Dune (412, en), Messiah (256, en), Citadelle (531, fr),
/// Hyperion (482, en).
pub fn seeded_book_db() -> (Database, Manager) {
    let (db, books) = book_db();
    for (title, pages, lang) in [
        ("Dune", 412, "en"),
        ("Messiah", 256, "en"),
        ("Citadelle", 531, "fr"),
        ("Hyperion", 482, "en"),
    ] {
        books
            .create([
                ("title", Value::from(title)),
                ("pages", Value::from(pages)),
                ("lang", Value::from(lang)),
            ])
            .unwrap();
    }
    (db, books)
}

/// Authors and books joined by a declared reference
pub fn library_db() -> (Database, Manager, Manager) {
    let db = Database::new();
    let authors = db
        .register(
            EntityType::new("Author")
                .attribute("name")
                .attribute("meta"),
        )
        .unwrap();
    let books = db
        .register(
            EntityType::new("Book")
                .attribute("title")
                .attribute("pages")
                .reference("author", "Author"),
        )
        .unwrap();
    (db, authors, books)
}

/// Titles of a result's records, in result order
pub fn titles(result: &reposit::QueryResult) -> Vec<String> {
    result
        .iter()
        .filter_map(|r| r.get("title"))
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}
