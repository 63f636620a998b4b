//! Database initialization
//!
//! Opens (creating when missing) the catalog database and creates every
//! table idempotently. Child and join rows cascade on book deletion.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Table name and its `CREATE TABLE IF NOT EXISTS` statement, in dependency order
const SCHEMA: &[(&str, &str)] = &[
    (
        "author",
        r#"
        CREATE TABLE IF NOT EXISTS author (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL DEFAULT '',
            patronymic TEXT,
            last_name TEXT NOT NULL,
            birth_year INTEGER
        )
        "#,
    ),
    (
        "bbk",
        r#"
        CREATE TABLE IF NOT EXISTS bbk (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bbk_abb TEXT NOT NULL UNIQUE,
            description TEXT
        )
        "#,
    ),
    (
        "udc",
        r#"
        CREATE TABLE IF NOT EXISTS udc (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            udc_abb TEXT NOT NULL UNIQUE,
            description TEXT
        )
        "#,
    ),
    (
        "grnti",
        r#"
        CREATE TABLE IF NOT EXISTS grnti (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            description TEXT
        )
        "#,
    ),
    (
        "publisher",
        r#"
        CREATE TABLE IF NOT EXISTS publisher (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "book",
        r#"
        CREATE TABLE IF NOT EXISTS book (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            type TEXT,
            edit TEXT,
            edition_statement TEXT,
            phys_desc TEXT,
            series TEXT,
            description TEXT
        )
        "#,
    ),
    (
        "book_author",
        r#"
        CREATE TABLE IF NOT EXISTS book_author (
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES author(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, author_id)
        )
        "#,
    ),
    (
        "book_bbk",
        r#"
        CREATE TABLE IF NOT EXISTS book_bbk (
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            bbk_id INTEGER NOT NULL REFERENCES bbk(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, bbk_id)
        )
        "#,
    ),
    (
        "book_udc",
        r#"
        CREATE TABLE IF NOT EXISTS book_udc (
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            udc_id INTEGER NOT NULL REFERENCES udc(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, udc_id)
        )
        "#,
    ),
    (
        "book_grnti",
        r#"
        CREATE TABLE IF NOT EXISTS book_grnti (
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            grnti_id INTEGER NOT NULL REFERENCES grnti(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, grnti_id)
        )
        "#,
    ),
    (
        "book_copy",
        r#"
        CREATE TABLE IF NOT EXISTS book_copy (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            inventory_no TEXT NOT NULL,
            receipt_date TEXT,
            storage_place TEXT,
            price REAL
        )
        "#,
    ),
    (
        "book_pub_place",
        r#"
        CREATE TABLE IF NOT EXISTS book_pub_place (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            publisher_id INTEGER REFERENCES publisher(id) ON DELETE SET NULL,
            city TEXT,
            pub_year INTEGER
        )
        "#,
    ),
    (
        "book_bbk_raw",
        r#"
        CREATE TABLE IF NOT EXISTS book_bbk_raw (
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            bbk_code TEXT NOT NULL
        )
        "#,
    ),
    (
        "book_udc_raw",
        r#"
        CREATE TABLE IF NOT EXISTS book_udc_raw (
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            udc_code TEXT NOT NULL
        )
        "#,
    ),
    (
        "book_grnti_raw",
        r#"
        CREATE TABLE IF NOT EXISTS book_grnti_raw (
            book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
            grnti_code TEXT NOT NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_book_copy_book ON book_copy(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_book_pub_place_book ON book_pub_place(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_book_bbk_raw_book ON book_bbk_raw(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_book_udc_raw_book ON book_udc_raw(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_book_grnti_raw_book ON book_grnti_raw(book_id)",
];

/// Names of all catalog tables
pub fn table_names() -> impl Iterator<Item = &'static str> {
    SCHEMA.iter().map(|(name, _)| *name)
}

/// Open the database file, creating it and its parent folder if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database with the full schema, for tests and demos
///
/// Holds a single connection that never expires, since every new
/// connection to `:memory:` would see an empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for (name, sql) in SCHEMA {
        sqlx::query(sql).execute(pool).await?;
        debug!("Ensured table {}", name);
    }

    for sql in INDEXES {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}
