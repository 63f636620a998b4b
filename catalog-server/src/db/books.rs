//! Book persistence
//!
//! `update_book` merges a partial update: scalar fields present in the
//! payload are assigned, and every relation list present replaces the
//! stored one. The whole merge runs in one transaction, so a rejected
//! relation leaves the book untouched.

use catalog_common::dto::{CreateBook, PubPlaceInput, UpdateBook};
use catalog_common::models::{
    Author, Bbk, BookBbkRaw, BookCopy, BookDetail, BookGrntiRaw, BookPubPlace, BookSummary,
    BookUdcRaw, Grnti, Paginated, Publisher, Udc,
};
use catalog_common::normalize::{dedup_codes, matches_term, search_term};
use catalog_common::{Error, Result};
use futures::TryStreamExt;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::dictionaries::{find_or_create_code, find_or_create_publisher, CodeScheme};
use crate::pagination::calculate_pagination;

#[derive(Debug, FromRow)]
struct BookRow {
    id: i64,
    title: Option<String>,
    book_type: Option<String>,
    edit: Option<String>,
    edition_statement: Option<String>,
    phys_desc: Option<String>,
    series: Option<String>,
    description: Option<String>,
}

#[derive(Debug, FromRow)]
struct PubPlaceRow {
    id: i64,
    book_id: i64,
    city: Option<String>,
    pub_year: Option<i32>,
    publisher_id: Option<i64>,
    publisher_name: Option<String>,
}

impl From<PubPlaceRow> for BookPubPlace {
    fn from(row: PubPlaceRow) -> Self {
        let publisher = match (row.publisher_id, row.publisher_name) {
            (Some(id), Some(name)) => Some(Publisher { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            book_id: row.book_id,
            publisher,
            city: row.city,
            pub_year: row.pub_year,
        }
    }
}

/// One page of book summaries, optionally filtered by title
pub async fn list_books(
    pool: &SqlitePool,
    q: Option<&str>,
    page: i64,
    limit: i64,
) -> Result<Paginated<BookSummary>> {
    const SUMMARY_SQL: &str = "SELECT id, title, type AS book_type, series FROM book ORDER BY id";

    let Some(term) = search_term(q) else {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book")
            .fetch_one(pool)
            .await?;
        let pagination = calculate_pagination(total, page, limit);

        let data = sqlx::query_as::<_, BookSummary>(
            "SELECT id, title, type AS book_type, series FROM book ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(pool)
        .await?;

        return Ok(Paginated {
            data,
            total,
            page: pagination.page,
            limit: pagination.limit,
        });
    };

    // Title filter runs here since SQLite LIKE ignores case for ASCII only
    let mut rows = sqlx::query_as::<_, BookSummary>(SUMMARY_SQL).fetch(pool);
    let mut matched = Vec::new();
    while let Some(book) = rows.try_next().await? {
        if book.title.as_deref().is_some_and(|t| matches_term(t, &term)) {
            matched.push(book);
        }
    }

    let total = matched.len() as i64;
    let pagination = calculate_pagination(total, page, limit);
    let data = matched
        .into_iter()
        .skip(pagination.offset as usize)
        .take(pagination.limit as usize)
        .collect();

    Ok(Paginated {
        data,
        total,
        page: pagination.page,
        limit: pagination.limit,
    })
}

/// Book with every relation, or `None` when the id is unknown
pub async fn load_book(pool: &SqlitePool, id: i64) -> Result<Option<BookDetail>> {
    let mut conn = pool.acquire().await?;
    fetch_detail(&mut conn, id).await
}

async fn fetch_detail(conn: &mut SqliteConnection, id: i64) -> Result<Option<BookDetail>> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        SELECT id, title, type AS book_type, edit, edition_statement, phys_desc, series, description
        FROM book
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let authors = sqlx::query_as::<_, Author>(
        r#"
        SELECT a.id, a.first_name, a.patronymic, a.last_name, a.birth_year
        FROM author a
        JOIN book_author ba ON ba.author_id = a.id
        WHERE ba.book_id = ?
        ORDER BY a.last_name, a.first_name, a.id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let bbks = sqlx::query_as::<_, Bbk>(
        r#"
        SELECT b.id, b.bbk_abb, b.description
        FROM bbk b
        JOIN book_bbk j ON j.bbk_id = b.id
        WHERE j.book_id = ?
        ORDER BY b.bbk_abb
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let udcs = sqlx::query_as::<_, Udc>(
        r#"
        SELECT u.id, u.udc_abb, u.description
        FROM udc u
        JOIN book_udc j ON j.udc_id = u.id
        WHERE j.book_id = ?
        ORDER BY u.udc_abb
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let grntis = sqlx::query_as::<_, Grnti>(
        r#"
        SELECT g.id, g.code, g.description
        FROM grnti g
        JOIN book_grnti j ON j.grnti_id = g.id
        WHERE j.book_id = ?
        ORDER BY g.code
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let book_copies = sqlx::query_as::<_, BookCopy>(
        r#"
        SELECT id, inventory_no, receipt_date, storage_place, price
        FROM book_copy
        WHERE book_id = ?
        ORDER BY id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let publication_places = sqlx::query_as::<_, PubPlaceRow>(
        r#"
        SELECT pp.id, pp.book_id, pp.city, pp.pub_year,
               p.id AS publisher_id, p.name AS publisher_name
        FROM book_pub_place pp
        LEFT JOIN publisher p ON p.id = pp.publisher_id
        WHERE pp.book_id = ?
        ORDER BY pp.id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(BookPubPlace::from)
    .collect();

    let bbk_raws = sqlx::query_as::<_, BookBbkRaw>(
        "SELECT book_id, bbk_code FROM book_bbk_raw WHERE book_id = ? ORDER BY rowid",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let udc_raws = sqlx::query_as::<_, BookUdcRaw>(
        "SELECT book_id, udc_code FROM book_udc_raw WHERE book_id = ? ORDER BY rowid",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let grnti_raws = sqlx::query_as::<_, BookGrntiRaw>(
        "SELECT book_id, grnti_code FROM book_grnti_raw WHERE book_id = ? ORDER BY rowid",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(BookDetail {
        id: row.id,
        title: row.title,
        book_type: row.book_type,
        edit: row.edit,
        edition_statement: row.edition_statement,
        phys_desc: row.phys_desc,
        series: row.series,
        description: row.description,
        authors,
        bbks,
        udcs,
        grntis,
        book_copies,
        publication_places,
        bbk_raws,
        udc_raws,
        grnti_raws,
    }))
}

/// Scalar columns of `book` paired with their payload values
fn scalar_fields(dto: &UpdateBook) -> [(&'static str, &Option<String>); 7] {
    [
        ("title", &dto.title),
        ("type", &dto.book_type),
        ("edit", &dto.edit),
        ("edition_statement", &dto.edition_statement),
        ("series", &dto.series),
        ("phys_desc", &dto.phys_desc),
        ("description", &dto.description),
    ]
}

/// Insert a book and its relations
pub async fn create_book(pool: &SqlitePool, dto: &CreateBook) -> Result<BookDetail> {
    dto.validate()?;

    let mut tx = pool.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO book (title, type, edit, edition_statement, series, phys_desc, description)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&dto.title)
    .bind(&dto.book_type)
    .bind(&dto.edit)
    .bind(&dto.edition_statement)
    .bind(&dto.series)
    .bind(&dto.phys_desc)
    .bind(&dto.description)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    apply_relations(&mut tx, id, dto).await?;

    let detail = fetch_detail(&mut tx, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Book {} vanished after insert", id)))?;

    tx.commit().await?;

    info!("Created book {}", id);
    Ok(detail)
}

/// Merge a partial update into an existing book
pub async fn update_book(pool: &SqlitePool, id: i64, dto: &UpdateBook) -> Result<BookDetail> {
    dto.validate()?;

    let mut tx = pool.begin().await?;

    // The first statement must write: a deferred transaction that reads
    // first cannot take the write lock while another writer holds it.
    let touched = sqlx::query("UPDATE book SET id = id WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if touched == 0 {
        return Err(Error::NotFound(format!("Book {} not found", id)));
    }

    let present: Vec<(&str, &String)> = scalar_fields(dto)
        .into_iter()
        .filter_map(|(column, value)| value.as_ref().map(|v| (column, v)))
        .collect();

    if !present.is_empty() {
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE book SET ");
        let mut assignments = query.separated(", ");
        for (column, value) in &present {
            assignments.push(format!("{} = ", column));
            assignments.push_bind_unseparated((*value).clone());
        }
        query.push(" WHERE id = ").push_bind(id);
        query.build().execute(&mut *tx).await?;
        debug!("Book {}: assigned {} scalar field(s)", id, present.len());
    }

    apply_relations(&mut tx, id, dto).await?;

    let detail = fetch_detail(&mut tx, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Book {} not found", id)))?;

    tx.commit().await?;

    info!("Updated book {}", id);
    Ok(detail)
}

/// Delete a book; join rows, copies, places and raw codes cascade
pub async fn delete_book(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM book WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Book {} not found", id)));
    }

    info!("Deleted book {}", id);
    Ok(())
}

async fn apply_relations(conn: &mut SqliteConnection, book_id: i64, dto: &UpdateBook) -> Result<()> {
    if let Some(ids) = &dto.authors_ids {
        replace_authors(conn, book_id, ids).await?;
    }

    let linked = [
        (CodeScheme::Bbk, &dto.bbk_abbs),
        (CodeScheme::Udc, &dto.udc_abbs),
        (CodeScheme::Grnti, &dto.grnti_codes),
    ];
    for (scheme, codes) in linked {
        if let Some(codes) = codes {
            replace_codes(conn, book_id, scheme, codes).await?;
        }
    }

    let raw = [
        (CodeScheme::Bbk, &dto.bbk_raw_codes),
        (CodeScheme::Udc, &dto.udc_raw_codes),
        (CodeScheme::Grnti, &dto.grnti_raw_codes),
    ];
    for (scheme, codes) in raw {
        if let Some(codes) = codes {
            replace_raw_codes(conn, book_id, scheme, codes).await?;
        }
    }

    if let Some(places) = &dto.pub_places {
        replace_pub_places(conn, book_id, places).await?;
    }

    Ok(())
}

async fn replace_authors(conn: &mut SqliteConnection, book_id: i64, ids: &[i64]) -> Result<()> {
    let mut unique: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }

    for author_id in &unique {
        let known: Option<i64> = sqlx::query_scalar("SELECT id FROM author WHERE id = ?")
            .bind(author_id)
            .fetch_optional(&mut *conn)
            .await?;
        if known.is_none() {
            return Err(Error::InvalidInput(format!("Unknown author id {}", author_id)));
        }
    }

    sqlx::query("DELETE FROM book_author WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    for author_id in &unique {
        sqlx::query("INSERT INTO book_author (book_id, author_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(author_id)
            .execute(&mut *conn)
            .await?;
    }

    debug!("Book {}: {} author(s)", book_id, unique.len());
    Ok(())
}

async fn replace_codes(
    conn: &mut SqliteConnection,
    book_id: i64,
    scheme: CodeScheme,
    codes: &[String],
) -> Result<()> {
    let codes = dedup_codes(codes.iter().map(|c| scheme.canonical(c)));

    let mut code_ids = Vec::with_capacity(codes.len());
    for code in &codes {
        code_ids.push(find_or_create_code(conn, scheme, code).await?);
    }

    let delete = format!("DELETE FROM {} WHERE book_id = ?", scheme.join_table());
    sqlx::query(&delete).bind(book_id).execute(&mut *conn).await?;

    let insert = format!(
        "INSERT OR IGNORE INTO {} (book_id, {}) VALUES (?, ?)",
        scheme.join_table(),
        scheme.join_column()
    );
    for code_id in code_ids {
        sqlx::query(&insert)
            .bind(book_id)
            .bind(code_id)
            .execute(&mut *conn)
            .await?;
    }

    debug!("Book {}: {} {} code(s)", book_id, codes.len(), scheme.label());
    Ok(())
}

async fn replace_raw_codes(
    conn: &mut SqliteConnection,
    book_id: i64,
    scheme: CodeScheme,
    codes: &[String],
) -> Result<()> {
    let codes = dedup_codes(codes);

    let delete = format!("DELETE FROM {} WHERE book_id = ?", scheme.raw_table());
    sqlx::query(&delete).bind(book_id).execute(&mut *conn).await?;

    let insert = format!(
        "INSERT INTO {} (book_id, {}) VALUES (?, ?)",
        scheme.raw_table(),
        scheme.raw_column()
    );
    for code in &codes {
        sqlx::query(&insert)
            .bind(book_id)
            .bind(code)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

async fn replace_pub_places(
    conn: &mut SqliteConnection,
    book_id: i64,
    places: &[PubPlaceInput],
) -> Result<()> {
    sqlx::query("DELETE FROM book_pub_place WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    let mut stored = 0;
    for place in places {
        let city = trimmed(&place.city);
        let publisher_name = trimmed(&place.publisher_name);
        if city.is_none() && publisher_name.is_none() && place.pub_year.is_none() {
            continue;
        }

        let publisher_id = match publisher_name {
            Some(name) => Some(find_or_create_publisher(conn, name).await?),
            None => None,
        };

        sqlx::query(
            "INSERT INTO book_pub_place (book_id, publisher_id, city, pub_year) VALUES (?, ?, ?, ?)",
        )
        .bind(book_id)
        .bind(publisher_id)
        .bind(city)
        .bind(place.pub_year)
        .execute(&mut *conn)
        .await?;
        stored += 1;
    }

    debug!("Book {}: {} publication place(s)", book_id, stored);
    Ok(())
}
