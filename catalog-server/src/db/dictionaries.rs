//! Dictionary lookups: authors, BBK, UDC, GRNTI and publishers

use catalog_common::dto::{NewAuthor, NewCode, NewPublisher};
use catalog_common::models::{Author, Bbk, Grnti, Publisher, Udc};
use catalog_common::normalize::{matches_term, normalize_bbk, normalize_grnti, search_term};
use catalog_common::{Error, Result};
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Most rows a dictionary search returns
pub const SEARCH_LIMIT: usize = 25;

/// Classification scheme and the tables that store it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeScheme {
    Bbk,
    Udc,
    Grnti,
}

impl CodeScheme {
    pub const ALL: [CodeScheme; 3] = [CodeScheme::Bbk, CodeScheme::Udc, CodeScheme::Grnti];

    pub fn label(self) -> &'static str {
        match self {
            CodeScheme::Bbk => "BBK",
            CodeScheme::Udc => "UDC",
            CodeScheme::Grnti => "GRNTI",
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            CodeScheme::Bbk => "bbk",
            CodeScheme::Udc => "udc",
            CodeScheme::Grnti => "grnti",
        }
    }

    pub(crate) fn code_column(self) -> &'static str {
        match self {
            CodeScheme::Bbk => "bbk_abb",
            CodeScheme::Udc => "udc_abb",
            CodeScheme::Grnti => "code",
        }
    }

    pub(crate) fn join_table(self) -> &'static str {
        match self {
            CodeScheme::Bbk => "book_bbk",
            CodeScheme::Udc => "book_udc",
            CodeScheme::Grnti => "book_grnti",
        }
    }

    pub(crate) fn join_column(self) -> &'static str {
        match self {
            CodeScheme::Bbk => "bbk_id",
            CodeScheme::Udc => "udc_id",
            CodeScheme::Grnti => "grnti_id",
        }
    }

    pub(crate) fn raw_table(self) -> &'static str {
        match self {
            CodeScheme::Bbk => "book_bbk_raw",
            CodeScheme::Udc => "book_udc_raw",
            CodeScheme::Grnti => "book_grnti_raw",
        }
    }

    pub(crate) fn raw_column(self) -> &'static str {
        match self {
            CodeScheme::Bbk => "bbk_code",
            CodeScheme::Udc => "udc_code",
            CodeScheme::Grnti => "grnti_code",
        }
    }

    /// Spelling a code is stored under
    ///
    /// GRNTI codes are padded to three groups; other schemes keep the
    /// code as written.
    pub fn canonical(self, code: &str) -> String {
        match self {
            CodeScheme::Grnti => normalize_grnti(code),
            CodeScheme::Bbk | CodeScheme::Udc => code.trim().to_string(),
        }
    }

    /// Key used when matching legacy raw codes against the dictionary
    pub fn match_key(self, code: &str) -> String {
        match self {
            CodeScheme::Bbk => normalize_bbk(code),
            CodeScheme::Udc => code.trim().to_string(),
            CodeScheme::Grnti => normalize_grnti(code),
        }
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn description_matches(description: &Option<String>, term: &str) -> bool {
    description
        .as_deref()
        .is_some_and(|d| matches_term(d, term))
}

fn conflict_on_unique(err: sqlx::Error, message: String) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Error::Conflict(message),
        _ => Error::Database(err),
    }
}

/// Stream an ordered table and keep the first `SEARCH_LIMIT` rows that match
async fn collect_matches<T, F>(pool: &SqlitePool, sql: &'static str, matches: F) -> Result<Vec<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    F: Fn(&T) -> bool,
{
    let mut rows = sqlx::query_as::<_, T>(sql).fetch(pool);
    let mut found = Vec::new();

    while let Some(row) = rows.try_next().await? {
        if matches(&row) {
            found.push(row);
            if found.len() == SEARCH_LIMIT {
                break;
            }
        }
    }

    Ok(found)
}

/// Authors whose "Last First Patronymic" contains the term
pub async fn search_authors(pool: &SqlitePool, q: Option<&str>) -> Result<Vec<Author>> {
    let Some(term) = search_term(q) else {
        return Ok(Vec::new());
    };

    collect_matches(
        pool,
        r#"
        SELECT id, first_name, patronymic, last_name, birth_year
        FROM author
        ORDER BY last_name, first_name, id
        "#,
        |author: &Author| matches_term(&author.display_name(), &term),
    )
    .await
}

pub async fn search_bbk(pool: &SqlitePool, q: Option<&str>) -> Result<Vec<Bbk>> {
    let Some(term) = search_term(q) else {
        return Ok(Vec::new());
    };

    collect_matches(
        pool,
        "SELECT id, bbk_abb, description FROM bbk ORDER BY bbk_abb",
        |bbk: &Bbk| matches_term(&bbk.bbk_abb, &term) || description_matches(&bbk.description, &term),
    )
    .await
}

pub async fn search_udc(pool: &SqlitePool, q: Option<&str>) -> Result<Vec<Udc>> {
    let Some(term) = search_term(q) else {
        return Ok(Vec::new());
    };

    collect_matches(
        pool,
        "SELECT id, udc_abb, description FROM udc ORDER BY udc_abb",
        |udc: &Udc| matches_term(&udc.udc_abb, &term) || description_matches(&udc.description, &term),
    )
    .await
}

/// GRNTI codes matching the term by code or description
pub async fn search_grnti(pool: &SqlitePool, q: Option<&str>) -> Result<Vec<Grnti>> {
    let Some(term) = search_term(q) else {
        return Ok(Vec::new());
    };

    collect_matches(
        pool,
        "SELECT id, code, description FROM grnti ORDER BY code",
        |grnti: &Grnti| {
            matches_term(&grnti.code, &term) || description_matches(&grnti.description, &term)
        },
    )
    .await
}

pub async fn search_publishers(pool: &SqlitePool, q: Option<&str>) -> Result<Vec<Publisher>> {
    let Some(term) = search_term(q) else {
        return Ok(Vec::new());
    };

    collect_matches(
        pool,
        "SELECT id, name FROM publisher ORDER BY name",
        |publisher: &Publisher| matches_term(&publisher.name, &term),
    )
    .await
}

pub async fn create_author(pool: &SqlitePool, new: &NewAuthor) -> Result<Author> {
    new.validate()?;

    let author = Author {
        id: 0,
        first_name: new.first_name.trim().to_string(),
        patronymic: blank_to_none(new.patronymic.as_deref()),
        last_name: new.last_name.trim().to_string(),
        birth_year: new.birth_year,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO author (first_name, patronymic, last_name, birth_year)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&author.first_name)
    .bind(&author.patronymic)
    .bind(&author.last_name)
    .bind(author.birth_year)
    .execute(pool)
    .await?;

    let author = Author {
        id: result.last_insert_rowid(),
        ..author
    };
    info!("Created author {}: {}", author.id, author.display_name());
    Ok(author)
}

async fn insert_code(pool: &SqlitePool, scheme: CodeScheme, new: &NewCode) -> Result<(i64, String, Option<String>)> {
    new.validate()?;

    let code = scheme.canonical(&new.code);
    let description = blank_to_none(new.description.as_deref());
    let sql = format!(
        "INSERT INTO {} ({}, description) VALUES (?, ?)",
        scheme.table(),
        scheme.code_column()
    );

    let result = sqlx::query(&sql)
        .bind(&code)
        .bind(&description)
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, format!("{} code {} already exists", scheme.label(), code)))?;

    info!("Created {} code {}", scheme.label(), code);
    Ok((result.last_insert_rowid(), code, description))
}

pub async fn create_bbk(pool: &SqlitePool, new: &NewCode) -> Result<Bbk> {
    let (id, bbk_abb, description) = insert_code(pool, CodeScheme::Bbk, new).await?;
    Ok(Bbk {
        id,
        bbk_abb,
        description,
    })
}

pub async fn create_udc(pool: &SqlitePool, new: &NewCode) -> Result<Udc> {
    let (id, udc_abb, description) = insert_code(pool, CodeScheme::Udc, new).await?;
    Ok(Udc {
        id,
        udc_abb,
        description,
    })
}

pub async fn create_grnti(pool: &SqlitePool, new: &NewCode) -> Result<Grnti> {
    let (id, code, description) = insert_code(pool, CodeScheme::Grnti, new).await?;
    Ok(Grnti {
        id,
        code,
        description,
    })
}

pub async fn create_publisher(pool: &SqlitePool, new: &NewPublisher) -> Result<Publisher> {
    new.validate()?;

    let name = new.name.trim().to_string();
    let result = sqlx::query("INSERT INTO publisher (name) VALUES (?)")
        .bind(&name)
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, format!("Publisher {} already exists", name)))?;

    info!("Created publisher {}", name);
    Ok(Publisher {
        id: result.last_insert_rowid(),
        name,
    })
}

/// Id of a dictionary code, inserting it without description when missing
pub(crate) async fn find_or_create_code(
    conn: &mut SqliteConnection,
    scheme: CodeScheme,
    code: &str,
) -> Result<i64> {
    let select = format!(
        "SELECT id FROM {} WHERE {} = ?",
        scheme.table(),
        scheme.code_column()
    );
    let existing: Option<i64> = sqlx::query_scalar(&select)
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let insert = format!("INSERT INTO {} ({}) VALUES (?)", scheme.table(), scheme.code_column());
    let id = sqlx::query(&insert)
        .bind(code)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    debug!("Added {} code {} to dictionary (id {})", scheme.label(), code, id);
    Ok(id)
}

/// Id of a publisher by exact name, inserting it when missing
pub(crate) async fn find_or_create_publisher(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM publisher WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query("INSERT INTO publisher (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    debug!("Added publisher {} (id {})", name, id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::db::init_memory_database;

    async fn seed_grnti(pool: &SqlitePool, rows: &[(&str, &str)]) {
        for (code, description) in rows {
            sqlx::query("INSERT INTO grnti (code, description) VALUES (?, ?)")
                .bind(code)
                .bind(description)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_empty_term_returns_nothing() {
        let pool = init_memory_database().await.unwrap();
        seed_grnti(&pool, &[("20.15.05", "Информатика")]).await;

        assert!(search_grnti(&pool, None).await.unwrap().is_empty());
        assert!(search_grnti(&pool, Some("   ")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_grnti_matches_code_or_description() {
        let pool = init_memory_database().await.unwrap();
        seed_grnti(
            &pool,
            &[
                ("29.00.00", "Физика"),
                ("20.15.05", "Информационные системы"),
                ("06.81.12", "Ядерная физика в экономике"),
            ],
        )
        .await;

        let by_description = search_grnti(&pool, Some(" ФИЗИКА ")).await.unwrap();
        let codes: Vec<_> = by_description.iter().map(|g| g.code.as_str()).collect();
        assert_eq!(codes, vec!["06.81.12", "29.00.00"]);

        let by_code = search_grnti(&pool, Some("20.15")).await.unwrap();
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].description.as_deref(), Some("Информационные системы"));
    }

    #[tokio::test]
    async fn test_search_is_capped() {
        let pool = init_memory_database().await.unwrap();
        for i in 0..40 {
            sqlx::query("INSERT INTO bbk (bbk_abb, description) VALUES (?, 'Общий раздел')")
                .bind(format!("32.{:03}", i))
                .execute(&pool)
                .await
                .unwrap();
        }

        let found = search_bbk(&pool, Some("общий")).await.unwrap();
        assert_eq!(found.len(), SEARCH_LIMIT);
        assert_eq!(found[0].bbk_abb, "32.000");
    }

    #[tokio::test]
    async fn test_author_search_by_full_name() {
        let pool = init_memory_database().await.unwrap();
        let created = create_author(
            &pool,
            &NewAuthor {
                first_name: "Иван".to_string(),
                patronymic: Some("Петрович".to_string()),
                last_name: "Сидоров".to_string(),
                birth_year: Some(1950),
            },
        )
        .await
        .unwrap();

        let found = search_authors(&pool, Some("сидоров иван")).await.unwrap();
        assert_eq!(found, vec![created]);
        assert!(search_authors(&pool, Some("кузнецов")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let pool = init_memory_database().await.unwrap();
        let new = NewCode {
            code: "20.15".to_string(),
            description: Some("Информатика".to_string()),
        };

        let created = create_grnti(&pool, &new).await.unwrap();
        assert_eq!(created.code, "20.15.00");

        let again = create_grnti(&pool, &new).await;
        assert!(matches!(again, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_duplicate_publisher_is_conflict() {
        let pool = init_memory_database().await.unwrap();
        let new = NewPublisher {
            name: " Наука ".to_string(),
        };

        let created = create_publisher(&pool, &new).await.unwrap();
        assert_eq!(created.name, "Наука");
        assert!(matches!(
            create_publisher(&pool, &new).await,
            Err(Error::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_find_or_create_code_reuses_existing() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = find_or_create_code(&mut conn, CodeScheme::Udc, "004.4").await.unwrap();
        let second = find_or_create_code(&mut conn, CodeScheme::Udc, "004.4").await.unwrap();
        assert_eq!(first, second);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM udc")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_scheme_keys() {
        assert_eq!(CodeScheme::Grnti.canonical(" 20 "), "20.00.00");
        assert_eq!(CodeScheme::Bbk.canonical(" 32.973я7 "), "32.973я7");
        assert_eq!(CodeScheme::Bbk.match_key("32.973я7"), "32.973Я7");
    }
}
