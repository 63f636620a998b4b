//! Row counts for the `tables` maintenance command

use super::init::table_names;
use crate::Result;
use sqlx::SqlitePool;

/// A catalog table and how many rows it holds
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub row_count: i64,
}

/// Count rows in every catalog table present in the database, by name
///
/// Tables the schema does not know about are left out.
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<TableInfo>> {
    let present: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await?;

    let mut names: Vec<&str> = table_names()
        .filter(|name| present.iter().any(|p| p == name))
        .collect();
    names.sort_unstable();

    let mut counts = Vec::with_capacity(names.len());
    for name in names {
        // identifiers come from the compiled schema
        let row_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", name))
            .fetch_one(pool)
            .await?;
        counts.push(TableInfo {
            name: name.to_string(),
            row_count,
        });
    }

    Ok(counts)
}
