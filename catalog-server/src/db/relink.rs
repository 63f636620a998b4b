//! Relink legacy raw codes to the classification dictionaries
//!
//! Raw codes come from the catalogue export verbatim. Once the matching
//! dictionary entry exists, a join row is added so the book shows the
//! code as a regular classification.

use std::collections::HashMap;

use catalog_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use super::dictionaries::CodeScheme;

/// Outcome of relinking one scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelinkStats {
    /// Raw rows examined
    pub total: u64,
    /// Rows whose code matched a dictionary entry
    pub linked: u64,
    /// Rows with no dictionary match
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelinkReport {
    pub bbk: RelinkStats,
    pub udc: RelinkStats,
    pub grnti: RelinkStats,
}

/// Match every raw code against its dictionary and insert missing join rows
///
/// BBK compares case-insensitively, GRNTI after padding to three groups,
/// UDC as trimmed. Existing join rows are left alone.
pub async fn relink_raw_codes(pool: &SqlitePool) -> Result<RelinkReport> {
    let mut report = RelinkReport::default();

    for scheme in CodeScheme::ALL {
        let stats = relink_scheme(pool, scheme).await?;
        info!(
            "{} relink: {} raw, {} linked, {} without match",
            scheme.label(),
            stats.total,
            stats.linked,
            stats.skipped
        );

        match scheme {
            CodeScheme::Bbk => report.bbk = stats,
            CodeScheme::Udc => report.udc = stats,
            CodeScheme::Grnti => report.grnti = stats,
        }
    }

    Ok(report)
}

async fn relink_scheme(pool: &SqlitePool, scheme: CodeScheme) -> Result<RelinkStats> {
    let dictionary_sql = format!("SELECT id, {} FROM {}", scheme.code_column(), scheme.table());
    let dictionary: HashMap<String, i64> = sqlx::query_as::<_, (i64, String)>(&dictionary_sql)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(id, code)| (scheme.match_key(&code), id))
        .collect();

    let raw_sql = format!(
        "SELECT book_id, {} FROM {} ORDER BY book_id",
        scheme.raw_column(),
        scheme.raw_table()
    );
    let raws = sqlx::query_as::<_, (i64, String)>(&raw_sql)
        .fetch_all(pool)
        .await?;

    let insert = format!(
        "INSERT OR IGNORE INTO {} (book_id, {}) VALUES (?, ?)",
        scheme.join_table(),
        scheme.join_column()
    );

    let mut stats = RelinkStats::default();
    let mut tx = pool.begin().await?;

    for (book_id, raw_code) in raws {
        stats.total += 1;

        match dictionary.get(&scheme.match_key(&raw_code)) {
            Some(code_id) => {
                sqlx::query(&insert)
                    .bind(book_id)
                    .bind(code_id)
                    .execute(&mut *tx)
                    .await?;
                stats.linked += 1;
            }
            None => stats.skipped += 1,
        }
    }

    tx.commit().await?;
    Ok(stats)
}
