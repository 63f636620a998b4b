//! Catalog records
//!
//! Field names serialize in camelCase, the wire format the edit UI speaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub patronymic: Option<String>,
    pub last_name: String,
    pub birth_year: Option<i32>,
}

impl Author {
    /// "Last First Patronymic" with blank parts skipped
    pub fn display_name(&self) -> String {
        [
            Some(self.last_name.as_str()),
            Some(self.first_name.as_str()),
            self.patronymic.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Bbk {
    pub id: i64,
    pub bbk_abb: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Udc {
    pub id: i64,
    pub udc_abb: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Grnti {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

/// Physical copy of a book held by the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BookCopy {
    pub id: i64,
    pub inventory_no: String,
    pub receipt_date: Option<NaiveDate>,
    pub storage_place: Option<String>,
    pub price: Option<f64>,
}

/// "City, Publisher, Year" imprint of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPubPlace {
    pub id: i64,
    pub book_id: i64,
    pub publisher: Option<Publisher>,
    pub city: Option<String>,
    pub pub_year: Option<i32>,
}

/// Legacy BBK code imported verbatim and not matched to the dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BookBbkRaw {
    pub book_id: i64,
    pub bbk_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BookUdcRaw {
    pub book_id: i64,
    pub udc_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BookGrntiRaw {
    pub book_id: i64,
    pub grnti_code: String,
}

/// Row of the book list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i64,
    pub title: Option<String>,
    pub book_type: Option<String>,
    pub series: Option<String>,
}

/// Book with every relation loaded, as returned by `GET /books/:id`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub id: i64,
    pub title: Option<String>,
    pub book_type: Option<String>,
    pub edit: Option<String>,
    pub edition_statement: Option<String>,
    pub phys_desc: Option<String>,
    pub series: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub bbks: Vec<Bbk>,
    #[serde(default)]
    pub udcs: Vec<Udc>,
    #[serde(default)]
    pub grntis: Vec<Grnti>,
    #[serde(default)]
    pub book_copies: Vec<BookCopy>,
    #[serde(default)]
    pub publication_places: Vec<BookPubPlace>,
    #[serde(default)]
    pub bbk_raws: Vec<BookBbkRaw>,
    #[serde(default)]
    pub udc_raws: Vec<BookUdcRaw>,
    #[serde(default)]
    pub grnti_raws: Vec<BookGrntiRaw>,
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Classification code as shown on an edit-form chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCode {
    pub id: i64,
    pub code: String,
}

impl From<&Bbk> for ClassCode {
    fn from(bbk: &Bbk) -> Self {
        Self {
            id: bbk.id,
            code: bbk.bbk_abb.clone(),
        }
    }
}

impl From<&Udc> for ClassCode {
    fn from(udc: &Udc) -> Self {
        Self {
            id: udc.id,
            code: udc.udc_abb.clone(),
        }
    }
}

impl From<&Grnti> for ClassCode {
    fn from(grnti: &Grnti) -> Self {
        Self {
            id: grnti.id,
            code: grnti.code.clone(),
        }
    }
}
