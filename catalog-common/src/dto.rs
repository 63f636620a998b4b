//! Request payloads
//!
//! `UpdateBook` is a partial update: a `None` field means "leave as is",
//! a present list replaces the whole relation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum title length accepted by create/update
pub const TITLE_MAX_LEN: usize = 500;

/// Publication place as submitted by the edit form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubPlaceInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_year: Option<i32>,
}

/// Partial update of a book (`PUT /books/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phys_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Author ids picked in the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors_ids: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbk_abbs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udc_abbs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grnti_codes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbk_raw_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udc_raw_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grnti_raw_codes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_places: Option<Vec<PubPlaceInput>>,
}

/// New book (`POST /books`); relations use the same shape as an update
pub type CreateBook = UpdateBook;

impl UpdateBook {
    /// True when applying this update would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject payloads the database must never see
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.chars().count() > TITLE_MAX_LEN {
                return Err(Error::InvalidInput(format!(
                    "title must be at most {} characters",
                    TITLE_MAX_LEN
                )));
            }
        }

        for place in self.pub_places.iter().flatten() {
            if let Some(year) = place.pub_year {
                if year < 0 {
                    return Err(Error::InvalidInput(format!(
                        "pubYear must not be negative: {}",
                        year
                    )));
                }
            }
        }

        Ok(())
    }
}

/// New author (`POST /authors`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    pub first_name: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
}

impl NewAuthor {
    pub fn validate(&self) -> Result<()> {
        if self.last_name.trim().is_empty() {
            return Err(Error::InvalidInput("lastName must not be empty".to_string()));
        }
        Ok(())
    }
}

/// New dictionary code (`POST /bbk`, `/udc`, `/grnti`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCode {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCode {
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(Error::InvalidInput("code must not be empty".to_string()));
        }
        Ok(())
    }
}

/// New publisher (`POST /publishers`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPublisher {
    pub name: String,
}

impl NewPublisher {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("name must not be empty".to_string()));
        }
        Ok(())
    }
}
