//! Edit session: load a book, prefill the form, submit the update
//!
//! Every outcome the user should see is reported as a [`Notice`] and
//! logged.

use std::fmt;

use catalog_common::models::BookDetail;
use tracing::{error, info};

use crate::client::{CatalogClient, ClientError};
use crate::form::BookForm;

const LOAD_FAILED: &str = "Could not load the book";
const SAVE_FAILED: &str = "Could not save the book";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short message shown after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Server message for API errors, `fallback` for anything else
fn failure_text(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Api { message, .. } => message.clone(),
        _ => fallback.to_string(),
    }
}

/// One book being edited
pub struct EditSession {
    client: CatalogClient,
    book: Option<BookDetail>,
    form: Option<BookForm>,
}

impl EditSession {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            book: None,
            form: None,
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    /// Book as last loaded or saved
    pub fn book(&self) -> Option<&BookDetail> {
        self.book.as_ref()
    }

    pub fn form(&self) -> Option<&BookForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut BookForm> {
        self.form.as_mut()
    }

    /// Fetch the full book and prefill the form from it
    pub async fn open(&mut self, book_id: i64) -> Result<(), Notice> {
        match self.client.get_book(book_id).await {
            Ok(book) => {
                self.form = Some(BookForm::prefill(&book));
                self.book = Some(book);
                info!(book_id, "Book loaded for editing");
                Ok(())
            }
            Err(e) => {
                error!(book_id, error = %e, "Failed to load book");
                self.book = None;
                self.form = None;
                Err(Notice::error(failure_text(&e, LOAD_FAILED)))
            }
        }
    }

    /// Submit the form; on success the form is refilled from the saved book
    pub async fn submit(&mut self) -> Notice {
        let Some(form) = &self.form else {
            return Notice::error("No book is open");
        };

        let book_id = form.book_id;
        let update = form.to_update();

        match self.client.update_book(book_id, &update).await {
            Ok(saved) => {
                self.form = Some(BookForm::prefill(&saved));
                self.book = Some(saved);
                info!(book_id, "Book saved");
                Notice::success(format!("Book #{} saved", book_id))
            }
            Err(e) => {
                error!(book_id, error = %e, "Failed to save book");
                Notice::error(failure_text(&e, SAVE_FAILED))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_text_prefers_server_message() {
        let api = ClientError::Api {
            status: 400,
            message: "Unknown author id 7".to_string(),
        };
        assert_eq!(failure_text(&api, SAVE_FAILED), "Unknown author id 7");

        let network = ClientError::Network("connection refused".to_string());
        assert_eq!(failure_text(&network, SAVE_FAILED), SAVE_FAILED);
    }

    #[tokio::test]
    async fn test_submit_without_book() {
        let client = CatalogClient::new("http://127.0.0.1:9", None).unwrap();
        let mut session = EditSession::new(client);

        let notice = session.submit().await;
        assert!(notice.is_error());
        assert!(session.form().is_none());
    }
}
