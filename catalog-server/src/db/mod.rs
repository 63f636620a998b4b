//! Catalog persistence
//!
//! Repository functions over the SQLite pool. Writes that touch several
//! tables run in one transaction.

pub mod books;
pub mod dictionaries;
pub mod relink;

pub use books::{create_book, delete_book, list_books, load_book, update_book};
pub use dictionaries::{
    create_author, create_bbk, create_grnti, create_publisher, create_udc, search_authors,
    search_bbk, search_grnti, search_publishers, search_udc, CodeScheme, SEARCH_LIMIT,
};
pub use relink::{relink_raw_codes, RelinkReport, RelinkStats};
