//! Database schema and connection setup

pub mod init;
pub mod tables;

pub use init::*;
pub use tables::{list_tables, TableInfo};
