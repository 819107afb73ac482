//! Table module for upload metadata
//!
//! Provides the `UploadTable` contract and its Postgres implementation over
//! the `file_uploads` table.

mod postgres;
mod upload_table;

pub use postgres::PgUploadTable;
pub use upload_table::UploadTable;
