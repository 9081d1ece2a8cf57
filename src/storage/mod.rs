mod document_store;
mod models;

pub use document_store::{DocumentStore, StorageError};
pub use models::*;
