//! Original-file documents and their store.

pub mod store;

pub(crate) mod model;

pub use model::OriginalFile;
pub use store::{DocumentStore, FileHandle};
