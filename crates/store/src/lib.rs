//! Access to the remote document store holding slots and credentials.
//!
//! This crate provides:
//! - `DocumentStore` trait with the two operations the engine needs
//! - `HttpDocumentStore` speaking the `<root>/<path>.json` REST layout
//! - `MemoryDocumentStore`, an in-process fake with fault injection

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;
pub use traits::{DocumentStore, StoreError, ROOT_PATH};
