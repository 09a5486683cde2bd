//! Paged record storage for bulk data too large for the state store.

pub mod paged;

pub use paged::PagedStore;
