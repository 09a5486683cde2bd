//! Concrete pipeline definitions.

pub mod inbox;

pub use inbox::{NO_ACTIONS, inbox_pipeline, is_no_actions, seed_store};
