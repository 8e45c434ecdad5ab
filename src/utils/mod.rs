//! Shared helpers.

mod selector;
pub mod text;

pub use selector::parse_selector_unsafe;
