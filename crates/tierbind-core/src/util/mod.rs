//! Utility helpers shared across the crate.

mod pages;

pub use self::pages::{pages_for, round_to_pages};
