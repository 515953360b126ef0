//! Link ids
//!
//! Shaarli identifies a link by its creation date, formatted to the second.
//! This module handles:
//! - Converting between ids, timestamps and the dates shown on listings
//! - Generating creation timestamps that never collide

mod format;
mod generator;

pub use format::IdFormat;
pub use generator::{IdGenerator, MIN_SPACING};
