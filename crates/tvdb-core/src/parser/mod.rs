//! Parsers for catalog field formats
//!
//! - `credits`: Guest star micro-format and plain name lists
//! - `dates`: Free-text air dates

pub mod credits;
pub mod dates;

// Re-export main parsing functions
pub use credits::{parse_credits, parse_guest_stars, parse_people};
pub use dates::parse_premiere_date;
