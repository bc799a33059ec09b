//! Utility functions.

pub mod parser;

pub use parser::{format_duration, parse_duration, parse_id_list};
