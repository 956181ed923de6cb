//! Configuration types
//!
//! Board-agnostic wheel configuration and the parser for its TOML source.

pub mod parse;
pub mod types;

pub use parse::{parse_config, parse_pin_string, ParseError};
pub use types::*;
