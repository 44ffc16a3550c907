//! # rbtag Common Library
//!
//! Shared code for the rbtag archive tagger:
//! - Fatal error type (configuration, roster)
//! - Configuration loading and validation
//! - Name normalization and the string comparison used for ordering
//! - Duration formatting for embedded titles

pub mod config;
pub mod error;
pub mod human_time;
pub mod text;

pub use error::{Error, Result};
pub use text::{compare_str, normalize_name, ComparisonResult};
