//! SQL utilities for member queries
//!
//! Provides WHERE/ORDER BY rendering, DDL generation, and identifier sanitization.

pub mod condition;
pub mod ddl;
pub mod sanitize;

pub use condition::{build_condition_clause, build_order_by_clause, column_ref};
pub use ddl::DdlGenerator;
pub use sanitize::{RESERVED_WORDS, quote_identifier, validate_identifier};
