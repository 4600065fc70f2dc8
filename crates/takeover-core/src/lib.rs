//! Core types for the dangling CNAME fingerprint registry.
//!
//! This crate provides the foundational pieces shared by the verifier and the CLI:
//!
//! - **Types**: fingerprint records, probe specifications and verification results
//! - **Table**: the row parser and Markdown renderer for the fingerprint table
//! - **Readme**: locating and replacing the table inside a README document
//! - **Errors**: a single [`TakeoverError`] with a [`Result`] alias
//!
//! # Example
//!
//! ```rust
//! use takeover_core::table::{parse_row, ParseOutcome};
//!
//! let row = "| Heroku | Vulnerable | | herokuapp.com | `No such app` | | |";
//! match parse_row(row) {
//!     ParseOutcome::Record(record) => assert_eq!(record.engine, "Heroku"),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/takeover-core/0.3.0")]

mod error;
pub mod readme;
pub mod table;
pub mod types;

pub use error::{Result, TakeoverError};
pub use types::*;
