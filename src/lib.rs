#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// The application controller tying ledger, theme and storage together
pub mod app;
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Functions for parsing input, exporting CSV and rendering reports
pub mod io;
/// The transaction ledger and its persistence
pub mod ledger;
/// Totals, category breakdowns and month filtering
pub mod ops;
/// Key-value storage backends
pub mod storage;
/// Theme persistence
pub mod theme;
/// Data types used throughout Pocketbook
pub mod types;

pub use app::{App, View};
pub use errors::Error;
pub use ledger::Ledger;
