//! # panicdump-parse - Dump Parsing
//!
//! Turns the text a Go program prints when it panics (or on `SIGQUIT`) into
//! [`Task`](panicdump_core::Task)s.
//!
//! ## Public API
//!
//! ### Line Classifier (`classify`)
//! - [`parse_task_header()`], [`parse_call()`], [`parse_location()`],
//!   [`parse_created()`] - Field-extracting recognizers
//! - [`is_unavailable()`], [`is_elided()`], [`is_blank()`] - Marker checks
//!
//! ### State Machine (`dump`)
//! - [`DumpParser`] - Line-by-line parser building tasks
//! - [`Feed`] - Whether a fed line was consumed or should be passed through
//! - [`scan_dump()`] - Drive the parser over a reader, copying noise to a writer
//!
//! ### Scanner (`scanner`)
//! - [`LineScanner`] - Terminator-preserving line tokenizer

pub mod classify;
pub mod dump;
pub mod scanner;

pub use classify::{
    is_blank, is_elided, is_unavailable, parse_call, parse_created, parse_location,
    parse_task_header, Location, TaskHeader,
};
pub use dump::{scan_dump, DumpParser, Feed, ScanOutcome};
pub use scanner::{LineScanner, MAX_TOKEN_SIZE};
