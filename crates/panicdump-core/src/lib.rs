//! # panicdump-core - Core Domain Types
//!
//! Foundation crate for panicdump. Provides the parsed dump model, error
//! handling, logging setup and environment-derived root candidates.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing, dirs).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Context`] - Parsed tasks plus discovered source roots
//! - [`Task`] - One goroutine with its [`Signature`], [`Stack`] and creation site
//! - [`Call`] - One frame: [`Func`], [`Args`] and source location
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Parse, IO and configuration errors
//! - [`Expectation`] - Which continuation the parser wanted when it stopped
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ### Configuration (`config`)
//! - [`RootCandidates`] - Local standard library and workspace directories
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use panicdump_core::prelude::*;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

pub use config::{workspace_roots_from, RootCandidates, STDLIB_ENV, WORKSPACE_ENV};
pub use error::{Error, Expectation, Result};
pub use types::{Arg, Args, Call, Context, Func, Signature, Stack, Task, UNAVAILABLE_SRC};
