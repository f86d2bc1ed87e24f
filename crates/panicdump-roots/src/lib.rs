//! # panicdump-roots - Source Root Discovery
//!
//! Maps the build-machine source paths printed in a dump to files on this
//! machine.
//!
//! ## Public API
//!
//! ### Probing (`probe`)
//! - [`FileProbe`] - "Is this a regular file?" oracle
//! - [`LocalFs`] - Oracle backed by the real filesystem
//!
//! ### Discovery (`resolve`)
//! - [`find_roots()`] - Confirm the stdlib and workspace roots of a dump
//! - [`Roots`], [`RootMapping`] - Confirmed remote -> local roots
//!
//! ### Localization (`locations`)
//! - [`localize()`] - Fill local paths and stdlib flags on every call

pub mod locations;
pub mod probe;
pub mod resolve;

pub use locations::localize;
pub use probe::{FileProbe, LocalFs};
pub use resolve::{find_roots, has_path_prefix, source_files, split_path, RootMapping, Roots};
