//! Filesystem existence oracle used by root discovery

use std::fs;
use std::path::Path;

/// Answers whether a path names a regular file.
///
/// Root discovery only ever asks this one question, so tests can swap in a
/// fake filesystem.
#[cfg_attr(test, mockall::automock)]
pub trait FileProbe {
    fn is_file(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileProbe for LocalFs {
    fn is_file(&self, path: &Path) -> bool {
        fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
    }
}
