//! Source root discovery.
//!
//! A dump records where each source file lived on the machine that built the
//! binary. The part of the path below the package root is usually the same
//! on this machine, so probing ever shorter suffixes of a remote path against
//! a local candidate directory finds where the remote root ends.
//!
//! This is a heuristic. Files that match nothing are simply left unresolved.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use panicdump_core::{RootCandidates, Task};
use tracing::{debug, trace};

use crate::probe::FileProbe;

/// A remote root confirmed against a local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMapping {
    /// Root prefix as printed in the dump
    pub remote: String,

    /// Local directory holding the same tree
    pub local: PathBuf,
}

/// Roots confirmed for one dump. Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roots {
    pub stdlib: Option<RootMapping>,

    /// Remote workspace root -> local directory
    pub workspaces: BTreeMap<String, PathBuf>,
}

impl Roots {
    /// Whether `path` already lies under a confirmed root.
    pub fn covers(&self, path: &str) -> bool {
        self.stdlib
            .as_ref()
            .is_some_and(|root| has_path_prefix(path, &root.remote))
            || self
                .workspaces
                .keys()
                .any(|remote| has_path_prefix(path, remote))
    }
}

/// Discover the remote roots of every source file referenced by `tasks`.
///
/// Files are visited in sorted order. The standard library candidate is
/// tried until one file confirms it; workspace candidates are tried in
/// order and the first one holding any suffix of the file wins.
pub fn find_roots<P: FileProbe>(tasks: &[Task], candidates: &RootCandidates, probe: &P) -> Roots {
    let mut roots = Roots::default();

    for file in source_files(tasks) {
        if roots.covers(&file) {
            continue;
        }
        let parts = split_path(&file);

        if roots.stdlib.is_none() {
            if let Some(local) = &candidates.stdlib {
                if let Some(remote) = rooted_in(probe, local, &parts) {
                    debug!("Found stdlib root {} -> {}", remote, local.display());
                    roots.stdlib = Some(RootMapping {
                        remote,
                        local: local.clone(),
                    });
                    continue;
                }
            }
        }

        let found = candidates
            .workspaces
            .iter()
            .find_map(|local| rooted_in(probe, local, &parts).map(|remote| (remote, local)));
        match found {
            Some((remote, local)) => {
                debug!("Found workspace root {} -> {}", remote, local.display());
                roots
                    .workspaces
                    .entry(remote)
                    .or_insert_with(|| local.clone());
            }
            None => trace!("No local root for {}", file),
        }
    }

    roots
}

/// All source paths referenced by `tasks`, creation sites included, deduped
/// and sorted.
pub fn source_files(tasks: &[Task]) -> Vec<String> {
    let files: BTreeSet<&str> = tasks
        .iter()
        .flat_map(|task| task.calls())
        .map(|call| call.src_path.as_str())
        .filter(|path| !path.is_empty())
        .collect();
    files.into_iter().map(str::to_string).collect()
}

/// Split a path into its components.
///
/// The first component keeps any leading separators so absolute and relative
/// paths stay distinct. Empty components are dropped.
pub fn split_path(path: &str) -> Vec<&str> {
    let lead = path.len() - path.trim_start_matches('/').len();
    let rest = &path[lead..];

    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let Some(first) = segments.next() else {
        return if lead > 0 { vec![path] } else { Vec::new() };
    };

    let mut parts = vec![&path[..lead + first.len()]];
    parts.extend(segments);
    parts
}

/// True if `path` is strictly below the directory `prefix`.
///
/// `a/b` is a prefix of `a/b/c` but not of `a/bc`.
pub fn has_path_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Find the longest suffix of `parts` present as a file under `root` and
/// return the remote prefix in front of it.
fn rooted_in<P: FileProbe>(probe: &P, root: &Path, parts: &[&str]) -> Option<String> {
    (1..parts.len()).find_map(|i| {
        let suffix: PathBuf = parts[i..].iter().collect();
        let candidate = root.join(suffix);
        trace!("Probing {}", candidate.display());
        probe
            .is_file(&candidate)
            .then(|| parts[..i].join("/"))
    })
}
