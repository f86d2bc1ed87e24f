//! Rewrite remote source paths to their local counterparts

use std::path::{Path, PathBuf};

use panicdump_core::{Call, Task};

use crate::resolve::{has_path_prefix, Roots};

/// Fill `local_src_path` and `is_stdlib` on every call of every task.
///
/// The standard library root is checked first, then the workspace roots.
/// Calls under no known root keep `local_src_path = None`.
pub fn localize(tasks: &mut [Task], roots: &Roots) {
    for call in tasks.iter_mut().flat_map(Task::calls_mut) {
        localize_call(call, roots);
    }
}

fn localize_call(call: &mut Call, roots: &Roots) {
    let stdlib = roots
        .stdlib
        .as_ref()
        .filter(|root| has_path_prefix(&call.src_path, &root.remote));

    call.local_src_path = match stdlib {
        Some(root) => Some(rebase(&root.local, &call.src_path[root.remote.len()..])),
        None => longest_workspace(roots, &call.src_path)
            .map(|(remote, local)| rebase(local, &call.src_path[remote.len()..])),
    };
    call.is_stdlib = stdlib.is_some() || call.is_test_main();
}

/// The workspace root with the longest remote prefix of `path`.
fn longest_workspace<'a>(roots: &'a Roots, path: &str) -> Option<(&'a str, &'a PathBuf)> {
    roots
        .workspaces
        .iter()
        .filter(|(remote, _)| has_path_prefix(path, remote))
        .max_by_key(|(remote, _)| remote.len())
        .map(|(remote, local)| (remote.as_str(), local))
}

/// Join the remainder of a remote path (starting with `/`) onto a local root.
fn rebase(local: &Path, rest: &str) -> PathBuf {
    local.join(rest.trim_start_matches('/'))
}
