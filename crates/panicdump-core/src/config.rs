//! Local root candidates derived from the environment
//!
//! The resolver needs to know where the standard library and the workspace
//! trees live on this machine. Both come from the same variables the Go
//! toolchain reads. When `GOROOT` is not set, the installed `go` tool is
//! asked for its own root.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{Error, Result};

/// Variable naming the local standard library tree
pub const STDLIB_ENV: &str = "GOROOT";

/// Search-path variable listing local workspace trees
pub const WORKSPACE_ENV: &str = "GOPATH";

/// Local directories probed during root discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootCandidates {
    /// Local standard library directory, if known
    pub stdlib: Option<PathBuf>,

    /// Local workspace directories, in priority order
    pub workspaces: Vec<PathBuf>,
}

impl RootCandidates {
    pub fn new(stdlib: Option<PathBuf>, workspaces: Vec<PathBuf>) -> Self {
        Self { stdlib, workspaces }
    }

    /// Read candidates from `GOROOT` and `GOPATH`.
    ///
    /// An unset `GOROOT` falls back to `go env GOROOT`. Fails only when
    /// `GOPATH` is unset or empty and no home directory can be found for the
    /// default.
    pub fn from_env() -> Result<Self> {
        let stdlib = stdlib_root_from(env::var_os(STDLIB_ENV), detect_stdlib_root);
        let workspaces = workspace_roots_from(env::var_os(WORKSPACE_ENV), dirs::home_dir())?;
        debug!(
            "Root candidates: stdlib={:?}, workspaces={:?}",
            stdlib, workspaces
        );
        Ok(Self { stdlib, workspaces })
    }
}

/// Pick the standard library root.
///
/// A non-empty `value` wins; otherwise `detect` is consulted.
pub fn stdlib_root_from<F>(value: Option<OsString>, detect: F) -> Option<PathBuf>
where
    F: FnOnce() -> Option<PathBuf>,
{
    match value.filter(|v| !v.is_empty()) {
        Some(v) => Some(PathBuf::from(v)),
        None => detect(),
    }
}

/// Ask the installed `go` tool for its root.
///
/// Returns `None` when `go` is missing, fails, or prints nothing.
pub fn detect_stdlib_root() -> Option<PathBuf> {
    let output = Command::new("go")
        .args(["env", STDLIB_ENV])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .inspect_err(|e| debug!("go env {} failed: {}", STDLIB_ENV, e))
        .ok()?;
    if !output.status.success() {
        debug!("go env {} exited with {}", STDLIB_ENV, output.status);
        return None;
    }
    root_from_output(&output.stdout)
}

/// Trimmed, non-empty first line of a command's stdout.
fn root_from_output(stdout: &[u8]) -> Option<PathBuf> {
    let text = String::from_utf8_lossy(stdout);
    let root = text.lines().next()?.trim();
    (!root.is_empty()).then(|| PathBuf::from(root))
}

/// Split a search-path value into workspace roots.
///
/// Empty entries are dropped. When nothing is left, `<home>/go` is used.
pub fn workspace_roots_from(value: Option<OsString>, home: Option<PathBuf>) -> Result<Vec<PathBuf>> {
    let roots: Vec<PathBuf> = value
        .as_deref()
        .map(|v| {
            env::split_paths(v)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();
    if !roots.is_empty() {
        return Ok(roots);
    }

    match home {
        Some(home) => Ok(vec![home.join("go")]),
        None => Err(Error::config(format!(
            "{} is unset and no home directory was found",
            WORKSPACE_ENV
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // ─────────────────────────────────────────────────────────────────────────
    // Standard library root
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_stdlib_root_prefers_variable() {
        let root = stdlib_root_from(Some(OsString::from("/usr/local/go")), || {
            panic!("detection must not run when the variable is set")
        });
        assert_eq!(root, Some(PathBuf::from("/usr/local/go")));
    }

    #[test]
    fn test_stdlib_root_falls_back_to_detection() {
        let detected = || Some(PathBuf::from("/opt/go"));
        assert_eq!(stdlib_root_from(None, detected), Some(PathBuf::from("/opt/go")));
        assert_eq!(
            stdlib_root_from(Some(OsString::new()), detected),
            Some(PathBuf::from("/opt/go"))
        );
        assert_eq!(stdlib_root_from(None, || None), None);
    }

    #[test]
    fn test_root_from_output() {
        assert_eq!(
            root_from_output(b"/usr/lib/go\n"),
            Some(PathBuf::from("/usr/lib/go"))
        );
        assert_eq!(
            root_from_output(b"  C:\\Go\r\n"),
            Some(PathBuf::from("C:\\Go"))
        );
        assert_eq!(root_from_output(b""), None);
        assert_eq!(root_from_output(b"\n"), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Workspace roots
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_workspace_roots_split() {
        let value = env::join_paths(["/a/go", "/b/go"]).unwrap();
        let roots = workspace_roots_from(Some(value), None).unwrap();
        assert_eq!(roots, vec![PathBuf::from("/a/go"), PathBuf::from("/b/go")]);
    }

    #[test]
    fn test_workspace_roots_drop_empty_entries() {
        let value = env::join_paths(["", "/a/go", ""]).unwrap();
        let roots = workspace_roots_from(Some(value), None).unwrap();
        assert_eq!(roots, vec![PathBuf::from("/a/go")]);
    }

    #[test]
    fn test_workspace_roots_fallback_to_home() {
        let roots = workspace_roots_from(None, Some(PathBuf::from("/home/gopher"))).unwrap();
        assert_eq!(roots, vec![PathBuf::from("/home/gopher/go")]);

        let roots =
            workspace_roots_from(Some(OsString::new()), Some(PathBuf::from("/home/gopher")))
                .unwrap();
        assert_eq!(roots, vec![PathBuf::from("/home/gopher/go")]);
    }

    #[test]
    fn test_workspace_roots_without_home_fails() {
        let err = workspace_roots_from(None, None).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("GOPATH"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_variables() {
        let old_root = env::var_os(STDLIB_ENV);
        let old_path = env::var_os(WORKSPACE_ENV);

        env::set_var(STDLIB_ENV, "/usr/local/go");
        env::set_var(WORKSPACE_ENV, "/work/go");
        let candidates = RootCandidates::from_env().unwrap();
        assert_eq!(candidates.stdlib, Some(PathBuf::from("/usr/local/go")));
        assert_eq!(candidates.workspaces, vec![PathBuf::from("/work/go")]);

        env::set_var(STDLIB_ENV, "");
        let candidates = RootCandidates::from_env().unwrap();
        assert_eq!(candidates.stdlib, detect_stdlib_root());

        match old_root {
            Some(v) => env::set_var(STDLIB_ENV, v),
            None => env::remove_var(STDLIB_ENV),
        }
        match old_path {
            Some(v) => env::set_var(WORKSPACE_ENV, v),
            None => env::remove_var(WORKSPACE_ENV),
        }
    }
}
