//! Domain types for a parsed goroutine dump

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Source path recorded for a task whose stack could not be captured
pub const UNAVAILABLE_SRC: &str = "<unavailable>";

/// Package-relative path of the harness file `go test` injects
const TEST_MAIN_SRC: &str = "_test/_testmain.go";

// ─────────────────────────────────────────────────────────────────────────────
// Calls
// ─────────────────────────────────────────────────────────────────────────────

/// A function name exactly as printed in the dump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Func {
    pub raw: String,
}

impl Func {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A single raw argument word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    pub value: u64,
}

/// Arguments printed for a call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Args {
    pub values: Vec<Arg>,

    /// The runtime truncated the argument list
    pub elided: bool,
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .values
            .iter()
            .map(|arg| format!("0x{:x}", arg.value))
            .collect();
        if self.elided {
            parts.push("...".to_string());
        }
        f.write_str(&parts.join(", "))
    }
}

/// One stack frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub func: Func,
    pub args: Args,

    /// Source path as printed in the dump (the build machine's path)
    pub src_path: String,

    /// Line number, `None` for synthesized frames
    pub line: Option<u32>,

    /// Path of the same file on this machine, once roots are resolved
    pub local_src_path: Option<PathBuf>,

    /// Whether the file belongs to the standard library
    pub is_stdlib: bool,
}

impl Call {
    /// Create a call with no location attached yet.
    pub fn new(func: Func, args: Args) -> Self {
        Self {
            func,
            args,
            ..Self::default()
        }
    }

    /// The synthetic frame used when a task's stack is unavailable.
    pub fn unavailable() -> Self {
        Self {
            src_path: UNAVAILABLE_SRC.to_string(),
            ..Self::default()
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.src_path == UNAVAILABLE_SRC
    }

    /// File name without its directory.
    ///
    /// Examples:
    /// - `/go/src/runtime/proc.go` -> `proc.go`
    /// - `<autogenerated>` -> `<autogenerated>`
    pub fn src_name(&self) -> &str {
        self.src_path.rsplit('/').next().unwrap_or(&self.src_path)
    }

    /// Parent directory name and file name, e.g. `runtime/proc.go`.
    pub fn pkg_src(&self) -> String {
        let mut parts = self.src_path.rsplit('/');
        let name = parts.next().unwrap_or_default();
        match parts.next() {
            Some(dir) if !dir.is_empty() => format!("{}/{}", dir, name),
            _ => name.to_string(),
        }
    }

    /// `name:line`, or just the name when there is no line.
    pub fn src_line(&self) -> String {
        with_line(self.src_name(), self.line)
    }

    /// `path:line`, or just the path when there is no line.
    pub fn full_src_line(&self) -> String {
        with_line(&self.src_path, self.line)
    }

    /// Whether `go test` injected this frame's file.
    pub fn is_test_main(&self) -> bool {
        self.pkg_src() == TEST_MAIN_SRC
    }
}

fn with_line(path: &str, line: Option<u32>) -> String {
    match line {
        Some(line) => format!("{}:{}", path, line),
        None => path.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered call stack, innermost frame first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub calls: Vec<Call>,

    /// The runtime omitted frames from this stack
    pub elided: bool,
}

/// Scheduling metadata printed in a task header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Base run state, e.g. `running`, `chan receive`
    pub state: String,
    pub sleep_min: u32,
    pub sleep_max: u32,

    /// `locked to thread`
    pub locked: bool,
}

impl Signature {
    /// Human readable sleep duration, empty when the task was not sleeping.
    pub fn sleep_string(&self) -> String {
        if self.sleep_max == 0 {
            return String::new();
        }
        if self.sleep_min != self.sleep_max {
            return format!("{}~{} minutes", self.sleep_min, self.sleep_max);
        }
        format!("{} minutes", self.sleep_max)
    }
}

/// One goroutine from the dump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,

    /// First task printed, conventionally the one that panicked
    pub first: bool,
    pub signature: Signature,
    pub stack: Stack,

    /// Where the task was spawned, if the runtime printed it
    pub created_by: Option<Call>,
}

impl Task {
    /// All calls of this task, creation site included.
    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.stack.calls.iter().chain(self.created_by.iter())
    }

    pub fn calls_mut(&mut self) -> impl Iterator<Item = &mut Call> {
        self.stack.calls.iter_mut().chain(self.created_by.iter_mut())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// Parse result: the tasks found plus the roots discovered for their sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Tasks in the order they were printed
    pub tasks: Vec<Task>,

    /// Standard library root as it appears in the dump, if one was found
    pub stdlib_root: Option<String>,

    /// Remote workspace root -> matching local directory.
    ///
    /// `None` when root discovery was not requested.
    pub workspace_roots: Option<BTreeMap<String, PathBuf>>,
}

impl Context {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            stdlib_root: None,
            workspace_roots: None,
        }
    }
}
