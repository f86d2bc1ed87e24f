//! panicdump Library
//!
//! Parses the goroutine dump a Go program prints when it panics and, when
//! asked, finds where the referenced source files live on this machine.
//!
//! ```no_run
//! use std::io;
//!
//! let stdin = io::stdin().lock();
//! let outcome = panicdump::parse_dump(stdin, io::stdout(), true);
//! if let Some(context) = &outcome.context {
//!     for task in &context.tasks {
//!         println!("goroutine {} [{}]", task.id, task.signature.state);
//!     }
//! }
//! ```

use std::io::{BufRead, Write};

use tracing::{info, warn};

pub use panicdump_core::{
    logging, prelude, Arg, Args, Call, Context, Error, Expectation, Func, Result, RootCandidates,
    Signature, Stack, Task,
};
pub use panicdump_parse::{scan_dump, DumpParser, Feed, ScanOutcome};
pub use panicdump_roots::{find_roots, localize, FileProbe, LocalFs, RootMapping, Roots};

/// Everything a parse produced
#[derive(Debug, Default)]
pub struct DumpOutcome {
    /// Parsed dump, `None` when the input held no goroutine header
    pub context: Option<Context>,

    /// Fatal error that stopped parsing, if any
    pub error: Option<Error>,
}

impl DumpOutcome {
    /// Drop partial results when parsing failed.
    pub fn into_result(self) -> Result<Option<Context>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.context),
        }
    }
}

/// Dump parser with optional source root discovery
#[derive(Debug, Clone)]
pub struct DumpAnalyzer<P = LocalFs> {
    candidates: Option<RootCandidates>,
    probe: P,
}

impl DumpAnalyzer<LocalFs> {
    /// Parse only, no root discovery.
    pub fn new() -> Self {
        Self {
            candidates: None,
            probe: LocalFs,
        }
    }
}

impl Default for DumpAnalyzer<LocalFs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FileProbe> DumpAnalyzer<P> {
    /// Discover roots against these local candidates after parsing.
    pub fn with_roots(mut self, candidates: RootCandidates) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Answer file existence questions with `probe` instead of the filesystem.
    pub fn with_probe<Q: FileProbe>(self, probe: Q) -> DumpAnalyzer<Q> {
        DumpAnalyzer {
            candidates: self.candidates,
            probe,
        }
    }

    /// Parse `reader`, copying every line outside the dump to `out`.
    pub fn parse<R: BufRead, W: Write>(&self, reader: R, out: W) -> DumpOutcome {
        let ScanOutcome { tasks, error } = scan_dump(reader, out);
        if tasks.is_empty() {
            return DumpOutcome {
                context: None,
                error,
            };
        }

        let mut context = Context::new(tasks);
        if let Some(candidates) = &self.candidates {
            let roots = find_roots(&context.tasks, candidates, &self.probe);
            localize(&mut context.tasks, &roots);
            context.stdlib_root = roots.stdlib.map(|root| root.remote);
            context.workspace_roots = Some(roots.workspaces);
        }

        info!(
            "Parsed {} goroutine(s){}",
            context.tasks.len(),
            if error.is_some() { " before an error" } else { "" }
        );
        DumpOutcome {
            context: Some(context),
            error,
        }
    }
}

/// Parse a dump, reading root candidates from `GOROOT`/`GOPATH` when
/// `guess_paths` is set.
///
/// Root discovery is skipped with a warning if the environment cannot
/// provide candidates.
pub fn parse_dump<R: BufRead, W: Write>(reader: R, out: W, guess_paths: bool) -> DumpOutcome {
    let mut analyzer = DumpAnalyzer::new();
    if guess_paths {
        match RootCandidates::from_env() {
            Ok(candidates) => analyzer = analyzer.with_roots(candidates),
            Err(e) => warn!("Skipping source root discovery: {}", e),
        }
    }
    analyzer.parse(reader, out)
}
