//! Goroutine dump state machine.
//!
//! Consumes raw lines one at a time, builds [`Task`]s, and reports which
//! lines were not part of a dump so the caller can pass them through. The
//! parser tolerates any amount of noise before and after a dump; a line that
//! breaks the grammar in the middle of a task stops parsing for good.

use std::io::{BufRead, Write};

use panicdump_core::prelude::*;

use crate::classify::{
    is_blank, is_elided, is_unavailable, parse_call, parse_created, parse_location,
    parse_task_header,
};
use crate::scanner::LineScanner;

/// Outcome of feeding one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Line belongs to the dump and was consumed
    Consumed,

    /// Line is not part of a dump; the caller should emit it unchanged
    PassThrough,
}

/// Parser states.
///
/// States inside a task carry the index of that task. Calls and creation
/// sites waiting for their location line are held here until it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Outside a dump
    Idle,

    /// Inside a dump, between two tasks
    BetweenTasks,

    /// Saw `goroutine N [state]:`
    AfterHeader { task: usize },

    /// Saw a call line, waiting for its location
    AfterCall { task: usize, call: Call },

    /// Saw `created by f`, waiting for its location
    AfterCreatedHeader { task: usize, func: Func },

    /// Attached a location to a call
    AfterCallLocation { task: usize },

    /// Attached a location to the creation site
    AfterCreatedLocation,

    /// Saw the unavailable-stack marker
    Unavailable { task: usize },

    /// A fatal error was reported; nothing more is parsed
    Failed,
}

/// Line-by-line goroutine dump parser
#[derive(Debug)]
pub struct DumpParser {
    state: State,

    /// Tasks found so far, in print order
    tasks: Vec<Task>,
}

impl DumpParser {
    /// Create a new parser in Idle state
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            tasks: Vec::new(),
        }
    }

    /// Tasks built so far
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether a fatal error already stopped this parser
    pub fn has_failed(&self) -> bool {
        self.state == State::Failed
    }

    /// Consume the parser and return its tasks
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Feed one line, terminator included.
    ///
    /// An error is fatal: the parser keeps the tasks built so far and every
    /// later line is passed through untouched.
    pub fn feed_line(&mut self, line: &str) -> Result<Feed> {
        let state = std::mem::replace(&mut self.state, State::Failed);
        let (next, result) = self.step(state, line);
        if result.is_err() {
            debug!("Dump parsing stopped with {} task(s)", self.tasks.len());
        }
        self.state = next;
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    fn step(&mut self, state: State, line: &str) -> (State, Result<Feed>) {
        match state {
            State::Idle | State::BetweenTasks => self.handle_between_tasks(line),

            State::AfterHeader { task } => {
                if is_unavailable(line) {
                    self.tasks[task].stack.calls = vec![Call::unavailable()];
                    return (State::Unavailable { task }, Ok(Feed::Consumed));
                }
                if let Some((call, error)) = parse_call(line) {
                    return self.begin_call(task, call, error);
                }
                let error = Error::unexpected_line(Expectation::FunctionAfterHeader, line);
                (State::Failed, Err(error))
            }

            State::AfterCall { task, mut call } => match parse_location(line) {
                Some(Ok(loc)) => {
                    call.src_path = loc.src_path;
                    call.line = Some(loc.line);
                    self.tasks[task].stack.calls.push(call);
                    (State::AfterCallLocation { task }, Ok(Feed::Consumed))
                }
                Some(Err(error)) => {
                    self.tasks[task].stack.calls.push(call);
                    (State::Failed, Err(error))
                }
                None => {
                    self.tasks[task].stack.calls.push(call);
                    let error = Error::unexpected_line(Expectation::FileAfterFunction, line);
                    (State::Failed, Err(error))
                }
            },

            State::AfterCreatedHeader { task, func } => {
                let mut created = Call::new(func, Default::default());
                let result = match parse_location(line) {
                    Some(Ok(loc)) => {
                        created.src_path = loc.src_path;
                        created.line = Some(loc.line);
                        Ok(Feed::Consumed)
                    }
                    Some(Err(error)) => Err(error),
                    None => Err(Error::unexpected_line(Expectation::FileAfterCreated, line)),
                };
                self.tasks[task].created_by = Some(created);
                match result {
                    Ok(feed) => (State::AfterCreatedLocation, Ok(feed)),
                    Err(error) => (State::Failed, Err(error)),
                }
            }

            State::AfterCallLocation { task } => {
                if let Some(func) = parse_created(line) {
                    return (State::AfterCreatedHeader { task, func }, Ok(Feed::Consumed));
                }
                if is_elided(line) {
                    self.tasks[task].stack.elided = true;
                    return (State::AfterCallLocation { task }, Ok(Feed::Consumed));
                }
                if let Some((call, error)) = parse_call(line) {
                    return self.begin_call(task, call, error);
                }
                if is_blank(line) {
                    return (State::BetweenTasks, Ok(Feed::Consumed));
                }
                trace!("Dump ended, passing through trailing output");
                (State::Idle, Ok(Feed::PassThrough))
            }

            State::AfterCreatedLocation => {
                if is_blank(line) {
                    return (State::BetweenTasks, Ok(Feed::Consumed));
                }
                trace!("Dump ended, passing through trailing output");
                (State::Idle, Ok(Feed::PassThrough))
            }

            State::Unavailable { task } => {
                if is_blank(line) {
                    return (State::BetweenTasks, Ok(Feed::Consumed));
                }
                if let Some(func) = parse_created(line) {
                    return (State::AfterCreatedHeader { task, func }, Ok(Feed::Consumed));
                }
                let error = Error::unexpected_line(Expectation::BlankAfterUnavailable, line);
                (State::Failed, Err(error))
            }

            State::Failed => (State::Failed, Ok(Feed::PassThrough)),
        }
    }

    fn handle_between_tasks(&mut self, line: &str) -> (State, Result<Feed>) {
        let Some(header) = parse_task_header(line) else {
            return (State::Idle, Ok(Feed::PassThrough));
        };

        let first = self.tasks.is_empty();
        if first {
            debug!("Dump detected at goroutine {}", header.id);
        }
        self.tasks.push(Task {
            id: header.id,
            first,
            signature: Signature {
                state: header.state,
                sleep_min: header.sleep_minutes,
                sleep_max: header.sleep_minutes,
                locked: header.locked,
            },
            ..Task::default()
        });
        let task = self.tasks.len() - 1;
        (State::AfterHeader { task }, Ok(Feed::Consumed))
    }

    /// Hold a freshly parsed call until its location arrives.
    ///
    /// A call with a malformed argument is kept on the stack and stops parsing.
    fn begin_call(
        &mut self,
        task: usize,
        call: Call,
        error: Option<Error>,
    ) -> (State, Result<Feed>) {
        match error {
            None => (State::AfterCall { task, call }, Ok(Feed::Consumed)),
            Some(error) => {
                self.tasks[task].stack.calls.push(call);
                (State::Failed, Err(error))
            }
        }
    }
}

impl Default for DumpParser {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream Driver
// ─────────────────────────────────────────────────────────────────────────────

/// Result of scanning a whole stream
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Tasks in print order; empty when no dump was detected
    pub tasks: Vec<Task>,

    /// First fatal error, if any
    pub error: Option<Error>,
}

/// Scan `reader` for a goroutine dump.
///
/// Every line that is not part of the dump is written to `out` unchanged and
/// in order. Parsing stops at the first fatal error, which is returned with
/// the tasks built before it; the rest of the input is left unread.
pub fn scan_dump<R: BufRead, W: Write>(reader: R, mut out: W) -> ScanOutcome {
    let mut parser = DumpParser::new();
    let mut error = None;

    for token in LineScanner::new(reader) {
        let result = token.map_err(Error::from).and_then(|raw| {
            let line = String::from_utf8_lossy(&raw);
            match parser.feed_line(&line)? {
                Feed::PassThrough => out.write_all(&raw).map_err(Error::from),
                Feed::Consumed => Ok(()),
            }
        });
        if let Err(e) = result {
            error = Some(e);
            break;
        }
    }
    if let Err(e) = out.flush() {
        error.get_or_insert(Error::from(e));
    }

    ScanOutcome {
        tasks: parser.into_tasks(),
        error,
    }
}
