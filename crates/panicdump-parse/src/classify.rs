//! Line shape recognizers for goroutine dumps.
//!
//! Each recognizer looks at one raw line (terminator included) and either
//! returns `None` when the line is not of its shape, or the extracted fields.
//! Recognizers never touch parser state.

use regex::Regex;
use std::sync::LazyLock;

use panicdump_core::{Arg, Args, Call, Error, Func, Result};

/// Header suffix marking a task pinned to its OS thread
const LOCKED_TO_THREAD: &str = "locked to thread";

// ─────────────────────────────────────────────────────────────────────────────
// Regex Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// Matches `goroutine 1 [chan receive, 5 minutes, locked to thread]:`
/// Captures: 1=id, 2=state with suffixes
static TASK_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\t| +)?goroutine (\d+) \[([^\]]+)\]:\r?\n$")
        .expect("Invalid TASK_HEADER_REGEX")
});

/// Matches the sleep suffix of a header: `5 minutes`
static MINUTES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+) minutes$").expect("Invalid MINUTES_REGEX"));

/// Matches the marker printed instead of a stack running on another thread
static UNAVAILABLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\t| +)goroutine running on other thread; stack unavailable")
        .expect("Invalid UNAVAILABLE_REGEX")
});

/// Matches a source location: `\t/src/main.go:12 +0x1d fp=0xc0 sp=0xc0`
///
/// - the file is `??` for cgo frames and `<autogenerated>` for compiler
///   generated wrappers
/// - the `+0x` offset is missing for frames without a linker entry
/// - `fp=`/`sp=` are appended to C frames while throwing
///
/// Captures: 1=file, 2=line
static LOCATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\t| +)(\?\?|<autogenerated>|.+\.(?:c|go|s)):(\d+)(?:| \+0x[0-9a-f]+)(?:| fp=0x[0-9a-f]+ sp=0x[0-9a-f]+)\r?\n$",
    )
    .expect("Invalid LOCATION_REGEX")
});

/// Matches `created by main.main`
/// Captures: 1=function
static CREATED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\t| +)?created by (.+?)\r?\n$").expect("Invalid CREATED_REGEX")
});

/// Matches `main.(*T).run(0xc000010000, 0x1, ...)`
/// Captures: 1=function, 2=arguments
static CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\t| +)?(.+)\((.*)\)\r?\n$").expect("Invalid CALL_REGEX")
});

/// Matches the sentinel the runtime prints when it stops walking a stack
static ELIDED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\t| +)?\.\.\.additional frames elided\.\.\.\r?\n$")
        .expect("Invalid ELIDED_REGEX")
});

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Fields of a task header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHeader {
    pub id: u64,

    /// Base run state, suffixes removed
    pub state: String,
    pub sleep_minutes: u32,
    pub locked: bool,
}

/// Fields of a source location line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub src_path: String,
    pub line: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Recognizers
// ─────────────────────────────────────────────────────────────────────────────

/// Recognize a task header.
///
/// Suffix items after the state are order independent; unknown ones are
/// ignored. An id that does not fit in a `u64` makes the line a non-header.
pub fn parse_task_header(line: &str) -> Option<TaskHeader> {
    let caps = TASK_HEADER_REGEX.captures(line)?;
    let id = caps[1].parse().ok()?;

    let mut items = caps[2].split(", ");
    let state = items.next().unwrap_or_default().to_string();
    let mut sleep_minutes = 0;
    let mut locked = false;
    for item in items {
        if item == LOCKED_TO_THREAD {
            locked = true;
            continue;
        }
        if let Some(m) = MINUTES_REGEX.captures(item) {
            sleep_minutes = m[1].parse().unwrap_or(0);
        }
    }

    Some(TaskHeader {
        id,
        state,
        sleep_minutes,
        locked,
    })
}

/// Recognize the unavailable-stack marker.
pub fn is_unavailable(line: &str) -> bool {
    UNAVAILABLE_REGEX.is_match(line)
}

/// Recognize a source location line.
///
/// Returns `Some(Err(_))` when the shape matched but the line number does
/// not fit.
pub fn parse_location(line: &str) -> Option<Result<Location>> {
    let caps = LOCATION_REGEX.captures(line)?;
    Some(
        caps[2]
            .parse()
            .map(|num| Location {
                src_path: caps[1].to_string(),
                line: num,
            })
            .map_err(|_| Error::malformed_field(line)),
    )
}

/// Recognize a `created by` line and return the function.
pub fn parse_created(line: &str) -> Option<Func> {
    CREATED_REGEX
        .captures(line)
        .map(|caps| Func::new(&caps[1]))
}

/// Recognize a call line.
///
/// The call is returned even when an argument fails to parse; in that case
/// it holds the arguments read before the bad one and the error is returned
/// alongside.
pub fn parse_call(line: &str) -> Option<(Call, Option<Error>)> {
    let caps = CALL_REGEX.captures(line)?;
    let mut args = Args::default();
    let mut error = None;

    for raw in caps[2].split(", ") {
        if raw == "..." {
            args.elided = true;
            break;
        }
        if raw.is_empty() {
            // Remaining values were dropped.
            break;
        }
        match parse_uint(raw) {
            Some(value) => args.values.push(Arg { value }),
            None => {
                error = Some(Error::malformed_field(line));
                break;
            }
        }
    }

    Some((Call::new(Func::new(&caps[1]), args), error))
}

/// Recognize the elided-frames sentinel.
pub fn is_elided(line: &str) -> bool {
    ELIDED_REGEX.is_match(line)
}

/// A line holding nothing but its terminator.
pub fn is_blank(line: &str) -> bool {
    line == "\n" || line == "\r\n"
}

/// Parse an unsigned integer, detecting the base from its prefix.
///
/// Accepts `0x`/`0X` hex, `0o`/`0O` and leading-zero octal, `0b`/`0B`
/// binary, and decimal.
fn parse_uint(s: &str) -> Option<u64> {
    let (digits, radix) = if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (rest, 16)
    } else if let Some(rest) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        (rest, 8)
    } else if let Some(rest) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        (rest, 2)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    // from_str_radix accepts a leading '+', the runtime never prints one.
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Task Header
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_task_header_plain() {
        let header = parse_task_header("goroutine 1 [running]:\n").unwrap();
        assert_eq!(header.id, 1);
        assert_eq!(header.state, "running");
        assert_eq!(header.sleep_minutes, 0);
        assert!(!header.locked);
    }

    #[test]
    fn test_parse_task_header_with_suffixes() {
        let header =
            parse_task_header("goroutine 42 [chan receive, 12 minutes, locked to thread]:\r\n")
                .unwrap();
        assert_eq!(header.id, 42);
        assert_eq!(header.state, "chan receive");
        assert_eq!(header.sleep_minutes, 12);
        assert!(header.locked);
    }

    #[test]
    fn test_parse_task_header_suffix_order_and_unknown_items() {
        let header =
            parse_task_header("goroutine 7 [select, locked to thread, whatever, 3 minutes]:\n")
                .unwrap();
        assert_eq!(header.state, "select");
        assert_eq!(header.sleep_minutes, 3);
        assert!(header.locked);
    }

    #[test]
    fn test_parse_task_header_rejects_other_lines() {
        assert!(parse_task_header("goroutine 1 [running]\n").is_none());
        assert!(parse_task_header("goroutine x [running]:\n").is_none());
        assert!(parse_task_header("panic: boom\n").is_none());
        assert!(parse_task_header("goroutine 99999999999999999999999 [running]:\n").is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Locations
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_location_with_offset() {
        let loc = parse_location("\t/home/user/src/app/main.go:12 +0x39\n")
            .unwrap()
            .unwrap();
        assert_eq!(loc.src_path, "/home/user/src/app/main.go");
        assert_eq!(loc.line, 12);
    }

    #[test]
    fn test_parse_location_variants() {
        let loc = parse_location("    main.go:3\r\n").unwrap().unwrap();
        assert_eq!(loc.src_path, "main.go");
        assert_eq!(loc.line, 3);

        let loc = parse_location("\t<autogenerated>:1\n").unwrap().unwrap();
        assert_eq!(loc.src_path, "<autogenerated>");

        let loc = parse_location("\t??:0\n").unwrap().unwrap();
        assert_eq!(loc.src_path, "??");

        let loc = parse_location("\t/goroot/src/runtime/asm_amd64.s:1357 +0x1 fp=0xc000 sp=0xc008\n")
            .unwrap()
            .unwrap();
        assert_eq!(loc.src_path, "/goroot/src/runtime/asm_amd64.s");
        assert_eq!(loc.line, 1357);
    }

    #[test]
    fn test_parse_location_requires_indent_and_extension() {
        assert!(parse_location("/src/main.go:12\n").is_none());
        assert!(parse_location("\t/src/main.rs:12\n").is_none());
        assert!(parse_location("\t/src/main.go:12 trailing\n").is_none());
    }

    #[test]
    fn test_parse_location_line_overflow() {
        let result = parse_location("\tmain.go:99999999999\n").unwrap();
        assert!(matches!(result, Err(Error::MalformedField { .. })));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Calls
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_call_without_args() {
        let (call, err) = parse_call("main.main()\n").unwrap();
        assert!(err.is_none());
        assert_eq!(call.func.raw, "main.main");
        assert!(call.args.values.is_empty());
        assert!(!call.args.elided);
    }

    #[test]
    fn test_parse_call_with_args() {
        let (call, err) = parse_call("main.(*Server).run(0xc000010000, 0x5, 17)\n").unwrap();
        assert!(err.is_none());
        assert_eq!(call.func.raw, "main.(*Server).run");
        let values: Vec<u64> = call.args.values.iter().map(|a| a.value).collect();
        assert_eq!(values, vec![0xc000010000, 5, 17]);
    }

    #[test]
    fn test_parse_call_elided_args() {
        let (call, err) = parse_call("main.f(0x1, 0x2, ...)\n").unwrap();
        assert!(err.is_none());
        assert_eq!(call.args.values.len(), 2);
        assert!(call.args.elided);
    }

    #[test]
    fn test_parse_call_empty_tail_is_dropped() {
        let (call, err) = parse_call("main.f(0x1, 0x2, )\n").unwrap();
        assert!(err.is_none());
        assert_eq!(call.args.values.len(), 2);
        assert!(!call.args.elided);
    }

    #[test]
    fn test_parse_call_bad_arg_keeps_call() {
        let (call, err) = parse_call("main.f(0x1, zz)\n").unwrap();
        assert_eq!(call.func.raw, "main.f");
        assert_eq!(call.args.values.len(), 1);
        assert!(matches!(err, Some(Error::MalformedField { .. })));
    }

    #[test]
    fn test_parse_call_rejects_non_calls() {
        assert!(parse_call("goroutine 1 [running]:\n").is_none());
        assert!(parse_call("\t/src/main.go:12 +0x39\n").is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Markers
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_created() {
        assert_eq!(
            parse_created("created by main.main\n"),
            Some(Func::new("main.main"))
        );
        assert_eq!(
            parse_created("created by net/http.(*Server).Serve\r\n"),
            Some(Func::new("net/http.(*Server).Serve"))
        );
        assert!(parse_created("main.main()\n").is_none());
    }

    #[test]
    fn test_parse_created_strips_carriage_return() {
        let func = parse_created("created by main.main\r\n").unwrap();
        assert_eq!(func.raw, "main.main");
        assert!(!func.raw.ends_with('\r'));
    }

    #[test]
    fn test_markers() {
        assert!(is_unavailable(
            "\tgoroutine running on other thread; stack unavailable\n"
        ));
        assert!(!is_unavailable(
            "goroutine running on other thread; stack unavailable\n"
        ));
        assert!(is_elided("...additional frames elided...\n"));
        assert!(is_elided("...additional frames elided...\r\n"));
        assert!(!is_elided("...additional frames elided\n"));
        assert!(is_blank("\n"));
        assert!(is_blank("\r\n"));
        assert!(!is_blank(" \n"));
    }

    #[test]
    fn test_parse_uint_bases() {
        assert_eq!(parse_uint("0x1f"), Some(31));
        assert_eq!(parse_uint("0X1F"), Some(31));
        assert_eq!(parse_uint("017"), Some(15));
        assert_eq!(parse_uint("0o17"), Some(15));
        assert_eq!(parse_uint("0b101"), Some(5));
        assert_eq!(parse_uint("0"), Some(0));
        assert_eq!(parse_uint("42"), Some(42));
        assert_eq!(parse_uint("0x"), None);
        assert_eq!(parse_uint("+1"), None);
        assert_eq!(parse_uint("-1"), None);
        assert_eq!(parse_uint("09"), None);
    }
}
