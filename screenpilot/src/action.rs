//! The closed action vocabulary and the parser that extracts it from
//! free-form model output.
//!
//! Model responses mix reasoning prose with a fenced code block of action
//! lines. Only lines matching the vocabulary become [`Action`]s; everything
//! else is ignored. Extracted text is never evaluated as code; each line is
//! parsed into a tagged variant and later dispatched through an explicit
//! match.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Loop control symbols. They terminate or pause execution instead of
/// dispatching input (handled by the executor, collected by the parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSymbol {
    Done,
    Fail,
    Wait,
}

/// One desktop action, with all coordinates in the logical space.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move { x: u32, y: u32 },
    Click { x: Option<u32>, y: Option<u32> },
    DoubleClick,
    RightClick,
    TypeText(String),
    KeyPress(String),
    HotKey(Vec<String>),
    Control(ControlSymbol),
}

/// A parsed action together with the response line it came from. The source
/// line is what the safety filter scans and what reports quote.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionItem {
    pub action: Action,
    pub source: String,
}

/// Ordered action sequence for one cycle. Execution order is list order;
/// filtering may remove items but never reorders them.
pub type ActionList = Vec<ActionItem>;

// Call-like line, optionally namespaced: `computer.click(x=10, y=20)`.
static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:computer\.)?([a-z_]+)\((.*)\)$").unwrap());

// Quoted argument, single or double quotes, with escapes.
static STRING_ARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'"#).unwrap());

/// Extract an [`ActionList`] from raw model text.
///
/// Lines inside fenced code regions are the candidates, in document order
/// across all regions; when the response has no fence at all, the whole text
/// is scanned line by line. Blank lines, `#` comments and unrecognized lines
/// are skipped silently; prose is expected, not an error. Control symbols
/// are collected like any other action; termination is execution-time
/// behavior.
pub fn parse_response(text: &str) -> ActionList {
    let candidates = candidate_lines(text);
    let mut actions = ActionList::new();

    for line in candidates {
        match parse_line(&line) {
            Some(action) => actions.push(ActionItem {
                action,
                source: line,
            }),
            None => debug!(line = %line, "ignoring unrecognized response line"),
        }
    }

    debug!(count = actions.len(), "actions parsed from model response");
    actions
}

/// Candidate lines: fenced-region contents when any fence exists, otherwise
/// every line. An unclosed trailing fence runs to the end of the text.
fn candidate_lines(text: &str) -> Vec<String> {
    let mut fenced: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut saw_fence = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            saw_fence = true;
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            fenced.push(line.to_string());
        }
    }

    let raw: Vec<String> = if saw_fence {
        fenced
    } else {
        text.lines().map(|l| l.to_string()).collect()
    };

    raw.into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

/// Parse one trimmed candidate line against the vocabulary.
fn parse_line(line: &str) -> Option<Action> {
    match line {
        "DONE" => return Some(Action::Control(ControlSymbol::Done)),
        "FAIL" => return Some(Action::Control(ControlSymbol::Fail)),
        "WAIT" => return Some(Action::Control(ControlSymbol::Wait)),
        _ => {}
    }

    let caps = CALL_RE.captures(line)?;
    let verb = caps.get(1)?.as_str();
    let args = caps.get(2)?.as_str().trim();

    match verb {
        "move" | "move_to" => {
            let (x, y) = parse_coord_pair(args)?;
            Some(Action::Move { x, y })
        }
        "click" => {
            if args.is_empty() {
                Some(Action::Click { x: None, y: None })
            } else {
                let (x, y) = parse_coord_pair(args)?;
                Some(Action::Click {
                    x: Some(x),
                    y: Some(y),
                })
            }
        }
        "double_click" if args.is_empty() => Some(Action::DoubleClick),
        "right_click" if args.is_empty() => Some(Action::RightClick),
        "type" | "typewrite" => Some(Action::TypeText(single_string_arg(args)?)),
        "press" => Some(Action::KeyPress(single_string_arg(args)?)),
        "hotkey" => {
            let keys = string_args(args);
            if keys.is_empty() {
                None
            } else {
                Some(Action::HotKey(keys))
            }
        }
        _ => None,
    }
}

/// `100, 200` or `x=100, y=200` (order-insensitive for the keyword form).
fn parse_coord_pair(args: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = args.split(',').map(|p| p.trim()).collect();
    if parts.len() != 2 {
        return None;
    }

    let mut x = None;
    let mut y = None;
    for (idx, part) in parts.iter().enumerate() {
        if let Some(rest) = part.strip_prefix("x=") {
            x = rest.trim().parse::<u32>().ok();
        } else if let Some(rest) = part.strip_prefix("y=") {
            y = rest.trim().parse::<u32>().ok();
        } else if idx == 0 {
            x = part.parse::<u32>().ok();
        } else {
            y = part.parse::<u32>().ok();
        }
    }

    Some((x?, y?))
}

fn string_args(args: &str) -> Vec<String> {
    STRING_ARG_RE
        .captures_iter(args)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| unescape(m.as_str()))
        })
        .collect()
}

fn single_string_arg(args: &str) -> Option<String> {
    let mut found = string_args(args);
    if found.len() == 1 {
        found.pop()
    } else {
        None
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
