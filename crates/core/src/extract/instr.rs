//! Surface-token instruction classification.
//!
//! An instruction is identified by its leading opcode token on a line,
//! after stripping a `%result =` assignment prefix; no type checking is
//! performed. A line can contribute to several tallies at once (a `call`
//! on a branch-adjacent line, say); counts are only exclusive within one
//! classifier's own category set.

use std::sync::OnceLock;

use regex::Regex;

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcall\b").expect("call regex"))
}

/// Counts reported by one pass over a block or region body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionTally {
    /// Real instruction lines: indented, not a comment, not a closing brace.
    pub instructions: usize,
    pub cond_branches: usize,
    pub uncond_branches: usize,
    pub loads: usize,
    pub stores: usize,
    pub allocas: usize,
    pub fadd: usize,
    pub fsub: usize,
    pub fmul: usize,
    pub fdiv: usize,
    pub calls: usize,
    pub rets: usize,
}

/// Classify every line of `text` and accumulate tallies.
pub fn tally(text: &str) -> InstructionTally {
    let mut out = InstructionTally::default();
    for line in text.lines() {
        if !is_instruction_line(line) {
            continue;
        }
        out.instructions += 1;
        out.calls += call_re().find_iter(line).count();
        match opcode(line) {
            Some("br") => {
                if is_conditional_branch(line) {
                    out.cond_branches += 1;
                } else {
                    out.uncond_branches += 1;
                }
            }
            Some("load") => out.loads += 1,
            Some("store") => out.stores += 1,
            Some("alloca") => out.allocas += 1,
            Some("fadd") => out.fadd += 1,
            Some("fsub") => out.fsub += 1,
            Some("fmul") => out.fmul += 1,
            Some("fdiv") => out.fdiv += 1,
            Some("ret") => out.rets += 1,
            _ => {}
        }
    }
    out
}

/// Count real instruction lines in a region body.
pub fn count_instruction_lines(text: &str) -> usize {
    text.lines().filter(|line| is_instruction_line(line)).count()
}

/// Count `call` occurrences in a region body, word-boundary matched.
pub fn call_count(text: &str) -> usize {
    call_re().find_iter(text).count()
}

/// Total branch successors in a region body: a conditional branch has two
/// targets, an unconditional branch one.
pub fn successor_count(text: &str) -> usize {
    text.lines()
        .filter(|line| is_instruction_line(line))
        .filter(|line| opcode(line) == Some("br"))
        .map(|line| if is_conditional_branch(line) { 2 } else { 1 })
        .sum()
}

/// A real instruction line is indented, non-blank, not a `;` comment, and
/// not the region's closing brace.
pub fn is_instruction_line(line: &str) -> bool {
    if !line.starts_with(' ') && !line.starts_with('\t') {
        return false;
    }
    let body = line.trim_start();
    !body.is_empty() && !body.starts_with(';') && !body.starts_with('}')
}

/// The leading opcode token of an instruction line.
///
/// Strips a `%result =` assignment prefix, so `%v = load i32, ...` reports
/// `load`. Returns `None` for lines with no token after the prefix.
pub fn opcode(line: &str) -> Option<&str> {
    let body = line.trim_start();
    let body = match body.split_once('=') {
        Some((lhs, rhs)) if lhs.trim_start().starts_with('%') => rhs,
        _ => body,
    };
    body.split_whitespace().next()
}

/// A branch is conditional when its first operand is a boolean predicate
/// token (`i1`).
fn is_conditional_branch(line: &str) -> bool {
    let mut tokens = line.trim_start().split_whitespace();
    tokens.next() == Some("br") && tokens.next() == Some("i1")
}
