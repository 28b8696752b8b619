//! Call-graph relationships recovered from call-instruction lines.
//!
//! Call edges are directed caller -> callee pairs inferred by scanning for
//! `call` lines and taking the first `@symbol` they reference. They are
//! computed on demand per function and never materialized as a graph
//! structure; the only stateful traversal is caller height, which walks
//! upward through "who calls me" queries.
//!
//! Caller-height traversal MUST carry a visited set. The call graph is
//! implicitly cyclic (self recursion, mutual recursion), and without the
//! set a cycle never terminates. Do not weaken this.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{BasicBlock, Function, Module};

fn callee_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcall\b[^@\n]*@([\w.]+)").expect("callee regex"))
}

fn prof_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!prof\s+!\d+.*?count:\s*(\d+)").expect("prof regex"))
}

/// Call-graph features for one function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStats {
    /// Callee symbols in textual order, one entry per call occurrence.
    pub callees: Vec<String>,
    /// Total call occurrences (not unique callees).
    pub call_usage: usize,
    /// Whether the function's own name appears among its callees.
    pub is_recursive: bool,
    /// Hops upward through the caller relation before it runs dry or
    /// revisits a function.
    pub caller_height: usize,
    /// First profiling count annotated near the function entry, or 0.
    pub entry_block_freq: u64,
    /// Maximum profiling count annotated on any basic block, or 0.
    pub max_callsite_block_freq: u64,
}

/// Compute all call-graph features for `function` within `module`.
pub fn call_stats(module: &Module, function: &Function) -> CallStats {
    let callees = callees(function.text());
    let is_recursive = callees.iter().any(|callee| callee == function.name());
    CallStats {
        call_usage: callees.len(),
        is_recursive,
        caller_height: caller_height(module, function),
        entry_block_freq: entry_frequency(function.text()),
        max_callsite_block_freq: max_block_frequency(&function.blocks()),
        callees,
    }
}

/// Callee symbols referenced by call instructions, in textual order.
///
/// Each call line contributes the first `@symbol` after the `call` token;
/// repeated callees appear once per occurrence.
pub fn callees(text: &str) -> Vec<String> {
    callee_re().captures_iter(text).map(|caps| caps[1].to_string()).collect()
}

/// The first function in definition order containing a call that references
/// `name`, if any.
pub fn caller_of<'m>(module: &'m Module, name: &str) -> Option<&'m Function> {
    module.functions().iter().find(|f| callees(f.text()).iter().any(|callee| callee == name))
}

/// Number of hops upward through the caller relation.
///
/// The walk stops when no caller is found or when the next caller has
/// already been visited; the visited set is what bounds the traversal on
/// cyclic call graphs, including a 1-node self-loop.
pub fn caller_height(module: &Module, function: &Function) -> usize {
    let mut height = 0;
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = function;

    loop {
        let Some(caller) = caller_of(module, current.name()) else {
            break;
        };
        if visited.contains(caller.name()) {
            break;
        }
        height += 1;
        visited.insert(current.name());
        current = caller;
    }

    height
}

/// First profiling count annotated in the function's text, or 0 when no
/// annotation is present (absence is not an error).
pub fn entry_frequency(text: &str) -> u64 {
    prof_count(text).unwrap_or(0)
}

/// Maximum profiling count across all per-block annotations, or 0.
pub fn max_block_frequency(blocks: &[BasicBlock]) -> u64 {
    blocks.iter().filter_map(|block| prof_count(block.text())).max().unwrap_or(0)
}

fn prof_count(text: &str) -> Option<u64> {
    prof_count_re().captures(text).and_then(|caps| caps[1].parse().ok())
}
