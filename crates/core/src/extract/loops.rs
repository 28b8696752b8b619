//! Loop-marked region location and loop aggregates.
//!
//! An anchor is any line containing the `loop:` marker. The body is
//! recovered by scanning forward from the anchor with a brace-balance
//! counter that starts at 1 (the anchor is assumed to sit inside one open
//! scope); the scan stops when the counter returns to zero or the text
//! ends, in which case the body is truncated there. Nesting depth is the
//! marker count on the anchor line, a heuristic proxy rather than true
//! lexical depth.

use crate::extract::instr;
use crate::model::LoopRegion;

const LOOP_MARKER: &str = "loop:";

/// Aggregate loop features for one function.
///
/// All fields are 0 when the function has no loop anchors; that is a
/// normal outcome, not a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopStats {
    pub count: usize,
    /// Mean nesting depth across anchors.
    pub avg_depth: f64,
    /// Maximum nesting depth observed.
    pub max_depth: usize,
    /// Mean real-instruction count per loop body.
    pub avg_instructions: f64,
    /// Loop bodies containing at least one conditional branch.
    pub bodies_with_cond_branch: usize,
    /// Call occurrences summed across all loop bodies.
    pub callsites: usize,
}

/// Locate every loop-marked region in function text.
pub fn find_loop_regions(text: &str) -> Vec<LoopRegion> {
    let mut regions = Vec::new();
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let depth = line.matches(LOOP_MARKER).count();
        if depth > 0 {
            regions.push(LoopRegion { depth, body: scan_body(text, line_start) });
        }
        line_start += line.len();
    }
    regions
}

/// Aggregate loop features over all regions found in `text`.
pub fn loop_stats(text: &str) -> LoopStats {
    let regions = find_loop_regions(text);
    if regions.is_empty() {
        return LoopStats::default();
    }

    let count = regions.len();
    let mut depth_sum = 0usize;
    let mut max_depth = 0usize;
    let mut instruction_sum = 0usize;
    let mut bodies_with_cond_branch = 0usize;
    let mut callsites = 0usize;

    for region in &regions {
        depth_sum += region.depth;
        max_depth = max_depth.max(region.depth);
        instruction_sum += instr::count_instruction_lines(&region.body);
        if instr::tally(&region.body).cond_branches > 0 {
            bodies_with_cond_branch += 1;
        }
        callsites += instr::call_count(&region.body);
    }

    LoopStats {
        count,
        avg_depth: depth_sum as f64 / count as f64,
        max_depth,
        avg_instructions: instruction_sum as f64 / count as f64,
        bodies_with_cond_branch,
        callsites,
    }
}

/// Forward brace-balance scan from the anchor's line start.
///
/// The balance starts at 1; `{` increments, `}` decrements, and the body
/// ends at the brace that brings the balance to zero. Running off the end
/// of the text returns the truncated remainder; it never fails.
fn scan_body(text: &str, anchor_start: usize) -> String {
    let mut balance = 1i32;
    for (idx, byte) in text[anchor_start..].bytes().enumerate() {
        match byte {
            b'{' => balance += 1,
            b'}' => {
                balance -= 1;
                if balance == 0 {
                    return text[anchor_start..anchor_start + idx + 1].to_string();
                }
            }
            _ => {}
        }
    }
    text[anchor_start..].to_string()
}
