//! Function and basic-block segmentation.
//!
//! A function region starts at a line whose first token is `define` and runs
//! through the brace that balances the one opened on that line. An
//! unterminated final region is kept and truncated at end-of-text; this is
//! the crate-wide policy for malformed trailing regions.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{BasicBlock, Function};

/// Sentinel name assigned when a definition header carries no symbol token.
///
/// Multiple anonymous regions then collide on this name; degraded but
/// non-fatal.
pub const UNKNOWN_FUNCTION: &str = "unknown";

fn symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([\w.]+)").expect("symbol regex"))
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*[\w.]+:").expect("label regex"))
}

/// Split module text into function regions, in definition order.
///
/// Later-defined duplicates overwrite earlier ones in place, matching
/// dictionary semantics: the name keeps its original position but carries
/// the last-seen region text.
pub fn split_functions(text: &str) -> Vec<Function> {
    let mut functions: Vec<Function> = Vec::new();
    let mut offset = 0;

    while let Some(start) = next_define(text, offset) {
        let end = region_end(text, start);
        let region = &text[start..end];
        let name = function_name(region);
        match functions.iter_mut().find(|f| f.name() == name) {
            Some(existing) => *existing = Function::new(name, region),
            None => functions.push(Function::new(name, region)),
        }
        offset = end;
    }

    functions
}

/// Extract the function name from a region's header line.
///
/// The first `@symbol` token wins; a header without one gets the
/// [`UNKNOWN_FUNCTION`] sentinel rather than failing.
pub fn function_name(region: &str) -> String {
    let header = region.lines().next().unwrap_or("");
    symbol_re()
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_FUNCTION.to_string())
}

/// Segment function text into basic blocks by splitting on label lines.
///
/// The span before the first label (the definition header) is skipped, and
/// blank spans are dropped, so the returned blocks are non-empty and in
/// textual order.
pub fn segment_blocks(function_text: &str) -> Vec<BasicBlock> {
    label_re()
        .split(function_text)
        .skip(1)
        // Strip the line break consumed up to the label but keep interior
        // indentation; instruction lines are recognized by it.
        .map(|span| span.trim_start_matches(['\n', '\r']).trim_end())
        .filter(|span| !span.is_empty())
        .map(BasicBlock::new)
        .collect()
}

/// Find the byte offset of the next line whose first token is `define`,
/// at or after `from`.
fn next_define(text: &str, from: usize) -> Option<usize> {
    let mut line_start = from;
    for line in text[from..].split_inclusive('\n') {
        if line.split_whitespace().next() == Some("define") {
            return Some(line_start);
        }
        line_start += line.len();
    }
    None
}

/// Scan forward from a region start until its braces balance.
///
/// The returned offset is one past the closing brace, or the end of the
/// text when the region is unterminated (truncate-and-include policy).
fn region_end(text: &str, start: usize) -> usize {
    let mut depth = 0i32;
    let mut opened = false;
    for (idx, byte) in text[start..].bytes().enumerate() {
        match byte {
            b'{' => {
                depth += 1;
                opened = true;
            }
            b'}' => {
                depth -= 1;
                if opened && depth == 0 {
                    return start + idx + 1;
                }
            }
            // A definition header with no opening brace on its line is
            // declaration-like; end the region at the line break.
            b'\n' if !opened => return start + idx + 1,
            _ => {}
        }
    }
    text.len()
}
