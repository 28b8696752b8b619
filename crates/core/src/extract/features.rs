//! Feature aggregation: one immutable merge of pre-computed sub-results.
//!
//! Block stats, loop stats, the instruction tally, and call stats are each
//! computed up front and merged into a [`FeatureVector`] in a single step,
//! so a degraded sub-computation can never leave a row half-populated.
//! This module is pure computation; no I/O happens here.

use crate::extract::{calls, instr, loops};
use crate::model::{BasicBlock, FeatureRow, FeatureVector, Function, Module};

/// Block-level density figures for one function.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockStats {
    pub blocks: usize,
    /// Mean real-instruction count per block; 0 with no blocks, never NaN.
    pub avg_instructions: f64,
    /// Mean branch-successor count per block; 0 with no blocks.
    pub avg_successors: f64,
}

/// Compute per-block averages over a function's block sequence.
pub fn block_stats(blocks: &[BasicBlock]) -> BlockStats {
    if blocks.is_empty() {
        return BlockStats::default();
    }
    let count = blocks.len();
    let instructions: usize = blocks.iter().map(BasicBlock::instructions).sum();
    let successors: usize = blocks.iter().map(|b| instr::successor_count(b.text())).sum();
    BlockStats {
        blocks: count,
        avg_instructions: instructions as f64 / count as f64,
        avg_successors: successors as f64 / count as f64,
    }
}

/// Merge all extraction passes into the fixed feature set for one function.
pub fn function_features(module: &Module, function: &Function) -> FeatureVector {
    let blocks = function.blocks();
    let block = block_stats(&blocks);
    let tally = instr::tally(function.text());
    let loops = loops::loop_stats(function.text());
    let call = calls::call_stats(module, function);

    FeatureVector {
        instruction_per_block: block.avg_instructions,
        successor_per_block: block.avg_successors,
        calls_no: tally.calls as f64,
        is_local: if function.is_local() { 1.0 } else { 0.0 },
        ret_count: tally.rets as f64,
        fmul_count: tally.fmul as f64,
        fdiv_count: tally.fdiv as f64,
        fadd_count: tally.fadd as f64,
        fsub_count: tally.fsub as f64,
        avg_nested_loop_level: loops.avg_depth,
        instr_per_loop: loops.avg_instructions,
        block_with_multiple_succ_per_loop: loops.bodies_with_cond_branch as f64,
        max_loop_depth: loops.max_depth as f64,
        num_callsite_in_loop: loops.callsites as f64,
        caller_height: call.caller_height as f64,
        call_usage: call.call_usage as f64,
        is_recursive: if call.is_recursive { 1.0 } else { 0.0 },
        entry_block_freq: call.entry_block_freq as f64,
        max_callsite_block_freq: call.max_callsite_block_freq as f64,
        load_count: tally.loads as f64,
        store_count: tally.stores as f64,
        alloca_count: tally.allocas as f64,
        conditional_branch_count: tally.cond_branches as f64,
        unconditional_branch_count: tally.uncond_branches as f64,
    }
}

/// One row per function, in definition order.
///
/// Functions with zero basic blocks still get a row; their per-block
/// averages are simply 0.
pub fn function_rows(module: &Module, source_file: &str) -> Vec<FeatureRow> {
    module
        .functions()
        .iter()
        .map(|function| FeatureRow {
            function_name: Some(function.name().to_string()),
            source_file: source_file.to_string(),
            features: function_features(module, function),
        })
        .collect()
}

/// One row for the whole file: per-function features mean-reduced across
/// functions that have at least one basic block.
///
/// Zero-block functions are excluded from the mean but do not error out
/// the file; a module with no block-bearing functions yields an all-zero
/// row.
pub fn file_row(module: &Module, source_file: &str) -> FeatureRow {
    let vectors: Vec<FeatureVector> = module
        .functions()
        .iter()
        .filter(|function| !function.blocks().is_empty())
        .map(|function| function_features(module, function))
        .collect();

    FeatureRow {
        function_name: None,
        source_file: source_file.to_string(),
        features: FeatureVector::mean(&vectors),
    }
}
