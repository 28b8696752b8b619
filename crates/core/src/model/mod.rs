//! Core data model for IR modules, functions, blocks, loops, and feature rows.
//!
//! Everything here is a view over raw `.ll` text. Functions and blocks are
//! textual regions, not verified syntax; the extraction passes in
//! [`crate::extract`] recover them with pattern matching and brace
//! balancing, and tolerate partial or ambiguous matches by design.

use serde::{Deserialize, Serialize};

/// The complete text of one IR file, split into named function regions.
///
/// Function order matches definition order in the source text. A module is
/// immutable once split and is the unit of one analysis pass.
#[derive(Debug, Clone)]
pub struct Module {
    functions: Vec<Function>,
}

impl Module {
    /// Split raw module text into function regions.
    ///
    /// Never fails: malformed regions are truncated or skipped, an empty
    /// module simply has no functions.
    pub fn parse(text: &str) -> Self {
        Self { functions: crate::extract::split::split_functions(text) }
    }

    /// All functions, in definition order.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Look up a function by name.
    ///
    /// Names are unique within a module: the splitter gives a later-defined
    /// duplicate the earlier one's slot.
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }
}

/// A contiguous textual region covering one function definition, from its
/// `define` line through the balancing closing brace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
    text: String,
}

impl Function {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The definition line that opened this region.
    pub fn header(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }

    /// Whether the linkage qualifier marks this function module-local.
    pub fn is_local(&self) -> bool {
        self.header().split_whitespace().any(|tok| tok == "internal" || tok == "private")
    }

    /// Segment this function's text into basic blocks, in textual order.
    pub fn blocks(&self) -> Vec<BasicBlock> {
        crate::extract::split::segment_blocks(&self.text)
    }
}

/// A straight-line instruction span between control-flow labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    text: String,
    instructions: usize,
}

impl BasicBlock {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let instructions = crate::extract::instr::count_instruction_lines(&text);
        Self { text, instructions }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of real instruction lines in this block.
    pub fn instructions(&self) -> usize {
        self.instructions
    }
}

/// A loop-marked region, anchored at a loop-marker line.
///
/// Loop regions are an independent view over the function text and are not
/// guaranteed disjoint from basic blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopRegion {
    /// Loop-marker occurrences on the anchor line; a proxy for nesting, not
    /// true lexical scope depth.
    pub depth: usize,
    /// Body text recovered by brace-balance scanning, possibly truncated at
    /// end-of-text.
    pub body: String,
}

/// The fixed per-function feature set.
///
/// Every field is present in every row and defaults to 0.0 when a metric
/// has no applicable data: a function with no blocks, no loops, or no
/// profiling metadata yields zeros, never an absent key and never NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub instruction_per_block: f64,
    pub successor_per_block: f64,
    pub calls_no: f64,
    pub is_local: f64,
    pub ret_count: f64,
    pub fmul_count: f64,
    pub fdiv_count: f64,
    pub fadd_count: f64,
    pub fsub_count: f64,
    pub avg_nested_loop_level: f64,
    pub instr_per_loop: f64,
    pub block_with_multiple_succ_per_loop: f64,
    pub max_loop_depth: f64,
    pub num_callsite_in_loop: f64,
    pub caller_height: f64,
    pub call_usage: f64,
    pub is_recursive: f64,
    pub entry_block_freq: f64,
    pub max_callsite_block_freq: f64,
    pub load_count: f64,
    pub store_count: f64,
    pub alloca_count: f64,
    pub conditional_branch_count: f64,
    pub unconditional_branch_count: f64,
}

impl FeatureVector {
    /// Number of features in the vector.
    pub const WIDTH: usize = 24;

    /// Column names, in the same order as [`FeatureVector::values`].
    pub const COLUMNS: [&'static str; Self::WIDTH] = [
        "instruction_per_block",
        "successor_per_block",
        "calls_no",
        "is_local",
        "ret_count",
        "fmul_count",
        "fdiv_count",
        "fadd_count",
        "fsub_count",
        "avg_nested_loop_level",
        "instr_per_loop",
        "block_with_multiple_succ_per_loop",
        "max_loop_depth",
        "num_callsite_in_loop",
        "caller_height",
        "call_usage",
        "is_recursive",
        "entry_block_freq",
        "max_callsite_block_freq",
        "load_count",
        "store_count",
        "alloca_count",
        "conditional_branch_count",
        "unconditional_branch_count",
    ];

    /// Feature values in [`FeatureVector::COLUMNS`] order.
    pub fn values(&self) -> [f64; Self::WIDTH] {
        [
            self.instruction_per_block,
            self.successor_per_block,
            self.calls_no,
            self.is_local,
            self.ret_count,
            self.fmul_count,
            self.fdiv_count,
            self.fadd_count,
            self.fsub_count,
            self.avg_nested_loop_level,
            self.instr_per_loop,
            self.block_with_multiple_succ_per_loop,
            self.max_loop_depth,
            self.num_callsite_in_loop,
            self.caller_height,
            self.call_usage,
            self.is_recursive,
            self.entry_block_freq,
            self.max_callsite_block_freq,
            self.load_count,
            self.store_count,
            self.alloca_count,
            self.conditional_branch_count,
            self.unconditional_branch_count,
        ]
    }

    /// Rebuild a vector from values in [`FeatureVector::COLUMNS`] order.
    pub fn from_values(values: [f64; Self::WIDTH]) -> Self {
        Self {
            instruction_per_block: values[0],
            successor_per_block: values[1],
            calls_no: values[2],
            is_local: values[3],
            ret_count: values[4],
            fmul_count: values[5],
            fdiv_count: values[6],
            fadd_count: values[7],
            fsub_count: values[8],
            avg_nested_loop_level: values[9],
            instr_per_loop: values[10],
            block_with_multiple_succ_per_loop: values[11],
            max_loop_depth: values[12],
            num_callsite_in_loop: values[13],
            caller_height: values[14],
            call_usage: values[15],
            is_recursive: values[16],
            entry_block_freq: values[17],
            max_callsite_block_freq: values[18],
            load_count: values[19],
            store_count: values[20],
            alloca_count: values[21],
            conditional_branch_count: values[22],
            unconditional_branch_count: values[23],
        }
    }

    /// Componentwise mean of a set of vectors.
    ///
    /// An empty set yields the all-zero vector rather than NaN.
    pub fn mean<'a, I>(vectors: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        let mut sum = [0.0; Self::WIDTH];
        let mut count = 0usize;
        for vector in vectors {
            for (slot, value) in sum.iter_mut().zip(vector.values()) {
                *slot += value;
            }
            count += 1;
        }
        if count == 0 {
            return Self::default();
        }
        for slot in sum.iter_mut() {
            *slot /= count as f64;
        }
        Self::from_values(sum)
    }
}

/// One output record: the fixed feature set plus source identifiers.
///
/// `function_name` is present for per-function rows and absent for
/// file-aggregate rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    pub source_file: String,
    #[serde(flatten)]
    pub features: FeatureVector,
}
