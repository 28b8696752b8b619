use llfeat_core::extract::instr;

const MIXED: &str = "\
define float @math(float %a, float %b, i1 %p) {
entry:
  ; set up scratch space
  %buf = alloca [4 x float]
  %x = load float, ptr %src
  store float %x, ptr %dst
  %s = fadd float %a, %b
  %d = fsub float %a, %b
  %m = fmul float %a, %b
  %q = fdiv float %a, %b
  %c = call float @llvm.fabs.f32(float %s)
  br i1 %p, label %then, label %done

then:
  br label %done

done:
  ret float %m
}
";

#[test]
fn tallies_each_category_from_leading_opcode() {
    let tally = instr::tally(MIXED);
    assert_eq!(tally.allocas, 1);
    assert_eq!(tally.loads, 1);
    assert_eq!(tally.stores, 1);
    assert_eq!(tally.fadd, 1);
    assert_eq!(tally.fsub, 1);
    assert_eq!(tally.fmul, 1);
    assert_eq!(tally.fdiv, 1);
    assert_eq!(tally.calls, 1);
    assert_eq!(tally.rets, 1);
    assert_eq!(tally.cond_branches, 1);
    assert_eq!(tally.uncond_branches, 1);
}

#[test]
fn comments_labels_and_braces_are_not_instructions() {
    let tally = instr::tally(MIXED);
    // Everything indented except the comment line: 7 value-producing
    // instructions plus store, two branches, and the return.
    assert_eq!(tally.instructions, 11);
}

#[test]
fn branch_is_conditional_only_with_boolean_predicate() {
    assert_eq!(instr::tally("  br i1 %cmp, label %a, label %b\n").cond_branches, 1);
    assert_eq!(instr::tally("  br label %a\n").uncond_branches, 1);
    assert_eq!(instr::tally("  br label %a\n").cond_branches, 0);
}

#[test]
fn successor_count_weighs_conditional_branches_double() {
    assert_eq!(instr::successor_count(MIXED), 3);
}

#[test]
fn assignment_prefix_is_stripped_before_opcode_match() {
    assert_eq!(instr::opcode("  %v = load i32, ptr %p"), Some("load"));
    assert_eq!(instr::opcode("  store i32 0, ptr %p"), Some("store"));
    assert_eq!(instr::opcode("  ret void"), Some("ret"));
}

#[test]
fn call_count_is_word_boundary_matched() {
    assert_eq!(instr::call_count("  %r = call i32 @recall_buffer()\n"), 1);
    assert_eq!(instr::call_count("  %r = tail call i32 @f()\n"), 1);
    assert_eq!(instr::call_count("  %x = add i32 %caller, 1\n"), 0);
}

#[test]
fn a_line_can_feed_multiple_classifiers() {
    // A call line is both a call occurrence and a real instruction line;
    // categories are only exclusive within one classifier.
    let text = "  %c = call float @f(float %x)\n";
    let tally = instr::tally(text);
    assert_eq!(tally.calls, 1);
    assert_eq!(tally.instructions, 1);
}

#[test]
fn unindented_lines_are_ignored() {
    let tally = instr::tally("define void @f() {\nentry:\n}\n");
    assert_eq!(tally.instructions, 0);
}
