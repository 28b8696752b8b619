use llfeat_core::extract::loops;

const LOOPED: &str = "\
define void @spin(i32 %n) {
entry:
  br label %loop

loop:
  %i = phi i32 [ 0, %entry ], [ %next, %loop ]
  call void @work(i32 %i)
  %next = add i32 %i, 1
  %done = icmp eq i32 %next, %n
  br i1 %done, label %exit, label %loop

exit:
  ret void
}
";

#[test]
fn finds_anchor_and_recovers_body_through_balancing_brace() {
    let regions = loops::find_loop_regions(LOOPED);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].depth, 1);
    assert!(regions[0].body.starts_with("loop:"));
    assert!(regions[0].body.ends_with('}'));
}

#[test]
fn balanced_body_closes_the_assumed_open_scope() {
    let regions = loops::find_loop_regions(LOOPED);
    let body = &regions[0].body;
    let opens = body.matches('{').count();
    let closes = body.matches('}').count();
    // The scan starts at balance 1, so a cleanly terminated body carries
    // exactly one more close than open.
    assert_eq!(opens + 1, closes);
}

#[test]
fn unbalanced_body_truncates_at_end_of_text_without_raising() {
    let text = "\
define void @broken() {
entry:
  br label %loop

loop:
  %x = add i32 1, 2
";
    let regions = loops::find_loop_regions(text);
    assert_eq!(regions.len(), 1);
    assert!(regions[0].body.ends_with("%x = add i32 1, 2\n"));
}

#[test]
fn anchor_line_marker_count_is_nesting_depth() {
    let text = "\
define void @nested() {
outer.loop:
  br label %inner

inner.loop: ; inner.loop: hottest region
  br i1 %p, label %inner, label %exit
}
";
    let regions = loops::find_loop_regions(text);
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].depth, 1);
    assert_eq!(regions[1].depth, 2);

    let stats = loops::loop_stats(text);
    assert_eq!(stats.count, 2);
    assert!((stats.avg_depth - 1.5).abs() < f64::EPSILON);
    assert_eq!(stats.max_depth, 2);
}

#[test]
fn aggregates_cover_instructions_branches_and_callsites() {
    let stats = loops::loop_stats(LOOPED);
    assert_eq!(stats.count, 1);
    assert!((stats.avg_depth - 1.0).abs() < f64::EPSILON);
    assert_eq!(stats.max_depth, 1);
    // phi, call, add, icmp, br inside the loop body plus the ret after the
    // exit label, all within the recovered region.
    assert!((stats.avg_instructions - 6.0).abs() < f64::EPSILON);
    assert_eq!(stats.bodies_with_cond_branch, 1);
    assert_eq!(stats.callsites, 1);
}

#[test]
fn no_anchors_yield_all_zero_stats() {
    let text = "\
define i32 @straight(i32 %x) {
entry:
  %y = add i32 %x, 1
  ret i32 %y
}
";
    let stats = loops::loop_stats(text);
    assert_eq!(stats, loops::LoopStats::default());
}
