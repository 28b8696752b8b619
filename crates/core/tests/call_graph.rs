use llfeat_core::extract::calls;
use llfeat_core::model::Module;

const CALLER_AND_RECURSIVE: &str = "\
define i32 @A() {
entry:
  %x = call i32 @B(i32 1)
  %y = call i32 @B(i32 2)
  %cmp = icmp sgt i32 %x, %y
  br i1 %cmp, label %big, label %done

big:
  br label %done

done:
  ret i32 %x
}

define i32 @B(i32 %n) {
entry:
  %r = call i32 @B(i32 %n)
  ret i32 %r
}
";

#[test]
fn callees_are_listed_per_occurrence_in_textual_order() {
    let module = Module::parse(CALLER_AND_RECURSIVE);
    let a = module.get("A").expect("A");
    assert_eq!(calls::callees(a.text()), vec!["B", "B"]);
}

#[test]
fn call_usage_counts_occurrences_not_unique_callees() {
    let module = Module::parse(CALLER_AND_RECURSIVE);
    let a = module.get("A").expect("A");
    let stats = calls::call_stats(&module, a);
    assert_eq!(stats.call_usage, 2);
    assert!(!stats.is_recursive);
}

#[test]
fn self_call_sets_recursion_flag() {
    let module = Module::parse(CALLER_AND_RECURSIVE);
    let b = module.get("B").expect("B");
    let stats = calls::call_stats(&module, b);
    assert!(stats.is_recursive);
}

#[test]
fn caller_height_follows_callers_and_survives_self_loop() {
    let module = Module::parse(CALLER_AND_RECURSIVE);
    let b = module.get("B").expect("B");
    // A calls B; B's own self-call must not spin the walk forever.
    assert_eq!(calls::caller_height(&module, b), 1);

    let a = module.get("A").expect("A");
    assert_eq!(calls::caller_height(&module, a), 0);
}

#[test]
fn pure_self_loop_terminates() {
    let text = "\
define i32 @S() {
entry:
  %r = call i32 @S()
  ret i32 %r
}
";
    let module = Module::parse(text);
    let s = module.get("S").expect("S");
    assert_eq!(calls::caller_height(&module, s), 1);
}

#[test]
fn mutual_cycle_terminates() {
    let text = "\
define void @M1() {
entry:
  call void @M2()
  ret void
}

define void @M2() {
entry:
  call void @M1()
  ret void
}
";
    let module = Module::parse(text);
    let m1 = module.get("M1").expect("M1");
    let m2 = module.get("M2").expect("M2");
    assert_eq!(calls::caller_height(&module, m1), 1);
    assert_eq!(calls::caller_height(&module, m2), 1);
}

#[test]
fn caller_match_is_exact_on_symbol_names() {
    let text = "\
define void @foo() {
entry:
  ret void
}

define void @bar() {
entry:
  call void @foo2()
  ret void
}
";
    let module = Module::parse(text);
    let foo = module.get("foo").expect("foo");
    assert!(calls::caller_of(&module, "foo").is_none());
    assert_eq!(calls::caller_height(&module, foo), 0);
}

#[test]
fn profiling_counts_come_from_prof_annotations() {
    let text = "\
define i32 @hot() {
entry:
  %v = call i32 @helper(), !prof !0 count: 400
  br label %warm

warm:
  %w = add i32 %v, 1, !prof !1 count: 900
  ret i32 %w
}
";
    let module = Module::parse(text);
    let hot = module.get("hot").expect("hot");
    let stats = calls::call_stats(&module, hot);
    assert_eq!(stats.entry_block_freq, 400);
    assert_eq!(stats.max_callsite_block_freq, 900);
}

#[test]
fn absent_profiling_metadata_yields_zero_not_error() {
    let module = Module::parse(CALLER_AND_RECURSIVE);
    for function in module.functions() {
        let stats = calls::call_stats(&module, function);
        assert_eq!(stats.entry_block_freq, 0);
        assert_eq!(stats.max_callsite_block_freq, 0);
    }
}
