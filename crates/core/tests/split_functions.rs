use llfeat_core::model::Module;

const TWO_FUNCTIONS: &str = "\
; ModuleID = 'demo'
define i32 @helper(i32 %x) {
entry:
  %sum = add i32 %x, 1
  ret i32 %sum
}

define internal i32 @main() {
entry:
  %a = call i32 @helper(i32 1)
  ret i32 %a
}
";

#[test]
fn splits_functions_in_definition_order() {
    let module = Module::parse(TWO_FUNCTIONS);
    let names: Vec<&str> = module.functions().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["helper", "main"]);
}

#[test]
fn function_region_spans_definition_through_closing_brace() {
    let module = Module::parse(TWO_FUNCTIONS);
    let helper = module.get("helper").expect("helper");
    assert!(helper.text().starts_with("define i32 @helper"));
    assert!(helper.text().ends_with('}'));
    assert!(!helper.text().contains("@main"));
}

#[test]
fn linkage_qualifier_marks_function_local() {
    let module = Module::parse(TWO_FUNCTIONS);
    assert!(!module.get("helper").expect("helper").is_local());
    assert!(module.get("main").expect("main").is_local());
}

#[test]
fn later_duplicate_overwrites_earlier_in_place() {
    let text = "\
define i32 @dup() {
entry:
  ret i32 1
}

define i32 @other() {
entry:
  ret i32 0
}

define i32 @dup() {
entry:
  ret i32 2
}
";
    let module = Module::parse(text);
    let names: Vec<&str> = module.functions().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["dup", "other"]);
    assert!(module.get("dup").expect("dup").text().contains("ret i32 2"));
}

#[test]
fn header_without_symbol_gets_sentinel_name() {
    let text = "\
define i32 () {
entry:
  ret i32 0
}
";
    let module = Module::parse(text);
    assert_eq!(module.functions().len(), 1);
    assert_eq!(module.functions()[0].name(), "unknown");
}

#[test]
fn unterminated_final_region_is_kept_truncated() {
    let text = "\
define i32 @broken() {
entry:
  %x = add i32 1, 2
";
    let module = Module::parse(text);
    let broken = module.get("broken").expect("broken");
    assert!(broken.text().contains("%x = add i32 1, 2"));
    assert!(!broken.text().contains('}'));
}

#[test]
fn definition_header_without_brace_ends_at_line_break() {
    let text = "\
define void @decl()
define i32 @real() {
entry:
  ret i32 0
}
";
    let module = Module::parse(text);
    let names: Vec<&str> = module.functions().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["decl", "real"]);
    assert!(module.get("decl").expect("decl").blocks().is_empty());
}

#[test]
fn blocks_are_ordered_non_empty_and_skip_entry_header() {
    let module = Module::parse(TWO_FUNCTIONS);
    let helper = module.get("helper").expect("helper");
    let blocks = helper.blocks();
    assert_eq!(blocks.len(), 1);
    assert!(!blocks[0].text().is_empty());
    assert!(!blocks[0].text().contains("define"));
    assert_eq!(blocks[0].instructions(), 2);
}

#[test]
fn multi_block_function_preserves_textual_order() {
    let text = "\
define i32 @pick(i1 %p) {
entry:
  br i1 %p, label %left, label %right

left:
  br label %join

right:
  br label %join

join:
  ret i32 0
}
";
    let module = Module::parse(text);
    let blocks = module.get("pick").expect("pick").blocks();
    assert_eq!(blocks.len(), 4);
    assert!(blocks[0].text().contains("br i1 %p"));
    assert!(blocks[3].text().contains("ret i32 0"));
    for block in &blocks {
        assert!(!block.text().is_empty());
    }
}

#[test]
fn function_with_no_labels_has_no_blocks() {
    let text = "\
define void @empty() {
}
";
    let module = Module::parse(text);
    assert!(module.get("empty").expect("empty").blocks().is_empty());
}
