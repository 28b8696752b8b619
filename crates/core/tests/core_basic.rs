use llfeat_core::model::Module;
use llfeat_core::version;

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn empty_module_has_no_functions() {
    let module = Module::parse("");
    assert!(module.functions().is_empty());
}

#[test]
fn text_without_definitions_has_no_functions() {
    let module = Module::parse("; ModuleID = 'empty'\ntarget triple = \"x86_64\"\n");
    assert!(module.functions().is_empty());
    assert!(module.get("anything").is_none());
}
