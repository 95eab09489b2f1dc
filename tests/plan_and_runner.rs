//! End-to-end coverage of the Plan Builder feeding the Runner (§4.5, §4.6),
//! against an in-memory `SymbolStore` fixture rather than a real ELF image
//! — the engine's dataflow beyond the loader doesn't care where symbol
//! addresses came from, only that they point at callable `"C-unwind"`
//! functions, which this process supplies directly.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use symtest::codec::{encode, TestRole};
use symtest::plan::build_plan;
use symtest::runner::{list_plan, run_plan};
use symtest::symbols::{Binding, SymbolStore, SymbolVariant};

fn insert(store: &mut SymbolStore, symbol: String, address: u64) {
    let idx = store.insert(&symbol);
    store.append_variant(
        idx,
        SymbolVariant {
            address,
            binding: Binding::Strong,
            module_path: Arc::from(Path::new("/bin/fixture")),
        },
    );
}

extern "C-unwind" fn passing_test() {}

extern "C-unwind" fn failing_test() {
    symtest::ASSERT_EQ!(1, 0);
}

#[test]
fn scenario_s1_discover_all_runs_every_simple_test() {
    let mut store = SymbolStore::new();
    insert(
        &mut store,
        encode(TestRole::SimpleTest, "Suite1", "A"),
        passing_test as usize as u64,
    );
    insert(
        &mut store,
        encode(TestRole::SimpleTest, "Suite1", "B"),
        passing_test as usize as u64,
    );

    let plan = build_plan(&store, None);
    let summary = run_plan(&plan);

    assert_eq!(summary.ran, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn scenario_s4_module_list_filter_restricts_and_reorders_suites() {
    let mut store = SymbolStore::new();
    insert(
        &mut store,
        encode(TestRole::SimpleTest, "Suite2", "C"),
        passing_test as usize as u64,
    );
    insert(
        &mut store,
        encode(TestRole::SimpleTest, "Suite1", "A"),
        passing_test as usize as u64,
    );

    let filter = vec!["Suite1".to_string()];
    let plan = build_plan(&store, Some(&filter));

    assert_eq!(plan.suites.len(), 1);
    assert_eq!(plan.suites[0].name, "Suite1");
    let summary = run_plan(&plan);
    assert_eq!(summary.ran, 1);
}

#[test]
fn scenario_s6_list_test_reports_structure_without_invoking_bodies() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    extern "C-unwind" fn would_explode_if_called() {
        CALLS.fetch_add(1, Ordering::SeqCst);
        panic!("list-test must never invoke a test body");
    }

    let mut store = SymbolStore::new();
    insert(
        &mut store,
        encode(TestRole::SimpleTest, "Suite1", "A"),
        would_explode_if_called as usize as u64,
    );

    let plan = build_plan(&store, None);
    list_plan(&plan);

    assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    assert_eq!(plan.suites[0].tests.len(), 1);
}

#[test]
fn property_6_a_failing_test_does_not_stop_its_suite() {
    let mut store = SymbolStore::new();
    insert(
        &mut store,
        encode(TestRole::SimpleTest, "Suite1", "A"),
        failing_test as usize as u64,
    );
    insert(
        &mut store,
        encode(TestRole::SimpleTest, "Suite1", "B"),
        passing_test as usize as u64,
    );

    let plan = build_plan(&store, None);
    let summary = run_plan(&plan);

    assert_eq!(summary.ran, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.exit_code(), -1);
}

#[test]
fn property_7_fixture_teardown_runs_exactly_once_after_every_test() {
    static SETUP_CALLS: AtomicUsize = AtomicUsize::new(0);
    static TEARDOWN_CALLS: AtomicUsize = AtomicUsize::new(0);

    extern "C-unwind" fn setup() -> *mut core::ffi::c_void {
        SETUP_CALLS.fetch_add(1, Ordering::SeqCst);
        std::ptr::null_mut()
    }
    extern "C-unwind" fn teardown(_ctx: *mut core::ffi::c_void) {
        TEARDOWN_CALLS.fetch_add(1, Ordering::SeqCst);
    }
    extern "C-unwind" fn test_ok(_ctx: *mut core::ffi::c_void) {}
    extern "C-unwind" fn test_fail(_ctx: *mut core::ffi::c_void) {
        symtest::ASSERT_TRUE!(false);
    }

    let mut store = SymbolStore::new();
    insert(
        &mut store,
        encode(TestRole::FixtureSetup, "Fix", "Fix"),
        setup as usize as u64,
    );
    insert(
        &mut store,
        encode(TestRole::FixtureTest, "Fix", "T1"),
        test_ok as usize as u64,
    );
    insert(
        &mut store,
        encode(TestRole::FixtureTest, "Fix", "T2"),
        test_fail as usize as u64,
    );
    insert(
        &mut store,
        encode(TestRole::FixtureTeardown, "Fix", "Fix"),
        teardown as usize as u64,
    );

    let plan = build_plan(&store, None);
    let summary = run_plan(&plan);

    assert_eq!(summary.ran, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(SETUP_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(TEARDOWN_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn weak_only_entry_is_skipped_by_the_runner_without_crashing() {
    // A symbol whose only variant is weak never resolves an address
    // (§4.5); the runner must skip it rather than transmute a null/garbage
    // pointer.
    let mut store = SymbolStore::new();
    let idx = store.insert(&encode(TestRole::SimpleTest, "Suite1", "A"));
    store.append_variant(
        idx,
        SymbolVariant {
            address: 0xdead_beef,
            binding: Binding::Weak,
            module_path: Arc::from(Path::new("/bin/fixture")),
        },
    );

    let plan = build_plan(&store, None);
    assert_eq!(plan.suites[0].tests[0].address, None);
    let summary = run_plan(&plan);
    assert_eq!(summary.ran, 0);
    assert_eq!(summary.exit_code(), 0);
}
