//! A minimal sample program demonstrating the attribute-macro surface,
//! mirroring `original_source/sample/sample1.c` and
//! `original_source/unittest/main-test.c`: a suite of passing simple
//! tests, a suite of intentionally failing ones (to show FAIL reporting
//! without the demo's own exit code being treated as a build failure),
//! and a fixture suite threading a context pointer through setup, one
//! test, and teardown.

use symtest::{fixture_setup, fixture_teardown, fixture_test, simple_test};

#[simple_test(Suite1)]
fn test_true_false() {
    symtest::ASSERT_TRUE!(1 == 1);
    symtest::ASSERT_FALSE!(1 == 2);
    symtest::ASSERT_FALSE!(1 != 1);
    symtest::ASSERT_TRUE!(1 == 1);
}

#[simple_test(Suite1)]
fn test_compare() {
    symtest::ASSERT_EQ!(1, 1);
    symtest::ASSERT_NE!(1, 2);
    symtest::ASSERT_LT!(1, 10);
    symtest::ASSERT_LE!(1, 1);
    symtest::ASSERT_GT!(10, 1);
    symtest::ASSERT_GE!(1, 1);
}

#[simple_test(Suite1)]
fn test_str_compare() {
    symtest::ASSERT_STREQ!("a", "a");
    symtest::ASSERT_STRNE!("a", "b");
    symtest::ASSERT_STRLT!("a", "b");
    symtest::ASSERT_STRLE!("a", "a");
    symtest::ASSERT_STRGT!("b", "a");
    symtest::ASSERT_STRGE!("b", "b");
}

#[simple_test(NegativeSuite1)]
fn t1() {
    symtest::ASSERT_TRUE!(false);
}

#[simple_test(NegativeSuite1)]
fn t3() {
    symtest::ASSERT_EQ!(1, 0);
}

static FIXTURE_VALUE: std::sync::atomic::AtomicI32 = std::sync::atomic::AtomicI32::new(10);

#[fixture_setup(Fix)]
fn fix_setup() -> *mut core::ffi::c_void {
    FIXTURE_VALUE.as_ptr() as *mut core::ffi::c_void
}

#[fixture_teardown(Fix)]
fn fix_teardown(ctx: *mut core::ffi::c_void) {
    symtest::ASSERT_TRUE!(ctx as *mut i32 == FIXTURE_VALUE.as_ptr());
}

#[fixture_test(Fix)]
fn t1_fixture(ctx: *mut core::ffi::c_void) {
    let counter = unsafe { &*(ctx as *const i32 as *const std::sync::atomic::AtomicI32) };
    counter.store(20, std::sync::atomic::Ordering::SeqCst);
    symtest::ASSERT_EQ!(counter.load(std::sync::atomic::Ordering::SeqCst), 20);
}

fn main() {
    env_logger::init();
    let summary = symtest::discover_and_run(symtest::module_map::ScanMode::Main, None)
        .expect("self-discovery should succeed for this demo binary");
    std::process::exit(summary.exit_code());
}
