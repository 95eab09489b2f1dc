//! Runner (§4.6) and Failure Channel (§4.7, §9): executes a [`TestPlan`],
//! installing a recovery point around each test body so an assertion
//! failure unwinds back to the runner's RUN/FAIL loop instead of the
//! process.

use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use colored::Colorize;

use crate::codec::{self, TestRole};
use crate::error::EngineError;
use crate::plan::{Suite, SuiteKind, TestPlan};
use crate::symbols::SymbolStore;

type SimpleTestFn = unsafe extern "C-unwind" fn();
type FixtureSetupFn = unsafe extern "C-unwind" fn() -> *mut c_void;
type FixtureTestFn = unsafe extern "C-unwind" fn(*mut c_void);
type FixtureTeardownFn = unsafe extern "C-unwind" fn(*mut c_void);

/// RAII guard for the process-wide Failure Channel (§9 "Global Failure
/// Channel"): installs a panic hook that swallows the default "thread
/// panicked at ..." noise for the lifetime of the [`Runner`], since the
/// assertion surface already writes its own formatted diagnostic, and
/// restores the previous hook on drop.
struct FailureChannelGuard {
    previous: Option<Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>>,
}

impl FailureChannelGuard {
    fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|_info| {
            // The assertion surface (`fail`) has already written the
            // diagnostic this panic carries; suppress the default one.
        }));
        FailureChannelGuard {
            previous: Some(previous),
        }
    }
}

impl Drop for FailureChannelGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}

/// Outcome of executing a single test body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Fail,
}

/// Result of running a Test Plan: whether every executed test passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ran: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl RunSummary {
    /// §6: "Exit code: 0 iff all executed tests passed and no
    /// lookup/ELF errors occurred; −1 on any failure."
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 && self.unknown == 0 {
            0
        } else {
            -1
        }
    }
}

/// Executes `plan`, writing RUN/OK/FAIL/SETUP/TEARDOWN status lines to
/// stderr and timing each test with a monotonic clock. Suites run in
/// plan order; tests within a suite run in insertion (discovery) order. A
/// test's failure never aborts the suite or the plan (§5, §8 property 6).
pub fn run_plan(plan: &TestPlan) -> RunSummary {
    let _channel = FailureChannelGuard::install();
    let mut summary = RunSummary {
        ran: 0,
        failed: 0,
        unknown: 0,
    };

    for suite in &plan.suites {
        run_suite(suite, &mut summary);
    }
    summary
}

fn run_suite(suite: &Suite, summary: &mut RunSummary) {
    match suite.kind {
        Some(SuiteKind::Fixture) => {
            eprintln!("{}", format!("[ SUITE(F)] {}", suite.name).bold());
            run_fixture_suite(suite, summary);
        }
        Some(SuiteKind::Simple) | None => {
            eprintln!("{}", format!("[ SUITE(T)] {}", suite.name).bold());
            for test in &suite.tests {
                run_simple_test(&suite.name, test, summary);
            }
        }
    }
    eprintln!();
}

fn run_simple_test(suite_name: &str, test: &crate::plan::TestEntry, summary: &mut RunSummary) {
    let Some(address) = test.address else {
        return;
    };
    let full_name = format!("{suite_name}.{}", test.name);
    eprintln!("[ RUN     ] {full_name}");
    let start = Instant::now();
    let outcome = invoke_guarded(|| {
        let f: SimpleTestFn = unsafe { std::mem::transmute::<usize, SimpleTestFn>(address as usize) };
        unsafe { f() }
    });
    report(&full_name, outcome, start.elapsed(), summary);
}

fn run_fixture_suite(suite: &Suite, summary: &mut RunSummary) {
    let ctx = match suite.setup {
        Some(address) => {
            eprintln!("[ SETUP   ] {}", suite.name);
            let setup: FixtureSetupFn =
                unsafe { std::mem::transmute::<usize, FixtureSetupFn>(address as usize) };
            Some(unsafe { setup() })
        }
        None => None,
    };

    for test in &suite.tests {
        let Some(address) = test.address else {
            continue;
        };
        let full_name = format!("{}.{}", suite.name, test.name);
        eprintln!("[ RUN     ] {full_name}");
        let start = Instant::now();
        let outcome = invoke_guarded(|| {
            let f: FixtureTestFn =
                unsafe { std::mem::transmute::<usize, FixtureTestFn>(address as usize) };
            let ctx_ptr = ctx.unwrap_or(std::ptr::null_mut());
            unsafe { f(ctx_ptr) }
        });
        report(&full_name, outcome, start.elapsed(), summary);
    }

    // Teardown runs only if setup was invoked, exactly once, after every
    // fixture test regardless of their individual outcomes (§4.6, §8
    // property 7).
    if let (Some(ctx_ptr), Some(address)) = (ctx, suite.teardown) {
        eprintln!("[ TEARDOWN] {}", suite.name);
        let teardown: FixtureTeardownFn =
            unsafe { std::mem::transmute::<usize, FixtureTeardownFn>(address as usize) };
        // A failing teardown assertion is still routed through the same
        // recovery point; its outcome doesn't feed back into `summary`
        // beyond what the assertion surface already reported, matching
        // the spec's silence on teardown-failure accounting.
        let _ = invoke_guarded(|| unsafe { teardown(ctx_ptr) });
    }
}

fn invoke_guarded<F: FnOnce()>(body: F) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(()) => Outcome::Ok,
        Err(_) => Outcome::Fail,
    }
}

fn report(full_name: &str, outcome: Outcome, elapsed: std::time::Duration, summary: &mut RunSummary) {
    summary.ran += 1;
    match outcome {
        Outcome::Ok => {
            eprintln!(
                "{} {full_name} ({} ms)",
                "[      OK ]".green(),
                elapsed.as_millis()
            );
        }
        Outcome::Fail => {
            summary.failed += 1;
            eprintln!(
                "{} {full_name} ({} ms)",
                "[    FAIL ]".red(),
                elapsed.as_millis()
            );
        }
    }
}

/// `RunTestList` (§4.6, §6 `--test-list`): bypasses plan building
/// entirely. Encodes each `Suite.Test` pair, looks it up via
/// [`SymbolStore::find_strong`], and invokes it as a Simple test. Unknown
/// names are reported but don't stop the remaining list from running.
pub fn run_test_list(store: &SymbolStore, names: &[String]) -> RunSummary {
    let _channel = FailureChannelGuard::install();
    let mut summary = RunSummary {
        ran: 0,
        failed: 0,
        unknown: 0,
    };

    for raw in names {
        match split_suite_test(raw) {
            Some((suite, test)) => {
                let symbol = codec::encode(TestRole::SimpleTest, suite, test);
                match store.find_strong(&symbol) {
                    Some(address) => {
                        eprintln!("[ RUN     ] {raw}");
                        let start = Instant::now();
                        let outcome = invoke_guarded(|| {
                            let f: SimpleTestFn = unsafe {
                                std::mem::transmute::<usize, SimpleTestFn>(address as usize)
                            };
                            unsafe { f() }
                        });
                        report(raw, outcome, start.elapsed(), &mut summary);
                    }
                    None => {
                        summary.unknown += 1;
                        let err = EngineError::UnknownTest(raw.clone());
                        eprintln!("{} {err}", "[ ERROR   ]".red());
                    }
                }
            }
            None => {
                summary.unknown += 1;
                let err = EngineError::UnknownTest(raw.clone());
                eprintln!("{} {err}", "[ ERROR   ]".red());
            }
        }
    }
    summary
}

fn split_suite_test(raw: &str) -> Option<(&str, &str)> {
    raw.split_once('.')
}

/// `ListAllTests` (§4.6, §6 `--list-test`): prints the same structure the
/// runner would execute, without invoking any test bodies.
pub fn list_plan(plan: &TestPlan) {
    for suite in &plan.suites {
        match suite.kind {
            Some(SuiteKind::Fixture) => {
                println!("[ SUITE(F)] {}", suite.name);
                if suite.setup.is_some() {
                    println!("  [ SETUP    ]");
                }
                for test in &suite.tests {
                    println!("  {}.{}", suite.name, test.name);
                }
                if suite.teardown.is_some() {
                    println!("  [ TEARDOWN ]");
                }
            }
            Some(SuiteKind::Simple) | None => {
                println!("[ SUITE(T)] {}", suite.name);
                for test in &suite.tests {
                    println!("  {}.{}", suite.name, test.name);
                }
            }
        }
    }
}

pub fn load_engine_error_banner(err: &EngineError) {
    eprintln!("{} {err}", "[ ERROR ]".red().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::TestEntry;

    fn plan_with_passing_and_failing() -> TestPlan {
        extern "C-unwind" fn pass() {}
        extern "C-unwind" fn fail() {
            panic!("boom");
        }

        let mut suite = Suite::new("Suite1".to_string());
        suite.kind = Some(SuiteKind::Simple);
        suite.tests = vec![
            TestEntry {
                name: "A".to_string(),
                address: Some(pass as usize as u64),
            },
            TestEntry {
                name: "B".to_string(),
                address: Some(fail as usize as u64),
            },
        ];
        TestPlan {
            suites: vec![suite],
        }
    }

    #[test]
    fn failure_isolation_keeps_running_subsequent_tests() {
        let plan = plan_with_passing_and_failing();
        let summary = run_plan(&plan);
        assert_eq!(summary.ran, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.exit_code(), -1);
    }

    #[test]
    fn all_passing_yields_zero_exit_code() {
        extern "C-unwind" fn pass() {}
        let mut suite = Suite::new("Suite1".to_string());
        suite.kind = Some(SuiteKind::Simple);
        suite.tests = vec![TestEntry {
            name: "A".to_string(),
            address: Some(pass as usize as u64),
        }];
        let plan = TestPlan {
            suites: vec![suite],
        };
        let summary = run_plan(&plan);
        assert_eq!(summary.exit_code(), 0);
    }
}
