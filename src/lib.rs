//! `symtest`: a self-introspecting unit-test runner for natively compiled
//! programs. A test author declares tests with the attribute macros in
//! `symtest-macros`; the resulting executable discovers its own tests by
//! scanning its own ELF image(s) for symbols whose names match an encoded
//! naming convention (`symtest::codec`), builds a test plan
//! (`symtest::plan`), and dispatches it (`symtest::runner`) — no static
//! registration list, no code generation step, no linker tricks.
//!
//! Module layout mirrors the engine's dependency order, leaves first:
//! [`elf`] and [`symbols`] underpin [`loader`], which populates the
//! [`symbols::SymbolStore`] that [`plan`] turns into a [`plan::TestPlan`]
//! that [`runner`] executes. [`codec`] is the naming-convention seam
//! between [`loader`]/[`plan`] and the attribute macros. [`assertion`] is
//! the external surface test bodies call into; [`module_map`] and
//! [`error`] are leaf utilities used throughout.

#[macro_use]
extern crate enum_display_derive;

pub mod assertion;
pub mod codec;
pub mod elf;
pub mod error;
pub mod loader;
pub mod module_map;
pub mod plan;
pub mod runner;
pub mod symbols;

pub use symtest_macros::{fixture_setup, fixture_teardown, fixture_test, simple_test};

use error::EngineError;
use module_map::ScanMode;
use plan::TestPlan;
use runner::RunSummary;
use symbols::SymbolStore;

/// Runs the full discovery pipeline against the calling process's own
/// image(s): Module Map Reader → ELF Symbol Loader → Symbol Store (§2
/// dataflow). This is the engine's only entry point into populating a
/// fresh store; callers then hand the store to [`plan::build_plan`] or
/// [`runner::run_test_list`].
pub fn discover(mode: ScanMode) -> Result<SymbolStore, EngineError> {
    let modules = module_map::read_self_modules(mode)?;
    let mut store = SymbolStore::new();
    loader::load_modules(&mut store, &modules)?;
    Ok(store)
}

/// Convenience wrapper: discovers, builds a plan (optionally filtered to
/// `suite_filter`), and runs it. This is what the CLI binary's default
/// (no `--test-list`) path does.
pub fn discover_and_run(
    mode: ScanMode,
    suite_filter: Option<&[String]>,
) -> Result<RunSummary, EngineError> {
    let store = discover(mode)?;
    let plan = plan::build_plan(&store, suite_filter);
    Ok(runner::run_plan(&plan))
}

/// Convenience wrapper: discovers and builds a plan without running it,
/// for the `--list-test` CLI path.
pub fn discover_plan(
    mode: ScanMode,
    suite_filter: Option<&[String]>,
) -> Result<TestPlan, EngineError> {
    let store = discover(mode)?;
    Ok(plan::build_plan(&store, suite_filter))
}

/// Convenience wrapper: discovers and runs the exact `Suite.Test` pairs
/// in `names`, bypassing plan building entirely — the `--test-list` CLI
/// path (§4.6 `RunTestList`).
pub fn discover_and_run_test_list(
    mode: ScanMode,
    names: &[String],
) -> Result<RunSummary, EngineError> {
    let store = discover(mode)?;
    Ok(runner::run_test_list(&store, names))
}
