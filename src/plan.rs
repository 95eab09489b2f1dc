//! Plan Builder (§4.5): walks the [`SymbolStore`], applies the Name Codec,
//! honors an optional suite filter, and produces an ordered [`TestPlan`] of
//! [`Suite`]s grouped by kind with their tests, setup, and teardown.

use crate::codec::{self, TestRole};
use crate::symbols::{ControlFlow, SymbolStore};

/// Whether a suite's tests run standalone or share a setup/teardown
/// fixture (§3 Suite).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteKind {
    Simple,
    Fixture,
}

/// One runnable item: a display name paired with the callable address
/// resolved for it, if any (§3 Test Entry). `address` is `None` when the
/// discovered symbol carried only weak variants and no strong definition
/// was ever linked in.
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub name: String,
    pub address: Option<u64>,
}

/// A group of [`TestEntry`] values sharing a suite name (§3 Suite).
#[derive(Debug, Clone)]
pub struct Suite {
    pub name: String,
    pub kind: Option<SuiteKind>,
    pub tests: Vec<TestEntry>,
    pub setup: Option<u64>,
    pub teardown: Option<u64>,
    setup_defined: bool,
    teardown_defined: bool,
}

impl Suite {
    /// `pub(crate)` so the Runner's tests can build a [`Suite`] directly
    /// against fabricated addresses instead of round-tripping through a
    /// real [`SymbolStore`] (full discovery coverage lives in this
    /// module's own tests and in `tests/plan.rs`).
    pub(crate) fn new(name: String) -> Self {
        Suite {
            name,
            kind: None,
            tests: Vec::new(),
            setup: None,
            teardown: None,
            setup_defined: false,
            teardown_defined: false,
        }
    }
}

/// Ordered list of suites to execute (§3 Test Plan). Order is discovery
/// order unless a suite filter was supplied, in which case it is the
/// filter's order.
#[derive(Debug, Clone, Default)]
pub struct TestPlan {
    pub suites: Vec<Suite>,
}

fn role_kind(role: TestRole) -> SuiteKind {
    match role {
        TestRole::SimpleTest => SuiteKind::Simple,
        TestRole::FixtureTest | TestRole::FixtureSetup | TestRole::FixtureTeardown => {
            SuiteKind::Fixture
        }
    }
}

/// Where a decoded symbol's address should land once the strong variant
/// (if any) is found, resolved once per entry in `begin` and consumed by
/// `on_variant`.
enum PendingSlot {
    None,
    Test { suite_idx: usize, test_idx: usize },
    Setup { suite_idx: usize },
    Teardown { suite_idx: usize },
}

struct BuildCtx {
    plan: TestPlan,
    filtering: bool,
    pending: PendingSlot,
}

/// Builds a [`TestPlan`] from `store`. With `suite_filter` absent, every
/// decodable symbol creates or extends a suite (discover-all mode, in
/// discovery order). With it present, the plan is pre-seeded with the
/// listed suites in listed order and symbols whose suite isn't listed are
/// discarded.
pub fn build_plan(store: &SymbolStore, suite_filter: Option<&[String]>) -> TestPlan {
    let mut plan = TestPlan::default();
    if let Some(names) = suite_filter {
        for name in names {
            plan.suites.push(Suite::new(name.clone()));
        }
    }

    let mut ctx = BuildCtx {
        plan,
        filtering: suite_filter.is_some(),
        pending: PendingSlot::None,
    };

    store.for_each(
        &mut ctx,
        |ctx, name| begin_entry(ctx, name),
        |ctx, address, weak| on_variant(ctx, address, weak),
        |ctx| ctx.pending = PendingSlot::None,
    );

    ctx.plan
}

fn begin_entry(ctx: &mut BuildCtx, name: &str) -> ControlFlow {
    let Some(decoded) = codec::decode(name) else {
        return ControlFlow::Break;
    };

    let suite_idx = match find_suite(&ctx.plan, &decoded.suite) {
        Some(idx) => idx,
        None if ctx.filtering => {
            // Not in the filter list: discard (§4.5 Filter mode).
            return ControlFlow::Break;
        }
        None => {
            ctx.plan.suites.push(Suite::new(decoded.suite.clone()));
            ctx.plan.suites.len() - 1
        }
    };

    let incoming_kind = role_kind(decoded.role);
    let suite = &mut ctx.plan.suites[suite_idx];
    match suite.kind {
        None => suite.kind = Some(incoming_kind),
        Some(existing) if existing != incoming_kind => {
            log::debug!(
                "plan builder: discarding `{name}`, suite `{}` already kind {:?}, got {:?}",
                suite.name,
                existing,
                incoming_kind
            );
            return ControlFlow::Break;
        }
        Some(_) => {}
    }

    ctx.pending = match decoded.role {
        TestRole::SimpleTest | TestRole::FixtureTest => {
            suite.tests.push(TestEntry {
                name: decoded.name.clone(),
                address: None,
            });
            PendingSlot::Test {
                suite_idx,
                test_idx: suite.tests.len() - 1,
            }
        }
        TestRole::FixtureSetup => {
            if suite.setup_defined {
                log::debug!(
                    "plan builder: discarding duplicate setup `{name}` for suite `{}`",
                    suite.name
                );
                return ControlFlow::Break;
            }
            suite.setup_defined = true;
            PendingSlot::Setup { suite_idx }
        }
        TestRole::FixtureTeardown => {
            if suite.teardown_defined {
                log::debug!(
                    "plan builder: discarding duplicate teardown `{name}` for suite `{}`",
                    suite.name
                );
                return ControlFlow::Break;
            }
            suite.teardown_defined = true;
            PendingSlot::Teardown { suite_idx }
        }
    };

    ControlFlow::Continue
}

fn on_variant(ctx: &mut BuildCtx, address: u64, weak: bool) -> ControlFlow {
    // Strong preferred regardless of insertion order: skip weak variants
    // and keep looking; stop at the first strong one (§4.5).
    if weak {
        return ControlFlow::Continue;
    }

    match ctx.pending {
        PendingSlot::Test {
            suite_idx,
            test_idx,
        } => {
            ctx.plan.suites[suite_idx].tests[test_idx].address = Some(address);
        }
        PendingSlot::Setup { suite_idx } => {
            ctx.plan.suites[suite_idx].setup = Some(address);
        }
        PendingSlot::Teardown { suite_idx } => {
            ctx.plan.suites[suite_idx].teardown = Some(address);
        }
        PendingSlot::None => {}
    }
    ControlFlow::Break
}

fn find_suite(plan: &TestPlan, name: &str) -> Option<usize> {
    plan.suites.iter().position(|s| s.name == name)
}
