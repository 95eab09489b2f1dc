//! Name Codec (§4.4): encodes/decodes the naming convention mapping
//! `(role, suite, test-name) <-> linker symbol`.
//!
//! ```text
//! <PREFIX><ROLE><SUITE><SEP><NAME>
//! ```

pub const PREFIX: &str = "__CUnitPP_";
pub const SEPARATOR: &str = "____";

/// The four kinds of symbol a test author can declare (§3 Test Role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestRole {
    SimpleTest,
    FixtureTest,
    FixtureSetup,
    FixtureTeardown,
}

impl TestRole {
    fn from_char(c: char) -> Option<TestRole> {
        match c {
            'T' => Some(TestRole::SimpleTest),
            'F' => Some(TestRole::FixtureTest),
            'S' => Some(TestRole::FixtureSetup),
            'D' => Some(TestRole::FixtureTeardown),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            TestRole::SimpleTest => 'T',
            TestRole::FixtureTest => 'F',
            TestRole::FixtureSetup => 'S',
            TestRole::FixtureTeardown => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    pub role: TestRole,
    pub suite: String,
    pub name: String,
}

/// Builds the linker symbol name for `(role, suite, name)`. The strict
/// inverse of [`decode`]; used by the `--test-list` lookup path to
/// construct the key for a user-supplied `Suite.Test` argument.
///
/// Setup and teardown symbols carry no meaningful test-name field (the
/// Plan Builder ignores it for those two roles), so by convention it is
/// always the role character itself — e.g. a fixture setup for suite
/// `Fix` is `__CUnitPP_SFix____S` (§6).
pub fn encode(role: TestRole, suite: &str, name: &str) -> String {
    let role_char = role.to_char();
    match role {
        TestRole::FixtureSetup | TestRole::FixtureTeardown => {
            format!("{PREFIX}{role_char}{suite}{SEPARATOR}{role_char}")
        }
        TestRole::SimpleTest | TestRole::FixtureTest => {
            format!("{PREFIX}{role_char}{suite}{SEPARATOR}{name}")
        }
    }
}

/// Decodes a linker symbol name produced by [`encode`]. Rejects any
/// string that:
/// - does not start with [`PREFIX`],
/// - has no recognized role character immediately following the prefix,
/// - or whose remainder does not contain [`SEPARATOR`] exactly once.
pub fn decode(symbol: &str) -> Option<DecodedName> {
    let rest = symbol.strip_prefix(PREFIX)?;
    let mut chars = rest.chars();
    let role = TestRole::from_char(chars.next()?)?;
    let remainder = chars.as_str();

    if remainder.match_indices(SEPARATOR).count() != 1 {
        return None;
    }
    let sep_at = remainder.find(SEPARATOR)?;
    let suite = &remainder[..sep_at];
    let name = &remainder[sep_at + SEPARATOR.len()..];

    Some(DecodedName {
        role,
        suite: suite.to_string(),
        name: name.to_string(),
    })
}
