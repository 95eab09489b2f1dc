//! Assertion surface (§6, §9): the external collaborator test bodies call
//! to report a failed expectation. `fail` writes a formatted diagnostic to
//! standard error and then raises on the Failure Channel — a Rust panic,
//! caught by the recovery point the Runner installs around each test
//! invocation (`src/runner.rs`). It never returns.
//!
//! The macros below are the thin, hand-written `macro_rules!` wrappers
//! test authors actually write against, mirroring the `ASSERT_*` macro
//! family in `original_source/src/cunitpp.h` one for one. They stringify
//! operand *expressions* for binary comparisons (matching the original's
//! `#LHS`/`#RHS`) but print operand *values* for the string comparisons,
//! since that's what the original's `%s` format specifiers do.

/// Writes `{file}:{line}: {message}` to stderr, then panics to unwind
/// back to the Runner's recovery point. Test bodies never call this
/// directly — they go through the `ASSERT_*` macros below. The panic
/// payload is [`EngineError::AssertionFailure`] (§7), giving the Runner a
/// concrete type to downcast against if it ever needs to distinguish an
/// assertion failure from an unrelated panic inside a test body.
#[track_caller]
pub fn fail(file: &str, line: u32, message: std::fmt::Arguments<'_>) -> ! {
    eprintln!("{file}:{line}: {message}");
    std::panic::panic_any(crate::error::EngineError::AssertionFailure);
}

#[macro_export]
macro_rules! ASSERT_EQ {
    ($lhs:expr, $rhs:expr) => {{
        if !(($lhs) == ($rhs)) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!(
                    "Comparison `{} {} {}` failed",
                    stringify!($lhs),
                    "==",
                    stringify!($rhs)
                ),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_NE {
    ($lhs:expr, $rhs:expr) => {{
        if !(($lhs) != ($rhs)) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!(
                    "Comparison `{} {} {}` failed",
                    stringify!($lhs),
                    "!=",
                    stringify!($rhs)
                ),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_LT {
    ($lhs:expr, $rhs:expr) => {{
        if !(($lhs) < ($rhs)) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!(
                    "Comparison `{} {} {}` failed",
                    stringify!($lhs),
                    "<",
                    stringify!($rhs)
                ),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_LE {
    ($lhs:expr, $rhs:expr) => {{
        if !(($lhs) <= ($rhs)) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!(
                    "Comparison `{} {} {}` failed",
                    stringify!($lhs),
                    "<=",
                    stringify!($rhs)
                ),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_GT {
    ($lhs:expr, $rhs:expr) => {{
        if !(($lhs) > ($rhs)) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!(
                    "Comparison `{} {} {}` failed",
                    stringify!($lhs),
                    ">",
                    stringify!($rhs)
                ),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_GE {
    ($lhs:expr, $rhs:expr) => {{
        if !(($lhs) >= ($rhs)) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!(
                    "Comparison `{} {} {}` failed",
                    stringify!($lhs),
                    ">=",
                    stringify!($rhs)
                ),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_STREQ {
    ($lhs:expr, $rhs:expr) => {{
        let lhs: &str = $lhs;
        let rhs: &str = $rhs;
        if !(lhs == rhs) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("String comparison `{} {} {}` failed", lhs, "==", rhs),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_STRNE {
    ($lhs:expr, $rhs:expr) => {{
        let lhs: &str = $lhs;
        let rhs: &str = $rhs;
        if !(lhs != rhs) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("String comparison `{} {} {}` failed", lhs, "!=", rhs),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_STRLT {
    ($lhs:expr, $rhs:expr) => {{
        let lhs: &str = $lhs;
        let rhs: &str = $rhs;
        if !(lhs < rhs) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("String comparison `{} {} {}` failed", lhs, "<", rhs),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_STRLE {
    ($lhs:expr, $rhs:expr) => {{
        let lhs: &str = $lhs;
        let rhs: &str = $rhs;
        if !(lhs <= rhs) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("String comparison `{} {} {}` failed", lhs, "<=", rhs),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_STRGT {
    ($lhs:expr, $rhs:expr) => {{
        let lhs: &str = $lhs;
        let rhs: &str = $rhs;
        if !(lhs > rhs) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("String comparison `{} {} {}` failed", lhs, ">", rhs),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_STRGE {
    ($lhs:expr, $rhs:expr) => {{
        let lhs: &str = $lhs;
        let rhs: &str = $rhs;
        if !(lhs >= rhs) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("String comparison `{} {} {}` failed", lhs, ">=", rhs),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_TRUE {
    ($cond:expr) => {{
        if !($cond) {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("Expression `{}` expected to be true", stringify!($cond)),
            );
        }
    }};
}

#[macro_export]
macro_rules! ASSERT_FALSE {
    ($cond:expr) => {{
        if $cond {
            $crate::assertion::fail(
                file!(),
                line!(),
                format_args!("Expression `{}` expected to be false", stringify!($cond)),
            );
        }
    }};
}
