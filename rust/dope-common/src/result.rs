//! Result alias and the precondition helpers shared by the descriptor crates.
//!
//! Address arithmetic is carried out in `i128` so that no intermediate sum can
//! wrap; [`narrow_address`] brings a finished value back to `i64` and is the one
//! place where an unrepresentable result turns into `ExtentOverflow`.

use crate::error::{Error, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with `InvalidArgument` naming `$name` unless `$expr` holds.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        Err(invalid_arg(name, condition))
    }
}

#[cold]
fn invalid_arg(name: &str, condition: &str) -> Error {
    ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: format!("requires `{condition}`"),
    }
    .into()
}

/// Fails with `RankMismatch` unless `actual == expected`.
#[inline]
pub fn verify_rank(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::rank_mismatch(expected, actual))
    }
}

/// Converts a widened address or offset to `i64`.
///
/// `describe` is only evaluated on failure and names the quantity in the
/// resulting `ExtentOverflow` message.
#[inline]
pub fn narrow_address(value: i128, describe: impl FnOnce() -> String) -> Result<i64> {
    i64::try_from(value).map_err(|_| overflow(value, describe()))
}

#[cold]
fn overflow(value: i128, what: String) -> Error {
    Error::extent_overflow(format!("{what} ({value}) overflows i64"))
}
