//! Bounds policy for width-aware memory accesses.

use std::ops::Range;

use crate::{FaultCode, OperandWidth};

/// Validates that a `width`-byte access at `address` fits in a buffer of
/// `len` bytes and returns the byte range it covers.
///
/// # Errors
///
/// Returns [`FaultCode::OutOfBoundsAccess`] when `address` is negative or
/// `address + width` exceeds `len`.
pub fn validate_access(
    address: i64,
    width: OperandWidth,
    len: usize,
) -> Result<Range<usize>, FaultCode> {
    let out_of_bounds = FaultCode::OutOfBoundsAccess {
        address,
        width: width.bytes(),
    };

    let start = usize::try_from(address).map_err(|_| out_of_bounds)?;
    let end = start
        .checked_add(width.byte_len())
        .filter(|end| *end <= len)
        .ok_or(out_of_bounds)?;

    Ok(start..end)
}
