use std::fmt::Display;
use thiserror::Error;

/// Errors that can occur while operating on a [`SubString`](crate::slice::SubString) or while
/// driving the generalized suffix tree through its public API.
///
/// These are the caller-recoverable "argument error" surface described in the design docs:
/// they leave whatever they were called on unmodified, and never fire on well-formed input
/// produced by the tree's own construction algorithm. Internal invariant breaches (a bug in the
/// construction algorithm itself, not a caller mistake) are reported via `assert!`/`debug_assert!`
/// instead, since they should never occur and there is no sensible recovery for them.
#[derive(Debug, Error)]
pub enum GstError {
    /// A slice's `offset + length` would reach past the end of its backing buffer.
    #[error("slice out of bounds: offset {offset} + length {length} exceeds backing length {backing_len}")]
    SliceOutOfBounds {
        /// Offset into the backing buffer
        offset: usize,
        /// Requested length
        length: usize,
        /// Length of the backing buffer
        backing_len: usize,
    },

    /// `char_at(i)` was called with `i` at or past the slice's length.
    #[error("index {index} out of bounds for slice of length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length of the slice
        length: usize,
    },

    /// `sub_slice(start, end)` was called with a malformed or out-of-range range.
    #[error("invalid sub-slice range [{start}, {end}) for slice of length {length}")]
    InvalidRange {
        /// Requested start
        start: usize,
        /// Requested end
        end: usize,
        /// Length of the slice being sub-sliced
        length: usize,
    },

    /// `extend(c)` was called but there is no next code unit, or the next code unit isn't `c`.
    #[error("cannot extend slice by {attempted:?}: {reason}")]
    InvalidExtend {
        /// The code unit the caller tried to extend by
        attempted: u8,
        /// Why the extension failed
        reason: String,
    },

    /// `enumerate_common` was called with a non-positive `min_length` or `min_keys`.
    #[error("{what} must be positive, got {value}")]
    NonPositiveArgument {
        /// Which argument was invalid
        what: &'static str,
        /// The value that was supplied
        value: i64,
    },
}

/// A specialized `Result` type for fallible operations on [`SubString`](crate::slice::SubString)
/// and the generalized suffix tree's public API.
pub type Result<T> = std::result::Result<T, GstError>;

impl GstError {
    pub(crate) fn slice_out_of_bounds(offset: usize, length: usize, backing_len: usize) -> Self {
        Self::SliceOutOfBounds {
            offset,
            length,
            backing_len,
        }
    }

    pub(crate) fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    pub(crate) fn invalid_range(start: usize, end: usize, length: usize) -> Self {
        Self::InvalidRange { start, end, length }
    }

    pub(crate) fn invalid_extend(attempted: u8, reason: impl Display) -> Self {
        Self::InvalidExtend {
            attempted,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn non_positive(what: &'static str, value: i64) -> Self {
        Self::NonPositiveArgument { what, value }
    }
}
