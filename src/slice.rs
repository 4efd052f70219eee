use std::rc::Rc;

use crate::error::{GstError, Result};

/// A zero-copy window over a shared, owned backing buffer.
///
/// Rather than borrowing the caller's key with a lifetime parameter (which would make the tree a
/// self-referential, suffix-linked graph fighting the borrow checker on every insert), each
/// inserted key is copied once into an `Rc<[u8]>`, and every `SubString` derived while processing
/// that key just clones the `Rc` (a refcount bump, not a copy of the bytes). Two slices that share
/// a backing pointer and offset are therefore provably equal as prefixes without comparing bytes;
/// `starts_with` uses this as a fast path.
#[derive(Clone)]
pub struct SubString {
    backing: Rc<[u8]>,
    offset: usize,
    length: usize,
}

impl SubString {
    /// Builds a slice over the whole of `backing`.
    pub fn new(backing: Rc<[u8]>) -> Self {
        let length = backing.len();
        SubString {
            backing,
            offset: 0,
            length,
        }
    }

    /// Builds a slice `backing[offset..offset+length]`, failing if it would run past the end of
    /// `backing`.
    pub fn with_bounds(backing: Rc<[u8]>, offset: usize, length: usize) -> Result<Self> {
        if offset + length > backing.len() {
            return Err(GstError::slice_out_of_bounds(offset, length, backing.len()));
        }
        Ok(SubString {
            backing,
            offset,
            length,
        })
    }

    /// Empty slice sharing `backing`, positioned at `offset`.
    pub fn empty_at(backing: Rc<[u8]>, offset: usize) -> Result<Self> {
        Self::with_bounds(backing, offset, 0)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `backing[offset + i]`, failing if `i` is out of bounds.
    pub fn char_at(&self, i: usize) -> Result<u8> {
        if i >= self.length {
            return Err(GstError::index_out_of_bounds(i, self.length));
        }
        Ok(self.backing[self.offset + i])
    }

    pub fn last(&self) -> Result<u8> {
        if self.length == 0 {
            return Err(GstError::index_out_of_bounds(0, 0));
        }
        self.char_at(self.length - 1)
    }

    /// First code unit of the slice: the key this slice would be indexed under in a node's
    /// edge map.
    pub fn first(&self) -> Option<u8> {
        if self.length == 0 {
            None
        } else {
            Some(self.backing[self.offset])
        }
    }

    /// Returns a new slice sharing the backing, covering `[start, end)` of this slice.
    pub fn sub_slice(&self, start: usize, end: usize) -> Result<Self> {
        if end < start || end > self.length {
            return Err(GstError::invalid_range(start, end, self.length));
        }
        if start == 0 && end == self.length {
            return Ok(self.clone());
        }
        Ok(SubString {
            backing: Rc::clone(&self.backing),
            offset: self.offset + start,
            length: end - start,
        })
    }

    /// `sub_slice(start, length())`.
    pub fn suffix_from(&self, start: usize) -> Result<Self> {
        self.sub_slice(start, self.length)
    }

    /// Returns a slice one code unit longer, over the same backing, failing unless the next code
    /// unit exists and equals `c`. This is the contract the on-line construction algorithm relies
    /// on to reason about the active-point string without ever copying bytes.
    pub fn extend(&self, c: u8) -> Result<Self> {
        let next_offset = self.offset + self.length;
        if next_offset >= self.backing.len() {
            return Err(GstError::invalid_extend(c, "no next code unit"));
        }
        let actual = self.backing[next_offset];
        if actual != c {
            return Err(GstError::invalid_extend(
                c,
                format!("next code unit is {} not {}", actual, c),
            ));
        }
        Ok(SubString {
            backing: Rc::clone(&self.backing),
            offset: self.offset,
            length: self.length + 1,
        })
    }

    /// Returns a slice with its length reduced by `k`, clamped at 0. `k` is unsigned, so there is
    /// no negative case to reject.
    pub fn shorten(&self, k: usize) -> Self {
        let length = self.length.saturating_sub(k);
        SubString {
            backing: Rc::clone(&self.backing),
            offset: self.offset,
            length,
        }
    }

    /// Compares up to `n` code units of `self` against `other`, fast-pathing when both slices
    /// share a backing pointer and offset (in which case they are provably equal as prefixes).
    pub fn starts_with(&self, other: &SubString, n: usize) -> bool {
        if n > self.length || n > other.length {
            return false;
        }
        if Rc::ptr_eq(&self.backing, &other.backing) && self.offset == other.offset {
            return true;
        }
        (0..n).all(|i| self.backing[self.offset + i] == other.backing[other.offset + i])
    }

    /// `starts_with(other, other.length())`: does `self` begin with the whole of `other`?
    pub fn starts_with_all(&self, other: &SubString) -> bool {
        self.starts_with(other, other.length())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.backing[self.offset..self.offset + self.length]
    }

    /// Lossy UTF-8 rendering, used by `statistics` and the common-substring miner's emitted
    /// labels; the alphabet is opaque bytes, not necessarily valid UTF-8.
    pub fn to_display_string(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl std::fmt::Debug for SubString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SubString({:?})", self.to_display_string())
    }
}
