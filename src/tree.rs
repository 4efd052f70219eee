use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::{GstError, Result};
use crate::node::{Arena, Edge, NodeId, ROOT};
use crate::slice::SubString;

/// A generalized suffix tree: an on-line, Ukkonen-style index over many independently inserted
/// (key, value) pairs, answering substring-containment queries in time proportional to the query
/// length.
///
/// `T` is the opaque value type associated with each key. It must be `Clone + Eq + Hash` because
/// a single logical value is cloned into every node along a suffix-link propagation chain during
/// `insert`, and the high-cardinality value-bag representation is a `HashSet<T>`.
///
/// The tree is `!Sync` by construction (its arena borrows a single-threaded `Rc<[u8]>` per
/// inserted key), so concurrent reads while a writer is mid-`insert` are the caller's
/// responsibility to rule out; the type system enforces "no readers across threads" for free
/// rather than merely documenting it.
pub struct GeneralizedSuffixTree<T: Clone + Eq + Hash> {
    arena: Arena<T>,
}

impl<T: Clone + Eq + Hash> GeneralizedSuffixTree<T> {
    pub fn new() -> Self {
        GeneralizedSuffixTree {
            arena: Arena::new(),
        }
    }

    /// Adds `key` to the tree, associating `value` with every substring of `key`.
    ///
    /// Construction is total: any key (including the empty key, which is a no-op) and any value
    /// are accepted. Re-inserting the same `(key, value)` leaves the observable result set
    /// unchanged, though it may still perform structural work internally.
    pub fn insert(&mut self, key: &str, value: T) {
        let backing: Rc<[u8]> = Rc::from(key.as_bytes());
        let mut active_leaf = ROOT;
        let mut s = ROOT;
        let mut text = SubString::empty_at(Rc::clone(&backing), 0)
            .expect("an empty slice at offset 0 is always within bounds");

        for i in 0..backing.len() {
            let c = backing[i];
            let rest = SubString::with_bounds(Rc::clone(&backing), i, backing.len() - i)
                .expect("rest is always within the backing key's bounds");
            let (next_s, next_text) =
                self.update(s, text, c, rest, value.clone(), &mut active_leaf);
            s = next_s;
            text = next_text;
        }

        if active_leaf != ROOT
            && active_leaf != s
            && self.arena.node(active_leaf).suffix_link().is_none()
        {
            self.arena.node_mut(active_leaf).set_suffix_link(s);
        }
    }

    /// One phase of Ukkonen's on-line construction: processes the single character `c`, the
    /// `i`-th character of the key being inserted, extending every suffix that is currently
    /// "pending" (per `remaining_suffix_count` in the classical formulation, here driven
    /// implicitly by the `endpoint` flag `test_and_split` returns).
    fn update(
        &mut self,
        s_in: NodeId,
        text: SubString,
        c: u8,
        rest: SubString,
        value: T,
        active_leaf: &mut NodeId,
    ) -> (NodeId, SubString) {
        let mut s = s_in;
        let mut k = text
            .extend(c)
            .expect("update: the active-point slice must be extendable by the character just read");
        let mut old_root = ROOT;

        let (mut endpoint, mut r) = self.test_and_split(s, &text, c, &rest, &value);

        while !endpoint {
            let leaf = match self.arena.node(r).get_edge(c).cloned() {
                // Earlier insertions (of other keys) may already have populated a descendant
                // here, a genuine difference from single-string Ukkonen, where this branch can
                // never be taken.
                Some(edge) => edge.dest,
                None => {
                    let leaf = self.arena.create();
                    self.arena.add_ref(leaf, value.clone());
                    self.arena.node_mut(r).add_edge(Edge {
                        label: rest.clone(),
                        dest: leaf,
                    });
                    leaf
                }
            };

            if *active_leaf != ROOT {
                self.arena.node_mut(*active_leaf).set_suffix_link(leaf);
            }
            *active_leaf = leaf;

            if old_root != ROOT {
                self.arena.node_mut(old_root).set_suffix_link(r);
            }
            old_root = r;

            if self.arena.node(s).suffix_link().is_none() {
                debug_assert_eq!(s, ROOT, "only the root may be without a suffix link here");
                k = k
                    .suffix_from(1)
                    .expect("k is non-empty whenever this branch runs");
            } else if let Some(link) = self.arena.node(s).suffix_link() {
                let shortened = k.shorten(1);
                let (canon_s, canon_sub) = self.canonize(link, shortened);
                s = canon_s;
                let last = k.char_at(k.length() - 1).expect("k is non-empty inside update's loop");
                k = canon_sub
                    .extend(last)
                    .expect("canonized remainder must be extendable by k's last character");
            }

            let next_search = k.shorten(1);
            let (next_endpoint, next_r) = self.test_and_split(s, &next_search, c, &rest, &value);
            endpoint = next_endpoint;
            r = next_r;
        }

        if old_root != ROOT {
            self.arena.node_mut(old_root).set_suffix_link(r);
        }

        self.canonize(s, k)
    }

    /// Tests whether the single-character extension `c` is already represented starting from
    /// `(s, search)`, splitting an edge if needed to make it explicit. Returns `(endpoint, r)`
    /// where `r` is either the (possibly newly split) node at which the extension is now
    /// explicit (`endpoint == true`), or the node from which a new leaf should be attached
    /// (`endpoint == false`).
    fn test_and_split(
        &mut self,
        s: NodeId,
        search: &SubString,
        c: u8,
        rest: &SubString,
        value: &T,
    ) -> (bool, NodeId) {
        let (s2, search2) = self.canonize(s, search.clone());

        if !search2.is_empty() {
            let first = search2.first().expect("search2 is non-empty");
            let edge = self
                .arena
                .node(s2)
                .get_edge(first)
                .expect("test_and_split: canonize left a non-empty remainder implying this edge exists")
                .clone();
            let at_boundary = edge
                .label
                .char_at(search2.length())
                .expect("search2 is strictly shorter than edge.label here");
            if at_boundary == c {
                (true, s2)
            } else {
                let new_internal = self.split_edge(s2, first, search2.length());
                (false, new_internal)
            }
        } else {
            let rb = rest.first().expect("rest is always non-empty: rest[0] == c");
            match self.arena.node(s2).get_edge(rb).cloned() {
                None => (false, s2),
                Some(edge) => {
                    if edge.label.starts_with_all(rest) {
                        if edge.label.length() == rest.length() {
                            self.arena.add_ref(edge.dest, value.clone());
                            (true, s2)
                        } else {
                            let new_internal = self.split_edge(s2, rb, rest.length());
                            self.arena.add_ref(new_internal, value.clone());
                            (false, s2)
                        }
                    } else {
                        // The path already diverges before reaching the end of `rest` (or the
                        // existing edge is shorter than `rest` and a previous key's insertion has
                        // already extended structure past this point). Either way `c` itself is
                        // already accounted for; no split is needed at this extension.
                        (true, s2)
                    }
                }
            }
        }
    }

    /// Walks the active point `(s, input)` down the tree as far as whole edge labels allow,
    /// returning the canonical `(node, remainder)` fixpoint.
    fn canonize(&self, s_in: NodeId, input: SubString) -> (NodeId, SubString) {
        let mut s = s_in;
        let mut remainder = input;
        loop {
            if remainder.is_empty() {
                return (s, remainder);
            }
            let first = remainder.first().expect("remainder is non-empty");
            let edge = match self.arena.node(s).get_edge(first) {
                Some(e) => e.clone(),
                None => return (s, remainder),
            };
            if !remainder.starts_with(&edge.label, edge.label.length()) {
                return (s, remainder);
            }
            s = edge.dest;
            remainder = remainder
                .suffix_from(edge.label.length())
                .expect("remainder fully contains edge.label here, so this sub-slice is in bounds");
        }
    }

    /// Splits `parent`'s edge for `first_byte` at `first_part_length`, inserting a new internal
    /// node between the two halves. Returns the new internal node.
    fn split_edge(&mut self, parent: NodeId, first_byte: u8, first_part_length: usize) -> NodeId {
        let edge = self
            .arena
            .node(parent)
            .get_edge(first_byte)
            .expect("split_edge requires the edge to already exist")
            .clone();
        debug_assert!(
            first_part_length < edge.label.length(),
            "split_edge requires a strict prefix of the edge label"
        );

        let first = edge
            .label
            .sub_slice(0, first_part_length)
            .expect("first_part_length is within the edge label's bounds");
        let second = edge
            .label
            .suffix_from(first_part_length)
            .expect("first_part_length is within the edge label's bounds");

        let new_internal = self.arena.create();
        self.arena
            .node_mut(parent)
            .replace_edge(first_byte, Edge { label: first, dest: new_internal });
        self.arena
            .node_mut(new_internal)
            .add_edge(Edge { label: second, dest: edge.dest });

        new_internal
    }

    /// Returns every value whose key contains `query` as a substring. Empty queries always
    /// return no results.
    pub fn search(&self, query: &str) -> HashSet<T> {
        let mut out = HashSet::new();
        self.search_with(query, |values| out.extend(values.iter().cloned()));
        out
    }

    /// Streaming variant of [`search`](Self::search): `sink` is invoked one or more times with
    /// subsets of the result whose union is the full answer (this implementation invokes it
    /// exactly once, with the complete result, since the tree holds the whole answer in one
    /// subtree once the query is located).
    pub fn search_with(&self, query: &str, mut sink: impl FnMut(&[T])) {
        if query.is_empty() {
            return;
        }
        let bytes = query.as_bytes();
        let mut current = ROOT;
        let mut pos = 0usize;

        while pos < bytes.len() {
            let first = bytes[pos];
            let edge = match self.arena.node(current).get_edge(first) {
                Some(e) => e,
                None => return,
            };
            let remaining = bytes.len() - pos;
            let n = remaining.min(edge.label.length());
            if edge.label.as_bytes()[..n] != bytes[pos..pos + n] {
                return;
            }
            current = edge.dest;
            pos += n;
            if n == remaining {
                let mut collected = Vec::new();
                self.read_values(current, &mut collected);
                sink(&collected);
                return;
            }
        }
    }

    /// Returns every value stored in the tree.
    pub fn enumerate_all(&self) -> HashSet<T> {
        let mut collected = Vec::new();
        self.read_values(ROOT, &mut collected);
        collected.into_iter().collect()
    }

    /// Streaming variant of [`enumerate_all`](Self::enumerate_all).
    pub fn enumerate_all_with(&self, mut sink: impl FnMut(&[T])) {
        let mut collected = Vec::new();
        self.read_values(ROOT, &mut collected);
        sink(&collected);
    }

    /// Pushes `node`'s own values, then recursively every descendant's values, into `out`.
    /// The root's own bag is always empty (nothing is ever added to it, since the root absorbs
    /// value adds as a no-op), so calling this at the root naturally enumerates everything
    /// without needing to special-case root's contribution away.
    fn read_values(&self, node: NodeId, out: &mut Vec<T>) {
        out.extend(self.arena.node(node).own_values().cloned());
        for (_, edge) in self.arena.node(node).children() {
            self.read_values(edge.dest, out);
        }
    }

    /// Depth-first-enumerates every distinct substring of at least `min_length` code units that
    /// occurs in at least `min_keys` distinct inserted keys, invoking `visitor` once per distinct
    /// substring with its associated value set.
    pub fn enumerate_common(
        &self,
        min_length: i64,
        min_keys: i64,
        mut visitor: impl FnMut(&str, &HashSet<T>),
    ) -> Result<()> {
        if min_length <= 0 {
            return Err(GstError::non_positive("min_length", min_length));
        }
        if min_keys <= 0 {
            return Err(GstError::non_positive("min_keys", min_keys));
        }

        let min_length = min_length as usize;
        let min_keys = min_keys as usize;
        let mut seen_labels: HashSet<String> = HashSet::new();
        let mut buffer: Vec<u8> = Vec::new();
        self.enumerate_common_rec(ROOT, min_length, min_keys, &mut buffer, &mut seen_labels, &mut visitor);
        Ok(())
    }

    /// Returns `K(node)`: the set of distinct values reachable from `node`, computed bottom-up in
    /// the same post-order pass that emits qualifying substrings, so each node's closure is
    /// computed once rather than once per ancestor.
    fn enumerate_common_rec(
        &self,
        node: NodeId,
        min_length: usize,
        min_keys: usize,
        buffer: &mut Vec<u8>,
        seen_labels: &mut HashSet<String>,
        visitor: &mut dyn FnMut(&str, &HashSet<T>),
    ) -> HashSet<T> {
        let mut reachable: HashSet<T> = self.arena.node(node).own_values().cloned().collect();

        for (_, edge) in self.arena.node(node).children() {
            let restore_to = buffer.len();
            buffer.extend_from_slice(edge.label.as_bytes());
            let child_reachable =
                self.enumerate_common_rec(edge.dest, min_length, min_keys, buffer, seen_labels, visitor);
            reachable.extend(child_reachable);
            buffer.truncate(restore_to);
        }

        if buffer.len() >= min_length && reachable.len() >= min_keys {
            let label = String::from_utf8_lossy(buffer).into_owned();
            if seen_labels.insert(label.clone()) {
                visitor(&label, &reachable);
            }
        }

        reachable
    }

    /// A human-readable summary of the tree's size and shape. Format is unspecified and may
    /// change between versions; intended for debugging and logging, not machine parsing.
    pub fn statistics(&self) -> String {
        let mut edge_count = 0usize;
        let mut leaf_count = 0usize;
        let mut max_depth = 0usize;
        let mut total_values = 0usize;
        self.walk_statistics(ROOT, 0, &mut edge_count, &mut leaf_count, &mut max_depth, &mut total_values);

        format!(
            "GeneralizedSuffixTree {{ nodes: {}, edges: {}, leaves: {}, max_depth: {}, stored_value_refs: {} }}",
            self.arena.len(),
            edge_count,
            leaf_count,
            max_depth,
            total_values
        )
    }

    fn walk_statistics(
        &self,
        node: NodeId,
        depth: usize,
        edge_count: &mut usize,
        leaf_count: &mut usize,
        max_depth: &mut usize,
        total_values: &mut usize,
    ) {
        *max_depth = (*max_depth).max(depth);
        *total_values += self.arena.node(node).value_count();

        let children: Vec<(u8, Edge)> = self
            .arena
            .node(node)
            .children()
            .map(|(&b, e)| (b, e.clone()))
            .collect();

        if children.is_empty() {
            *leaf_count += 1;
        }

        for (_, edge) in children {
            *edge_count += 1;
            self.walk_statistics(
                edge.dest,
                depth + edge.label.length(),
                edge_count,
                leaf_count,
                max_depth,
                total_values,
            );
        }
    }
}

impl<T: Clone + Eq + Hash> Default for GeneralizedSuffixTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
