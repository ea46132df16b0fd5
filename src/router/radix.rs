//! Radix tree for route matching.
//!
//! Keys are normalized paths (see [`crate::macros::Template::normalized`]):
//! literal text, the dynamic marker `:` standing for one segment, and an
//! optional trailing wildcard marker `*` standing for the rest of the path.
//!
//! ## Layout
//!
//! Nodes live in one arena (`Vec<RadixNode<T>>`) and refer to their children
//! by index, so prefix splits are index moves instead of ownership transfers.
//! A tree is only mutated while routes are registered; lookups take `&self`
//! and may run from any number of threads.
//!
//! ## Shape invariants
//!
//! - Every `:` marker is a node of its own. Before a path is inserted, the
//!   prefixes ending right before and right after each marker are inserted
//!   as value-less placeholders, so the tree always has a branch point there.
//! - A wildcard is stored on the node whose segment ends at the `/` before
//!   the `*`; the node owns the capture name and the route value.
//! - A wildcard registered directly under `/` is a separate root-level node
//!   (`root_wildcard`). It never takes part in prefix splitting and is tried
//!   after every other root node, so it cannot shadow them.
//! - A node holds at most one value; inserting a second one at the same key
//!   fails with [`Conflict`] and leaves the tree unchanged.
//!
//! ## Priority
//!
//! After each insertion every level is reordered: static nodes first (busier
//! subtrees before smaller ones, wildcard owners included), then the `:`
//! node, then the root wildcard. A node tries its children before its own
//! wildcard. Lookup walks children in that order and backtracks, so
//! `/a/static` beats `/a/:` which beats `/a/*`, and a literal segment beats
//! a `:` sibling even when the literal branch also ends in a wildcard.
//!
//! ## Example
//!
//! ```rust
//! use brrtmux::router::RadixTree;
//! use std::sync::Arc;
//!
//! let mut tree = RadixTree::new();
//! tree.insert("/users/:", vec![Arc::from("id")], None, "get_user").unwrap();
//! tree.insert("/users/me", Vec::new(), None, "me").unwrap();
//!
//! let found = tree.find("/users/42", |_, _| true).unwrap();
//! assert_eq!(*found.value, "get_user");
//! assert_eq!(found.values.as_slice(), &["42"]);
//!
//! let found = tree.find("/users/me", |_, _| true).unwrap();
//! assert_eq!(*found.value, "me");
//! ```

use smallvec::SmallVec;
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use crate::macros::parser::{PARAM_START, WILDCARD_PARAM_START};

/// Maximum number of captured values kept inline before spilling to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured substrings of one lookup, in path order.
pub type CaptureVec<'p> = SmallVec<[&'p str; MAX_INLINE_PARAMS]>;

type NodeId = usize;

/// Returned by [`RadixTree::insert`] when the key already carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict;

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("path is already registered")
    }
}

impl std::error::Error for Conflict {}

#[derive(Clone, Debug)]
struct RadixNode<T> {
    /// Literal text owned by this node, or exactly `:` for a dynamic segment
    segment: String,
    /// Capture name when this node also accepts the rest of the path
    wildcard_param: Option<Arc<str>>,
    /// Names of the `:` values captured on the way to this node
    param_names: Vec<Arc<str>>,
    children: Vec<NodeId>,
    value: Option<T>,
    root: bool,
    root_wildcard: bool,
}

impl<T> RadixNode<T> {
    fn new(segment: &str, root: bool) -> Self {
        Self {
            segment: segment.to_string(),
            wildcard_param: None,
            param_names: Vec::new(),
            children: Vec::new(),
            value: None,
            root,
            root_wildcard: false,
        }
    }

    fn is_dynamic(&self) -> bool {
        self.segment.len() == 1 && self.segment.starts_with(PARAM_START)
    }

    /// Sort class: static, dynamic, root wildcard.
    ///
    /// A node owning a wildcard is still literal text, so it sorts with the
    /// static nodes; its own wildcard is only tried after its children.
    fn priority_class(&self) -> u8 {
        if self.root_wildcard {
            2
        } else if self.is_dynamic() {
            1
        } else {
            0
        }
    }
}

/// What gets attached to the node matching a key.
struct Entry<T> {
    param_names: Vec<Arc<str>>,
    wildcard_param: Option<Arc<str>>,
    value: Option<T>,
}

impl<T> Entry<T> {
    fn placeholder() -> Self {
        Self {
            param_names: Vec::new(),
            wildcard_param: None,
            value: None,
        }
    }
}

/// Successful lookup.
#[derive(Debug)]
pub struct Found<'t, 'p, T> {
    /// Value of the accepting node
    pub value: &'t T,
    /// Names for the dynamic values, in path order
    pub param_names: &'t [Arc<str>],
    /// Name for the trailing wildcard value, if the node captured one
    pub wildcard_param: Option<&'t Arc<str>>,
    /// Captured substrings: dynamic values first, then the wildcard value
    pub values: CaptureVec<'p>,
}

impl<'t, 'p, T> Found<'t, 'p, T> {
    /// Pair each captured value with its name.
    ///
    /// A value beyond the declared names belongs to the wildcard.
    pub fn params(&self) -> impl Iterator<Item = (&'t Arc<str>, &'p str)> + '_ {
        self.param_names
            .iter()
            .chain(self.wildcard_param)
            .zip(self.values.iter().copied())
    }
}

/// Arena-backed radix tree keyed by normalized paths.
#[derive(Clone, Debug)]
pub struct RadixTree<T> {
    nodes: Vec<RadixNode<T>>,
    roots: Vec<NodeId>,
    len: usize,
}

impl<T> Default for RadixTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RadixTree<T> {
    /// Empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            len: 0,
        }
    }

    /// Number of values stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no value was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, placeholders included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert `value` under the normalized path `key`.
    ///
    /// `param_names` name the `:` markers in order. When `key` ends with the
    /// wildcard marker, `wildcard_param` names the tail capture.
    ///
    /// # Errors
    ///
    /// [`Conflict`] when `key` already carries a value. The tree is left
    /// unchanged in that case.
    pub fn insert(
        &mut self,
        key: &str,
        param_names: Vec<Arc<str>>,
        wildcard_param: Option<Arc<str>>,
        value: T,
    ) -> Result<(), Conflict> {
        let (path, wildcard_param) = match key.strip_suffix(WILDCARD_PARAM_START) {
            Some(stripped) => (
                stripped,
                Some(wildcard_param.unwrap_or_else(|| Arc::from(""))),
            ),
            None => (key, None),
        };

        if wildcard_param.is_some() && path == "/" {
            return self.insert_root_wildcard(param_names, wildcard_param, value);
        }
        for (idx, _) in path.match_indices(PARAM_START) {
            self.add(None, &path[..idx], Entry::placeholder())?;
            self.add(None, &path[..=idx], Entry::placeholder())?;
        }
        self.add(
            None,
            path,
            Entry {
                param_names,
                wildcard_param,
                value: Some(value),
            },
        )?;

        self.len += 1;
        self.prioritize();
        Ok(())
    }

    fn insert_root_wildcard(
        &mut self,
        param_names: Vec<Arc<str>>,
        wildcard_param: Option<Arc<str>>,
        value: T,
    ) -> Result<(), Conflict> {
        if self.roots.iter().any(|&id| self.nodes[id].root_wildcard) {
            return Err(Conflict);
        }
        let mut node = RadixNode::new("/", true);
        node.root_wildcard = true;
        node.param_names = param_names;
        node.wildcard_param = wildcard_param;
        node.value = Some(value);
        let id = self.push(node);
        self.roots.push(id);

        self.len += 1;
        self.prioritize();
        Ok(())
    }

    fn push(&mut self, node: RadixNode<T>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn level(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(id) => &self.nodes[id].children,
            None => &self.roots,
        }
    }

    fn level_mut(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        match parent {
            Some(id) => &mut self.nodes[id].children,
            None => &mut self.roots,
        }
    }

    fn add(&mut self, parent: Option<NodeId>, path: &str, entry: Entry<T>) -> Result<(), Conflict> {
        if path.is_empty() {
            return match parent {
                Some(id) => self.attach(id, entry),
                None => Ok(()),
            };
        }

        let siblings = self.level(parent).len();
        for i in 0..siblings {
            let id = self.level(parent)[i];
            let node = &self.nodes[id];
            if node.root_wildcard {
                continue;
            }
            let common = common_prefix_len(&node.segment, path);
            if common == 0 {
                continue;
            }

            if common < node.segment.len() {
                self.split(id, common);
                if common == path.len() {
                    return self.attach(id, entry);
                }
                let leaf = self.leaf(&path[common..], entry, false);
                self.nodes[id].children.push(leaf);
                return Ok(());
            }
            if common < path.len() {
                return self.add(Some(id), &path[common..], entry);
            }
            return self.attach(id, entry);
        }

        let leaf = self.leaf(path, entry, parent.is_none());
        self.level_mut(parent).push(leaf);
        Ok(())
    }

    /// Keep `segment[..at]` on `id` and move everything else to a new child.
    fn split(&mut self, id: NodeId, at: usize) {
        let node = &mut self.nodes[id];
        let suffix = node.segment.split_off(at);
        let demoted = RadixNode {
            segment: suffix,
            wildcard_param: node.wildcard_param.take(),
            param_names: std::mem::take(&mut node.param_names),
            children: std::mem::take(&mut node.children),
            value: node.value.take(),
            root: false,
            root_wildcard: false,
        };
        let child = self.push(demoted);
        self.nodes[id].children.push(child);
    }

    fn leaf(&mut self, segment: &str, entry: Entry<T>, root: bool) -> NodeId {
        let mut node = RadixNode::new(segment, root);
        node.param_names = entry.param_names;
        node.wildcard_param = entry.wildcard_param;
        node.value = entry.value;
        self.push(node)
    }

    fn attach(&mut self, id: NodeId, entry: Entry<T>) -> Result<(), Conflict> {
        let Some(value) = entry.value else {
            return Ok(());
        };
        let node = &mut self.nodes[id];
        if node.value.is_some() {
            return Err(Conflict);
        }
        node.value = Some(value);
        node.param_names = entry.param_names;
        node.wildcard_param = entry.wildcard_param;
        Ok(())
    }

    fn prioritize(&mut self) {
        let mut sizes = vec![0usize; self.nodes.len()];
        let mut roots = std::mem::take(&mut self.roots);
        self.sort_level(&mut roots, &mut sizes);
        self.roots = roots;
    }

    /// Sort `level` and everything below it; returns the level's node count.
    fn sort_level(&mut self, level: &mut [NodeId], sizes: &mut [usize]) -> usize {
        let mut total = 0;
        for &id in level.iter() {
            let mut children = std::mem::take(&mut self.nodes[id].children);
            let size = 1 + self.sort_level(&mut children, sizes);
            self.nodes[id].children = children;
            sizes[id] = size;
            total += size;
        }
        level.sort_by_key(|&id| {
            let class = self.nodes[id].priority_class();
            let busy = if class == 0 { sizes[id] } else { 0 };
            (class, Reverse(busy))
        });
        total
    }

    /// Find the first node accepting `path`.
    ///
    /// Candidates are visited in priority order, deepest first. A candidate
    /// is offered to `accept` with its value and the values captured so far;
    /// returning `false` makes the walk backtrack and try the next candidate.
    pub fn find<'t, 'p, F>(&'t self, path: &'p str, mut accept: F) -> Option<Found<'t, 'p, T>>
    where
        F: FnMut(&T, &[&'p str]) -> bool,
    {
        let mut values = CaptureVec::new();
        let id = self.find_in(&self.roots, path, &mut values, &mut accept)?;
        let node = &self.nodes[id];
        let value = node.value.as_ref()?;
        Some(Found {
            value,
            param_names: &node.param_names,
            wildcard_param: node.wildcard_param.as_ref(),
            values,
        })
    }

    fn find_in<'p, F>(
        &self,
        level: &[NodeId],
        path: &'p str,
        values: &mut CaptureVec<'p>,
        accept: &mut F,
    ) -> Option<NodeId>
    where
        F: FnMut(&T, &[&'p str]) -> bool,
    {
        for &id in level {
            let node = &self.nodes[id];
            let mark = values.len();

            if node.root_wildcard {
                let Some(value) = node.value.as_ref() else {
                    continue;
                };
                if !path.starts_with('/') {
                    continue;
                }
                values.push(if path.len() > 1 { &path[1..] } else { "/" });
                if accept(value, values) {
                    return Some(id);
                }
                values.truncate(mark);
                continue;
            }

            let rest = if node.is_dynamic() {
                let end = path.find('/').unwrap_or(path.len());
                if end == 0 {
                    continue;
                }
                values.push(&path[..end]);
                &path[end..]
            } else {
                match path.strip_prefix(node.segment.as_str()) {
                    Some(rest) => rest,
                    None => continue,
                }
            };

            if rest.is_empty() {
                if let Some(value) = node.value.as_ref() {
                    if node.wildcard_param.is_none() && accept(value, values) {
                        return Some(id);
                    }
                }
            } else {
                if let Some(found) = self.find_in(&node.children, rest, values, accept) {
                    return Some(found);
                }
                if let (Some(_), Some(value)) = (&node.wildcard_param, node.value.as_ref()) {
                    values.push(rest);
                    if accept(value, values) {
                        return Some(id);
                    }
                }
            }
            values.truncate(mark);
        }
        None
    }

    /// Render the tree, one node per line, for debugging.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for &id in &self.roots {
            self.dump_node(id, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.segment);
        if let Some(name) = &node.wildcard_param {
            out.push(WILDCARD_PARAM_START);
            out.push_str(name);
        }
        if node.value.is_some() {
            out.push_str(" [route]");
        }
        if node.root_wildcard {
            out.push_str(" [root wildcard]");
        } else if node.root {
            out.push_str(" [root]");
        }
        out.push('\n');
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }
}

/// Length in bytes of the common prefix, on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx)
}
