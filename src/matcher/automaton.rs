//! TermAutomaton: Multi-Pattern Aho-Corasick Automaton
//!
//! Compiles a glossary (or any pattern set) into a trie with failure links
//! and closed output sets, so a single left-to-right pass reports every
//! pattern ending at every position.
//!
//! Nodes live in an arena and address each other by index. Children are
//! owned edges of the trie; failure links are plain indices fixed at build
//! time. The automaton is immutable after `build` and can be shared across
//! threads for concurrent scans.

use std::collections::{HashMap, HashSet, VecDeque};

use super::utf16::{len_utf16, to_units, trim_js};

// =============================================================================
// Types
// =============================================================================

/// Index of a node in the arena
pub type NodeId = usize;

/// Registration index of a deduplicated pattern
pub type PatternId = usize;

/// The root node always sits at index 0
pub const ROOT: NodeId = 0;

/// A single trie node
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Outgoing trie edges keyed by UTF-16 code unit
    children: HashMap<u16, NodeId>,
    /// Longest proper suffix of this path that is also a trie path
    fail: NodeId,
    /// Patterns recognized on reaching this node, in registration order
    output: Vec<PatternId>,
}

impl Node {
    pub fn child(&self, unit: u16) -> Option<NodeId> {
        self.children.get(&unit).copied()
    }

    pub fn fail(&self) -> NodeId {
        self.fail
    }

    pub fn output(&self) -> &[PatternId] {
        &self.output
    }
}

/// A registered pattern with its UTF-16 length cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub text: String,
    pub len_utf16: usize,
}

/// Immutable Aho-Corasick automaton over UTF-16 code units
#[derive(Debug, Clone)]
pub struct TermAutomaton {
    nodes: Vec<Node>,
    patterns: Vec<Pattern>,
}

/// Options that shape how raw patterns are normalized before insertion
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Trim surrounding whitespace from every pattern
    pub trim: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { trim: true }
    }
}

// =============================================================================
// Construction
// =============================================================================

impl TermAutomaton {
    /// Build an automaton with default options (patterns trimmed)
    pub fn build<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build_with(patterns, BuildOptions::default())
    }

    /// Build an automaton from raw patterns.
    ///
    /// Whitespace-only patterns are dropped and duplicates collapse to their
    /// first registration. An empty set yields an automaton that never matches.
    pub fn build_with<I, S>(patterns: I, options: BuildOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut automaton = Self {
            nodes: vec![Node::default()],
            patterns: Vec::new(),
        };

        let mut seen: HashSet<String> = HashSet::new();
        for raw in patterns {
            let raw = raw.as_ref();
            let text = if options.trim { trim_js(raw) } else { raw };
            if trim_js(text).is_empty() || !seen.insert(text.to_string()) {
                continue;
            }
            automaton.insert(text);
        }

        automaton.link_failures();

        log::trace!(
            "TermAutomaton built: {} patterns, {} nodes",
            automaton.patterns.len(),
            automaton.nodes.len()
        );
        automaton
    }

    /// Walk (and extend) the trie path for `text`, marking its terminal node
    fn insert(&mut self, text: &str) {
        let id = self.patterns.len();
        self.patterns.push(Pattern {
            text: text.to_string(),
            len_utf16: len_utf16(text),
        });

        let mut node = ROOT;
        for unit in to_units(text) {
            node = match self.nodes[node].child(unit) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(unit, next);
                    next
                }
            };
        }
        self.nodes[node].output.push(id);
    }

    /// Breadth-first failure links plus output closure.
    ///
    /// BFS order guarantees a node's failure target is finalized (including
    /// its closed output set) before the node itself is visited.
    fn link_failures(&mut self) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        let root_children: Vec<NodeId> = self.nodes[ROOT].children.values().copied().collect();
        for child in root_children {
            self.nodes[child].fail = ROOT;
            queue.push_back(child);
        }

        while let Some(node) = queue.pop_front() {
            let edges: Vec<(u16, NodeId)> = self.nodes[node]
                .children
                .iter()
                .map(|(&unit, &child)| (unit, child))
                .collect();

            for (unit, child) in edges {
                let fail = self.resolve_fail(self.nodes[node].fail, unit);
                self.nodes[child].fail = fail;

                let closed = merge_sorted(&self.nodes[child].output, &self.nodes[fail].output);
                self.nodes[child].output = closed;

                queue.push_back(child);
            }
        }
    }

    /// Follow failure links from `start` until a node with a `unit` edge is found
    fn resolve_fail(&self, start: NodeId, unit: u16) -> NodeId {
        let mut cursor = start;
        loop {
            if let Some(next) = self.nodes[cursor].child(unit) {
                return next;
            }
            if cursor == ROOT {
                return ROOT;
            }
            cursor = self.nodes[cursor].fail;
        }
    }
}

/// Union of two ascending id lists into a fresh ascending list
fn merge_sorted(own: &[PatternId], inherited: &[PatternId]) -> Vec<PatternId> {
    let mut out = Vec::with_capacity(own.len() + inherited.len());
    let (mut i, mut j) = (0, 0);
    while i < own.len() && j < inherited.len() {
        match own[i].cmp(&inherited[j]) {
            std::cmp::Ordering::Less => {
                out.push(own[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(inherited[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(own[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&own[i..]);
    out.extend_from_slice(&inherited[j..]);
    out
}

// =============================================================================
// Read-only access
// =============================================================================

impl TermAutomaton {
    /// Number of distinct patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Number of trie nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id]
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.text.as_str())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Transition function: descend on `unit`, falling back along failure links
    pub fn step(&self, mut node: NodeId, unit: u16) -> NodeId {
        loop {
            if let Some(next) = self.nodes[node].child(unit) {
                return next;
            }
            if node == ROOT {
                return ROOT;
            }
            node = self.nodes[node].fail;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(ac: &TermAutomaton, path: &str) -> NodeId {
        to_units(path)
            .into_iter()
            .fold(ROOT, |node, unit| ac.node(node).child(unit).expect("path exists"))
    }

    fn outputs(ac: &TermAutomaton, path: &str) -> Vec<String> {
        ac.node(walk(ac, path))
            .output()
            .iter()
            .map(|&id| ac.pattern(id).text.clone())
            .collect()
    }

    #[test]
    fn test_empty_set_has_only_root() {
        let ac = TermAutomaton::build(Vec::<String>::new());
        assert!(ac.is_empty());
        assert_eq!(ac.node_count(), 1);
    }

    #[test]
    fn test_blank_patterns_discarded() {
        let ac = TermAutomaton::build(["", "   ", "\t\n"]);
        assert_eq!(ac.pattern_count(), 0);
    }

    #[test]
    fn test_duplicates_collapse() {
        let ac = TermAutomaton::build(["GPU", "GPU", " GPU "]);
        assert_eq!(ac.pattern_count(), 1);
        assert_eq!(outputs(&ac, "GPU"), vec!["GPU"]);
    }

    #[test]
    fn test_byte_order_mark_is_trimmed() {
        let ac = TermAutomaton::build(["\u{FEFF}GPU", "GPU", "\u{FEFF}"]);
        assert_eq!(ac.pattern_count(), 1);
        assert_eq!(ac.pattern(0).text, "GPU");
    }

    #[test]
    fn test_untrimmed_build_keeps_whitespace() {
        let ac = TermAutomaton::build_with([" a", "a"], BuildOptions { trim: false });
        assert_eq!(ac.pattern_count(), 2);
    }

    #[test]
    fn test_shared_prefix_reuses_nodes() {
        let ac = TermAutomaton::build(["he", "her", "hers"]);
        // root + h, e, r, s
        assert_eq!(ac.node_count(), 5);
    }

    #[test]
    fn test_root_children_fail_to_root() {
        let ac = TermAutomaton::build(["ab", "b"]);
        assert_eq!(ac.node(walk(&ac, "a")).fail(), ROOT);
        assert_eq!(ac.node(walk(&ac, "b")).fail(), ROOT);
    }

    #[test]
    fn test_failure_link_is_longest_suffix() {
        let ac = TermAutomaton::build(["she", "he", "hers"]);
        // "sh" -> "h", "she" -> "he"
        assert_eq!(ac.node(walk(&ac, "sh")).fail(), walk(&ac, "h"));
        assert_eq!(ac.node(walk(&ac, "she")).fail(), walk(&ac, "he"));
    }

    #[test]
    fn test_output_closure_in_registration_order() {
        // "c" registered first, so it precedes "abc" at the shared node
        let ac = TermAutomaton::build(["c", "abc", "bc"]);
        assert_eq!(outputs(&ac, "abc"), vec!["c", "abc", "bc"]);
        assert_eq!(outputs(&ac, "ab"), Vec::<String>::new());
    }

    #[test]
    fn test_step_follows_failure_chain() {
        let ac = TermAutomaton::build(["abd", "bc"]);
        let ab = walk(&ac, "ab");
        // No 'c' after "ab"; falls back to "b" then takes 'c'
        assert_eq!(ac.step(ab, b'c' as u16), walk(&ac, "bc"));
        assert_eq!(ac.step(ab, b'z' as u16), ROOT);
    }

    #[test]
    fn test_merge_sorted_dedupes() {
        assert_eq!(merge_sorted(&[1, 4], &[0, 1, 5]), vec![0, 1, 4, 5]);
        assert_eq!(merge_sorted(&[], &[2]), vec![2]);
    }
}
