//! Uniform in-memory representation of coverage data: missed/covered
//! counters and the immutable node tree they hang off. The stats merge
//! model produces a `Node` tree which filtering and the report writers
//! then consume read-only.

use crate::error::{FlowcovError, Result};

/// Coverage status derived from a counter's missed/covered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageStatus {
    Empty,
    NotCovered,
    PartlyCovered,
    FullyCovered,
}

/// Immutable missed/covered pair for one countable unit.
///
/// Counters are values: every "increment" builds a new counter via [`Counter::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter {
    pub missed: u64,
    pub covered: u64,
}

impl Counter {
    pub const ZERO: Counter = Counter {
        missed: 0,
        covered: 0,
    };

    #[must_use]
    pub fn new(missed: u64, covered: u64) -> Self {
        Self { missed, covered }
    }

    /// Counter for a single entity that either was or was not exercised
    /// in the current observation window.
    #[must_use]
    pub fn from_hit(hit: bool) -> Self {
        if hit {
            Self::new(0, 1)
        } else {
            Self::new(1, 0)
        }
    }

    /// Pointwise sum. Never fails; counts are assumed to fit u64.
    #[must_use]
    pub fn add(self, other: Counter) -> Counter {
        Counter {
            missed: self.missed + other.missed,
            covered: self.covered + other.covered,
        }
    }

    #[must_use]
    pub fn total(self) -> u64 {
        self.missed + self.covered
    }

    #[must_use]
    pub fn status(self) -> CoverageStatus {
        match (self.missed, self.covered) {
            (0, 0) => CoverageStatus::Empty,
            (_, 0) => CoverageStatus::NotCovered,
            (0, _) => CoverageStatus::FullyCovered,
            _ => CoverageStatus::PartlyCovered,
        }
    }

    /// Covered fraction, 0.0 when the counter is empty.
    #[must_use]
    pub fn covered_ratio(self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.covered as f64 / self.total() as f64
        }
    }
}

/// The unit kinds a node can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Instruction,
    Branch,
    Line,
    Complexity,
    Method,
    Class,
}

impl CounterKind {
    /// All kinds, in report column order.
    pub const ALL: [CounterKind; 6] = [
        CounterKind::Instruction,
        CounterKind::Branch,
        CounterKind::Line,
        CounterKind::Complexity,
        CounterKind::Method,
        CounterKind::Class,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CounterKind::Instruction => "INSTRUCTION",
            CounterKind::Branch => "BRANCH",
            CounterKind::Line => "LINE",
            CounterKind::Complexity => "COMPLEXITY",
            CounterKind::Method => "METHOD",
            CounterKind::Class => "CLASS",
        }
    }

    fn index(self) -> usize {
        match self {
            CounterKind::Instruction => 0,
            CounterKind::Branch => 1,
            CounterKind::Line => 2,
            CounterKind::Complexity => 3,
            CounterKind::Method => 4,
            CounterKind::Class => 5,
        }
    }
}

/// One counter per kind. Small fixed array rather than a map since the
/// kind set is closed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterMap([Counter; 6]);

impl CounterMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, kind: CounterKind) -> Counter {
        self.0[kind.index()]
    }

    /// Fold `counter` into the slot for `kind`.
    pub fn increment(&mut self, kind: CounterKind, counter: Counter) {
        let slot = &mut self.0[kind.index()];
        *slot = slot.add(counter);
    }

    /// Fold every counter of `other` into this map.
    pub fn merge(&mut self, other: &CounterMap) {
        for kind in CounterKind::ALL {
            self.increment(kind, other.get(kind));
        }
    }
}

/// Element kind of a coverage node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Line,
    Method,
    Class,
    Package,
    SourceFile,
    Bundle,
    Group,
}

impl ElementKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Line => "line",
            ElementKind::Method => "method",
            ElementKind::Class => "class",
            ElementKind::Package => "package",
            ElementKind::SourceFile => "sourcefile",
            ElementKind::Bundle => "bundle",
            ElementKind::Group => "group",
        }
    }
}

/// A sealed coverage node. Fields are private: once a tree leaves its
/// [`NodeBuilder`] it is never mutated, so sealed trees can be shared
/// freely across readers.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    kind: ElementKind,
    counters: CounterMap,
    children: Vec<Node>,
}

impl Node {
    /// Build a leaf node directly from its counters.
    #[must_use]
    pub fn leaf(name: impl Into<String>, kind: ElementKind, counters: CounterMap) -> Self {
        Self {
            name: name.into(),
            kind,
            counters,
            children: Vec::new(),
        }
    }

    /// Assemble a node from already-validated parts. Used by projection,
    /// which rebuilds interiors from retained children whose names are
    /// unique by construction.
    pub(crate) fn from_parts(
        name: String,
        kind: ElementKind,
        counters: CounterMap,
        children: Vec<Node>,
    ) -> Self {
        Self {
            name,
            kind,
            counters,
            children,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[must_use]
    pub fn counter(&self, kind: CounterKind) -> Counter {
        self.counters.get(kind)
    }

    #[must_use]
    pub fn counters(&self) -> &CounterMap {
        &self.counters
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Number of method-level leaves in this subtree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        if self.kind == ElementKind::Method {
            1
        } else {
            self.children.iter().map(Node::leaf_count).sum()
        }
    }
}

/// Bottom-up accumulator for an interior node.
///
/// Counters are recomputed as children are added: the builder's totals are
/// always the pointwise sum over current children plus any direct
/// contribution folded in via [`NodeBuilder::increment`]. `seal` consumes
/// the builder, so a sealed node cannot be mutated afterwards.
#[derive(Debug)]
pub struct NodeBuilder {
    name: String,
    kind: ElementKind,
    counters: CounterMap,
    children: Vec<Node>,
}

impl NodeBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            counters: CounterMap::new(),
            children: Vec::new(),
        }
    }

    /// Fold a direct per-level contribution into this node's totals
    /// (e.g. a class counting its own invocation as one instruction).
    pub fn increment(&mut self, kind: CounterKind, counter: Counter) {
        self.counters.increment(kind, counter);
    }

    /// Add a child, folding its counters into this node's totals.
    ///
    /// Child names must be unique within a parent; callers merge stats
    /// before building, never build twice with the same key.
    pub fn add_child(&mut self, child: Node) -> Result<()> {
        if self.children.iter().any(|c| c.name() == child.name()) {
            return Err(FlowcovError::DuplicateChild {
                child: child.name().to_string(),
                parent: self.name.clone(),
            });
        }
        self.counters.merge(child.counters());
        self.children.push(child);
        Ok(())
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn counter(&self, kind: CounterKind) -> Counter {
        self.counters.get(kind)
    }

    /// Freeze the accumulator into an immutable node.
    #[must_use]
    pub fn seal(self) -> Node {
        Node {
            name: self.name,
            kind: self.kind,
            counters: self.counters,
            children: self.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_add() {
        let a = Counter::new(2, 3);
        let b = Counter::new(1, 4);
        assert_eq!(a.add(b), Counter::new(3, 7));
        assert_eq!(a.add(Counter::ZERO), a);
    }

    #[test]
    fn test_counter_from_hit() {
        assert_eq!(Counter::from_hit(true), Counter::new(0, 1));
        assert_eq!(Counter::from_hit(false), Counter::new(1, 0));
    }

    #[test]
    fn test_counter_status() {
        assert_eq!(Counter::ZERO.status(), CoverageStatus::Empty);
        assert_eq!(Counter::new(2, 0).status(), CoverageStatus::NotCovered);
        assert_eq!(Counter::new(0, 2).status(), CoverageStatus::FullyCovered);
        assert_eq!(Counter::new(1, 1).status(), CoverageStatus::PartlyCovered);
    }

    #[test]
    fn test_counter_ratio_empty() {
        assert_eq!(Counter::ZERO.covered_ratio(), 0.0);
        assert_eq!(Counter::new(1, 3).covered_ratio(), 0.75);
    }

    fn method_leaf(name: &str, hit: bool) -> Node {
        let mut counters = CounterMap::new();
        counters.increment(CounterKind::Instruction, Counter::from_hit(hit));
        counters.increment(CounterKind::Method, Counter::from_hit(hit));
        Node::leaf(name, ElementKind::Method, counters)
    }

    #[test]
    fn test_builder_sums_children() {
        let mut class = NodeBuilder::new("C", ElementKind::Class);
        class.add_child(method_leaf("m1", true)).unwrap();
        class.add_child(method_leaf("m2", false)).unwrap();
        class.increment(CounterKind::Class, Counter::from_hit(true));

        let node = class.seal();
        assert_eq!(node.counter(CounterKind::Instruction), Counter::new(1, 1));
        assert_eq!(node.counter(CounterKind::Method), Counter::new(1, 1));
        assert_eq!(node.counter(CounterKind::Class), Counter::new(0, 1));
        assert_eq!(node.children().len(), 2);
    }

    #[test]
    fn test_builder_rejects_duplicate_child() {
        let mut class = NodeBuilder::new("C", ElementKind::Class);
        class.add_child(method_leaf("m1", true)).unwrap();
        let err = class.add_child(method_leaf("m1", false)).unwrap_err();
        match err {
            FlowcovError::DuplicateChild { child, parent } => {
                assert_eq!(child, "m1");
                assert_eq!(parent, "C");
            }
            other => panic!("unexpected error: {other}"),
        }
        // The failed insert must not have touched the totals.
        let node = class.seal();
        assert_eq!(node.counter(CounterKind::Instruction), Counter::new(0, 1));
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_counter_conservation_after_every_add() {
        let mut pkg = NodeBuilder::new("pkg", ElementKind::Package);
        let mut expected = Counter::ZERO;
        for (i, hit) in [true, false, true, true].iter().enumerate() {
            let leaf = method_leaf(&format!("m{i}"), *hit);
            expected = expected.add(leaf.counter(CounterKind::Instruction));
            pkg.add_child(leaf).unwrap();
            assert_eq!(pkg.counter(CounterKind::Instruction), expected);
        }
        let node = pkg.seal();
        let sum = node
            .children()
            .iter()
            .fold(Counter::ZERO, |acc, c| acc.add(c.counter(CounterKind::Instruction)));
        assert_eq!(node.counter(CounterKind::Instruction), sum);
    }

    #[test]
    fn test_leaf_count() {
        let mut class = NodeBuilder::new("C", ElementKind::Class);
        class.add_child(method_leaf("m1", true)).unwrap();
        class.add_child(method_leaf("m2", false)).unwrap();
        let mut pkg = NodeBuilder::new("pkg", ElementKind::Package);
        pkg.add_child(class.seal()).unwrap();
        let node = pkg.seal();
        assert_eq!(node.leaf_count(), 2);
        assert_eq!(node.find_child("C").unwrap().leaf_count(), 2);
    }
}
