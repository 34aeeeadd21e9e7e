//! Filtered projection of a sealed coverage tree.
//!
//! Every report writer goes through the same projection, so all output
//! formats are counter-consistent for the same filter. Projection is a pure
//! read-only traversal: it never mutates its input, and an empty result is
//! `None` ("nothing to report"), never an empty tree.

use regex::Regex;

use crate::error::{FlowcovError, Result};
use crate::model::{Counter, CounterKind, CounterMap, ElementKind, Node};

/// Caller-level filter: at most one of include/exclude is honored. When
/// both are given, include takes precedence and exclude is ignored (the
/// historical caller convention; nothing structurally prevents passing
/// both).
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub include: Option<String>,
    pub exclude: Option<String>,
}

impl FilterSpec {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include(pattern: impl Into<String>) -> Self {
        Self {
            include: Some(pattern.into()),
            exclude: None,
        }
    }

    #[must_use]
    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self {
            include: None,
            exclude: Some(pattern.into()),
        }
    }

    /// Compile into a matcher, or `None` when no filtering applies.
    ///
    /// An empty include string matches everything and an empty exclude
    /// string excludes nothing; both mean "no filter" explicitly rather
    /// than falling through to zero-width regex behavior. Invalid patterns
    /// fail here, before any traversal begins.
    pub fn compile(&self) -> Result<Option<NameFilter>> {
        if let Some(pattern) = self.include.as_deref().filter(|p| !p.is_empty()) {
            return Ok(Some(NameFilter::Include(anchored(pattern)?)));
        }
        if let Some(pattern) = self.exclude.as_deref().filter(|p| !p.is_empty()) {
            return Ok(Some(NameFilter::Exclude(anchored(pattern)?)));
        }
        Ok(None)
    }
}

/// Whole-string match like `^(?:pattern)$`.
fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| FlowcovError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compiled leaf-name matcher.
#[derive(Debug, Clone)]
pub enum NameFilter {
    Include(Regex),
    Exclude(Regex),
}

impl NameFilter {
    /// Whether a leaf with this simple name survives the filter.
    #[must_use]
    pub fn keeps(&self, name: &str) -> bool {
        match self {
            NameFilter::Include(re) => re.is_match(name),
            NameFilter::Exclude(re) => !re.is_match(name),
        }
    }
}

/// Project `node` through `filter`, keeping only matching method leaves and
/// the ancestors needed to contain them.
///
/// Interior counters are re-derived purely from retained children (a class
/// additionally re-derives its class counter from its surviving methods);
/// nothing is copied from the original interiors, so a class's own
/// invocation contribution is not part of a filtered view. An interior with
/// no surviving children projects to `None`, as does a filter matching no
/// leaves anywhere. With no filter the tree projects to itself.
#[must_use]
pub fn project(node: &Node, filter: Option<&NameFilter>) -> Option<Node> {
    match filter {
        None => Some(node.clone()),
        Some(filter) => project_node(node, filter),
    }
}

fn project_node(node: &Node, filter: &NameFilter) -> Option<Node> {
    if node.kind() == ElementKind::Method {
        return filter.keeps(node.name()).then(|| node.clone());
    }

    let mut counters = CounterMap::new();
    let mut children = Vec::new();
    for child in node.children() {
        if let Some(kept) = project_node(child, filter) {
            counters.merge(kept.counters());
            children.push(kept);
        }
    }
    if children.is_empty() {
        return None;
    }

    if node.kind() == ElementKind::Class {
        let methods = counters.get(CounterKind::Method);
        counters.increment(CounterKind::Class, Counter::from_hit(methods.covered > 0));
    }

    Some(Node::from_parts(
        node.name().to_string(),
        node.kind(),
        counters,
        children,
    ))
}
