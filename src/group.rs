//! Streaming group aggregation for hierarchical (multi-bundle) reports.
//!
//! A report driver describes an arbitrary-depth group hierarchy through a
//! linear call protocol (`visit_bundle`, `visit_group`, `visit_end`) while
//! the visitor rolls totals up incrementally. At most one child group is
//! unfinalized at a time, so memory stays proportional to the hierarchy
//! depth, not its size. A pending child is finalized by the next sibling
//! visit or by the parent's own `visit_end`, which is what guarantees each
//! child contributes to the parent's total exactly once.

use crate::error::{FlowcovError, Result};
use crate::filter::{project, NameFilter};
use crate::model::{Counter, CounterKind, CounterMap, ElementKind, Node};

/// Aggregation state for one group. Starts open; `visit_end` closes it
/// permanently and any later call fails with [`FlowcovError::GroupClosed`].
#[derive(Debug)]
pub struct GroupVisitor {
    name: String,
    total: CounterMap,
    last_child: Option<Box<GroupVisitor>>,
    closed: bool,
}

impl GroupVisitor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: CounterMap::new(),
            last_child: None,
            closed: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Running total for one counter kind.
    #[must_use]
    pub fn total(&self, kind: CounterKind) -> Counter {
        self.total.get(kind)
    }

    /// Visit a bundle in this group: the pending child group (if any) is
    /// finalized first, then the bundle's (possibly filtered) coverage is
    /// folded into this group's total. Returns the projected bundle for the
    /// caller's renderer, `None` when the filter leaves nothing.
    pub fn visit_bundle(
        &mut self,
        bundle: &Node,
        filter: Option<&NameFilter>,
    ) -> Result<Option<Node>> {
        self.ensure_open()?;
        self.finalize_last_child()?;
        let projected = project(bundle, filter);
        if let Some(node) = &projected {
            self.total.merge(node.counters());
        }
        Ok(projected)
    }

    /// Open a child group, finalizing the previous one first. The returned
    /// borrow is the only live handle into the hierarchy, which is exactly
    /// the at-most-one-open-child invariant.
    pub fn visit_group(&mut self, name: impl Into<String>) -> Result<&mut GroupVisitor> {
        self.ensure_open()?;
        self.finalize_last_child()?;
        Ok(self.last_child.insert(Box::new(GroupVisitor::new(name))))
    }

    /// Finalize any pending child and close this group.
    pub fn visit_end(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.finalize_last_child()?;
        self.closed = true;
        Ok(())
    }

    /// Consume the visitor into a group-kind node carrying the rolled-up
    /// totals. Closes the group first if the caller has not.
    pub fn into_node(mut self) -> Result<Node> {
        if !self.closed {
            self.visit_end()?;
        }
        Ok(Node::from_parts(
            self.name,
            ElementKind::Group,
            self.total,
            Vec::new(),
        ))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(FlowcovError::GroupClosed(self.name.clone()))
        } else {
            Ok(())
        }
    }

    fn finalize_last_child(&mut self) -> Result<()> {
        if let Some(mut child) = self.last_child.take() {
            if !child.closed {
                child.visit_end()?;
            }
            self.total.merge(&child.total);
        }
        Ok(())
    }
}
