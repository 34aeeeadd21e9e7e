//! Execution-stat merge model: a name-keyed hierarchy of mutable counters
//! (application → archive → process → activity) that repeated sampling
//! passes merge into, and a one-shot conversion into the generic coverage
//! node tree the report side consumes.
//!
//! Merging is strictly additive and therefore commutative and associative
//! over any merge order. `execution_count` is the lifetime total and is
//! carried through merges but never feeds coverage; only
//! `execution_since_reset` drives the hit/no-hit signal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Counter, CounterKind, CounterMap, ElementKind, Node, NodeBuilder};

/// One sampled observation of an activity inside a process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStat {
    pub process_name: String,
    pub activity_name: String,
    /// Process invoked by this activity, if it is a call activity.
    #[serde(default)]
    pub called_process: String,
    pub execution_count: u64,
    pub execution_since_reset: u64,
}

impl ActivityStat {
    pub fn new(
        process_name: impl Into<String>,
        activity_name: impl Into<String>,
        execution_count: u64,
        execution_since_reset: u64,
    ) -> Self {
        Self {
            process_name: process_name.into(),
            activity_name: activity_name.into(),
            called_process: String::new(),
            execution_count,
            execution_since_reset,
        }
    }

    /// Add counts from another sample of the same activity.
    pub fn merge(&mut self, other: &ActivityStat) {
        self.execution_count += other.execution_count;
        self.execution_since_reset += other.execution_since_reset;
    }

    /// Convert to a method-level leaf. One instruction models the activity
    /// invocation; there is no partial coverage at this granularity, so the
    /// counter is a plain hit/no-hit. Branches are not observable here and
    /// stay at zero.
    #[must_use]
    pub fn to_coverage_node(&self) -> Node {
        let hit = Counter::from_hit(self.execution_since_reset > 0);
        let mut counters = CounterMap::new();
        counters.increment(CounterKind::Instruction, hit);
        counters.increment(CounterKind::Method, hit);
        Node::leaf(self.activity_name.clone(), ElementKind::Method, counters)
    }
}

/// Cumulative stats for one process, with its activities keyed by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessStat {
    pub process_name: String,
    #[serde(default)]
    pub starter_name: String,
    pub execution_count: u64,
    pub execution_since_reset: u64,
    #[serde(default)]
    pub activities: BTreeMap<String, ActivityStat>,
}

impl ProcessStat {
    pub fn new(
        process_name: impl Into<String>,
        execution_count: u64,
        execution_since_reset: u64,
    ) -> Self {
        Self {
            process_name: process_name.into(),
            starter_name: String::new(),
            execution_count,
            execution_since_reset,
            activities: BTreeMap::new(),
        }
    }

    /// Insert a sampled activity, or merge it into the existing entry with
    /// the same name.
    pub fn add_activity(&mut self, stat: ActivityStat) {
        match self.activities.get_mut(&stat.activity_name) {
            Some(existing) => existing.merge(&stat),
            None => {
                self.activities.insert(stat.activity_name.clone(), stat);
            }
        }
    }

    /// Add counts from another sample of the same process.
    pub fn merge(&mut self, other: &ProcessStat) {
        self.execution_count += other.execution_count;
        self.execution_since_reset += other.execution_since_reset;
        for activity in other.activities.values() {
            self.add_activity(activity.clone());
        }
    }

    /// Convert to a class-level node: the process invocation counts as one
    /// direct instruction, activities become method children, and the class
    /// counter records whether any activity ran.
    pub fn to_coverage_node(&self) -> Result<Node> {
        let mut builder = NodeBuilder::new(self.process_name.clone(), ElementKind::Class);
        builder.increment(
            CounterKind::Instruction,
            Counter::from_hit(self.execution_since_reset > 0),
        );
        for activity in self.activities.values() {
            builder.add_child(activity.to_coverage_node())?;
        }
        let methods = builder.counter(CounterKind::Method);
        builder.increment(CounterKind::Class, Counter::from_hit(methods.covered > 0));
        Ok(builder.seal())
    }
}

/// Cumulative stats for one process archive (engine), keyed by process name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveStat {
    pub archive_name: String,
    #[serde(default)]
    pub processes: BTreeMap<String, ProcessStat>,
}

impl ArchiveStat {
    pub fn new(archive_name: impl Into<String>) -> Self {
        Self {
            archive_name: archive_name.into(),
            processes: BTreeMap::new(),
        }
    }

    pub fn add_process(&mut self, stat: ProcessStat) {
        match self.processes.get_mut(&stat.process_name) {
            Some(existing) => existing.merge(&stat),
            None => {
                self.processes.insert(stat.process_name.clone(), stat);
            }
        }
    }

    pub fn merge(&mut self, other: &ArchiveStat) {
        for process in other.processes.values() {
            self.add_process(process.clone());
        }
    }

    /// Convert to a package-level grouping of process classes.
    pub fn to_coverage_node(&self) -> Result<Node> {
        let mut builder = NodeBuilder::new(self.archive_name.clone(), ElementKind::Package);
        for process in self.processes.values() {
            builder.add_child(process.to_coverage_node()?)?;
        }
        Ok(builder.seal())
    }
}

/// Cumulative stats for a whole application, keyed by archive name. This is
/// the root of the merge hierarchy and the unit of snapshot persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStat {
    pub app_name: String,
    #[serde(default)]
    pub archives: BTreeMap<String, ArchiveStat>,
}

impl ApplicationStat {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            archives: BTreeMap::new(),
        }
    }

    pub fn add_archive(&mut self, stat: ArchiveStat) {
        match self.archives.get_mut(&stat.archive_name) {
            Some(existing) => existing.merge(&stat),
            None => {
                self.archives.insert(stat.archive_name.clone(), stat);
            }
        }
    }

    /// Fold another sampled (or persisted) application hierarchy into this
    /// one. Accepts a whole pass at once; single records go through the
    /// level-specific `add_*` methods.
    pub fn merge(&mut self, other: &ApplicationStat) {
        for archive in other.archives.values() {
            self.add_archive(archive.clone());
        }
    }

    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    pub fn process_count(&self) -> usize {
        self.archives.values().map(|a| a.processes.len()).sum()
    }

    pub fn activity_count(&self) -> usize {
        self.archives
            .values()
            .flat_map(|a| a.processes.values())
            .map(|p| p.activities.len())
            .sum()
    }

    /// Convert the merged hierarchy into an immutable bundle tree.
    ///
    /// Pure and idempotent: converting twice yields structurally equal
    /// trees. The bundle has no source-file children since source mapping
    /// does not exist for this execution model.
    pub fn to_coverage_node(&self) -> Result<Node> {
        let mut builder = NodeBuilder::new(self.app_name.clone(), ElementKind::Bundle);
        for archive in self.archives.values() {
            builder.add_child(archive.to_coverage_node()?)?;
        }
        Ok(builder.seal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_app(count: u64, since_reset: u64) -> ApplicationStat {
        let mut app = ApplicationStat::new("app");
        let mut archive = ArchiveStat::new("engine-1");
        let mut process = ProcessStat::new("P1", count, since_reset);
        process.add_activity(ActivityStat::new("P1", "A1", count, since_reset));
        archive.add_process(process);
        app.add_archive(archive);
        app
    }

    #[test]
    fn test_merge_adds_both_count_fields() {
        let mut app = sample_app(3, 2);
        app.merge(&sample_app(1, 0));

        let process = &app.archives["engine-1"].processes["P1"];
        assert_eq!(process.execution_count, 4);
        assert_eq!(process.execution_since_reset, 2);
        let activity = &process.activities["A1"];
        assert_eq!(activity.execution_count, 4);
        assert_eq!(activity.execution_since_reset, 2);
    }

    #[test]
    fn test_merge_inserts_unknown_keys() {
        let mut app = sample_app(1, 1);
        let mut other = ApplicationStat::new("app");
        let mut archive = ArchiveStat::new("engine-2");
        archive.add_process(ProcessStat::new("P2", 5, 5));
        other.add_archive(archive);

        app.merge(&other);
        assert_eq!(app.archive_count(), 2);
        assert_eq!(app.process_count(), 2);
    }

    #[test]
    fn test_merge_order_independent() {
        let a = sample_app(3, 2);
        let b = sample_app(1, 0);
        let c = sample_app(7, 4);

        let mut left = ApplicationStat::new("app");
        left.merge(&a);
        left.merge(&b);
        left.merge(&c);

        let mut right = ApplicationStat::new("app");
        right.merge(&c);
        right.merge(&a);
        right.merge(&b);

        let lp = &left.archives["engine-1"].processes["P1"];
        let rp = &right.archives["engine-1"].processes["P1"];
        assert_eq!(lp.execution_count, rp.execution_count);
        assert_eq!(lp.execution_since_reset, rp.execution_since_reset);
        assert_eq!(
            lp.activities["A1"].execution_since_reset,
            rp.activities["A1"].execution_since_reset
        );
    }

    #[test]
    fn test_activity_conversion_hit_rule() {
        let hit = ActivityStat::new("P1", "A1", 3, 2).to_coverage_node();
        assert_eq!(hit.counter(CounterKind::Instruction), Counter::new(0, 1));
        assert_eq!(hit.counter(CounterKind::Method), Counter::new(0, 1));
        assert_eq!(hit.counter(CounterKind::Branch), Counter::ZERO);

        // Lifetime count alone is not coverage.
        let cold = ActivityStat::new("P1", "A2", 9, 0).to_coverage_node();
        assert_eq!(cold.counter(CounterKind::Instruction), Counter::new(1, 0));
        assert_eq!(cold.counter(CounterKind::Method), Counter::new(1, 0));
    }

    #[test]
    fn test_end_to_end_merge_and_convert() {
        // Two samples of P1/A1: (3,2) then (1,0) → merged (4,2).
        let mut app = sample_app(3, 2);
        app.merge(&sample_app(1, 0));

        let bundle = app.to_coverage_node().unwrap();
        let package = bundle.find_child("engine-1").unwrap();
        let class = package.find_child("P1").unwrap();
        let method = class.find_child("A1").unwrap();

        // A1 executed since reset → covered.
        assert_eq!(method.counter(CounterKind::Instruction), Counter::new(0, 1));
        // P1's own invocation (0,1) plus child (0,1).
        assert_eq!(class.counter(CounterKind::Instruction), Counter::new(0, 2));
        assert_eq!(class.counter(CounterKind::Class), Counter::new(0, 1));
        assert_eq!(bundle.counter(CounterKind::Instruction), Counter::new(0, 2));
    }

    #[test]
    fn test_conversion_idempotent() {
        let app = sample_app(3, 2);
        let first = app.to_coverage_node().unwrap();
        let second = app.to_coverage_node().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_class_counter_without_activities() {
        let process = ProcessStat::new("P1", 2, 2);
        let node = process.to_coverage_node().unwrap();
        // No activities ran, so the class counter reports a miss even
        // though the process itself was invoked.
        assert_eq!(node.counter(CounterKind::Class), Counter::new(1, 0));
        assert_eq!(node.counter(CounterKind::Instruction), Counter::new(0, 1));
    }
}
