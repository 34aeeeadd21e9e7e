//! Plain text summary report for terminals.

use std::fmt::Write;

use super::ReportWriter;
use crate::error::Result;
use crate::model::{CounterKind, Node};

/// Text format writer.
pub struct TextWriter;

impl ReportWriter for TextWriter {
    fn write(&self, bundle: &Node) -> Result<String> {
        let mut out = String::new();

        let processes: usize = bundle.children().iter().map(|p| p.children().len()).sum();
        writeln!(out, "Application: {}", bundle.name()).unwrap();
        writeln!(out, "Archives:    {}", bundle.children().len()).unwrap();
        writeln!(out, "Processes:   {}", processes).unwrap();
        writeln!(out, "Activities:  {}", bundle.leaf_count()).unwrap();
        out.push('\n');

        for (label, kind) in [
            ("Instructions:", CounterKind::Instruction),
            ("Branches:    ", CounterKind::Branch),
            ("Methods:     ", CounterKind::Method),
            ("Classes:     ", CounterKind::Class),
        ] {
            let counter = bundle.counter(kind);
            if counter.total() == 0 {
                continue;
            }
            writeln!(
                out,
                "{} {}/{} ({:.1}%)",
                label,
                counter.covered,
                counter.total(),
                counter.covered_ratio() * 100.0
            )
            .unwrap();
        }

        // Per-process breakdown, worst covered first.
        let mut rows: Vec<(String, &Node)> = Vec::new();
        for package in bundle.children() {
            for class in package.children() {
                rows.push((format!("{}/{}", package.name(), class.name()), class));
            }
        }
        rows.sort_by(|a, b| {
            let ra = a.1.counter(CounterKind::Instruction).covered_ratio();
            let rb = b.1.counter(CounterKind::Instruction).covered_ratio();
            ra.total_cmp(&rb).then_with(|| a.0.cmp(&b.0))
        });

        if !rows.is_empty() {
            out.push('\n');
            writeln!(
                out,
                "{:<50} {:>10} {:>9} {:>8}",
                "PROCESS", "ACTIVITIES", "COVERED", "RATE"
            )
            .unwrap();
            writeln!(out, "{}", "-".repeat(80)).unwrap();
            for (name, class) in rows {
                let methods = class.counter(CounterKind::Method);
                writeln!(
                    out,
                    "{:<50} {:>10} {:>9} {:>7.1}%",
                    name,
                    methods.total(),
                    methods.covered,
                    class.counter(CounterKind::Instruction).covered_ratio() * 100.0
                )
                .unwrap();
            }
        }

        Ok(out)
    }
}
