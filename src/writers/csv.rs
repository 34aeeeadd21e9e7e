//! CSV report: one row per class (process) with missed/covered columns for
//! each counter kind meaningful at class level.

use std::fmt::Write;

use super::ReportWriter;
use crate::error::Result;
use crate::model::{CounterKind, Node};

/// Counter kinds emitted as columns, in order.
const COLUMNS: [CounterKind; 5] = [
    CounterKind::Instruction,
    CounterKind::Branch,
    CounterKind::Line,
    CounterKind::Complexity,
    CounterKind::Method,
];

/// CSV format writer.
pub struct CsvWriter;

impl ReportWriter for CsvWriter {
    fn write(&self, bundle: &Node) -> Result<String> {
        let mut out = String::new();

        out.push_str("GROUP,PACKAGE,CLASS");
        for kind in COLUMNS {
            write!(out, ",{0}_MISSED,{0}_COVERED", kind.as_str()).unwrap();
        }
        out.push('\n');

        for package in bundle.children() {
            for class in package.children() {
                write!(
                    out,
                    "{},{},{}",
                    escape(bundle.name()),
                    escape(package.name()),
                    escape(class.name())
                )
                .unwrap();
                for kind in COLUMNS {
                    let counter = class.counter(kind);
                    write!(out, ",{},{}", counter.missed, counter.covered).unwrap();
                }
                out.push('\n');
            }
        }

        Ok(out)
    }
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
