//! XML report: nested `report`/`package`/`class`/`method` elements, each
//! carrying a `counter` element per non-empty counter kind.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::ReportWriter;
use crate::error::Result;
use crate::model::{CounterKind, Node};

/// XML format writer.
pub struct XmlWriter;

impl ReportWriter for XmlWriter {
    fn write(&self, bundle: &Node) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        write_element(&mut writer, "report", bundle, &|writer, bundle| {
            for package in bundle.children() {
                write_element(writer, "package", package, &|writer, package| {
                    for class in package.children() {
                        write_element(writer, "class", class, &|writer, class| {
                            for method in class.children() {
                                write_element(writer, "method", method, &|_, _| Ok(()))?;
                            }
                            Ok(())
                        })?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

type ChildFn<'a> = dyn Fn(&mut Writer<Vec<u8>>, &Node) -> Result<()> + 'a;

/// Write one named element: children first, then its counters, so the
/// counter rows a reader checks always follow the structure they summarize.
fn write_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    node: &Node,
    children: &ChildFn<'_>,
) -> Result<()> {
    let mut start = BytesStart::new(tag);
    start.push_attribute(("name", node.name()));
    writer.write_event(Event::Start(start))?;

    children(writer, node)?;
    write_counters(writer, node)?;

    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_counters(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    for kind in CounterKind::ALL {
        let counter = node.counter(kind);
        if counter.total() == 0 {
            continue;
        }
        let mut element = BytesStart::new("counter");
        element.push_attribute(("type", kind.as_str()));
        element.push_attribute(("missed", counter.missed.to_string().as_str()));
        element.push_attribute(("covered", counter.covered.to_string().as_str()));
        writer.write_event(Event::Empty(element))?;
    }
    Ok(())
}
