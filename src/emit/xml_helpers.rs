//! Low-level XML writing utilities shared by the emitters

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

/// Push an attribute only when a value is present
pub(crate) fn push_opt(element: &mut BytesStart, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        element.push_attribute((key, value));
    }
}

/// Push a boolean attribute only when it differs from its default
pub(crate) fn push_flag(element: &mut BytesStart, key: &str, value: bool, default: bool) {
    if value != default {
        element.push_attribute((key, if value { "true" } else { "false" }));
    }
}

/// Push a numeric attribute only when a value is present
pub(crate) fn push_num<N: ToString>(element: &mut BytesStart, key: &str, value: Option<N>) {
    if let Some(value) = value {
        let value = value.to_string();
        element.push_attribute((key, value.as_str()));
    }
}

/// Write `element` as an empty element, or as a start tag when `has_children`
pub(crate) fn write_open<W: Write>(
    writer: &mut Writer<W>,
    element: BytesStart,
    has_children: bool,
) -> anyhow::Result<()> {
    if has_children {
        writer.write_event(Event::Start(element))?;
    } else {
        writer.write_event(Event::Empty(element))?;
    }
    Ok(())
}

pub(crate) fn write_end<W: Write>(writer: &mut Writer<W>, name: &str) -> anyhow::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write `<name key="value"/>`
pub(crate) fn write_empty_with<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
) -> anyhow::Result<()> {
    let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Empty(element))?;
    Ok(())
}
