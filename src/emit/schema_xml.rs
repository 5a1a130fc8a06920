//! Generate the database schema document

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::metadata::{Column, ForeignKey, Index, SchemaModel, Table};

use super::xml_helpers::{push_flag, push_opt, write_empty_with, write_end, write_open};

pub fn generate_schema_xml<W: Write>(writer: W, schema: &SchemaModel) -> anyhow::Result<()> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);
    xml_writer
        .config_mut()
        .add_space_before_slash_in_empty_elements = true;

    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root = BytesStart::new("database").with_attributes([
        ("name", schema.database_name.as_str()),
        ("defaultIdMethod", "none"),
    ]);
    xml_writer.write_event(Event::Start(root))?;

    for table in &schema.tables {
        write_table(&mut xml_writer, table)?;
    }

    xml_writer.write_event(Event::End(BytesEnd::new("database")))?;
    Ok(())
}

fn write_table<W: Write>(writer: &mut Writer<W>, table: &Table) -> anyhow::Result<()> {
    let mut element = BytesStart::new("table");
    element.push_attribute(("name", table.name.as_str()));
    push_opt(&mut element, "description", table.description.as_deref());

    let has_children =
        !table.columns.is_empty() || !table.foreign_keys.is_empty() || !table.indices.is_empty();
    write_open(writer, element, has_children)?;
    if !has_children {
        return Ok(());
    }

    for column in &table.columns {
        write_column(writer, column)?;
    }
    for fk in &table.foreign_keys {
        write_foreign_key(writer, fk)?;
    }
    for index in &table.indices {
        write_index(writer, index)?;
    }

    write_end(writer, "table")
}

fn write_column<W: Write>(writer: &mut Writer<W>, column: &Column) -> anyhow::Result<()> {
    let mut element = BytesStart::new("column");
    element.push_attribute(("name", column.name.as_str()));
    element.push_attribute(("type", column.jdbc_type.as_str()));
    push_opt(&mut element, "size", column.size.as_deref());
    push_flag(&mut element, "primaryKey", column.primary_key, false);
    push_flag(&mut element, "required", column.required, false);
    push_flag(&mut element, "autoIncrement", column.auto_increment, false);
    push_opt(&mut element, "default", column.default_value.as_deref());
    push_opt(&mut element, "description", column.description.as_deref());
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_foreign_key<W: Write>(writer: &mut Writer<W>, fk: &ForeignKey) -> anyhow::Result<()> {
    let element =
        BytesStart::new("foreign-key").with_attributes([("foreignTable", fk.foreign_table.as_str())]);
    writer.write_event(Event::Start(element))?;
    for (local, foreign) in &fk.references {
        write_empty_with(
            writer,
            "reference",
            &[("local", local.as_str()), ("foreign", foreign.as_str())],
        )?;
    }
    write_end(writer, "foreign-key")
}

fn write_index<W: Write>(writer: &mut Writer<W>, index: &Index) -> anyhow::Result<()> {
    let (name, column_name) = if index.unique {
        ("unique", "unique-column")
    } else {
        ("index", "index-column")
    };
    let element = BytesStart::new(name).with_attributes([("name", index.name.as_str())]);
    writer.write_event(Event::Start(element))?;
    for column in &index.columns {
        write_empty_with(writer, column_name, &[("name", column.as_str())])?;
    }
    write_end(writer, name)
}
