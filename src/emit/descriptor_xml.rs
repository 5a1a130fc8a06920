//! Generate the O/R-mapping descriptor document

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::metadata::{
    Association, ClassDescriptor, CollectionDescriptor, FieldDescriptor, ProcedureArgument,
    ProcedureDescriptor, ProcedureKind, ReferenceDescriptor, ResolvedModel,
};
use crate::model::options::{AccessMode, AutoIncrement, CascadeMode};

use super::xml_helpers::{push_flag, push_num, push_opt, write_empty_with, write_end, write_open};

pub fn generate_descriptor_xml<W: Write>(writer: W, model: &ResolvedModel) -> anyhow::Result<()> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);
    xml_writer
        .config_mut()
        .add_space_before_slash_in_empty_elements = true;

    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml_writer.write_event(Event::Start(BytesStart::new("descriptor-repository")))?;

    for class in &model.classes {
        write_class(&mut xml_writer, class)?;
    }

    xml_writer.write_event(Event::End(BytesEnd::new("descriptor-repository")))?;
    Ok(())
}

fn write_class<W: Write>(writer: &mut Writer<W>, class: &ClassDescriptor) -> anyhow::Result<()> {
    let mut element = BytesStart::new("class-descriptor");
    element.push_attribute(("class", class.name.as_str()));
    push_opt(&mut element, "table", class.table.as_deref());
    push_opt(&mut element, "row-reader", class.row_reader.as_deref());
    push_opt(&mut element, "proxy", class.proxy.as_deref());
    push_num(&mut element, "proxy-prefetching-limit", class.proxy_prefetching_limit);
    push_opt(
        &mut element,
        "isolation-level",
        class.isolation_level.map(|l| l.as_str()),
    );
    push_flag(&mut element, "refresh", class.refresh, false);

    let has_children = !class.extents.is_empty()
        || !class.fields.is_empty()
        || !class.associations.is_empty()
        || !class.procedures.is_empty()
        || class.documentation.is_some();
    write_open(writer, element, has_children)?;
    if !has_children {
        return Ok(());
    }

    if let Some(doc) = &class.documentation {
        write_documentation(writer, doc)?;
    }
    for extent in &class.extents {
        write_empty_with(writer, "extent-class", &[("class-ref", extent.as_str())])?;
    }
    for field in &class.fields {
        write_field(writer, field)?;
    }
    for association in &class.associations {
        match association {
            Association::Reference(reference) => write_reference(writer, reference)?,
            Association::Collection(collection) => write_collection(writer, collection)?,
        }
    }
    for procedure in &class.procedures {
        write_procedure(writer, procedure)?;
    }

    write_end(writer, "class-descriptor")
}

fn write_documentation<W: Write>(writer: &mut Writer<W>, text: &str) -> anyhow::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("documentation")))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("documentation")))?;
    Ok(())
}

fn write_field<W: Write>(writer: &mut Writer<W>, field: &FieldDescriptor) -> anyhow::Result<()> {
    let mut element = BytesStart::new("field-descriptor");
    element.push_attribute(("name", field.name.as_str()));
    element.push_attribute(("column", field.column.as_str()));
    element.push_attribute(("jdbc-type", field.jdbc_type.as_str()));
    push_flag(&mut element, "primarykey", field.primary_key, false);
    push_flag(&mut element, "nullable", field.nullable, true);
    push_flag(&mut element, "indexed", field.indexed, false);
    if field.autoincrement != AutoIncrement::None {
        element.push_attribute(("autoincrement", "true"));
    }
    push_opt(&mut element, "sequence-name", field.sequence_name.as_deref());
    push_flag(&mut element, "locking", field.locking, false);
    push_flag(&mut element, "update-lock", field.update_lock, true);
    push_flag(&mut element, "default-fetch", field.default_fetch, false);
    push_opt(&mut element, "conversion", field.conversion.as_deref());
    push_num(&mut element, "length", field.length);
    push_num(&mut element, "precision", field.precision);
    push_num(&mut element, "scale", field.scale);
    if field.access != AccessMode::ReadWrite {
        element.push_attribute(("access", field.access.as_str()));
    }
    push_num(&mut element, "id", field.id);
    push_opt(&mut element, "default-value", field.default_value.as_deref());

    let has_children = field.documentation.is_some();
    write_open(writer, element, has_children)?;
    if let Some(doc) = &field.documentation {
        write_documentation(writer, doc)?;
        write_end(writer, "field-descriptor")?;
    }
    Ok(())
}

fn cascade_attributes(element: &mut BytesStart, update: CascadeMode, delete: CascadeMode) {
    if update != CascadeMode::None {
        element.push_attribute(("auto-update", update.as_str()));
    }
    if delete != CascadeMode::None {
        element.push_attribute(("auto-delete", delete.as_str()));
    }
}

fn write_reference<W: Write>(
    writer: &mut Writer<W>,
    reference: &ReferenceDescriptor,
) -> anyhow::Result<()> {
    let mut element = BytesStart::new("reference-descriptor");
    element.push_attribute(("name", reference.name.as_str()));
    element.push_attribute(("class-ref", reference.class_ref.as_str()));
    push_flag(&mut element, "proxy", reference.proxy, false);
    push_num(
        &mut element,
        "proxy-prefetching-limit",
        reference.proxy_prefetching_limit,
    );
    push_flag(&mut element, "refresh", reference.refresh, false);
    push_flag(&mut element, "auto-retrieve", reference.auto_retrieve, true);
    cascade_attributes(&mut element, reference.auto_update, reference.auto_delete);
    push_flag(&mut element, "otm-dependent", reference.otm_dependent, false);
    if reference.anonymous {
        element.push_attribute(("access", AccessMode::Anonymous.as_str()));
    }
    writer.write_event(Event::Start(element))?;

    if let Some(doc) = &reference.documentation {
        write_documentation(writer, doc)?;
    }
    for fk in &reference.foreign_keys {
        write_empty_with(writer, "foreignkey", &[("field-ref", fk.as_str())])?;
    }
    write_end(writer, "reference-descriptor")
}

fn write_collection<W: Write>(
    writer: &mut Writer<W>,
    collection: &CollectionDescriptor,
) -> anyhow::Result<()> {
    let mut element = BytesStart::new("collection-descriptor");
    element.push_attribute(("name", collection.name.as_str()));
    push_opt(
        &mut element,
        "collection-class",
        collection.collection_class.as_deref(),
    );
    element.push_attribute(("element-class-ref", collection.element_class_ref.as_str()));
    push_opt(
        &mut element,
        "indirection-table",
        collection.indirection_table.as_deref(),
    );
    push_flag(&mut element, "proxy", collection.proxy, false);
    push_num(
        &mut element,
        "proxy-prefetching-limit",
        collection.proxy_prefetching_limit,
    );
    push_flag(&mut element, "refresh", collection.refresh, false);
    push_flag(&mut element, "auto-retrieve", collection.auto_retrieve, true);
    cascade_attributes(&mut element, collection.auto_update, collection.auto_delete);
    push_flag(&mut element, "otm-dependent", collection.otm_dependent, false);
    writer.write_event(Event::Start(element))?;

    if let Some(doc) = &collection.documentation {
        write_documentation(writer, doc)?;
    }
    for entry in &collection.orderby {
        write_empty_with(
            writer,
            "orderby",
            &[
                ("name", entry.field.as_str()),
                ("sort", if entry.descending { "DESC" } else { "ASC" }),
            ],
        )?;
    }
    if collection.is_many_to_many() {
        for fk in &collection.foreign_keys {
            write_empty_with(writer, "fk-pointing-to-this-class", &[("column", fk.as_str())])?;
        }
        for fk in &collection.remote_foreign_keys {
            write_empty_with(
                writer,
                "fk-pointing-to-element-class",
                &[("column", fk.as_str())],
            )?;
        }
    } else {
        for fk in &collection.foreign_keys {
            write_empty_with(writer, "inverse-foreignkey", &[("field-ref", fk.as_str())])?;
        }
    }
    if let Some(customizer) = &collection.query_customizer {
        write_empty_with(writer, "query-customizer", &[("class", customizer.as_str())])?;
    }
    write_end(writer, "collection-descriptor")
}

fn write_procedure<W: Write>(
    writer: &mut Writer<W>,
    procedure: &ProcedureDescriptor,
) -> anyhow::Result<()> {
    let name = procedure.kind.element_name();
    let mut element = BytesStart::new(name);
    element.push_attribute(("name", procedure.name.as_str()));
    push_opt(
        &mut element,
        "return-field-ref",
        procedure.return_field_ref.as_deref(),
    );
    match procedure.kind {
        ProcedureKind::Insert | ProcedureKind::Update => {
            push_flag(&mut element, "include-all-fields", procedure.include_all_fields, false)
        }
        ProcedureKind::Delete => {
            push_flag(&mut element, "include-pk-only", procedure.include_pk_only, false)
        }
    }

    let has_children = !procedure.arguments.is_empty() || procedure.documentation.is_some();
    write_open(writer, element, has_children)?;
    if !has_children {
        return Ok(());
    }
    if let Some(doc) = &procedure.documentation {
        write_documentation(writer, doc)?;
    }
    for argument in &procedure.arguments {
        match argument {
            ProcedureArgument::Runtime {
                field_ref,
                is_return,
            } => {
                let mut arg = BytesStart::new("runtime-argument");
                push_opt(&mut arg, "field-ref", field_ref.as_deref());
                push_flag(&mut arg, "return", *is_return, false);
                writer.write_event(Event::Empty(arg))?;
            }
            ProcedureArgument::Constant { value } => {
                write_empty_with(writer, "constant-argument", &[("value", value.as_str())])?;
            }
        }
    }
    write_end(writer, name)
}
