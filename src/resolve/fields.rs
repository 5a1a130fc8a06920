//! Typed field descriptors built from effective raw fields

use crate::error::{MappingError, MappingResult};
use crate::metadata::{Column, FieldDescriptor};
use crate::model::jdbc::{
    default_mapping, DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE, DEFAULT_VARCHAR_LENGTH,
};
use crate::model::options::{AccessMode, AutoIncrement, FieldOptions};
use crate::model::HierarchyModel;

use super::members::{EffectiveField, EffectiveMembers};

pub(crate) fn build_field(
    model: &HierarchyModel,
    class_name: &str,
    field: &EffectiveField,
) -> MappingResult<FieldDescriptor> {
    let opts = FieldOptions::parse(class_name, &field.tag)?;

    let (jdbc_type, conversion, default_length) = match (opts.jdbc_type, &field.java_type) {
        (Some(jdbc_type), _) => (jdbc_type, opts.conversion.clone(), None),
        (None, Some(java_type)) => {
            let mapping = default_mapping(java_type);
            let conversion = opts
                .conversion
                .clone()
                .or_else(|| mapping.conversion.map(str::to_string));
            (mapping.jdbc_type, conversion, mapping.length)
        }
        (None, None) => {
            return Err(MappingError::InvalidOptionValue {
                class: class_name.to_string(),
                tag: field.tag.name.clone(),
                option: "jdbc-type".to_string(),
                value: String::new(),
                reason: format!("anonymous field '{}' needs an explicit jdbc-type", field.name),
            });
        }
    };

    let length = if jdbc_type.has_length() {
        opts.length.or(default_length).or(Some(DEFAULT_VARCHAR_LENGTH))
    } else {
        opts.length
    };
    let (precision, scale) = if jdbc_type.has_precision() {
        (
            opts.precision.or(Some(DEFAULT_DECIMAL_PRECISION)),
            opts.scale.or(Some(DEFAULT_DECIMAL_SCALE)),
        )
    } else {
        (opts.precision, opts.scale)
    };

    let access = if field.java_type.is_none() {
        AccessMode::Anonymous
    } else {
        opts.access.unwrap_or_default()
    };

    let column = opts
        .column
        .clone()
        .or_else(|| field.default_column.clone())
        .unwrap_or_else(|| field.name.clone());

    Ok(FieldDescriptor {
        name: field.name.clone(),
        declared_in: model.name(field.declared_in).to_string(),
        column,
        jdbc_type,
        primary_key: opts.primary_key,
        nullable: opts.nullable,
        autoincrement: opts.autoincrement,
        sequence_name: opts.sequence_name,
        locking: opts.locking,
        update_lock: opts.update_lock,
        default_fetch: opts.default_fetch,
        conversion,
        length,
        precision,
        scale,
        access,
        id: opts.id,
        indexed: opts.indexed,
        default_value: opts.default_value,
        documentation: opts.documentation,
        column_documentation: opts.column_documentation,
    })
}

/// Schema column for a mapped field
pub(crate) fn column_for(field: &FieldDescriptor) -> Column {
    Column {
        name: field.column.clone(),
        jdbc_type: field.jdbc_type,
        size: column_size(field),
        primary_key: field.primary_key,
        required: field.primary_key || !field.nullable,
        auto_increment: field.autoincrement == AutoIncrement::Database,
        default_value: field.default_value.clone(),
        description: field.column_documentation.clone(),
    }
}

/// `"254"` for character types, `"20,0"` for decimal types
pub(crate) fn column_size(field: &FieldDescriptor) -> Option<String> {
    if field.jdbc_type.has_length() {
        field.length.map(|l| l.to_string())
    } else if field.jdbc_type.has_precision() {
        match (field.precision, field.scale) {
            (Some(p), Some(s)) => Some(format!("{},{}", p, s)),
            (Some(p), None) => Some(p.to_string()),
            _ => None,
        }
    } else {
        field.length.map(|l| l.to_string())
    }
}

/// Look up a field a declaration refers to.
///
/// Names suppressed up the chain are reported as conflicts rather than
/// unresolved references.
pub(crate) fn find_field<'f>(
    class_name: &str,
    fields: &'f [FieldDescriptor],
    members: &EffectiveMembers,
    name: &str,
    context: impl Into<String>,
) -> MappingResult<&'f FieldDescriptor> {
    let name = name.trim();
    if let Some(field) = fields.iter().find(|f| f.name == name) {
        return Ok(field);
    }
    let context = context.into();
    if members.is_suppressed(name) {
        return Err(MappingError::conflict(
            class_name,
            format!("{} refers to suppressed member '{}'", context, name),
        ));
    }
    Err(MappingError::unresolved(class_name, "field", name, context))
}
