//! Stored-procedure bindings
//!
//! Procedures and their arguments are declared on the class itself and are
//! not inherited. Argument and field references are checked, everything
//! else is passed through.

use crate::error::{MappingError, MappingResult};
use crate::metadata::{FieldDescriptor, ProcedureArgument, ProcedureDescriptor, ProcedureKind};
use crate::model::declarations::{
    TAG_CONSTANT_ARGUMENT, TAG_DELETE_PROCEDURE, TAG_INSERT_PROCEDURE, TAG_RUNTIME_ARGUMENT,
    TAG_UPDATE_PROCEDURE,
};
use crate::model::options::{ArgumentOptions, ProcedureOptions};
use crate::model::{ClassId, HierarchyModel};

use super::fields::find_field;
use super::members::EffectiveMembers;

pub(crate) fn resolve_procedures(
    model: &HierarchyModel,
    id: ClassId,
    fields: &[FieldDescriptor],
    members: &EffectiveMembers,
) -> MappingResult<Vec<ProcedureDescriptor>> {
    let class_name = model.name(id);
    let decl = &model.node(id).decl;

    let mut arguments: Vec<ArgumentOptions> = Vec::new();
    for tag in &decl.tags {
        let argument = match tag.name.as_str() {
            TAG_RUNTIME_ARGUMENT => ArgumentOptions::parse_runtime(class_name, tag)?,
            TAG_CONSTANT_ARGUMENT => ArgumentOptions::parse_constant(class_name, tag)?,
            _ => continue,
        };
        if arguments.iter().any(|a| a.name() == argument.name()) {
            return Err(MappingError::conflict(
                class_name,
                format!("procedure argument '{}' is declared more than once", argument.name()),
            ));
        }
        if let ArgumentOptions::Runtime {
            name,
            field_ref: Some(field_ref),
            ..
        } = &argument
        {
            find_field(
                class_name,
                fields,
                members,
                field_ref,
                format!("field-ref of procedure argument '{}'", name),
            )?;
        }
        arguments.push(argument);
    }

    let mut procedures = Vec::new();
    for tag in &decl.tags {
        let kind = match tag.name.as_str() {
            TAG_INSERT_PROCEDURE => ProcedureKind::Insert,
            TAG_UPDATE_PROCEDURE => ProcedureKind::Update,
            TAG_DELETE_PROCEDURE => ProcedureKind::Delete,
            _ => continue,
        };
        let opts = ProcedureOptions::parse(class_name, tag)?;
        if let Some(return_field) = &opts.return_field_ref {
            find_field(
                class_name,
                fields,
                members,
                return_field,
                format!("return-field-ref of procedure '{}'", opts.name),
            )?;
        }

        let mut bound = Vec::with_capacity(opts.arguments.len());
        for arg_name in &opts.arguments {
            let argument = arguments
                .iter()
                .find(|a| a.name() == arg_name.as_str())
                .ok_or_else(|| {
                    MappingError::unresolved(
                        class_name,
                        "procedure argument",
                        arg_name,
                        format!("arguments of procedure '{}'", opts.name),
                    )
                })?;
            bound.push(match argument {
                ArgumentOptions::Runtime {
                    field_ref,
                    is_return,
                    ..
                } => ProcedureArgument::Runtime {
                    field_ref: field_ref.clone(),
                    is_return: *is_return,
                },
                ArgumentOptions::Constant { value, .. } => ProcedureArgument::Constant {
                    value: value.clone(),
                },
            });
        }

        procedures.push(ProcedureDescriptor {
            kind,
            name: opts.name,
            return_field_ref: opts.return_field_ref,
            include_all_fields: opts.include_all_fields && kind != ProcedureKind::Delete,
            include_pk_only: opts.include_pk_only && kind == ProcedureKind::Delete,
            arguments: bound,
            documentation: opts.documentation,
        });
    }
    Ok(procedures)
}
