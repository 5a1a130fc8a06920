//! Inheritance-aware resolution of the class hierarchy into mapping metadata
//!
//! Resolution runs in fixed phases over the whole hierarchy:
//! 1. persistence participation, tables and extents
//! 2. effective members per class (inherited, patched, own, nested)
//! 3. typed field descriptors and class tables
//! 4. references and collections, with join tables and constraints
//! 5. procedures
//!
//! The first error aborts the run; no partial model is ever returned.

mod associations;
mod containers;
mod fields;
mod members;
mod persistence;
mod procedures;
mod schema_builder;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::error::MappingResult;
use crate::metadata::{
    Association, ClassDescriptor, FieldDescriptor, Index, ProcedureDescriptor, ResolvedModel,
};
use crate::model::declarations::{CLASS_TAGS, MEMBER_TAGS, TAG_INDEX};
use crate::model::options::IndexOptions;
use crate::model::{ClassDecl, HierarchyModel, MemberKind};

use associations::{resolve_collection, resolve_reference, AssociationContext};
use fields::{build_field, column_for, find_field};
use members::{compute_members, EffectiveMembers};
use persistence::{resolve_persistence, ClassInfo};
use procedures::resolve_procedures;
use schema_builder::SchemaBuilder;

pub use members::NESTED_SEPARATOR;

/// How strictly declared types are checked against mapping declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksMode {
    /// Subtype and container compatibility violations are errors
    #[default]
    Strict,
    /// Only arity and JDBC type checks are enforced
    Basic,
}

impl fmt::Display for ChecksMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksMode::Strict => f.write_str("strict"),
            ChecksMode::Basic => f.write_str("basic"),
        }
    }
}

impl FromStr for ChecksMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ChecksMode::Strict),
            "basic" => Ok(ChecksMode::Basic),
            other => Err(format!("unknown checks mode '{}', expected strict or basic", other)),
        }
    }
}

/// Options for one resolution run
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub checks: ChecksMode,
    /// Name placed on the schema view
    pub database_name: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            checks: ChecksMode::Strict,
            database_name: "default".to_string(),
        }
    }
}

/// Resolve a hierarchy into a validated metadata graph
pub fn resolve(model: &HierarchyModel, options: &ResolveOptions) -> MappingResult<ResolvedModel> {
    warn_unknown_tags(model);

    let infos = resolve_persistence(model)?;
    let members = compute_members(model, &infos)?;

    let mut fields: Vec<Vec<FieldDescriptor>> = vec![Vec::new(); model.len()];
    for info in infos.iter().filter(|i| i.persistent) {
        let class_name = model.name(info.id);
        fields[info.id.index()] = members[info.id.index()]
            .fields
            .iter()
            .map(|f| build_field(model, class_name, f))
            .collect::<MappingResult<Vec<_>>>()?;
    }

    let mut schema = SchemaBuilder::new();
    for info in infos.iter().filter(|i| i.persistent) {
        add_class_table(
            model,
            &mut schema,
            info,
            &fields[info.id.index()],
            &members[info.id.index()],
        )?;
    }

    let ctx = AssociationContext {
        model,
        infos: &infos,
        members: &members,
        fields: &fields,
        checks: options.checks,
    };

    let mut classes = Vec::new();
    for info in infos.iter().filter(|i| i.persistent) {
        let id = info.id;
        let mut associations = Vec::with_capacity(members[id.index()].associations.len());
        for assoc in &members[id.index()].associations {
            associations.push(match assoc.kind {
                MemberKind::Reference => {
                    Association::Reference(resolve_reference(&ctx, &mut schema, id, assoc)?)
                }
                _ => Association::Collection(resolve_collection(&ctx, &mut schema, id, assoc)?),
            });
        }
        let procedures = resolve_procedures(
            model,
            id,
            &fields[id.index()],
            &members[id.index()],
        )?;
        classes.push(class_descriptor(
            model,
            info,
            fields[id.index()].clone(),
            associations,
            procedures,
        ));
    }

    let schema = schema.finish(&options.database_name);
    info!(
        classes = classes.len(),
        tables = schema.tables.len(),
        checks = %options.checks,
        "resolved mapping metadata"
    );
    Ok(ResolvedModel { classes, schema })
}

fn add_class_table(
    model: &HierarchyModel,
    schema: &mut SchemaBuilder,
    info: &ClassInfo,
    fields: &[FieldDescriptor],
    members: &Rc<EffectiveMembers>,
) -> MappingResult<()> {
    let Some(table) = info.table.as_deref() else {
        return Ok(());
    };
    let class_name = model.name(info.id);
    schema.add_table(table, info.options.table_documentation.as_deref());
    for field in fields {
        schema.add_column(table, column_for(field), class_name)?;
        if field.indexed {
            schema.add_index(
                table,
                Index {
                    name: format!("{}_{}_IDX", table, field.column),
                    unique: false,
                    columns: vec![field.column.clone()],
                },
                class_name,
            )?;
        }
    }

    for tag in model.node(info.id).decl.tags_named(TAG_INDEX) {
        let opts = IndexOptions::parse(class_name, tag)?;
        let mut columns = Vec::with_capacity(opts.fields.len());
        for name in &opts.fields {
            let field = find_field(
                class_name,
                fields,
                members,
                name,
                format!("fields of index '{}'", opts.name),
            )?;
            columns.push(field.column.clone());
        }
        schema.add_index(
            table,
            Index {
                name: opts.name,
                unique: opts.unique,
                columns,
            },
            class_name,
        )?;
    }
    debug!(class = class_name, table, columns = fields.len(), "added class table");
    Ok(())
}

fn class_descriptor(
    model: &HierarchyModel,
    info: &ClassInfo,
    fields: Vec<FieldDescriptor>,
    associations: Vec<Association>,
    procedures: Vec<ProcedureDescriptor>,
) -> ClassDescriptor {
    let node = model.node(info.id);
    let opts = &info.options;
    ClassDescriptor {
        name: node.name().to_string(),
        is_interface: node.is_interface(),
        table: info.table.clone(),
        extents: info
            .extents
            .iter()
            .map(|id| model.name(*id).to_string())
            .collect(),
        fields,
        associations,
        procedures,
        documentation: opts.documentation.clone(),
        table_documentation: opts.table_documentation.clone(),
        row_reader: opts.row_reader.clone(),
        refresh: opts.refresh,
        isolation_level: opts.isolation_level,
        proxy: opts.proxy.clone(),
        proxy_prefetching_limit: opts.proxy_prefetching_limit,
    }
}

fn warn_unknown_tags(model: &HierarchyModel) {
    for node in model.classes() {
        for tag in &node.decl.tags {
            if !CLASS_TAGS.contains(&tag.name.as_str()) {
                warn!(class = node.name(), tag = %tag.name, "ignoring unknown class tag");
            }
        }
        for member in &node.decl.members {
            for tag in &member.tags {
                if !MEMBER_TAGS.contains(&tag.name.as_str()) {
                    warn!(
                        class = node.name(),
                        member = %member.name,
                        tag = %tag.name,
                        "ignoring unknown member tag"
                    );
                }
            }
        }
    }
}

/// Build the hierarchy and resolve it in one step
pub fn resolve_declarations(
    declarations: Vec<ClassDecl>,
    options: &ResolveOptions,
) -> MappingResult<ResolvedModel> {
    let model = HierarchyModel::from_declarations(declarations)?;
    resolve(&model, options)
}
