//! Reference and collection resolution
//!
//! Foreign-key names are looked up in the effective fields of the side that
//! holds them, matched positionally against the primary keys of the other
//! side, and turned into descriptor entries. Physical constraints and join
//! tables are registered with the schema builder as they are resolved.

use tracing::{debug, warn};

use crate::error::{MappingError, MappingResult};
use crate::metadata::{
    Column, CollectionDescriptor, FieldDescriptor, ForeignKey, ReferenceDescriptor,
};
use crate::model::options::{CollectionOptions, ReferenceOptions};
use crate::model::{ClassId, HierarchyModel, MemberKind, MemberType};

use super::containers::validate_collection_class;
use super::fields::{column_size, find_field};
use super::members::{EffectiveAssociation, EffectiveMembers};
use super::persistence::ClassInfo;
use super::schema_builder::SchemaBuilder;
use super::ChecksMode;

/// Read-only state shared by all association lookups
pub(crate) struct AssociationContext<'a> {
    pub model: &'a HierarchyModel,
    pub infos: &'a [ClassInfo],
    pub members: &'a [std::rc::Rc<EffectiveMembers>],
    pub fields: &'a [Vec<FieldDescriptor>],
    pub checks: ChecksMode,
}

impl AssociationContext<'_> {
    fn name(&self, id: ClassId) -> &str {
        self.model.name(id)
    }

    fn primary_keys(&self, id: ClassId) -> Vec<&FieldDescriptor> {
        self.fields[id.index()].iter().filter(|f| f.primary_key).collect()
    }

    fn field(
        &self,
        owner: ClassId,
        name: &str,
        context: impl Into<String>,
    ) -> MappingResult<&FieldDescriptor> {
        find_field(
            self.name(owner),
            &self.fields[owner.index()],
            &self.members[owner.index()],
            name,
            context,
        )
    }

    fn persistent_class(
        &self,
        class_name: &str,
        target: &str,
        context: impl Into<String>,
    ) -> MappingResult<ClassId> {
        self.model
            .get_class(target)
            .filter(|id| self.infos[id.index()].persistent)
            .ok_or_else(|| MappingError::unresolved(class_name, "persistent class", target, context))
    }

    /// Whether `class` registers the constraints of `assoc`: the declaring
    /// class does, or every holder when the declarer is not persistent
    fn owns_constraints(&self, class: ClassId, assoc: &EffectiveAssociation) -> bool {
        assoc.declared_in == class || !self.infos[assoc.declared_in.index()].persistent
    }

    /// The single table a class and all of its extents are stored in
    fn uniform_table(&self, id: ClassId) -> Option<&str> {
        let info = &self.infos[id.index()];
        let mut tables = info
            .table
            .iter()
            .chain(info.extents.iter().filter_map(|e| self.infos[e.index()].table.as_ref()));
        let first = tables.next()?;
        if tables.all(|t| t.eq_ignore_ascii_case(first)) {
            Some(first.as_str())
        } else {
            None
        }
    }
}

/// Resolve an N:1 reference held by `class`
pub(crate) fn resolve_reference(
    ctx: &AssociationContext<'_>,
    schema: &mut SchemaBuilder,
    class: ClassId,
    assoc: &EffectiveAssociation,
) -> MappingResult<ReferenceDescriptor> {
    let class_name = ctx.name(class);
    let opts = ReferenceOptions::parse(class_name, &assoc.tag)?;
    let declared_type = assoc.java_type.as_deref().map(|t| MemberType::parse(t).raw_name());

    let Some(target_name) = opts.class_ref.clone().or_else(|| declared_type.clone()) else {
        return Err(MappingError::InvalidOptionValue {
            class: class_name.to_string(),
            tag: assoc.tag.name.clone(),
            option: "class-ref".to_string(),
            value: String::new(),
            reason: format!("anonymous reference '{}' needs a class-ref", assoc.name),
        });
    };
    let target = ctx.persistent_class(
        class_name,
        &target_name,
        format!("reference '{}'", assoc.name),
    )?;

    if ctx.checks == ChecksMode::Strict {
        if let (Some(_), Some(declared)) = (&opts.class_ref, &declared_type) {
            if !ctx.model.are_compatible(&target_name, declared) {
                return Err(MappingError::TypeMismatch {
                    class: class_name.to_string(),
                    member: assoc.name.clone(),
                    message: format!(
                        "class-ref '{}' is not compatible with the declared type '{}'",
                        target_name, declared
                    ),
                });
            }
        }
    }

    let context = format!("foreignkey of reference '{}'", assoc.name);
    let foreign_keys = opts
        .foreign_keys
        .iter()
        .map(|fk| ctx.field(class, fk, context.as_str()))
        .collect::<MappingResult<Vec<_>>>()?;
    let primary_keys = ctx.primary_keys(target);
    check_key_match(
        class_name,
        &assoc.name,
        "foreignkey",
        &foreign_keys,
        &primary_keys,
    )?;

    if opts.database_foreign_key {
        if let (Some(local), Some(foreign)) =
            (ctx.infos[class.index()].table.as_deref(), ctx.uniform_table(target))
        {
            schema.add_foreign_key(local, foreign_key(foreign, &foreign_keys, &primary_keys));
        }
    }

    debug!(
        class = class_name,
        reference = %assoc.name,
        target = %target_name,
        "resolved reference"
    );

    Ok(ReferenceDescriptor {
        name: assoc.name.clone(),
        declared_in: ctx.name(assoc.declared_in).to_string(),
        class_ref: target_name,
        foreign_keys: opts.foreign_keys,
        database_foreign_key: opts.database_foreign_key,
        anonymous: assoc.java_type.is_none(),
        auto_retrieve: opts.auto_retrieve,
        auto_update: opts.auto_update,
        auto_delete: opts.auto_delete,
        otm_dependent: opts.otm_dependent,
        proxy: opts.proxy,
        proxy_prefetching_limit: opts.proxy_prefetching_limit,
        refresh: opts.refresh,
        documentation: opts.documentation,
    })
}

/// Resolve a 1:N or M:N collection held by `class`
pub(crate) fn resolve_collection(
    ctx: &AssociationContext<'_>,
    schema: &mut SchemaBuilder,
    class: ClassId,
    assoc: &EffectiveAssociation,
) -> MappingResult<CollectionDescriptor> {
    let class_name = ctx.name(class);
    let opts = CollectionOptions::parse(class_name, &assoc.tag)?;
    let (element, element_name) = resolve_element_class(ctx, class, assoc, &opts)?;

    if ctx.checks == ChecksMode::Strict {
        if let Some(declared) = &assoc.java_type {
            validate_collection_class(
                ctx.model,
                class_name,
                &assoc.name,
                declared,
                opts.collection_class.as_deref(),
            )?;
        }
    }

    let remote_foreign_keys = match &opts.indirection_table {
        None => {
            resolve_inverse_foreign_keys(ctx, schema, class, element, assoc, &opts)?;
            if !opts.remote_foreign_keys.is_empty() {
                warn!(
                    class = class_name,
                    collection = %assoc.name,
                    "ignoring remote-foreignkey on a collection without indirection-table"
                );
            }
            Vec::new()
        }
        Some(join_table) => {
            resolve_indirection_table(ctx, schema, class, element, assoc, &opts, join_table)?
        }
    };

    let orderby_context = format!("orderby of collection '{}'", assoc.name);
    for entry in &opts.orderby {
        ctx.field(element, &entry.field, orderby_context.as_str())?;
    }

    debug!(
        class = class_name,
        collection = %assoc.name,
        element = %element_name,
        many_to_many = opts.indirection_table.is_some(),
        "resolved collection"
    );

    Ok(CollectionDescriptor {
        name: assoc.name.clone(),
        declared_in: ctx.name(assoc.declared_in).to_string(),
        element_class_ref: element_name,
        collection_class: opts.collection_class,
        foreign_keys: opts.foreign_keys,
        remote_foreign_keys,
        indirection_table: opts.indirection_table,
        orderby: opts.orderby,
        query_customizer: opts.query_customizer,
        database_foreign_key: opts.database_foreign_key,
        auto_retrieve: opts.auto_retrieve,
        auto_update: opts.auto_update,
        auto_delete: opts.auto_delete,
        otm_dependent: opts.otm_dependent,
        proxy: opts.proxy,
        proxy_prefetching_limit: opts.proxy_prefetching_limit,
        refresh: opts.refresh,
        documentation: opts.documentation,
    })
}

/// Element class of a collection: explicit `element-class-ref`, else the
/// array element or last generic argument of the declared type
fn resolve_element_class(
    ctx: &AssociationContext<'_>,
    class: ClassId,
    assoc: &EffectiveAssociation,
    opts: &CollectionOptions,
) -> MappingResult<(ClassId, String)> {
    let class_name = ctx.name(class);
    let declared_element = assoc
        .java_type
        .as_deref()
        .and_then(|t| MemberType::parse(t).element_type());

    let Some(element_name) = opts
        .element_class_ref
        .clone()
        .or_else(|| declared_element.clone())
    else {
        return Err(MappingError::unresolved(
            class_name,
            "element class",
            "",
            format!(
                "collection '{}' has no element-class-ref and its declared type has no element type",
                assoc.name
            ),
        ));
    };

    let element = ctx.persistent_class(
        class_name,
        &element_name,
        format!("element class of collection '{}'", assoc.name),
    )?;

    if ctx.checks == ChecksMode::Strict {
        if let (Some(_), Some(declared)) = (&opts.element_class_ref, &declared_element) {
            if !ctx.model.are_compatible(&element_name, declared) {
                return Err(MappingError::TypeMismatch {
                    class: class_name.to_string(),
                    member: assoc.name.clone(),
                    message: format!(
                        "element-class-ref '{}' is not compatible with the declared element type '{}'",
                        element_name, declared
                    ),
                });
            }
        }
    }
    Ok((element, element_name))
}

/// 1:N: the foreign keys live on the element class and point at `class`
fn resolve_inverse_foreign_keys(
    ctx: &AssociationContext<'_>,
    schema: &mut SchemaBuilder,
    class: ClassId,
    element: ClassId,
    assoc: &EffectiveAssociation,
    opts: &CollectionOptions,
) -> MappingResult<()> {
    let class_name = ctx.name(class);
    let context = format!(
        "inverse foreignkey of collection '{}' in {}",
        assoc.name, class_name
    );
    let foreign_keys = opts
        .foreign_keys
        .iter()
        .map(|fk| ctx.field(element, fk, context.as_str()))
        .collect::<MappingResult<Vec<_>>>()?;
    let primary_keys = ctx.primary_keys(class);
    check_key_match(
        class_name,
        &assoc.name,
        "foreignkey",
        &foreign_keys,
        &primary_keys,
    )?;

    // Subclasses inheriting the collection from a persistent declarer add nothing
    if opts.database_foreign_key && ctx.owns_constraints(class, assoc) {
        if let (Some(local), Some(foreign)) = (
            ctx.infos[element.index()].table.as_deref(),
            ctx.uniform_table(class),
        ) {
            schema.add_foreign_key(local, foreign_key(foreign, &foreign_keys, &primary_keys));
        }
    }
    Ok(())
}

/// M:N: synthesize the join table and return the remote foreign keys
fn resolve_indirection_table(
    ctx: &AssociationContext<'_>,
    schema: &mut SchemaBuilder,
    class: ClassId,
    element: ClassId,
    assoc: &EffectiveAssociation,
    opts: &CollectionOptions,
    join_table: &str,
) -> MappingResult<Vec<String>> {
    let class_name = ctx.name(class);
    let reciprocal = find_reciprocal(ctx, element, assoc, join_table)?;

    let remote_foreign_keys = if !opts.remote_foreign_keys.is_empty() {
        opts.remote_foreign_keys.clone()
    } else if let Some(other) = &reciprocal {
        other.foreign_keys.clone()
    } else {
        return Err(MappingError::unresolved(
            class_name,
            "remote-foreignkey",
            join_table,
            format!(
                "collection '{}' gives no remote-foreignkey and {} declares no collection on the same indirection table",
                assoc.name,
                ctx.name(element)
            ),
        ));
    };

    if let Some(other) = &reciprocal {
        let mismatch = (!other.remote_foreign_keys.is_empty()
            && !same_columns(&other.remote_foreign_keys, &opts.foreign_keys))
            || (!opts.remote_foreign_keys.is_empty()
                && !same_columns(&opts.remote_foreign_keys, &other.foreign_keys));
        if mismatch {
            return Err(MappingError::conflict(
                class_name,
                format!(
                    "collection '{}' and its counterpart in {} disagree on the columns of indirection table '{}'",
                    assoc.name,
                    ctx.name(element),
                    join_table
                ),
            ));
        }
    }

    if let Some(shared) = opts
        .foreign_keys
        .iter()
        .find(|fk| remote_foreign_keys.iter().any(|r| r.eq_ignore_ascii_case(fk)))
    {
        return Err(MappingError::conflict(
            class_name,
            format!(
                "column '{}' of indirection table '{}' is used for both sides of collection '{}'",
                shared, join_table, assoc.name
            ),
        ));
    }

    let owner_keys = ctx.primary_keys(class);
    let element_keys = ctx.primary_keys(element);
    check_arity(
        class_name,
        &assoc.name,
        "foreignkey",
        opts.foreign_keys.len(),
        owner_keys.len(),
    )?;
    check_arity(
        class_name,
        &assoc.name,
        "remote-foreignkey",
        remote_foreign_keys.len(),
        element_keys.len(),
    )?;

    schema.add_table(join_table, opts.indirection_table_documentation.as_deref());
    for (column, pk) in opts
        .foreign_keys
        .iter()
        .zip(&owner_keys)
        .chain(remote_foreign_keys.iter().zip(&element_keys))
    {
        schema.add_column(
            join_table,
            join_column(column, pk, opts.indirection_table_primary_keys),
            class_name,
        )?;
    }

    if opts.database_foreign_key && ctx.owns_constraints(class, assoc) {
        if let Some(owner_table) = ctx.uniform_table(class) {
            schema.add_foreign_key(
                join_table,
                ForeignKey {
                    foreign_table: owner_table.to_string(),
                    references: column_pairs(&opts.foreign_keys, &owner_keys),
                },
            );
        }
        if let Some(element_table) = ctx.uniform_table(element) {
            schema.add_foreign_key(
                join_table,
                ForeignKey {
                    foreign_table: element_table.to_string(),
                    references: column_pairs(&remote_foreign_keys, &element_keys),
                },
            );
        }
    }
    Ok(remote_foreign_keys)
}

/// The collection on the element class that shares the indirection table
fn find_reciprocal(
    ctx: &AssociationContext<'_>,
    element: ClassId,
    assoc: &EffectiveAssociation,
    join_table: &str,
) -> MappingResult<Option<CollectionOptions>> {
    let element_name = ctx.name(element);
    for other in &ctx.members[element.index()].associations {
        if other.kind != MemberKind::Collection {
            continue;
        }
        // The collection itself, possibly inherited by the element class
        if other.name == assoc.name && other.declared_in == assoc.declared_in {
            continue;
        }
        let other_opts = CollectionOptions::parse(element_name, &other.tag)?;
        let same_table = other_opts
            .indirection_table
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(join_table));
        if same_table {
            return Ok(Some(other_opts));
        }
    }
    Ok(None)
}

fn same_columns(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

fn check_arity(
    class_name: &str,
    member: &str,
    label: &'static str,
    keys: usize,
    primary_keys: usize,
) -> MappingResult<()> {
    if keys != primary_keys {
        return Err(MappingError::ArityMismatch {
            class: class_name.to_string(),
            member: member.to_string(),
            left_label: label,
            left: keys,
            right_label: "primary key",
            right: primary_keys,
        });
    }
    Ok(())
}

/// Equal length and positionally equal JDBC types
fn check_key_match(
    class_name: &str,
    member: &str,
    label: &'static str,
    keys: &[&FieldDescriptor],
    primary_keys: &[&FieldDescriptor],
) -> MappingResult<()> {
    check_arity(class_name, member, label, keys.len(), primary_keys.len())?;
    for (key, pk) in keys.iter().zip(primary_keys) {
        if key.jdbc_type != pk.jdbc_type {
            return Err(MappingError::TypeMismatch {
                class: class_name.to_string(),
                member: member.to_string(),
                message: format!(
                    "foreign key '{}' is {} but primary key '{}' of {} is {}",
                    key.name, key.jdbc_type, pk.name, pk.declared_in, pk.jdbc_type
                ),
            });
        }
    }
    Ok(())
}

fn foreign_key(
    foreign_table: &str,
    keys: &[&FieldDescriptor],
    primary_keys: &[&FieldDescriptor],
) -> ForeignKey {
    ForeignKey {
        foreign_table: foreign_table.to_string(),
        references: keys
            .iter()
            .zip(primary_keys)
            .map(|(k, pk)| (k.column.clone(), pk.column.clone()))
            .collect(),
    }
}

fn column_pairs(columns: &[String], primary_keys: &[&FieldDescriptor]) -> Vec<(String, String)> {
    columns
        .iter()
        .zip(primary_keys)
        .map(|(c, pk)| (c.clone(), pk.column.clone()))
        .collect()
}

/// Join-table column typed after the primary key it points at
fn join_column(name: &str, pk: &FieldDescriptor, primary_key: bool) -> Column {
    Column {
        name: name.to_string(),
        jdbc_type: pk.jdbc_type,
        size: column_size(pk),
        primary_key,
        required: primary_key,
        auto_increment: false,
        default_value: None,
        description: None,
    }
}
