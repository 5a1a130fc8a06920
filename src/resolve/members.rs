//! Effective member computation
//!
//! For every class the inherited members are merged from the direct
//! supertypes (superclass first), modify-inherited patches are applied to
//! them, own declarations are appended (replacing inherited members of the
//! same name), nested objects are expanded, and finally fields carrying an
//! `id` ordering key are reordered. Results are memoized per class and
//! computed supertype-first.
//!
//! Members stay in raw tag form here; typed parsing happens later so that a
//! patch that restates an inherited value is indistinguishable from no patch.
//!
//! An empty override value on an option resets it to its default. The member
//! itself is removed by an empty (or `true`) `ignore` override.

use std::collections::BTreeSet;
use std::rc::Rc;

use tracing::debug;

use crate::error::{MappingError, MappingResult};
use crate::model::declarations::{TAG_MODIFY_INHERITED, TAG_MODIFY_NESTED};
use crate::model::options::{OptionReader, PATCH_CONTROL_KEYS};
use crate::model::{ClassId, HierarchyModel, MemberKind, MemberType, Tag};

use super::persistence::ClassInfo;

/// Separator between a nested member and the nested field name
pub const NESTED_SEPARATOR: &str = "::";

#[derive(Debug, Clone)]
pub(crate) struct EffectiveField {
    pub name: String,
    pub declared_in: ClassId,
    /// `None` for anonymous fields
    pub java_type: Option<String>,
    pub tag: Tag,
    /// Column used when the options do not name one (nested fields)
    pub default_column: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct EffectiveAssociation {
    pub name: String,
    pub kind: MemberKind,
    pub declared_in: ClassId,
    /// `None` for anonymous references
    pub java_type: Option<String>,
    pub tag: Tag,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EffectiveMembers {
    pub fields: Vec<EffectiveField>,
    pub associations: Vec<EffectiveAssociation>,
    /// Names removed by an `ignore` override somewhere up the chain
    pub suppressed: BTreeSet<String>,
}

impl EffectiveMembers {
    pub fn field(&self, name: &str) -> Option<&EffectiveField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_suppressed(&self, name: &str) -> bool {
        self.suppressed.contains(name)
    }
}

/// Compute effective members for every class in the hierarchy
pub(crate) fn compute_members(
    model: &HierarchyModel,
    infos: &[ClassInfo],
) -> MappingResult<Vec<Rc<EffectiveMembers>>> {
    let mut table = MemberTable {
        model,
        infos,
        memo: vec![None; model.len()],
        visiting: vec![false; model.len()],
    };
    let mut all = Vec::with_capacity(model.len());
    for id in model.ids() {
        all.push(table.get(id)?);
    }
    Ok(all)
}

struct MemberTable<'m> {
    model: &'m HierarchyModel,
    infos: &'m [ClassInfo],
    memo: Vec<Option<Rc<EffectiveMembers>>>,
    visiting: Vec<bool>,
}

impl MemberTable<'_> {
    fn get(&mut self, id: ClassId) -> MappingResult<Rc<EffectiveMembers>> {
        if let Some(done) = &self.memo[id.index()] {
            return Ok(Rc::clone(done));
        }
        if self.visiting[id.index()] {
            return Err(MappingError::conflict(
                self.model.name(id),
                "nested objects form a cycle",
            ));
        }
        self.visiting[id.index()] = true;
        let members = Rc::new(self.compute(id)?);
        self.visiting[id.index()] = false;
        self.memo[id.index()] = Some(Rc::clone(&members));
        Ok(members)
    }

    fn compute(&mut self, id: ClassId) -> MappingResult<EffectiveMembers> {
        let class_name = self.model.name(id).to_string();
        let mut members = EffectiveMembers::default();

        if self.infos[id.index()].options.include_inherited {
            for sup in self.model.declared_supertypes(id) {
                let inherited = self.get(sup)?;
                for field in &inherited.fields {
                    if members.field(&field.name).is_none() {
                        members.fields.push(field.clone());
                    }
                }
                for assoc in &inherited.associations {
                    if !members.associations.iter().any(|a| a.name == assoc.name) {
                        members.associations.push(assoc.clone());
                    }
                }
                members.suppressed.extend(inherited.suppressed.iter().cloned());
            }
        }

        self.apply_inherited_patches(id, &class_name, &mut members)?;
        self.add_own_members(id, &class_name, &mut members)?;
        self.apply_nested_patches(id, &class_name, &mut members)?;

        let mut keyed = Vec::with_capacity(members.fields.len());
        for field in &members.fields {
            keyed.push(OptionReader::new(&class_name, &field.tag).i32("id")?);
        }
        let fields = std::mem::take(&mut members.fields);
        members.fields = order_by_keys(fields.into_iter().zip(keyed).collect());

        debug!(
            class = %class_name,
            fields = members.fields.len(),
            associations = members.associations.len(),
            "computed effective members"
        );
        Ok(members)
    }

    fn apply_inherited_patches(
        &self,
        id: ClassId,
        class_name: &str,
        members: &mut EffectiveMembers,
    ) -> MappingResult<()> {
        for patch in self.model.node(id).decl.tags_named(TAG_MODIFY_INHERITED) {
            let reader = OptionReader::new(class_name, patch);
            let name = reader.required("name", "modify-inherited needs the member name")?;
            let ignore = suppresses(patch, &reader)?;

            if let Some(pos) = members.fields.iter().position(|f| f.name == name) {
                if ignore {
                    members.fields.remove(pos);
                    members.suppressed.insert(name);
                } else {
                    apply_patch(&mut members.fields[pos].tag, patch);
                }
            } else if let Some(pos) = members.associations.iter().position(|a| a.name == name) {
                if ignore {
                    members.associations.remove(pos);
                    members.suppressed.insert(name);
                } else {
                    apply_patch(&mut members.associations[pos].tag, patch);
                }
            } else {
                return Err(MappingError::conflict(
                    class_name,
                    format!("modify-inherited names '{}', which is not an inherited member", name),
                ));
            }
        }
        Ok(())
    }

    fn add_own_members(
        &mut self,
        id: ClassId,
        class_name: &str,
        members: &mut EffectiveMembers,
    ) -> MappingResult<()> {
        let model = self.model;
        let mut own_fields: Vec<EffectiveField> = Vec::new();
        let mut own_assocs: Vec<EffectiveAssociation> = Vec::new();

        for declared in model.declared_mappings(id) {
            if declared.name.trim().is_empty() {
                return Err(MappingError::InvalidOptionValue {
                    class: class_name.to_string(),
                    tag: declared.tag.name.clone(),
                    option: "name".to_string(),
                    value: String::new(),
                    reason: "anonymous declarations need a name".to_string(),
                });
            }
            let name = declared.name.trim().to_string();
            let java_type = declared.java_type().map(str::to_string);

            match declared.kind {
                MemberKind::Field => {
                    push_unique_field(
                        class_name,
                        &mut own_fields,
                        EffectiveField {
                            name,
                            declared_in: id,
                            java_type,
                            tag: declared.tag.clone(),
                            default_column: None,
                        },
                    )?;
                }
                MemberKind::Nested => {
                    let nested_type = MemberType::parse(declared.java_type().unwrap_or(""));
                    let type_name = nested_type.raw_name();
                    let Some(nested_id) = model.get_class(&type_name) else {
                        return Err(MappingError::unresolved(
                            class_name,
                            "nested class",
                            &type_name,
                            format!("nested member '{}'", name),
                        ));
                    };
                    let nested = self.get(nested_id)?;
                    for inner in &nested.fields {
                        let mut tag = inner.tag.clone();
                        let base_column = tag
                            .get("column")
                            .map(str::to_string)
                            .filter(|c| !c.trim().is_empty())
                            .or_else(|| inner.default_column.clone())
                            .unwrap_or_else(|| inner.name.replace(NESTED_SEPARATOR, "_"));
                        tag.remove("column");
                        push_unique_field(
                            class_name,
                            &mut own_fields,
                            EffectiveField {
                                name: format!("{}{}{}", name, NESTED_SEPARATOR, inner.name),
                                declared_in: id,
                                java_type: inner.java_type.clone(),
                                tag,
                                default_column: Some(format!("{}_{}", name, base_column)),
                            },
                        )?;
                    }
                }
                MemberKind::Reference | MemberKind::Collection => {
                    if own_assocs.iter().any(|a| a.name == name) {
                        return Err(MappingError::conflict(
                            class_name,
                            format!("member '{}' is declared more than once", name),
                        ));
                    }
                    own_assocs.push(EffectiveAssociation {
                        name,
                        kind: declared.kind,
                        declared_in: id,
                        java_type,
                        tag: declared.tag.clone(),
                    });
                }
            }
        }

        for field in own_fields {
            members.fields.retain(|f| f.name != field.name);
            members.suppressed.remove(&field.name);
            members.fields.push(field);
        }
        for assoc in own_assocs {
            members.associations.retain(|a| a.name != assoc.name);
            members.suppressed.remove(&assoc.name);
            members.associations.push(assoc);
        }
        Ok(())
    }

    fn apply_nested_patches(
        &self,
        id: ClassId,
        class_name: &str,
        members: &mut EffectiveMembers,
    ) -> MappingResult<()> {
        for patch in self.model.node(id).decl.tags_named(TAG_MODIFY_NESTED) {
            let reader = OptionReader::new(class_name, patch);
            let name = reader.required("name", "modify-nested needs the nested field name")?;
            let ignore = suppresses(patch, &reader)?;
            let Some(pos) = members
                .fields
                .iter()
                .position(|f| f.name == name && f.name.contains(NESTED_SEPARATOR))
            else {
                return Err(MappingError::conflict(
                    class_name,
                    format!("modify-nested names '{}', which is not a nested field", name),
                ));
            };
            if ignore {
                members.fields.remove(pos);
                members.suppressed.insert(name);
            } else {
                apply_patch(&mut members.fields[pos].tag, patch);
            }
        }
        Ok(())
    }
}

fn push_unique_field(
    class_name: &str,
    fields: &mut Vec<EffectiveField>,
    field: EffectiveField,
) -> MappingResult<()> {
    if fields.iter().any(|f| f.name == field.name) {
        return Err(MappingError::conflict(
            class_name,
            format!("field '{}' is declared more than once", field.name),
        ));
    }
    fields.push(field);
    Ok(())
}

/// Whether a patch removes its member: `ignore` given empty or `true`
fn suppresses(patch: &Tag, reader: &OptionReader<'_>) -> MappingResult<bool> {
    match patch.get("ignore") {
        Some(value) if value.trim().is_empty() => Ok(true),
        _ => reader.bool_or("ignore", false),
    }
}

/// Apply a sparse patch: non-empty values override, empty values reset to default
pub(crate) fn apply_patch(target: &mut Tag, patch: &Tag) {
    for (key, value) in &patch.attributes {
        if PATCH_CONTROL_KEYS.contains(&key.as_str()) {
            continue;
        }
        if value.trim().is_empty() {
            target.remove(key);
        } else {
            target.set(key.clone(), value.clone());
        }
    }
}

/// Reorder items carrying an ordering key.
///
/// Keyed items keep the slots they occupy but those slots are refilled in
/// ascending key order (stable on ties). Unkeyed items never move.
pub(crate) fn order_by_keys<T>(items: Vec<(T, Option<i32>)>) -> Vec<T> {
    let mut slots: Vec<Option<T>> = Vec::with_capacity(items.len());
    let mut positions = Vec::new();
    let mut keyed = Vec::new();
    for (idx, (item, key)) in items.into_iter().enumerate() {
        match key {
            Some(k) => {
                positions.push(idx);
                keyed.push((k, item));
                slots.push(None);
            }
            None => slots.push(Some(item)),
        }
    }
    keyed.sort_by_key(|(k, _)| *k);
    for (pos, (_, item)) in positions.into_iter().zip(keyed) {
        slots[pos] = Some(item);
    }
    slots.into_iter().flatten().collect()
}
