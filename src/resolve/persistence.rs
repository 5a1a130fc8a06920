//! Persistence participation and extent resolution
//!
//! Decides for every class whether it carries mapping metadata, whether it
//! owns a table, and which persistent subtypes are listed as its extents.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{MappingError, MappingResult};
use crate::model::declarations::{simple_name, TAG_CLASS, TAG_EXTENT_CLASS};
use crate::model::options::{ClassOptions, OptionReader};
use crate::model::{ClassId, HierarchyModel};

/// Persistence facts of one class
#[derive(Debug, Clone)]
pub(crate) struct ClassInfo {
    pub id: ClassId,
    /// Parsed `ojb.class` options, defaults when the class has no marker
    pub options: ClassOptions,
    pub has_marker: bool,
    pub persistent: bool,
    /// `None` for non-persistent and metadata-only classes
    pub table: Option<String>,
    pub extents: Vec<ClassId>,
}

impl ClassInfo {
    /// Whether the marker on this class enables persistence for its subtypes
    fn enables_persistence(&self) -> bool {
        self.has_marker && self.options.generate_repository_info
    }
}

pub(crate) fn resolve_persistence(model: &HierarchyModel) -> MappingResult<Vec<ClassInfo>> {
    if let Some(id) = model.find_supertype_cycle() {
        return Err(MappingError::conflict(
            model.name(id),
            "class is part of a supertype cycle",
        ));
    }

    let mut infos = Vec::with_capacity(model.len());
    for node in model.classes() {
        let marker = node.decl.tag(TAG_CLASS);
        let options = match marker {
            Some(tag) => ClassOptions::parse(node.name(), tag)?,
            None => ClassOptions::default(),
        };
        infos.push(ClassInfo {
            id: node.id,
            options,
            has_marker: marker.is_some(),
            persistent: false,
            table: None,
            extents: Vec::new(),
        });
    }

    for id in model.ids() {
        let persistent = if infos[id.index()].has_marker {
            infos[id.index()].options.generate_repository_info
        } else {
            model
                .supertype_chain(id)
                .iter()
                .any(|sup| infos[sup.index()].enables_persistence())
        };
        let info = &mut infos[id.index()];
        info.persistent = persistent;
        if persistent && info.options.generate_table_info {
            info.table = Some(
                info.options
                    .table
                    .clone()
                    .unwrap_or_else(|| simple_name(model.name(id)).to_string()),
            );
        }
    }

    let persistent: Vec<bool> = infos.iter().map(|i| i.persistent).collect();
    for id in model.ids() {
        if !persistent[id.index()] {
            continue;
        }
        let extents = resolve_extents(model, &persistent, id, &infos[id.index()].options)?;
        debug!(
            class = model.name(id),
            persistent = true,
            table = ?infos[id.index()].table,
            extents = extents.len(),
            "resolved persistence"
        );
        infos[id.index()].extents = extents;
    }

    Ok(infos)
}

fn resolve_extents(
    model: &HierarchyModel,
    persistent: &[bool],
    id: ClassId,
    options: &ClassOptions,
) -> MappingResult<Vec<ClassId>> {
    let mut extents = Vec::new();
    if options.determine_extents {
        let mut seen = HashSet::new();
        collect_persistent_subtypes(model, persistent, id, &mut seen, &mut extents);
    }

    let class_name = model.name(id);
    for tag in model.node(id).decl.tags_named(TAG_EXTENT_CLASS) {
        let reader = OptionReader::new(class_name, tag);
        let target = reader.required("class-ref", "an extent class needs a class-ref")?;
        let extent = model
            .get_class(&target)
            .filter(|ext| *ext != id && persistent[ext.index()] && model.is_subtype_of(*ext, id))
            .ok_or_else(|| {
                MappingError::unresolved(
                    class_name,
                    "extent class",
                    &target,
                    "not a persistent subtype of the declaring class",
                )
            })?;
        if !extents.contains(&extent) {
            extents.push(extent);
        }
    }
    Ok(extents)
}

/// Depth-first preorder walk over direct subtypes, listing persistent ones
fn collect_persistent_subtypes(
    model: &HierarchyModel,
    persistent: &[bool],
    id: ClassId,
    seen: &mut HashSet<ClassId>,
    out: &mut Vec<ClassId>,
) {
    for &sub in model.direct_subtypes(id) {
        if !seen.insert(sub) {
            continue;
        }
        if persistent[sub.index()] {
            out.push(sub);
        }
        collect_persistent_subtypes(model, persistent, sub, seen, out);
    }
}
