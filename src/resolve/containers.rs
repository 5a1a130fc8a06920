//! Backing collection class validation
//!
//! Only applied in strict mode. The declared static type of a collection
//! member decides which implementations a `collection-class` may name.

use crate::error::{MappingError, MappingResult};
use crate::model::java_types::{
    ARRAY_BACKED_COLLECTIONS, JAVA_UTIL_COLLECTION, JAVA_UTIL_LIST, JAVA_UTIL_MAP, JAVA_UTIL_SET,
    MANAGEABLE_COLLECTION,
};
use crate::model::{HierarchyModel, MemberType};

/// Static container kind of a collection member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    Array,
    List,
    Set,
    Map,
    Collection,
    Other,
}

impl ContainerKind {
    pub fn of(model: &HierarchyModel, declared: &MemberType) -> Self {
        if declared.is_array() {
            return ContainerKind::Array;
        }
        let raw = declared.raw_name();
        if model.is_subtype_name(&raw, JAVA_UTIL_LIST) {
            ContainerKind::List
        } else if model.is_subtype_name(&raw, JAVA_UTIL_SET) {
            ContainerKind::Set
        } else if model.is_subtype_name(&raw, JAVA_UTIL_MAP) {
            ContainerKind::Map
        } else if model.is_subtype_name(&raw, JAVA_UTIL_COLLECTION) {
            ContainerKind::Collection
        } else {
            ContainerKind::Other
        }
    }

    /// Library interface an implementation must satisfy
    fn required_interface(&self) -> Option<&'static str> {
        match self {
            ContainerKind::List => Some(JAVA_UTIL_LIST),
            ContainerKind::Set => Some(JAVA_UTIL_SET),
            ContainerKind::Map => Some(JAVA_UTIL_MAP),
            ContainerKind::Collection => Some(JAVA_UTIL_COLLECTION),
            ContainerKind::Array | ContainerKind::Other => None,
        }
    }
}

/// Check a collection member's declared type against its `collection-class`
pub(crate) fn validate_collection_class(
    model: &HierarchyModel,
    class_name: &str,
    member: &str,
    declared_type: &str,
    collection_class: Option<&str>,
) -> MappingResult<()> {
    let declared = MemberType::parse(declared_type);
    let kind = ContainerKind::of(model, &declared);
    let incompatible = |collection_class: &str, message: String| {
        MappingError::ContainerCompatibility {
            class: class_name.to_string(),
            member: member.to_string(),
            collection_class: collection_class.to_string(),
            message,
        }
    };

    let Some(collection_class) = collection_class else {
        let raw = declared.raw_name();
        if kind == ContainerKind::Other && !model.is_subtype_name(&raw, MANAGEABLE_COLLECTION) {
            return Err(incompatible(
                &raw,
                "is neither a java.util collection nor a ManageableCollection".to_string(),
            ));
        }
        return Ok(());
    };

    if !model.type_exists(collection_class) {
        return Err(MappingError::unresolved(
            class_name,
            "collection class",
            collection_class,
            format!("collection '{}'", member),
        ));
    }
    if !model.is_subtype_name(collection_class, MANAGEABLE_COLLECTION) {
        return Err(incompatible(
            collection_class,
            format!("does not implement {}", MANAGEABLE_COLLECTION),
        ));
    }

    match kind {
        ContainerKind::Array => {
            if !ARRAY_BACKED_COLLECTIONS.contains(&collection_class.trim()) {
                return Err(incompatible(
                    collection_class,
                    format!(
                        "cannot back an array member; use one of {}",
                        ARRAY_BACKED_COLLECTIONS.join(", ")
                    ),
                ));
            }
        }
        ContainerKind::Other => {
            let raw = declared.raw_name();
            if !model.is_subtype_name(collection_class, &raw) {
                return Err(incompatible(
                    collection_class,
                    format!("is not assignable to the declared type {}", raw),
                ));
            }
        }
        _ => {
            if let Some(required) = kind.required_interface() {
                if !model.is_subtype_name(collection_class, required) {
                    return Err(incompatible(
                        collection_class,
                        format!("does not implement {} required by the declared type", required),
                    ));
                }
            }
        }
    }
    Ok(())
}
