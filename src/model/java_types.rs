//! Declared member types and the built-in library type registry
//!
//! Member types arrive as plain strings (`int`, `test.B[]`,
//! `java.util.List<test.B>`). They are parsed into [`MemberType`] so the
//! resolver can derive collection element types and container kinds.
//! Library types that never appear in the declaration set (the JDK
//! collections, the ORM's manageable collections) are described by a static
//! registry so subtype checks can cross into them.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";
pub const JAVA_UTIL_COLLECTION: &str = "java.util.Collection";
pub const JAVA_UTIL_LIST: &str = "java.util.List";
pub const JAVA_UTIL_SET: &str = "java.util.Set";
pub const JAVA_UTIL_MAP: &str = "java.util.Map";
pub const MANAGEABLE_COLLECTION: &str = "org.apache.ojb.broker.ManageableCollection";

/// Collection implementations permitted for array-typed members
pub const ARRAY_BACKED_COLLECTIONS: &[&str] = &[
    "org.apache.ojb.broker.util.collections.ManageableArrayList",
    "org.apache.ojb.broker.util.collections.ManageableVector",
];

static GENERIC_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([\w.$]+)\s*<(.*)>\s*$").unwrap());

/// A parsed member type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberType {
    /// Plain class or primitive type
    Scalar(String),
    /// `T[]`
    Array(Box<MemberType>),
    /// `Container<A, B>`
    Generic {
        container: String,
        arguments: Vec<MemberType>,
    },
}

impl MemberType {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(element) = trimmed.strip_suffix("[]") {
            return MemberType::Array(Box::new(MemberType::parse(element)));
        }
        if let Some(caps) = GENERIC_TYPE_RE.captures(trimmed) {
            let container = caps[1].to_string();
            let arguments = split_type_arguments(&caps[2])
                .into_iter()
                .map(MemberType::parse)
                .collect();
            return MemberType::Generic {
                container,
                arguments,
            };
        }
        MemberType::Scalar(trimmed.to_string())
    }

    /// The erased type name: container for generics, `T[]` for arrays
    pub fn raw_name(&self) -> String {
        match self {
            MemberType::Scalar(name) => name.clone(),
            MemberType::Array(element) => format!("{}[]", element.raw_name()),
            MemberType::Generic { container, .. } => container.clone(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, MemberType::Array(_))
    }

    /// Element type name of an array or of a parameterized container.
    ///
    /// For multi-argument containers (maps) the last argument is used.
    pub fn element_type(&self) -> Option<String> {
        match self {
            MemberType::Array(element) => Some(element.raw_name()),
            MemberType::Generic { arguments, .. } => arguments.last().map(|a| a.raw_name()),
            MemberType::Scalar(_) => None,
        }
    }
}

/// Split `A, Map<B, C>` on top-level commas only
fn split_type_arguments(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in raw.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(raw[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    let last = raw[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

/// Library type known without a declaration
#[derive(Debug, Clone, Copy)]
pub struct BuiltinType {
    pub name: &'static str,
    pub is_interface: bool,
    pub supertypes: &'static [&'static str],
}

const BUILTIN_TYPES: &[BuiltinType] = &[
    BuiltinType {
        name: JAVA_LANG_OBJECT,
        is_interface: false,
        supertypes: &[],
    },
    BuiltinType {
        name: "java.lang.Iterable",
        is_interface: true,
        supertypes: &[],
    },
    BuiltinType {
        name: JAVA_UTIL_COLLECTION,
        is_interface: true,
        supertypes: &["java.lang.Iterable"],
    },
    BuiltinType {
        name: JAVA_UTIL_LIST,
        is_interface: true,
        supertypes: &[JAVA_UTIL_COLLECTION],
    },
    BuiltinType {
        name: JAVA_UTIL_SET,
        is_interface: true,
        supertypes: &[JAVA_UTIL_COLLECTION],
    },
    BuiltinType {
        name: "java.util.SortedSet",
        is_interface: true,
        supertypes: &[JAVA_UTIL_SET],
    },
    BuiltinType {
        name: JAVA_UTIL_MAP,
        is_interface: true,
        supertypes: &[],
    },
    BuiltinType {
        name: "java.util.SortedMap",
        is_interface: true,
        supertypes: &[JAVA_UTIL_MAP],
    },
    BuiltinType {
        name: "java.util.AbstractCollection",
        is_interface: false,
        supertypes: &[JAVA_UTIL_COLLECTION],
    },
    BuiltinType {
        name: "java.util.AbstractList",
        is_interface: false,
        supertypes: &["java.util.AbstractCollection", JAVA_UTIL_LIST],
    },
    BuiltinType {
        name: "java.util.ArrayList",
        is_interface: false,
        supertypes: &["java.util.AbstractList", JAVA_UTIL_LIST],
    },
    BuiltinType {
        name: "java.util.LinkedList",
        is_interface: false,
        supertypes: &["java.util.AbstractList", JAVA_UTIL_LIST],
    },
    BuiltinType {
        name: "java.util.Vector",
        is_interface: false,
        supertypes: &["java.util.AbstractList", JAVA_UTIL_LIST],
    },
    BuiltinType {
        name: "java.util.AbstractSet",
        is_interface: false,
        supertypes: &["java.util.AbstractCollection", JAVA_UTIL_SET],
    },
    BuiltinType {
        name: "java.util.HashSet",
        is_interface: false,
        supertypes: &["java.util.AbstractSet", JAVA_UTIL_SET],
    },
    BuiltinType {
        name: "java.util.LinkedHashSet",
        is_interface: false,
        supertypes: &["java.util.HashSet", JAVA_UTIL_SET],
    },
    BuiltinType {
        name: "java.util.TreeSet",
        is_interface: false,
        supertypes: &["java.util.AbstractSet", "java.util.SortedSet"],
    },
    BuiltinType {
        name: "java.util.AbstractMap",
        is_interface: false,
        supertypes: &[JAVA_UTIL_MAP],
    },
    BuiltinType {
        name: "java.util.HashMap",
        is_interface: false,
        supertypes: &["java.util.AbstractMap", JAVA_UTIL_MAP],
    },
    BuiltinType {
        name: "java.util.TreeMap",
        is_interface: false,
        supertypes: &["java.util.AbstractMap", "java.util.SortedMap"],
    },
    BuiltinType {
        name: "java.util.Hashtable",
        is_interface: false,
        supertypes: &[JAVA_UTIL_MAP],
    },
    BuiltinType {
        name: MANAGEABLE_COLLECTION,
        is_interface: true,
        supertypes: &[],
    },
    BuiltinType {
        name: "org.apache.ojb.broker.util.collections.ManageableArrayList",
        is_interface: false,
        supertypes: &["java.util.ArrayList", MANAGEABLE_COLLECTION],
    },
    BuiltinType {
        name: "org.apache.ojb.broker.util.collections.ManageableVector",
        is_interface: false,
        supertypes: &["java.util.Vector", MANAGEABLE_COLLECTION],
    },
    BuiltinType {
        name: "org.apache.ojb.broker.util.collections.ManageableHashSet",
        is_interface: false,
        supertypes: &["java.util.HashSet", MANAGEABLE_COLLECTION],
    },
    BuiltinType {
        name: "org.apache.ojb.broker.util.collections.RemovalAwareCollection",
        is_interface: false,
        supertypes: &["org.apache.ojb.broker.util.collections.ManageableVector"],
    },
    BuiltinType {
        name: "org.apache.ojb.broker.util.collections.RemovalAwareList",
        is_interface: false,
        supertypes: &["org.apache.ojb.broker.util.collections.ManageableArrayList"],
    },
    BuiltinType {
        name: "org.apache.ojb.broker.util.collections.RemovalAwareSet",
        is_interface: false,
        supertypes: &["org.apache.ojb.broker.util.collections.ManageableHashSet"],
    },
];

static BUILTIN_INDEX: Lazy<HashMap<&'static str, &'static BuiltinType>> =
    Lazy::new(|| BUILTIN_TYPES.iter().map(|t| (t.name, t)).collect());

/// Look up a library type by qualified name
pub fn builtin_type(name: &str) -> Option<&'static BuiltinType> {
    BUILTIN_INDEX.get(name).copied()
}

/// Whether `sub` is `sup` or one of its library subtypes
pub fn builtin_is_subtype(sub: &str, sup: &str) -> bool {
    if sub == sup {
        return true;
    }
    match builtin_type(sub) {
        Some(t) => t.supertypes.iter().any(|s| builtin_is_subtype(s, sup)),
        None => false,
    }
}
