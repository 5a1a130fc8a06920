//! In-memory class hierarchy
//!
//! Classes live in an arena addressed by [`ClassId`]. The model mirrors the
//! declarations structurally; it performs no mapping validation. The only
//! thing rejected at construction is a duplicate class name, since lookups
//! by name would otherwise be ambiguous.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{MappingError, MappingResult};

use super::declarations::{
    ClassDecl, ClassKind, MemberDecl, Tag, TAG_COLLECTION, TAG_FIELD, TAG_NESTED, TAG_REFERENCE,
};
use super::java_types::{builtin_is_subtype, builtin_type, JAVA_LANG_OBJECT};

/// Stable index of a class in the hierarchy arena (declaration order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Supertype edge target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A class present in the declaration set
    Declared(ClassId),
    /// A library type outside the declaration set
    External(String),
}

/// One class or interface
#[derive(Debug, Clone)]
pub struct ClassNode {
    pub id: ClassId,
    pub decl: ClassDecl,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
}

impl ClassNode {
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn is_interface(&self) -> bool {
        self.decl.kind == ClassKind::Interface
    }

    /// Superclass first, then interfaces in declared order
    pub fn direct_supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }
}

/// Kind of a declared mapping member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Reference,
    Collection,
    Nested,
}

impl MemberKind {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            TAG_FIELD => Some(MemberKind::Field),
            TAG_REFERENCE => Some(MemberKind::Reference),
            TAG_COLLECTION => Some(MemberKind::Collection),
            TAG_NESTED => Some(MemberKind::Nested),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemberKind::Field => "field",
            MemberKind::Reference => "reference",
            MemberKind::Collection => "collection",
            MemberKind::Nested => "nested object",
        }
    }
}

/// A mapping declaration, either on a source member or anonymous on the class
#[derive(Debug, Clone, Copy)]
pub struct DeclaredMember<'a> {
    pub name: &'a str,
    pub kind: MemberKind,
    pub tag: &'a Tag,
    /// Backing source member; `None` for anonymous declarations
    pub member: Option<&'a MemberDecl>,
}

impl DeclaredMember<'_> {
    pub fn is_anonymous(&self) -> bool {
        self.member.is_none()
    }

    pub fn java_type(&self) -> Option<&str> {
        self.member.map(|m| m.java_type.as_str())
    }
}

/// The hierarchy arena
#[derive(Debug, Clone, Default)]
pub struct HierarchyModel {
    classes: Vec<ClassNode>,
    by_name: HashMap<String, ClassId>,
    subtypes: Vec<Vec<ClassId>>,
}

impl HierarchyModel {
    /// Build the arena from declarations, keeping their order
    pub fn from_declarations(decls: Vec<ClassDecl>) -> MappingResult<Self> {
        let mut by_name = HashMap::with_capacity(decls.len());
        for (idx, decl) in decls.iter().enumerate() {
            if by_name.insert(decl.name.clone(), ClassId(idx)).is_some() {
                return Err(MappingError::conflict(
                    &decl.name,
                    "class is declared more than once",
                ));
            }
        }

        let to_ref = |name: &str| match by_name.get(name) {
            Some(id) => TypeRef::Declared(*id),
            None => TypeRef::External(name.to_string()),
        };

        let mut classes = Vec::with_capacity(decls.len());
        for (idx, decl) in decls.into_iter().enumerate() {
            let superclass = decl.superclass.as_deref().map(to_ref);
            let interfaces = decl.interfaces.iter().map(|i| to_ref(i)).collect();
            classes.push(ClassNode {
                id: ClassId(idx),
                decl,
                superclass,
                interfaces,
            });
        }

        let mut subtypes = vec![Vec::new(); classes.len()];
        for node in &classes {
            for sup in node.direct_supertypes() {
                if let TypeRef::Declared(sup_id) = sup {
                    if !subtypes[sup_id.0].contains(&node.id) {
                        subtypes[sup_id.0].push(node.id);
                    }
                }
            }
        }

        Ok(Self {
            classes,
            by_name,
            subtypes,
        })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All classes in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.classes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId)
    }

    pub fn node(&self, id: ClassId) -> &ClassNode {
        &self.classes[id.0]
    }

    pub fn name(&self, id: ClassId) -> &str {
        &self.classes[id.0].decl.name
    }

    pub fn get_class(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name.trim()).copied()
    }

    /// Direct supertypes that are part of the declaration set
    pub fn declared_supertypes(&self, id: ClassId) -> Vec<ClassId> {
        self.node(id)
            .direct_supertypes()
            .filter_map(|r| match r {
                TypeRef::Declared(sup) => Some(*sup),
                TypeRef::External(_) => None,
            })
            .collect()
    }

    /// Transitive declared supertypes, depth-first with the superclass
    /// branch before interfaces. Each class appears once.
    pub fn supertype_chain(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id);
        self.collect_supertypes(id, &mut chain, &mut seen);
        chain
    }

    fn collect_supertypes(&self, id: ClassId, chain: &mut Vec<ClassId>, seen: &mut HashSet<ClassId>) {
        for sup in self.declared_supertypes(id) {
            if seen.insert(sup) {
                chain.push(sup);
                self.collect_supertypes(sup, chain, seen);
            }
        }
    }

    /// Declared classes that list `id` as superclass or interface
    pub fn direct_subtypes(&self, id: ClassId) -> &[ClassId] {
        &self.subtypes[id.0]
    }

    /// Field declarations: anonymous class-level fields first, then member fields
    pub fn declared_fields(&self, id: ClassId) -> Vec<DeclaredMember<'_>> {
        self.declared_mappings(id)
            .into_iter()
            .filter(|m| m.kind == MemberKind::Field)
            .collect()
    }

    /// Reference and collection declarations in the same order as fields
    pub fn declared_associations(&self, id: ClassId) -> Vec<DeclaredMember<'_>> {
        self.declared_mappings(id)
            .into_iter()
            .filter(|m| matches!(m.kind, MemberKind::Reference | MemberKind::Collection))
            .collect()
    }

    /// Every mapping declaration of a class, anonymous ones first
    pub fn declared_mappings(&self, id: ClassId) -> Vec<DeclaredMember<'_>> {
        let decl = &self.node(id).decl;
        let mut members = Vec::new();

        // Class-level field/reference tags declare anonymous members
        for tag in &decl.tags {
            let Some(kind) = MemberKind::from_tag(&tag.name) else {
                continue;
            };
            if matches!(kind, MemberKind::Field | MemberKind::Reference) {
                members.push(DeclaredMember {
                    name: tag.get("name").unwrap_or(""),
                    kind,
                    tag,
                    member: None,
                });
            }
        }

        for member in &decl.members {
            for tag in &member.tags {
                if let Some(kind) = MemberKind::from_tag(&tag.name) {
                    members.push(DeclaredMember {
                        name: &member.name,
                        kind,
                        tag,
                        member: Some(member),
                    });
                }
            }
        }
        members
    }

    /// Reflexive, transitive subtype test between two declared classes
    pub fn is_subtype_of(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || self.supertype_chain(sub).contains(&sup)
    }

    /// Subtype test by name, crossing from declared classes into library types
    pub fn is_subtype_name(&self, sub: &str, sup: &str) -> bool {
        if sup == JAVA_LANG_OBJECT {
            return true;
        }
        let mut queue = VecDeque::from([sub.trim().to_string()]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if current == sup {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            match self.get_class(&current) {
                Some(id) => {
                    for sup_ref in self.node(id).direct_supertypes() {
                        match sup_ref {
                            TypeRef::Declared(s) => queue.push_back(self.name(*s).to_string()),
                            TypeRef::External(name) => queue.push_back(name.clone()),
                        }
                    }
                }
                None => {
                    if builtin_is_subtype(&current, sup) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Whether either type is a subtype of the other
    pub fn are_compatible(&self, a: &str, b: &str) -> bool {
        self.is_subtype_name(a, b) || self.is_subtype_name(b, a)
    }

    /// Whether a type name is known, either declared or built in
    pub fn type_exists(&self, name: &str) -> bool {
        self.get_class(name).is_some() || builtin_type(name.trim()).is_some()
    }

    /// First class found on a supertype cycle, if any
    pub fn find_supertype_cycle(&self) -> Option<ClassId> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        fn visit(model: &HierarchyModel, id: ClassId, marks: &mut [Mark]) -> Option<ClassId> {
            match marks[id.0] {
                Mark::Done => return None,
                Mark::Active => return Some(id),
                Mark::New => {}
            }
            marks[id.0] = Mark::Active;
            for sup in model.declared_supertypes(id) {
                if let Some(found) = visit(model, sup, marks) {
                    return Some(found);
                }
            }
            marks[id.0] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::New; self.classes.len()];
        self.ids().find_map(|id| visit(self, id, &mut marks))
    }
}
