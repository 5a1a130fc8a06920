//! Raw class declarations as supplied by the declaration source

/// Tag names recognized on classes and members
pub const TAG_CLASS: &str = "ojb.class";
pub const TAG_EXTENT_CLASS: &str = "ojb.extent-class";
pub const TAG_FIELD: &str = "ojb.field";
pub const TAG_REFERENCE: &str = "ojb.reference";
pub const TAG_COLLECTION: &str = "ojb.collection";
pub const TAG_NESTED: &str = "ojb.nested";
pub const TAG_MODIFY_INHERITED: &str = "ojb.modify-inherited";
pub const TAG_MODIFY_NESTED: &str = "ojb.modify-nested";
pub const TAG_INDEX: &str = "ojb.index";
pub const TAG_INSERT_PROCEDURE: &str = "ojb.insert-procedure";
pub const TAG_UPDATE_PROCEDURE: &str = "ojb.update-procedure";
pub const TAG_DELETE_PROCEDURE: &str = "ojb.delete-procedure";
pub const TAG_RUNTIME_ARGUMENT: &str = "ojb.runtime-argument";
pub const TAG_CONSTANT_ARGUMENT: &str = "ojb.constant-argument";

/// Tags allowed on a class or interface
pub const CLASS_TAGS: &[&str] = &[
    TAG_CLASS,
    TAG_EXTENT_CLASS,
    TAG_FIELD,
    TAG_REFERENCE,
    TAG_MODIFY_INHERITED,
    TAG_MODIFY_NESTED,
    TAG_INDEX,
    TAG_INSERT_PROCEDURE,
    TAG_UPDATE_PROCEDURE,
    TAG_DELETE_PROCEDURE,
    TAG_RUNTIME_ARGUMENT,
    TAG_CONSTANT_ARGUMENT,
];

/// Tags allowed on a member
pub const MEMBER_TAGS: &[&str] = &[TAG_FIELD, TAG_REFERENCE, TAG_COLLECTION, TAG_NESTED];

/// Whether a declaration is a class or an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

/// A mapping tag with its ordered key/value options
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute setter, used by tests and programmatic callers
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up an option value (last occurrence wins)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set or replace an option value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.attributes.push((key, value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.attributes.retain(|(k, _)| k != key);
    }
}

/// A source member (field) of a class
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberDecl {
    pub name: String,
    /// Declared language type, e.g. `int`, `test.B[]`, `java.util.List<test.B>`
    pub java_type: String,
    pub tags: Vec<Tag>,
}

impl MemberDecl {
    pub fn new(name: impl Into<String>, java_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            java_type: java_type.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

/// A class or interface declaration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassDecl {
    /// Fully qualified name
    pub name: String,
    pub kind: ClassKind,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// Class-level tags in declaration order
    pub tags: Vec<Tag>,
    pub members: Vec<MemberDecl>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Interface,
            ..Default::default()
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    /// First class-level tag with the given name
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// All class-level tags with the given name, in declaration order
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }

    /// Simple (unqualified) name: the part after the last `.` or `$`
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }
}

/// Strip package and outer-class qualifiers from a type name
pub fn simple_name(qualified: &str) -> &str {
    qualified
        .rsplit(|c| c == '.' || c == '$')
        .next()
        .unwrap_or(qualified)
}

/// Split a comma-separated list of type names, keeping generic arguments intact
pub fn split_type_list(value: &str) -> Vec<String> {
    let mut types = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in value.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                if !current.trim().is_empty() {
                    types.push(current.trim().to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        types.push(current.trim().to_string());
    }
    types
}
