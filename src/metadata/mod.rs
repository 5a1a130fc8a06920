//! Resolved metadata graph handed to the emitters

mod descriptors;
mod schema;

pub use descriptors::*;
pub use schema::*;

/// Fully resolved and validated mapping metadata. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedModel {
    /// Persistent classes in declaration order
    pub classes: Vec<ClassDescriptor>,
    pub schema: SchemaModel,
}

impl ResolvedModel {
    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.iter().find(|c| c.name == name)
    }
}
