//! Class hierarchy model and mapping declarations

pub mod declarations;
mod hierarchy;
pub mod java_types;
pub mod jdbc;
pub mod options;

pub use declarations::{ClassDecl, ClassKind, MemberDecl, Tag};
pub use hierarchy::{ClassId, ClassNode, DeclaredMember, HierarchyModel, MemberKind, TypeRef};
pub use java_types::MemberType;
pub use jdbc::JdbcType;
