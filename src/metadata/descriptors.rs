//! Descriptor view of the resolved metadata graph

use crate::model::jdbc::JdbcType;
use crate::model::options::{AccessMode, AutoIncrement, CascadeMode, IsolationLevel, OrderBy};

/// Mapping metadata of one persistent class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    pub is_interface: bool,
    /// `None` for metadata-only classes
    pub table: Option<String>,
    pub extents: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    pub associations: Vec<Association>,
    pub procedures: Vec<ProcedureDescriptor>,
    pub documentation: Option<String>,
    pub table_documentation: Option<String>,
    pub row_reader: Option<String>,
    pub refresh: bool,
    pub isolation_level: Option<IsolationLevel>,
    pub proxy: Option<String>,
    pub proxy_prefetching_limit: Option<u32>,
}

impl ClassDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    pub fn references(&self) -> impl Iterator<Item = &ReferenceDescriptor> {
        self.associations.iter().filter_map(|a| match a {
            Association::Reference(r) => Some(r),
            Association::Collection(_) => None,
        })
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionDescriptor> {
        self.associations.iter().filter_map(|a| match a {
            Association::Collection(c) => Some(c),
            Association::Reference(_) => None,
        })
    }

    pub fn reference(&self, name: &str) -> Option<&ReferenceDescriptor> {
        self.references().find(|r| r.name == name)
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionDescriptor> {
        self.collections().find(|c| c.name == name)
    }
}

/// A mapped scalar attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Class whose declaration produced this field
    pub declared_in: String,
    pub column: String,
    pub jdbc_type: JdbcType,
    pub primary_key: bool,
    pub nullable: bool,
    pub autoincrement: AutoIncrement,
    pub sequence_name: Option<String>,
    pub locking: bool,
    pub update_lock: bool,
    pub default_fetch: bool,
    pub conversion: Option<String>,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub access: AccessMode,
    /// Ordering key
    pub id: Option<i32>,
    pub indexed: bool,
    pub default_value: Option<String>,
    pub documentation: Option<String>,
    pub column_documentation: Option<String>,
}

impl FieldDescriptor {
    pub fn is_anonymous(&self) -> bool {
        self.access == AccessMode::Anonymous
    }
}

/// Reference or collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    Reference(ReferenceDescriptor),
    Collection(CollectionDescriptor),
}

impl Association {
    pub fn name(&self) -> &str {
        match self {
            Association::Reference(r) => &r.name,
            Association::Collection(c) => &c.name,
        }
    }
}

/// Many-to-one association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDescriptor {
    pub name: String,
    pub declared_in: String,
    pub class_ref: String,
    pub foreign_keys: Vec<String>,
    pub database_foreign_key: bool,
    pub anonymous: bool,
    pub auto_retrieve: bool,
    pub auto_update: CascadeMode,
    pub auto_delete: CascadeMode,
    pub otm_dependent: bool,
    pub proxy: bool,
    pub proxy_prefetching_limit: Option<u32>,
    pub refresh: bool,
    pub documentation: Option<String>,
}

/// One-to-many or many-to-many association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub name: String,
    pub declared_in: String,
    pub element_class_ref: String,
    pub collection_class: Option<String>,
    /// Inverse foreign keys on the element class (1:N), or join-table
    /// columns pointing at this class (M:N)
    pub foreign_keys: Vec<String>,
    /// Join-table columns pointing at the element class (M:N only)
    pub remote_foreign_keys: Vec<String>,
    pub indirection_table: Option<String>,
    pub orderby: Vec<OrderBy>,
    pub query_customizer: Option<String>,
    pub database_foreign_key: bool,
    pub auto_retrieve: bool,
    pub auto_update: CascadeMode,
    pub auto_delete: CascadeMode,
    pub otm_dependent: bool,
    pub proxy: bool,
    pub proxy_prefetching_limit: Option<u32>,
    pub refresh: bool,
    pub documentation: Option<String>,
}

impl CollectionDescriptor {
    pub fn is_many_to_many(&self) -> bool {
        self.indirection_table.is_some()
    }
}

/// Kind of a stored-procedure binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Insert,
    Update,
    Delete,
}

impl ProcedureKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            ProcedureKind::Insert => "insert-procedure",
            ProcedureKind::Update => "update-procedure",
            ProcedureKind::Delete => "delete-procedure",
        }
    }
}

/// Procedure argument, passed through to the descriptor consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureArgument {
    Runtime {
        field_ref: Option<String>,
        is_return: bool,
    },
    Constant {
        value: String,
    },
}

/// Stored-procedure binding of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureDescriptor {
    pub kind: ProcedureKind,
    pub name: String,
    pub return_field_ref: Option<String>,
    pub include_all_fields: bool,
    pub include_pk_only: bool,
    pub arguments: Vec<ProcedureArgument>,
    pub documentation: Option<String>,
}
