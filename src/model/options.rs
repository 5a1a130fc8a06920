//! Typed option records parsed from raw tag attributes
//!
//! Raw tags carry free-form string pairs. Each recognized tag is turned into
//! a typed record here, with every value checked against its domain. Keys a
//! tag does not recognize are logged and ignored.

use std::str::FromStr;

use tracing::warn;

use crate::error::{MappingError, MappingResult};

use super::declarations::Tag;
use super::jdbc::JdbcType;

const CLASS_KEYS: &[&str] = &[
    "table",
    "generate-table-info",
    "generate-repository-info",
    "determine-extents",
    "include-inherited",
    "documentation",
    "table-documentation",
    "row-reader",
    "refresh",
    "isolation-level",
    "proxy",
    "proxy-prefetching-limit",
];

const FIELD_KEYS: &[&str] = &[
    "name",
    "column",
    "jdbc-type",
    "primarykey",
    "nullable",
    "autoincrement",
    "sequence-name",
    "locking",
    "update-lock",
    "default-fetch",
    "conversion",
    "length",
    "precision",
    "scale",
    "access",
    "id",
    "indexed",
    "default-value",
    "documentation",
    "column-documentation",
];

const REFERENCE_KEYS: &[&str] = &[
    "name",
    "class-ref",
    "foreignkey",
    "database-foreignkey",
    "auto-retrieve",
    "auto-update",
    "auto-delete",
    "otm-dependent",
    "proxy",
    "proxy-prefetching-limit",
    "refresh",
    "documentation",
];

const COLLECTION_KEYS: &[&str] = &[
    "element-class-ref",
    "foreignkey",
    "remote-foreignkey",
    "indirection-table",
    "indirection-table-primarykeys",
    "indirection-table-documentation",
    "collection-class",
    "orderby",
    "query-customizer",
    "database-foreignkey",
    "auto-retrieve",
    "auto-update",
    "auto-delete",
    "otm-dependent",
    "proxy",
    "proxy-prefetching-limit",
    "refresh",
    "documentation",
];

/// Keys of a modify-inherited patch that are not member options
pub const PATCH_CONTROL_KEYS: &[&str] = &["name", "ignore"];

/// Field access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    ReadWrite,
    ReadOnly,
    Anonymous,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "readwrite",
            AccessMode::ReadOnly => "readonly",
            AccessMode::Anonymous => "anonymous",
        }
    }
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "readwrite" => Ok(AccessMode::ReadWrite),
            "readonly" => Ok(AccessMode::ReadOnly),
            "anonymous" => Ok(AccessMode::Anonymous),
            _ => Err("expected readwrite, readonly or anonymous".to_string()),
        }
    }
}

/// Primary-key value generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoIncrement {
    #[default]
    None,
    Ojb,
    Database,
}

impl AutoIncrement {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoIncrement::None => "none",
            AutoIncrement::Ojb => "ojb",
            AutoIncrement::Database => "database",
        }
    }
}

impl FromStr for AutoIncrement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(AutoIncrement::None),
            "ojb" | "true" => Ok(AutoIncrement::Ojb),
            "database" => Ok(AutoIncrement::Database),
            _ => Err("expected none, ojb or database".to_string()),
        }
    }
}

/// Cascade behavior of auto-update / auto-delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeMode {
    #[default]
    None,
    Link,
    Object,
}

impl CascadeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadeMode::None => "none",
            CascadeMode::Link => "link",
            CascadeMode::Object => "object",
        }
    }
}

impl FromStr for CascadeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(CascadeMode::None),
            "link" => Ok(CascadeMode::Link),
            "object" | "true" => Ok(CascadeMode::Object),
            _ => Err("expected none, link, object, true or false".to_string()),
        }
    }
}

/// Transaction isolation level of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Optimistic,
    None,
}

impl IsolationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "read-uncommitted",
            IsolationLevel::ReadCommitted => "read-committed",
            IsolationLevel::RepeatableRead => "repeatable-read",
            IsolationLevel::Serializable => "serializable",
            IsolationLevel::Optimistic => "optimistic",
            IsolationLevel::None => "none",
        }
    }
}

impl FromStr for IsolationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read-uncommitted" => Ok(IsolationLevel::ReadUncommitted),
            "read-committed" => Ok(IsolationLevel::ReadCommitted),
            "repeatable-read" => Ok(IsolationLevel::RepeatableRead),
            "serializable" => Ok(IsolationLevel::Serializable),
            "optimistic" => Ok(IsolationLevel::Optimistic),
            "none" => Ok(IsolationLevel::None),
            _ => Err("unknown isolation level".to_string()),
        }
    }
}

/// One `orderby` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Reads typed values out of one tag, reporting errors against its class
pub struct OptionReader<'a> {
    class: &'a str,
    tag: &'a Tag,
}

impl<'a> OptionReader<'a> {
    pub fn new(class: &'a str, tag: &'a Tag) -> Self {
        Self { class, tag }
    }

    fn invalid(&self, key: &str, value: &str, reason: impl Into<String>) -> MappingError {
        MappingError::InvalidOptionValue {
            class: self.class.to_string(),
            tag: self.tag.name.clone(),
            option: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Non-empty string value
    pub fn string(&self, key: &str) -> Option<String> {
        self.tag
            .get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> MappingResult<bool> {
        match self.string(key) {
            None => Ok(default),
            Some(v) => match v.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(self.invalid(key, &v, "expected true or false")),
            },
        }
    }

    pub fn u32(&self, key: &str) -> MappingResult<Option<u32>> {
        match self.string(key) {
            None => Ok(None),
            Some(v) => v
                .parse::<u32>()
                .map(Some)
                .map_err(|_| self.invalid(key, &v, "expected a non-negative integer")),
        }
    }

    pub fn i32(&self, key: &str) -> MappingResult<Option<i32>> {
        match self.string(key) {
            None => Ok(None),
            Some(v) => v
                .parse::<i32>()
                .map(Some)
                .map_err(|_| self.invalid(key, &v, "expected a number")),
        }
    }

    pub fn parsed<T: FromStr<Err = String>>(&self, key: &str) -> MappingResult<Option<T>> {
        match self.string(key) {
            None => Ok(None),
            Some(v) => v.parse::<T>().map(Some).map_err(|e| self.invalid(key, &v, e)),
        }
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.string(key).map(|v| split_list(&v)).unwrap_or_default()
    }

    pub fn required(&self, key: &str, reason: &str) -> MappingResult<String> {
        self.string(key).ok_or_else(|| self.invalid(key, "", reason))
    }

    fn warn_unknown(&self, known: &[&str]) {
        for (key, _) in &self.tag.attributes {
            if !known.contains(&key.as_str()) {
                warn!(
                    class = self.class,
                    tag = %self.tag.name,
                    option = %key,
                    "ignoring unknown option"
                );
            }
        }
    }
}

/// Split a comma-separated option value, dropping empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Options of `ojb.class`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOptions {
    pub table: Option<String>,
    pub generate_table_info: bool,
    pub generate_repository_info: bool,
    pub determine_extents: bool,
    pub include_inherited: bool,
    pub documentation: Option<String>,
    pub table_documentation: Option<String>,
    pub row_reader: Option<String>,
    pub refresh: bool,
    pub isolation_level: Option<IsolationLevel>,
    pub proxy: Option<String>,
    pub proxy_prefetching_limit: Option<u32>,
}

impl Default for ClassOptions {
    fn default() -> Self {
        Self {
            table: None,
            generate_table_info: true,
            generate_repository_info: true,
            determine_extents: true,
            include_inherited: true,
            documentation: None,
            table_documentation: None,
            row_reader: None,
            refresh: false,
            isolation_level: None,
            proxy: None,
            proxy_prefetching_limit: None,
        }
    }
}

impl ClassOptions {
    pub fn parse(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(CLASS_KEYS);
        Ok(Self {
            table: r.string("table"),
            generate_table_info: r.bool_or("generate-table-info", true)?,
            generate_repository_info: r.bool_or("generate-repository-info", true)?,
            determine_extents: r.bool_or("determine-extents", true)?,
            include_inherited: r.bool_or("include-inherited", true)?,
            documentation: r.string("documentation"),
            table_documentation: r.string("table-documentation"),
            row_reader: r.string("row-reader"),
            refresh: r.bool_or("refresh", false)?,
            isolation_level: r.parsed("isolation-level")?,
            proxy: r.string("proxy"),
            proxy_prefetching_limit: r.u32("proxy-prefetching-limit")?,
        })
    }
}

/// Options of `ojb.field`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldOptions {
    pub column: Option<String>,
    pub jdbc_type: Option<JdbcType>,
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
    pub access: Option<AccessMode>,
    pub id: Option<i32>,
    pub indexed: bool,
    pub default_value: Option<String>,
    pub documentation: Option<String>,
    pub column_documentation: Option<String>,
}

impl FieldOptions {
    pub fn parse(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(FIELD_KEYS);
        Ok(Self {
            column: r.string("column"),
            jdbc_type: r.parsed("jdbc-type")?,
            primary_key: r.bool_or("primarykey", false)?,
            nullable: r.bool_or("nullable", true)?,
            autoincrement: r.parsed("autoincrement")?.unwrap_or_default(),
            sequence_name: r.string("sequence-name"),
            locking: r.bool_or("locking", false)?,
            update_lock: r.bool_or("update-lock", true)?,
            default_fetch: r.bool_or("default-fetch", false)?,
            conversion: r.string("conversion"),
            length: r.u32("length")?,
            precision: r.u32("precision")?,
            scale: r.u32("scale")?,
            access: r.parsed("access")?,
            id: r.i32("id")?,
            indexed: r.bool_or("indexed", false)?,
            default_value: r.string("default-value"),
            documentation: r.string("documentation"),
            column_documentation: r.string("column-documentation"),
        })
    }
}

/// Options of `ojb.reference`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOptions {
    pub class_ref: Option<String>,
    pub foreign_keys: Vec<String>,
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

impl ReferenceOptions {
    pub fn parse(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(REFERENCE_KEYS);
        let foreign_keys = r.list("foreignkey");
        if foreign_keys.is_empty() {
            return Err(r.invalid(
                "foreignkey",
                tag.get("foreignkey").unwrap_or(""),
                "a reference needs at least one foreign key",
            ));
        }
        Ok(Self {
            class_ref: r.string("class-ref"),
            foreign_keys,
            database_foreign_key: r.bool_or("database-foreignkey", true)?,
            auto_retrieve: r.bool_or("auto-retrieve", true)?,
            auto_update: r.parsed("auto-update")?.unwrap_or_default(),
            auto_delete: r.parsed("auto-delete")?.unwrap_or_default(),
            otm_dependent: r.bool_or("otm-dependent", false)?,
            proxy: r.bool_or("proxy", false)?,
            proxy_prefetching_limit: r.u32("proxy-prefetching-limit")?,
            refresh: r.bool_or("refresh", false)?,
            documentation: r.string("documentation"),
        })
    }
}

/// Options of `ojb.collection`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOptions {
    pub element_class_ref: Option<String>,
    pub foreign_keys: Vec<String>,
    pub remote_foreign_keys: Vec<String>,
    pub indirection_table: Option<String>,
    pub indirection_table_primary_keys: bool,
    pub indirection_table_documentation: Option<String>,
    pub collection_class: Option<String>,
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

impl CollectionOptions {
    pub fn parse(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(COLLECTION_KEYS);
        let foreign_keys = r.list("foreignkey");
        if foreign_keys.is_empty() {
            return Err(r.invalid(
                "foreignkey",
                tag.get("foreignkey").unwrap_or(""),
                "a collection needs at least one foreign key",
            ));
        }
        let mut orderby = Vec::new();
        for entry in r.list("orderby") {
            let (field, direction) = match entry.split_once('=') {
                Some((f, d)) => (f.trim().to_string(), d.trim().to_uppercase()),
                None => (entry.clone(), "ASC".to_string()),
            };
            let descending = match direction.as_str() {
                "ASC" => false,
                "DESC" => true,
                _ => return Err(r.invalid("orderby", &entry, "direction must be ASC or DESC")),
            };
            orderby.push(OrderBy { field, descending });
        }
        Ok(Self {
            element_class_ref: r.string("element-class-ref"),
            foreign_keys,
            remote_foreign_keys: r.list("remote-foreignkey"),
            indirection_table: r.string("indirection-table"),
            indirection_table_primary_keys: r.bool_or("indirection-table-primarykeys", false)?,
            indirection_table_documentation: r.string("indirection-table-documentation"),
            collection_class: r.string("collection-class"),
            orderby,
            query_customizer: r.string("query-customizer"),
            database_foreign_key: r.bool_or("database-foreignkey", true)?,
            auto_retrieve: r.bool_or("auto-retrieve", true)?,
            auto_update: r.parsed("auto-update")?.unwrap_or_default(),
            auto_delete: r.parsed("auto-delete")?.unwrap_or_default(),
            otm_dependent: r.bool_or("otm-dependent", false)?,
            proxy: r.bool_or("proxy", false)?,
            proxy_prefetching_limit: r.u32("proxy-prefetching-limit")?,
            refresh: r.bool_or("refresh", false)?,
            documentation: r.string("documentation"),
        })
    }
}

/// Options of `ojb.index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    pub name: String,
    pub fields: Vec<String>,
    pub unique: bool,
    pub documentation: Option<String>,
}

impl IndexOptions {
    pub fn parse(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(&["name", "fields", "unique", "documentation"]);
        let fields = r.list("fields");
        if fields.is_empty() {
            return Err(r.invalid(
                "fields",
                tag.get("fields").unwrap_or(""),
                "an index needs at least one field",
            ));
        }
        Ok(Self {
            name: r.required("name", "an index needs a name")?,
            fields,
            unique: r.bool_or("unique", false)?,
            documentation: r.string("documentation"),
        })
    }
}

/// Options of the insert/update/delete procedure tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureOptions {
    pub name: String,
    pub arguments: Vec<String>,
    pub return_field_ref: Option<String>,
    pub include_all_fields: bool,
    pub include_pk_only: bool,
    pub documentation: Option<String>,
}

impl ProcedureOptions {
    pub fn parse(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(&[
            "name",
            "arguments",
            "return-field-ref",
            "include-all-fields",
            "include-pk-only",
            "documentation",
        ]);
        Ok(Self {
            name: r.required("name", "a procedure needs a name")?,
            arguments: r.list("arguments"),
            return_field_ref: r.string("return-field-ref"),
            include_all_fields: r.bool_or("include-all-fields", false)?,
            include_pk_only: r.bool_or("include-pk-only", false)?,
            documentation: r.string("documentation"),
        })
    }
}

/// Options of `ojb.runtime-argument` and `ojb.constant-argument`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentOptions {
    Runtime {
        name: String,
        field_ref: Option<String>,
        is_return: bool,
    },
    Constant {
        name: String,
        value: String,
    },
}

impl ArgumentOptions {
    pub fn name(&self) -> &str {
        match self {
            ArgumentOptions::Runtime { name, .. } | ArgumentOptions::Constant { name, .. } => name,
        }
    }

    pub fn parse_runtime(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(&["name", "field-ref", "return", "documentation"]);
        Ok(ArgumentOptions::Runtime {
            name: r.required("name", "an argument needs a name")?,
            field_ref: r.string("field-ref"),
            is_return: r.bool_or("return", false)?,
        })
    }

    pub fn parse_constant(class: &str, tag: &Tag) -> MappingResult<Self> {
        let r = OptionReader::new(class, tag);
        r.warn_unknown(&["name", "value", "documentation"]);
        Ok(ArgumentOptions::Constant {
            name: r.required("name", "an argument needs a name")?,
            value: tag.get("value").unwrap_or("").to_string(),
        })
    }
}
