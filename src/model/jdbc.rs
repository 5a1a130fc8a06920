//! JDBC type enumeration and the fixed language-type to JDBC-type table

use std::fmt;
use std::str::FromStr;

pub const GUID_TYPE: &str = "org.apache.ojb.broker.util.GUID";
pub const GUID_CONVERSION: &str =
    "org.apache.ojb.broker.accesslayer.conversions.GUID2StringFieldConversion";
pub const OBJECT_CONVERSION: &str =
    "org.apache.ojb.broker.accesslayer.conversions.Object2ByteArrFieldConversion";

pub const DEFAULT_VARCHAR_LENGTH: u32 = 254;
pub const DEFAULT_DECIMAL_PRECISION: u32 = 20;
pub const DEFAULT_DECIMAL_SCALE: u32 = 0;

/// SQL type of a mapped column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum JdbcType {
    BIT,
    TINYINT,
    SMALLINT,
    INTEGER,
    BIGINT,
    REAL,
    FLOAT,
    DOUBLE,
    NUMERIC,
    DECIMAL,
    CHAR,
    VARCHAR,
    LONGVARCHAR,
    DATE,
    TIME,
    TIMESTAMP,
    BINARY,
    VARBINARY,
    LONGVARBINARY,
    CLOB,
    BLOB,
    ARRAY,
    STRUCT,
    REF,
    BOOLEAN,
    DATALINK,
}

impl JdbcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JdbcType::BIT => "BIT",
            JdbcType::TINYINT => "TINYINT",
            JdbcType::SMALLINT => "SMALLINT",
            JdbcType::INTEGER => "INTEGER",
            JdbcType::BIGINT => "BIGINT",
            JdbcType::REAL => "REAL",
            JdbcType::FLOAT => "FLOAT",
            JdbcType::DOUBLE => "DOUBLE",
            JdbcType::NUMERIC => "NUMERIC",
            JdbcType::DECIMAL => "DECIMAL",
            JdbcType::CHAR => "CHAR",
            JdbcType::VARCHAR => "VARCHAR",
            JdbcType::LONGVARCHAR => "LONGVARCHAR",
            JdbcType::DATE => "DATE",
            JdbcType::TIME => "TIME",
            JdbcType::TIMESTAMP => "TIMESTAMP",
            JdbcType::BINARY => "BINARY",
            JdbcType::VARBINARY => "VARBINARY",
            JdbcType::LONGVARBINARY => "LONGVARBINARY",
            JdbcType::CLOB => "CLOB",
            JdbcType::BLOB => "BLOB",
            JdbcType::ARRAY => "ARRAY",
            JdbcType::STRUCT => "STRUCT",
            JdbcType::REF => "REF",
            JdbcType::BOOLEAN => "BOOLEAN",
            JdbcType::DATALINK => "DATALINK",
        }
    }

    /// Types whose columns carry a length
    pub fn has_length(&self) -> bool {
        matches!(
            self,
            JdbcType::CHAR | JdbcType::VARCHAR | JdbcType::LONGVARCHAR
        )
    }

    /// Types whose columns carry precision and scale
    pub fn has_precision(&self) -> bool {
        matches!(self, JdbcType::DECIMAL | JdbcType::NUMERIC)
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JdbcType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_uppercase().as_str() {
            "BIT" => JdbcType::BIT,
            "TINYINT" => JdbcType::TINYINT,
            "SMALLINT" => JdbcType::SMALLINT,
            "INTEGER" => JdbcType::INTEGER,
            "BIGINT" => JdbcType::BIGINT,
            "REAL" => JdbcType::REAL,
            "FLOAT" => JdbcType::FLOAT,
            "DOUBLE" => JdbcType::DOUBLE,
            "NUMERIC" => JdbcType::NUMERIC,
            "DECIMAL" => JdbcType::DECIMAL,
            "CHAR" => JdbcType::CHAR,
            "VARCHAR" => JdbcType::VARCHAR,
            "LONGVARCHAR" => JdbcType::LONGVARCHAR,
            "DATE" => JdbcType::DATE,
            "TIME" => JdbcType::TIME,
            "TIMESTAMP" => JdbcType::TIMESTAMP,
            "BINARY" => JdbcType::BINARY,
            "VARBINARY" => JdbcType::VARBINARY,
            "LONGVARBINARY" => JdbcType::LONGVARBINARY,
            "CLOB" => JdbcType::CLOB,
            "BLOB" => JdbcType::BLOB,
            "ARRAY" => JdbcType::ARRAY,
            "STRUCT" => JdbcType::STRUCT,
            "REF" => JdbcType::REF,
            "BOOLEAN" => JdbcType::BOOLEAN,
            "DATALINK" => JdbcType::DATALINK,
            _ => return Err(format!("Unknown jdbc type: {}", s)),
        };
        Ok(ty)
    }
}

/// Default mapping derived from a member's declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub jdbc_type: JdbcType,
    pub conversion: Option<&'static str>,
    pub length: Option<u32>,
}

impl TypeMapping {
    fn plain(jdbc_type: JdbcType) -> Self {
        Self {
            jdbc_type,
            conversion: None,
            length: None,
        }
    }
}

/// Map a declared language type to its default JDBC type.
///
/// Unknown object types are stored serialized, which requires a conversion.
pub fn default_mapping(java_type: &str) -> TypeMapping {
    let name = java_type.trim();
    let jdbc = match name {
        "boolean" | "java.lang.Boolean" | "Boolean" => JdbcType::BIT,
        "byte" | "java.lang.Byte" | "Byte" => JdbcType::TINYINT,
        "short" | "java.lang.Short" | "Short" => JdbcType::SMALLINT,
        "int" | "java.lang.Integer" | "Integer" => JdbcType::INTEGER,
        "long" | "java.lang.Long" | "Long" => JdbcType::BIGINT,
        "float" | "java.lang.Float" | "Float" => JdbcType::REAL,
        "double" | "java.lang.Double" | "Double" => JdbcType::FLOAT,
        "char" | "java.lang.Character" | "Character" => {
            return TypeMapping {
                jdbc_type: JdbcType::CHAR,
                conversion: None,
                length: Some(1),
            }
        }
        "java.lang.String" | "String" => JdbcType::VARCHAR,
        "java.math.BigDecimal" => JdbcType::DECIMAL,
        "java.math.BigInteger" => JdbcType::BIGINT,
        "byte[]" | "java.lang.Byte[]" | "Byte[]" => JdbcType::VARBINARY,
        "java.util.Date" | "java.sql.Date" => JdbcType::DATE,
        "java.sql.Time" => JdbcType::TIME,
        "java.sql.Timestamp" | "java.util.Calendar" | "java.util.GregorianCalendar" => {
            JdbcType::TIMESTAMP
        }
        "java.sql.Blob" => JdbcType::BLOB,
        "java.sql.Clob" => JdbcType::CLOB,
        "java.sql.Array" => JdbcType::ARRAY,
        "java.sql.Ref" => JdbcType::REF,
        "java.sql.Struct" => JdbcType::STRUCT,
        "java.net.URL" => JdbcType::DATALINK,
        GUID_TYPE => {
            return TypeMapping {
                jdbc_type: JdbcType::VARCHAR,
                conversion: Some(GUID_CONVERSION),
                length: None,
            }
        }
        _ => {
            return TypeMapping {
                jdbc_type: JdbcType::LONGVARBINARY,
                conversion: Some(OBJECT_CONVERSION),
                length: None,
            }
        }
    };
    TypeMapping::plain(jdbc)
}
