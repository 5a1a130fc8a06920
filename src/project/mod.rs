//! Mapping project file parsing

mod ormproj_parser;

pub use ormproj_parser::{parse_ormproj, OrmProject, DEFAULT_DESCRIPTOR_FILE, DEFAULT_SCHEMA_FILE};
