//! Declaration source reading

mod declaration_parser;

pub use declaration_parser::{
    parse_declaration_file, parse_declaration_files, parse_declarations_str,
};
