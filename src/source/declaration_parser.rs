//! Parser for declaration files
//!
//! A declaration file mirrors classes, their members and the mapping tags
//! attached to both:
//!
//! ```xml
//! <declarations>
//!   <class name="test.A" extends="test.Base" implements="test.I">
//!     <ojb.class table="A_TAB"/>
//!     <field name="id" type="int"><ojb.field primarykey="true"/></field>
//!   </class>
//!   <interface name="test.I" extends="test.J"/>
//! </declarations>
//! ```
//!
//! Every child element of a class other than `field` is a class-level tag,
//! every child element of a `field` is a member tag. Tag validation happens
//! in the resolver.

use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::WINDOWS_1252;
use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::OrmGenError;
use crate::model::declarations::split_type_list;
use crate::model::{ClassDecl, MemberDecl, Tag};

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes.clone()) {
        Ok(s) => Ok(s),
        Err(_) => {
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

/// Parse all declaration files, concatenating classes in file order
pub fn parse_declaration_files(paths: &[PathBuf]) -> Result<Vec<ClassDecl>> {
    let mut declarations = Vec::new();
    for path in paths {
        declarations.extend(parse_declaration_file(path)?);
    }
    Ok(declarations)
}

/// Parse one declaration file
pub fn parse_declaration_file(path: &Path) -> Result<Vec<ClassDecl>> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| OrmGenError::DeclarationReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);
    let declarations = parse_declarations_str(content, path)?;
    debug!(
        path = %path.display(),
        classes = declarations.len(),
        "parsed declaration file"
    );
    Ok(declarations)
}

/// Parse declaration XML. `path` is used for error reporting only.
pub fn parse_declarations_str(content: &str, path: &Path) -> Result<Vec<ClassDecl>> {
    let doc = Document::parse(content).map_err(|e| OrmGenError::DeclarationParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let invalid = |message: String| OrmGenError::InvalidDeclaration {
        path: path.to_path_buf(),
        message,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "declarations" {
        return Err(invalid(format!(
            "expected <declarations> root element, found <{}>",
            root.tag_name().name()
        ))
        .into());
    }

    let mut declarations = Vec::new();
    for node in root.children().filter(Node::is_element) {
        let decl = match node.tag_name().name() {
            "class" => parse_class(&node, false),
            "interface" => parse_class(&node, true),
            other => Err(format!("unexpected element <{}>", other)),
        }
        .map_err(invalid)?;
        declarations.push(decl);
    }
    Ok(declarations)
}

fn parse_class(node: &Node, is_interface: bool) -> Result<ClassDecl, String> {
    let name = required_attribute(node, "name")?;
    let mut decl = if is_interface {
        ClassDecl::interface(name)
    } else {
        ClassDecl::new(name)
    };

    if let Some(extends) = node.attribute("extends") {
        if is_interface {
            decl.interfaces.extend(split_type_list(extends));
        } else {
            let supers = split_type_list(extends);
            if supers.len() > 1 {
                return Err(format!("class {} extends more than one class", decl.name));
            }
            decl.superclass = supers.into_iter().next();
        }
    }
    if let Some(implements) = node.attribute("implements") {
        if is_interface {
            return Err(format!("interface {} cannot use implements", decl.name));
        }
        decl.interfaces.extend(split_type_list(implements));
    }

    for child in node.children().filter(Node::is_element) {
        if child.tag_name().name() == "field" {
            let member_name = required_attribute(&child, "name")?;
            let java_type = required_attribute(&child, "type")
                .map_err(|e| format!("{} (member {} of {})", e, member_name, decl.name))?;
            let mut member = MemberDecl::new(member_name, java_type);
            for tag_node in child.children().filter(Node::is_element) {
                member.tags.push(parse_tag(&tag_node));
            }
            decl.members.push(member);
        } else {
            decl.tags.push(parse_tag(&child));
        }
    }
    Ok(decl)
}

fn parse_tag(node: &Node) -> Tag {
    let mut tag = Tag::new(node.tag_name().name());
    for attr in node.attributes() {
        tag.attributes
            .push((attr.name().to_string(), attr.value().to_string()));
    }
    tag
}

fn required_attribute(node: &Node, name: &str) -> Result<String, String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            format!(
                "<{}> is missing the '{}' attribute",
                node.tag_name().name(),
                name
            )
        })
}
