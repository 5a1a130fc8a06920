//! Parser for .ormproj files

use std::path::{Path, PathBuf};

use anyhow::Result;
use roxmltree::Document;

use crate::error::OrmGenError;
use crate::resolve::ChecksMode;

pub const DEFAULT_DESCRIPTOR_FILE: &str = "repository_user.xml";
pub const DEFAULT_SCHEMA_FILE: &str = "project-schema.xml";

/// Parsed mapping project
#[derive(Debug, Clone)]
pub struct OrmProject {
    /// Project name
    pub name: String,
    /// Database name placed on the schema document
    pub database_name: String,
    /// Validation mode
    pub checks: ChecksMode,
    /// Declaration files, sorted by path
    pub sources: Vec<PathBuf>,
    /// File name of the descriptor document
    pub descriptor_file: String,
    /// File name of the schema document
    pub schema_file: String,
    /// Project directory
    pub project_dir: PathBuf,
}

/// Parse a .ormproj file
pub fn parse_ormproj(path: &Path) -> Result<OrmProject> {
    let content = std::fs::read_to_string(path).map_err(|e| OrmGenError::ProjectReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let doc = Document::parse(&content).map_err(|e| OrmGenError::ProjectParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Project" {
        return Err(OrmGenError::InvalidProjectFormat {
            message: format!(
                "expected <Project> root element, found <{}>",
                root.tag_name().name()
            ),
        }
        .into());
    }

    let project_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

    let name = find_property_value(&root, "Name").unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Project")
            .to_string()
    });

    let database_name = find_property_value(&root, "DatabaseName").unwrap_or_else(|| name.clone());

    let checks = match find_property_value(&root, "Checks") {
        Some(value) => value
            .parse::<ChecksMode>()
            .map_err(|message| OrmGenError::InvalidProjectFormat { message })?,
        None => ChecksMode::default(),
    };

    let descriptor_file = find_property_value(&root, "DescriptorFile")
        .unwrap_or_else(|| DEFAULT_DESCRIPTOR_FILE.to_string());
    let schema_file =
        find_property_value(&root, "SchemaFile").unwrap_or_else(|| DEFAULT_SCHEMA_FILE.to_string());

    let sources = find_source_files(&root, &project_dir)?;

    Ok(OrmProject {
        name,
        database_name,
        checks,
        sources,
        descriptor_file,
        schema_file,
        project_dir,
    })
}

fn find_property_value(root: &roxmltree::Node, property_name: &str) -> Option<String> {
    for node in root.descendants() {
        if node.tag_name().name() == property_name {
            return node
                .text()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }
    }
    None
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("xml"))
}

fn find_source_files(root: &roxmltree::Node, project_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let mut include_patterns: Vec<String> = Vec::new();
    let mut exclude_patterns: Vec<String> = Vec::new();

    for node in root.descendants() {
        if node.tag_name().name() == "Source" {
            if let Some(include) = node.attribute("Include") {
                include_patterns.push(include.replace('\\', "/"));
            }
            if let Some(remove) = node.attribute("Remove") {
                exclude_patterns.push(remove.replace('\\', "/"));
            }
        }
    }

    for pattern in &include_patterns {
        if pattern.contains('*') || pattern.contains('?') {
            let glob_pattern = project_dir.join(pattern);
            let glob_str = glob_pattern.to_string_lossy();
            let paths = glob::glob(&glob_str).map_err(|e| OrmGenError::InvalidProjectFormat {
                message: format!("invalid Source pattern '{}': {}", pattern, e),
            })?;
            for entry in paths.filter_map(|p| p.ok()) {
                if is_xml(&entry) {
                    sources.push(entry);
                }
            }
        } else {
            let source_path = project_dir.join(pattern);
            if !source_path.exists() {
                return Err(OrmGenError::InvalidProjectFormat {
                    message: format!("Source '{}' does not exist", pattern),
                }
                .into());
            }
            sources.push(source_path);
        }
    }

    // No explicit Source items: every .xml file below the project directory
    if include_patterns.is_empty() {
        for entry in walkdir::WalkDir::new(project_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_xml(path) {
                continue;
            }
            let relative = path.strip_prefix(project_dir).unwrap_or(path);
            let in_output_dir = relative.components().any(|c| {
                matches!(c.as_os_str().to_str(), Some("bin") | Some("obj") | Some("build"))
            });
            if !in_output_dir {
                sources.push(path.to_path_buf());
            }
        }
    }

    if !exclude_patterns.is_empty() {
        sources.retain(|file| {
            for pattern in &exclude_patterns {
                let exclude_path = project_dir.join(pattern);
                if pattern.contains('*') || pattern.contains('?') {
                    if let Ok(matcher) = glob::Pattern::new(&exclude_path.to_string_lossy()) {
                        if matcher.matches_path(file) {
                            return false;
                        }
                    }
                } else if file == &exclude_path {
                    return false;
                }
            }
            true
        });
    }

    sources.sort();
    sources.dedup();
    Ok(sources)
}
