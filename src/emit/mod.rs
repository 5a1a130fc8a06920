//! Descriptor and schema document generation

mod descriptor_xml;
mod schema_xml;
mod xml_helpers;

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::error::OrmGenError;
use crate::metadata::ResolvedModel;

pub use descriptor_xml::generate_descriptor_xml;
pub use schema_xml::generate_schema_xml;

/// Both documents rendered in memory
#[derive(Debug, Clone)]
pub struct RenderedOutputs {
    pub descriptor: Vec<u8>,
    pub schema: Vec<u8>,
}

/// Paths of the written documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub descriptor: PathBuf,
    pub schema: PathBuf,
}

/// Render both documents without touching the file system
pub fn render_outputs(model: &ResolvedModel) -> Result<RenderedOutputs> {
    let mut descriptor = Cursor::new(Vec::with_capacity(model.classes.len() * 1024));
    generate_descriptor_xml(&mut descriptor, model)?;

    let mut schema = Cursor::new(Vec::with_capacity(model.schema.tables.len() * 512));
    generate_schema_xml(&mut schema, &model.schema)?;

    Ok(RenderedOutputs {
        descriptor: descriptor.into_inner(),
        schema: schema.into_inner(),
    })
}

/// Write rendered documents into `output_dir`.
///
/// Both documents are staged next to their targets and only then renamed
/// into place. A failure removes whatever this call already wrote.
pub fn write_outputs(
    outputs: &RenderedOutputs,
    output_dir: &Path,
    descriptor_file: &str,
    schema_file: &str,
) -> Result<OutputPaths> {
    std::fs::create_dir_all(output_dir).map_err(|e| OrmGenError::OutputWriteError {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let paths = OutputPaths {
        descriptor: output_dir.join(descriptor_file),
        schema: output_dir.join(schema_file),
    };
    let documents = [
        (&paths.descriptor, &outputs.descriptor),
        (&paths.schema, &outputs.schema),
    ];

    let mut staged: Vec<PathBuf> = Vec::with_capacity(documents.len());
    for (path, bytes) in documents {
        let staging = staging_path(path);
        if let Err(e) = std::fs::write(&staging, bytes) {
            staged.push(staging.clone());
            remove_all(&staged);
            return Err(OrmGenError::OutputWriteError {
                path: staging,
                source: e,
            }
            .into());
        }
        staged.push(staging);
    }

    for (idx, (path, bytes)) in documents.into_iter().enumerate() {
        if let Err(e) = std::fs::rename(&staged[idx], path) {
            remove_all(&staged[idx..]);
            let placed: Vec<PathBuf> = documents[..idx]
                .iter()
                .map(|(placed, _)| (*placed).clone())
                .collect();
            remove_all(&placed);
            return Err(OrmGenError::OutputWriteError {
                path: path.clone(),
                source: e,
            }
            .into());
        }
        debug!(path = %path.display(), bytes = bytes.len(), "wrote output document");
    }
    Ok(paths)
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = std::fs::remove_file(path);
    }
}
