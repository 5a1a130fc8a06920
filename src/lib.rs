//! rust-ormgen: an annotation-driven O/R-mapping metadata compiler
//!
//! This library reads class declarations carrying mapping tags, resolves
//! them across the inheritance hierarchy and emits two documents: the
//! O/R-mapping descriptor and the database schema.

pub mod emit;
pub mod error;
pub mod metadata;
pub mod model;
pub mod project;
pub mod resolve;
pub mod source;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

pub use emit::OutputPaths;
pub use error::{MappingError, MappingErrorKind, OrmGenError};
pub use metadata::ResolvedModel;
pub use project::OrmProject;
pub use resolve::{resolve, resolve_declarations, ChecksMode, ResolveOptions};

/// Options for compiling a mapping project
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Path to the .ormproj file
    pub project_path: PathBuf,
    /// Output directory (defaults to `<project dir>/build`)
    pub output_dir: Option<PathBuf>,
    /// Overrides the project's validation mode
    pub checks: Option<ChecksMode>,
    /// Enable verbose output
    pub verbose: bool,
}

/// Parse a project and resolve its declarations without writing anything
pub fn check_project(options: &CompileOptions) -> Result<ResolvedModel> {
    let project = project::parse_ormproj(&options.project_path)?;
    resolve_project(&project, options)
}

fn resolve_project(project: &OrmProject, options: &CompileOptions) -> Result<ResolvedModel> {
    debug!(project = %project.name, sources = project.sources.len(), "resolving project");
    if options.verbose {
        println!(
            "Project {}: {} declaration files",
            project.name,
            project.sources.len()
        );
    }

    let declarations = source::parse_declaration_files(&project.sources)?;
    if options.verbose {
        println!("Parsed {} class declarations", declarations.len());
    }

    let resolve_options = ResolveOptions {
        checks: options.checks.unwrap_or(project.checks),
        database_name: project.database_name.clone(),
    };
    let model = resolve_declarations(declarations, &resolve_options)?;

    if options.verbose {
        println!(
            "Resolved {} persistent classes into {} tables ({} checks)",
            model.classes.len(),
            model.schema.tables.len(),
            resolve_options.checks
        );
    }
    Ok(model)
}

/// Compile a project into its descriptor and schema documents
pub fn compile_project(options: CompileOptions) -> Result<OutputPaths> {
    // Step 1: Parse the project file
    let project = project::parse_ormproj(&options.project_path)?;

    // Step 2: Parse and resolve all declarations
    let model = resolve_project(&project, &options)?;

    // Step 3: Render both documents before either is written
    let outputs = emit::render_outputs(&model)?;

    // Step 4: Write them out
    let output_dir = options
        .output_dir
        .unwrap_or_else(|| project.project_dir.join("build"));
    let paths = emit::write_outputs(
        &outputs,
        &output_dir,
        &project.descriptor_file,
        &project.schema_file,
    )?;

    info!(
        descriptor = %paths.descriptor.display(),
        schema = %paths.schema.display(),
        "wrote mapping documents"
    );
    if options.verbose {
        println!("Created {} and {}", paths.descriptor.display(), paths.schema.display());
    }
    Ok(paths)
}
