//! Common test utilities for rust-ormgen tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rust_ormgen::{ChecksMode, CompileOptions, OutputPaths};

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub project_dir: PathBuf,
    /// Stored for debugging purposes
    _fixture_name: String,
}

impl TestContext {
    /// Create a new test context by copying a fixture to a temp directory
    pub fn with_fixture(fixture_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(fixture_name);

        let project_dir = temp_dir.path().to_path_buf();

        // Copy fixture to temp directory
        copy_dir_recursive(&fixture_path, &project_dir).expect("Failed to copy fixture");

        Self {
            _temp_dir: temp_dir,
            project_dir,
            _fixture_name: fixture_name.to_string(),
        }
    }

    /// Get the path to the .ormproj file
    pub fn project_path(&self) -> PathBuf {
        self.project_dir.join("project.ormproj")
    }

    /// Default output directory of the project
    pub fn build_dir(&self) -> PathBuf {
        self.project_dir.join("build")
    }

    fn options(&self, checks: Option<ChecksMode>) -> CompileOptions {
        CompileOptions {
            project_path: self.project_path(),
            output_dir: None,
            checks,
            verbose: false,
        }
    }

    /// Compile the project using the rust-ormgen library
    pub fn compile(&self) -> CompileResult {
        self.compile_with(None)
    }

    /// Compile with a validation mode overriding the project setting
    pub fn compile_with(&self, checks: Option<ChecksMode>) -> CompileResult {
        match rust_ormgen::compile_project(self.options(checks)) {
            Ok(paths) => CompileResult {
                success: true,
                paths: Some(paths),
                errors: vec![],
                error: None,
            },
            Err(e) => CompileResult {
                success: false,
                paths: None,
                errors: vec![format!("{:#}", e)],
                error: Some(e),
            },
        }
    }

    /// Compile the project and return the output paths, panicking if it fails
    pub fn compile_successfully(&self) -> OutputPaths {
        let result = self.compile();
        assert!(
            result.success,
            "Compile failed for fixture '{}': {:?}",
            self._fixture_name, result.errors
        );
        result.paths.expect("Compile succeeded but no output paths")
    }
}

/// Result of a compile operation
#[derive(Debug)]
pub struct CompileResult {
    pub success: bool,
    pub paths: Option<OutputPaths>,
    pub errors: Vec<String>,
    pub error: Option<anyhow::Error>,
}

impl CompileResult {
    /// The mapping error behind a failed compile, if that is what failed
    pub fn mapping_error(&self) -> Option<&rust_ormgen::MappingError> {
        self.error
            .as_ref()
            .and_then(|e| e.downcast_ref::<rust_ormgen::MappingError>())
    }
}

/// Read a generated document
pub fn read_document(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// Recursively copy a directory
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
