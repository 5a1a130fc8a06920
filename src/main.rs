use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_ormgen::{check_project, compile_project, ChecksMode, CompileOptions};

#[derive(Parser)]
#[command(name = "rust-ormgen")]
#[command(author, version, about = "Compile annotated class declarations into O/R-mapping metadata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .ormproj file into descriptor and schema documents
    Compile {
        /// Path to the .ormproj file
        #[arg(short, long)]
        project: PathBuf,

        /// Output directory (defaults to <project dir>/build)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Validation mode (strict, basic); overrides the project setting
        #[arg(short, long)]
        checks: Option<ChecksMode>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Resolve a .ormproj file and report errors without writing output
    Check {
        /// Path to the .ormproj file
        #[arg(short, long)]
        project: PathBuf,

        /// Validation mode (strict, basic); overrides the project setting
        #[arg(short, long)]
        checks: Option<ChecksMode>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            project,
            output_dir,
            checks,
            verbose,
        } => {
            init_logging(verbose)?;
            let options = CompileOptions {
                project_path: project,
                output_dir,
                checks,
                verbose,
            };

            let paths = compile_project(options)?;
            println!("Wrote {}", paths.descriptor.display());
            println!("Wrote {}", paths.schema.display());
        }
        Commands::Check {
            project,
            checks,
            verbose,
        } => {
            init_logging(verbose)?;
            let options = CompileOptions {
                project_path: project,
                output_dir: None,
                checks,
                verbose,
            };

            let model = check_project(&options)?;
            println!(
                "OK: {} classes, {} tables",
                model.classes.len(),
                model.schema.tables.len()
            );
        }
    }

    Ok(())
}
