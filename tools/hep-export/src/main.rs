//! hep-export - Hephaestus model export tool
//!
//! Compiles Blockbench projects (.bbmodel) into Hephaestus model documents
//! (.hepmodel)

use anyhow::Result;
use clap::{Parser, Subcommand};
use hephaestus_shared::HEP_MODEL_FORMAT;
use std::path::PathBuf;

// Use modules from library
use hep_export::{bbmodel, formats, manifest, model};

#[derive(Parser)]
#[command(name = "hep-export")]
#[command(about = "Hephaestus model export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a single project
    Compile {
        /// Input .bbmodel file
        input: PathBuf,

        /// Output .hepmodel file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write without indentation
        #[arg(long)]
        compact: bool,

        /// Fail on compatibility warnings
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Compile a project without writing, reporting warnings
    Check {
        /// Input .bbmodel file
        input: PathBuf,
    },

    /// Build every model listed in a manifest
    Build {
        /// Path to models.toml manifest
        #[arg(default_value = "models.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            output,
            compact,
            deny_warnings,
        } => {
            let output =
                output.unwrap_or_else(|| input.with_extension(HEP_MODEL_FORMAT.extension));
            tracing::info!("Compiling {:?} -> {:?}", input, output);

            let project = bbmodel::load_project(&input)?;
            let compilation = model::compile(&project)?;
            if deny_warnings && compilation.has_warnings() {
                anyhow::bail!(
                    "{} compatibility warnings, refusing to write {:?}",
                    compilation.warnings.len(),
                    output
                );
            }

            let style = if compact {
                formats::OutputStyle::Compact
            } else {
                formats::OutputStyle::Pretty
            };
            formats::write_model_file(&output, &compilation.model, style)?;
            tracing::info!("Done!");
        }

        Commands::Check { input } => {
            tracing::info!("Checking {:?}", input);
            let project = bbmodel::load_project(&input)?;
            let compilation = model::compile(&project)?;
            let model = &compilation.model;
            tracing::info!(
                "'{}': {} bones, {} elements, {} textures, {} animations, {} warnings",
                model.name,
                model.bones().count(),
                model.element_count(),
                model.textures.len(),
                model.animations.len(),
                compilation.warnings.len()
            );
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building models from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }
    }

    Ok(())
}
