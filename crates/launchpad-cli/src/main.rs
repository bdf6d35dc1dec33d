mod commands;

use clap::{Parser, Subcommand};
use commands::{ContainerOptions, ModelOptions};
use launchpad_container::BuildError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "launchpad",
    about = "Build project containers and generate Kustomize manifests from an application model"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and push a container image for every project in the model
    Build {
        #[command(flatten)]
        model: ModelOptions,
        #[command(flatten)]
        container: ContainerOptions,
    },
    /// Generate Kustomize manifests, building project containers first
    Generate {
        #[command(flatten)]
        model: ModelOptions,
        #[command(flatten)]
        container: ContainerOptions,
        /// Directory manifests are written to (one subdirectory per resource)
        #[arg(long, default_value = commands::DEFAULT_OUTPUT_PATH)]
        output_path: PathBuf,
        /// Directory checked for template overrides before the built-in set
        #[arg(long)]
        template_path: Option<PathBuf>,
        /// Use each project's existing containerImage instead of building
        #[arg(long)]
        skip_build: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="absent or invalid RUST_LOG falls back to info"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build { model, container } => commands::build(&model, &container).await,
        Commands::Generate {
            model,
            container,
            output_path,
            template_path,
            skip_build,
        } => {
            commands::generate(
                &model,
                &container,
                &output_path,
                template_path.as_deref(),
                skip_build,
            )
            .await
        }
    };

    // Build aborts carry their own process exit code.
    if let Err(err) = &result {
        if let Some(code) = err.downcast_ref::<BuildError>().and_then(BuildError::exit_code) {
            eprintln!("Error: {err}");
            std::process::exit(code);
        }
    }

    result
}
