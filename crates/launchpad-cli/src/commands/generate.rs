use launchpad_core::ApplicationModel;
use launchpad_manifest::{ManifestOutcome, generate_all};
use std::path::Path;

use super::{ContainerOptions, ModelOptions};

/// Generate Kustomize manifests for every resource in the model.
pub async fn generate(
    model_options: &ModelOptions,
    options: &ContainerOptions,
    output_path: &Path,
    template_path: Option<&Path>,
    skip_build: bool,
) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let mut model = ApplicationModel::load(&model_options.manifest)?;
    println!(
        "Loaded {} resource(s) from {}",
        model.len(),
        model_options.manifest.display()
    );

    if !skip_build
        && !super::build::build_projects(&mut model, &model_options.manifest, options, &config)
            .await?
    {
        println!("No manifests generated.");
        return Ok(());
    }

    let template_dir = template_path.or(config.templates.path.as_deref());
    if let Some(dir) = template_dir {
        println!("Using template overrides from {}", dir.display());
    }

    println!("Generating manifests in {}...", output_path.display());
    let outcomes = generate_all(&model, output_path, template_dir)?;

    for (key, outcome) in &outcomes {
        match outcome {
            ManifestOutcome::Written { path, files } => {
                println!("  {key}: {} ({})", path.display(), files.join(", "));
            }
            ManifestOutcome::Skipped => println!("  {key}: nothing to generate"),
        }
    }

    println!();
    println!("Generation complete.");
    Ok(())
}
