use launchpad_container::{BuildOutcome, ContainerComposer};
use launchpad_core::{ApplicationModel, LaunchpadConfig};
use std::path::Path;

use super::{ContainerOptions, ModelOptions};

/// Build and push every project container in the model.
pub async fn build(model_options: &ModelOptions, options: &ContainerOptions) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let mut model = ApplicationModel::load(&model_options.manifest)?;

    if build_projects(&mut model, &model_options.manifest, options, &config).await? {
        println!();
        println!("All project containers built and pushed.");
    }

    Ok(())
}

/// Build each project with a project path and point it at the pushed image.
///
/// Returns `false` when the user declined to log in to the registry; no
/// further projects are built in that case.
pub(crate) async fn build_projects(
    model: &mut ApplicationModel,
    model_path: &Path,
    options: &ContainerOptions,
    config: &LaunchpadConfig,
) -> anyhow::Result<bool> {
    let container = options.resolve(&config.container);
    let composer = ContainerComposer::new(&config.build);
    let interactive = !options.non_interactive;

    if container.image_name.is_some() && model.projects().count() > 1 {
        tracing::warn!("image name override applies to every project in the model");
    }

    for (key, project) in model.projects_mut() {
        let Some(project_path) = project.path.clone() else {
            tracing::debug!(resource = key, "no project path, using existing image");
            continue;
        };

        let target = super::build_target(&container, model_path, key, &project_path)?;
        println!("Building container for '{key}'...");

        match composer.build_and_push(&target, interactive).await? {
            BuildOutcome::Succeeded { attempts } => {
                project.container_image = target.image_reference(key);
                tracing::info!(resource = key, attempts, image = %project.container_image, "container pushed");
                println!("  Pushed {}", project.container_image);
            }
            BuildOutcome::LoginDeclined => {
                println!("Registry login declined; stopping.");
                return Ok(false);
            }
        }
    }

    Ok(true)
}
