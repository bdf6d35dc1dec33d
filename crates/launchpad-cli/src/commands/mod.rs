mod build;
mod generate;

use clap::Args;
use launchpad_container::BuildTarget;
use launchpad_core::{ContainerConfig, LaunchpadConfig};
use std::path::{Path, PathBuf};

pub use build::build;
pub use generate::generate;

/// Output directory used when `--output-path` is not given.
pub(crate) const DEFAULT_OUTPUT_PATH: &str = "./launchpad-output";

#[derive(Args)]
pub struct ModelOptions {
    /// Application model to read
    #[arg(long, default_value = "./manifest.json")]
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct ContainerOptions {
    /// Container registry images are pushed to
    #[arg(long)]
    pub registry: Option<String>,
    /// Repository prefix inside the registry
    #[arg(long)]
    pub repository: Option<String>,
    /// Image name (defaults to the resource key)
    ///
    /// The name is always passed to the build as ContainerImageName, so the
    /// pushed image and the manifests' containerImage agree. Leaving it to
    /// the SDK's assembly-name default is only possible through the library.
    #[arg(long)]
    pub image_name: Option<String>,
    /// Image tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Never prompt; recoverable failures either retry automatically or abort
    #[arg(long)]
    pub non_interactive: bool,
}

impl ContainerOptions {
    /// Command-line values layered over `launchpad.toml`.
    fn resolve(&self, config: &ContainerConfig) -> ContainerConfig {
        ContainerConfig {
            registry: self.registry.clone().or_else(|| config.registry.clone()),
            repository: self.repository.clone().or_else(|| config.repository.clone()),
            image_name: self.image_name.clone().or_else(|| config.image_name.clone()),
            // arch-lint: allow(no-silent-result-drop) reason="no --tag flag means the configured tag"
            tag: self.tag.clone().unwrap_or_else(|| config.tag.clone()),
        }
    }
}

/// Configuration is read from the working directory, like the model default.
pub(crate) fn load_config() -> anyhow::Result<LaunchpadConfig> {
    Ok(LaunchpadConfig::load(Path::new("."))?)
}

/// Build target for the project stored under `key`.
///
/// `project_path` is resolved against the directory holding the model.
pub(crate) fn build_target(
    container: &ContainerConfig,
    model_path: &Path,
    key: &str,
    project_path: &Path,
) -> anyhow::Result<BuildTarget> {
    let registry = container
        .registry
        .clone()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "container registry not set: pass --registry or set [container].registry in launchpad.toml"
            )
        })?;

    // arch-lint: allow(no-silent-result-drop) reason="a bare file name has no parent; it lives in the working directory"
    let base = model_path.parent().unwrap_or(Path::new("."));
    // Always set, so the SDK never falls back to the assembly name and the
    // reference from `image_reference(key)` is the one actually pushed.
    let image_name = container
        .image_name
        .clone()
        .filter(|n| !n.is_empty())
        // arch-lint: allow(no-silent-result-drop) reason="no configured image name means the resource key"
        .unwrap_or_else(|| key.to_owned());

    Ok(BuildTarget {
        project_path: base.join(project_path),
        registry,
        repository: container.repository.clone(),
        image_name: Some(image_name),
        tag: container.tag.clone(),
    })
}
