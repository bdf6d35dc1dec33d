use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// launchpad.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchpadConfig {
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Registry images are pushed to (e.g. `myreg.io`)
    pub registry: Option<String>,
    /// Repository prefix inside the registry
    pub repository: Option<String>,
    /// Image name override (defaults to the resource key)
    pub image_name: Option<String>,
    /// Image tag (defaults to latest)
    #[serde(default = "default_tag")]
    pub tag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory checked for manifest template overrides before the
    /// built-in set is used.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Build executable used to publish project containers
    #[serde(default = "default_build_program")]
    pub program: String,
    /// Executable used for interactive registry login
    #[serde(default = "default_login_program")]
    pub login_program: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            registry: None,
            repository: None,
            image_name: None,
            tag: default_tag(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: default_build_program(),
            login_program: default_login_program(),
        }
    }
}

impl LaunchpadConfig {
    /// Load from launchpad.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join("launchpad.toml");
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_tag() -> String {
    "latest".to_owned()
}

fn default_build_program() -> String {
    "dotnet".to_owned()
}

fn default_login_program() -> String {
    "docker".to_owned()
}
