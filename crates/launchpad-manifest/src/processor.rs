use launchpad_core::{ApplicationModel, Resource, ResourceKind};
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use crate::builtin::{self, KUSTOMIZATION_FILE};
use crate::postgres::{PostgresDatabaseProcessor, PostgresServerProcessor};
use crate::project::ProjectProcessor;
use crate::template::{self, RenderError, TemplateData};

static PROJECT: ProjectProcessor = ProjectProcessor;
static POSTGRES_SERVER: PostgresServerProcessor = PostgresServerProcessor;
static POSTGRES_DATABASE: PostgresDatabaseProcessor = PostgresDatabaseProcessor;

/// Translates one resource kind into manifests.
///
/// Processors are stateless; [`processor_for`] hands out one shared instance
/// per kind.
pub trait ManifestProcessor: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Manifest files this kind emits, in render order. The kustomization
    /// file is implied and not listed.
    fn manifests(&self) -> &'static [&'static str];

    /// Build the render payload for `resource`.
    fn template_data(&self, resource: &Resource) -> Result<TemplateData, ManifestError>;

    /// Decode a raw record of this processor's kind.
    fn decode(&self, payload: &serde_json::Value) -> launchpad_core::Result<Resource> {
        launchpad_core::decode(self.kind().tag(), payload)
    }

    /// Write the manifests for `resource` under `output_root/key`.
    fn produce_manifests(
        &self,
        key: &str,
        resource: &Resource,
        output_root: &Path,
        template_dir: Option<&Path>,
    ) -> Result<ManifestOutcome, ManifestError> {
        write_manifests(self, key, resource, output_root, template_dir)
    }
}

/// What a processor did for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome {
    Written { path: PathBuf, files: Vec<String> },
    /// Metadata-only resource; nothing touched on disk.
    Skipped,
}

pub fn processor_for(kind: ResourceKind) -> &'static dyn ManifestProcessor {
    match kind {
        ResourceKind::Project => &PROJECT,
        ResourceKind::PostgresServer => &POSTGRES_SERVER,
        ResourceKind::PostgresDatabase => &POSTGRES_DATABASE,
    }
}

/// Produce the manifests for a single resource, dispatching on its kind.
pub fn produce_manifests(
    key: &str,
    resource: &Resource,
    output_root: &Path,
    template_dir: Option<&Path>,
) -> Result<ManifestOutcome, ManifestError> {
    processor_for(resource.kind()).produce_manifests(key, resource, output_root, template_dir)
}

/// Produce manifests for every resource in `model`, in model order.
///
/// Resources are processed one at a time; the first failure stops the run.
pub fn generate_all(
    model: &ApplicationModel,
    output_root: &Path,
    template_dir: Option<&Path>,
) -> Result<Vec<(String, ManifestOutcome)>, ManifestError> {
    model
        .resources()
        .iter()
        .map(|(key, resource)| {
            produce_manifests(key, resource, output_root, template_dir)
                .map(|outcome| (key.clone(), outcome))
        })
        .collect()
}

fn write_manifests<P: ManifestProcessor + ?Sized>(
    processor: &P,
    key: &str,
    resource: &Resource,
    output_root: &Path,
    template_dir: Option<&Path>,
) -> Result<ManifestOutcome, ManifestError> {
    let data = processor.template_data(resource)?;

    let output_path = resource_output_path(output_root, key)?;
    ensure_clean_dir(&output_path)?;

    let mut files = Vec::with_capacity(processor.manifests().len() + 1);
    for file in processor
        .manifests()
        .iter()
        .copied()
        .chain([KUSTOMIZATION_FILE])
    {
        write_rendered(&output_path, file, &data, template_dir)?;
        files.push(file.to_owned());
    }

    tracing::info!(resource = key, path = %output_path.display(), "manifests written");

    Ok(ManifestOutcome::Written {
        path: output_path,
        files,
    })
}

/// `output_root/key`, refusing keys that would escape `output_root`.
fn resource_output_path(output_root: &Path, key: &str) -> Result<PathBuf, ManifestError> {
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(output_root.join(key)),
        _ => Err(ManifestError::InvalidResourceKey(key.to_owned())),
    }
}

/// Make `path` an existing, empty directory.
fn ensure_clean_dir(path: &Path) -> Result<(), ManifestError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| ManifestError::CleanOutput {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::create_dir_all(path).map_err(|e| ManifestError::CreateOutput {
        path: path.to_path_buf(),
        source: e,
    })
}

fn load_template(file: &str, template_dir: Option<&Path>) -> Result<Cow<'static, str>, ManifestError> {
    if let Some(dir) = template_dir {
        let candidate = dir.join(file);
        if candidate.is_file() {
            tracing::debug!(template = %candidate.display(), "using template override");
            return std::fs::read_to_string(&candidate)
                .map(Cow::Owned)
                .map_err(|e| ManifestError::ReadTemplate {
                    path: candidate,
                    source: e,
                });
        }
    }

    builtin::template(file)
        .map(Cow::Borrowed)
        .ok_or_else(|| ManifestError::MissingTemplate(file.to_owned()))
}

fn write_rendered(
    output_path: &Path,
    file: &str,
    data: &TemplateData,
    template_dir: Option<&Path>,
) -> Result<(), ManifestError> {
    let source = load_template(file, template_dir)?;
    let rendered = template::render(&source, data).map_err(|e| ManifestError::Render {
        file: file.to_owned(),
        source: e,
    })?;

    let path = output_path.join(file);
    std::fs::write(&path, rendered).map_err(|e| ManifestError::Write { path, source: e })
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid resource key {0:?}: keys must be a single path segment")]
    InvalidResourceKey(String),

    #[error("{processor} processor cannot handle a {found} resource")]
    KindMismatch {
        processor: ResourceKind,
        found: ResourceKind,
    },

    #[error("failed to clean output directory {path}")]
    CleanOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create output directory {path}")]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read template {path}")]
    ReadTemplate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no built-in template named {0}")]
    MissingTemplate(String),

    #[error("failed to render {file}")]
    Render { file: String, source: RenderError },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_matching_processor() {
        for kind in ResourceKind::ALL {
            assert_eq!(processor_for(kind).kind(), kind);
        }
    }

    #[test]
    fn only_metadata_kinds_have_no_manifests() {
        for kind in ResourceKind::ALL {
            assert_eq!(
                processor_for(kind).manifests().is_empty(),
                kind.is_metadata_only(),
                "{kind}"
            );
        }
    }

    #[test]
    fn every_listed_manifest_has_a_builtin() {
        for kind in ResourceKind::ALL {
            for file in processor_for(kind).manifests() {
                assert!(builtin::template(file).is_some(), "{file}");
            }
        }
    }

    #[test]
    fn output_path_accepts_plain_keys() {
        let path = resource_output_path(Path::new("/out"), "catalogservice").unwrap();
        assert_eq!(path, PathBuf::from("/out/catalogservice"));
    }

    #[test]
    fn output_path_rejects_escaping_keys() {
        for key in ["..", "../etc", "a/b", "/abs", ""] {
            assert!(
                matches!(
                    resource_output_path(Path::new("/out"), key),
                    Err(ManifestError::InvalidResourceKey(_))
                ),
                "{key:?}"
            );
        }
    }

    #[test]
    fn processor_decode_uses_its_own_tag() {
        let payload = serde_json::json!({ "name": "pg" });
        let resource = processor_for(ResourceKind::PostgresServer)
            .decode(&payload)
            .unwrap();
        assert_eq!(resource.kind(), ResourceKind::PostgresServer);
    }
}
