use launchpad_core::{Resource, ResourceKind};

use crate::builtin::{DEPLOYMENT_FILE, SERVICE_FILE};
use crate::processor::{ManifestError, ManifestProcessor};
use crate::template::TemplateData;

const MANIFESTS: &[&str] = &[DEPLOYMENT_FILE, SERVICE_FILE];

/// Emits a Deployment and a Service for a project resource.
pub struct ProjectProcessor;

impl ManifestProcessor for ProjectProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Project
    }

    fn manifests(&self) -> &'static [&'static str] {
        MANIFESTS
    }

    fn template_data(&self, resource: &Resource) -> Result<TemplateData, ManifestError> {
        match resource {
            Resource::Project(project) => Ok(TemplateData::new(&project.name, MANIFESTS)
                .with_env(project.env.clone())
                .with_container_image(&project.container_image)),
            other => Err(ManifestError::KindMismatch {
                processor: self.kind(),
                found: other.kind(),
            }),
        }
    }
}
