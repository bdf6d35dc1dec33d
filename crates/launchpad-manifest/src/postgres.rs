use launchpad_core::{Resource, ResourceKind};
use std::path::Path;

use crate::builtin::POSTGRES_SERVER_FILE;
use crate::processor::{ManifestError, ManifestOutcome, ManifestProcessor};
use crate::template::TemplateData;

const SERVER_MANIFESTS: &[&str] = &[POSTGRES_SERVER_FILE];

/// Emits a StatefulSet and Service for a managed PostgreSQL server.
pub struct PostgresServerProcessor;

impl ManifestProcessor for PostgresServerProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::PostgresServer
    }

    fn manifests(&self) -> &'static [&'static str] {
        SERVER_MANIFESTS
    }

    fn template_data(&self, resource: &Resource) -> Result<TemplateData, ManifestError> {
        match resource {
            Resource::PostgresServer(server) => Ok(TemplateData::new(&server.name, SERVER_MANIFESTS)),
            other => Err(ManifestError::KindMismatch {
                processor: self.kind(),
                found: other.kind(),
            }),
        }
    }
}

/// Databases only configure their parent server; nothing is written.
pub struct PostgresDatabaseProcessor;

impl ManifestProcessor for PostgresDatabaseProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::PostgresDatabase
    }

    fn manifests(&self) -> &'static [&'static str] {
        &[]
    }

    fn template_data(&self, resource: &Resource) -> Result<TemplateData, ManifestError> {
        match resource {
            Resource::PostgresDatabase(db) => Ok(TemplateData::new(&db.name, &[])),
            other => Err(ManifestError::KindMismatch {
                processor: self.kind(),
                found: other.kind(),
            }),
        }
    }

    fn produce_manifests(
        &self,
        key: &str,
        _resource: &Resource,
        _output_root: &Path,
        _template_dir: Option<&Path>,
    ) -> Result<ManifestOutcome, ManifestError> {
        tracing::debug!(resource = key, "database resource, no manifests");
        Ok(ManifestOutcome::Skipped)
    }
}
