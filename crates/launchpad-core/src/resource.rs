//! The closed set of resource kinds an application model may contain.
//!
//! Every kind is identified by a versioned tag (`project.v0`, ...). A tag
//! selects exactly one decoder; anything else is rejected by [`decode`]
//! before it reaches manifest generation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

const PROJECT_TAG: &str = "project.v0";
const POSTGRES_SERVER_TAG: &str = "postgres.server.v0";
const POSTGRES_DATABASE_TAG: &str = "postgres.database.v0";

/// Kind discriminator for [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Project,
    PostgresServer,
    PostgresDatabase,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Project,
        ResourceKind::PostgresServer,
        ResourceKind::PostgresDatabase,
    ];

    /// The tag this kind is written as in the application model.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Project => PROJECT_TAG,
            Self::PostgresServer => POSTGRES_SERVER_TAG,
            Self::PostgresDatabase => POSTGRES_DATABASE_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn supported_tags() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.tag()).collect()
    }

    /// Metadata-only kinds carry configuration for other resources and
    /// never produce manifests of their own.
    pub fn is_metadata_only(self) -> bool {
        matches!(self, Self::PostgresDatabase)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::PostgresServer => "postgres server",
            Self::PostgresDatabase => "postgres database",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A buildable application project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResource {
    #[serde(default)]
    pub name: String,
    /// Fully qualified image reference the deployment runs.
    /// Empty until the caller resolves it from the container settings.
    #[serde(default)]
    pub container_image: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Project file handed to the build tool. Projects without a path are
    /// deployed from `container_image` as-is and never built.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// A managed PostgreSQL server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresServerResource {
    #[serde(default)]
    pub name: String,
}

/// A database hosted on a [`PostgresServerResource`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresDatabaseResource {
    #[serde(default)]
    pub name: String,
    /// Key of the server resource this database lives on.
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Project(ProjectResource),
    PostgresServer(PostgresServerResource),
    PostgresDatabase(PostgresDatabaseResource),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Project(_) => ResourceKind::Project,
            Self::PostgresServer(_) => ResourceKind::PostgresServer,
            Self::PostgresDatabase(_) => ResourceKind::PostgresDatabase,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Project(p) => &p.name,
            Self::PostgresServer(s) => &s.name,
            Self::PostgresDatabase(d) => &d.name,
        }
    }

    /// Use `key` as the name when the record did not carry one.
    pub(crate) fn name_or(mut self, key: &str) -> Self {
        let name = match &mut self {
            Self::Project(p) => &mut p.name,
            Self::PostgresServer(s) => &mut s.name,
            Self::PostgresDatabase(d) => &mut d.name,
        };
        if name.is_empty() {
            key.clone_into(name);
        }
        self
    }
}

/// Decode a raw resource record into a [`Resource`], dispatching on `tag`.
///
/// # Examples
///
/// ```
/// use launchpad_core::{decode, ResourceKind};
///
/// let payload = serde_json::json!({ "type": "postgres.server.v0", "name": "pg" });
/// let resource = decode("postgres.server.v0", &payload).unwrap();
/// assert_eq!(resource.kind(), ResourceKind::PostgresServer);
/// assert_eq!(resource.name(), "pg");
/// ```
pub fn decode(tag: &str, payload: &Value) -> crate::Result<Resource> {
    let kind = ResourceKind::from_tag(tag).ok_or_else(|| crate::Error::UnsupportedResourceKind {
        tag: tag.to_owned(),
    })?;

    let invalid = |source: serde_json::Error| crate::Error::InvalidResource {
        kind: kind.label(),
        source,
    };

    let resource = match kind {
        ResourceKind::Project => {
            Resource::Project(ProjectResource::deserialize(payload).map_err(invalid)?)
        }
        ResourceKind::PostgresServer => {
            Resource::PostgresServer(PostgresServerResource::deserialize(payload).map_err(invalid)?)
        }
        ResourceKind::PostgresDatabase => Resource::PostgresDatabase(
            PostgresDatabaseResource::deserialize(payload).map_err(invalid)?,
        ),
    };

    Ok(resource)
}
