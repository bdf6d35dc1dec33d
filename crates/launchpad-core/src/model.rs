use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::resource::{ProjectResource, Resource, decode};

/// A decoded application model: resource keys mapped to resources, in the
/// order they appear in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationModel {
    resources: Vec<(String, Resource)>,
}

#[derive(Deserialize)]
struct RawModel {
    #[serde(default)]
    resources: Map<String, Value>,
}

impl ApplicationModel {
    pub fn new(resources: Vec<(String, Resource)>) -> Self {
        Self { resources }
    }

    /// Parse a model document of the form
    /// `{"resources": {"<key>": {"type": "<tag>", ...}}}`.
    pub fn from_json(content: &str) -> crate::Result<Self> {
        let raw: RawModel =
            serde_json::from_str(content).map_err(|e| crate::Error::ModelParse { source: e })?;

        let mut resources = Vec::with_capacity(raw.resources.len());
        for (key, payload) in raw.resources {
            let tag = payload
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| crate::Error::MissingResourceType { key: key.clone() })?;

            let resource = decode(tag, &payload)?.name_or(&key);
            tracing::debug!(key = %key, kind = %resource.kind(), "decoded resource");
            resources.push((key, resource));
        }

        Ok(Self { resources })
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ModelLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn resources(&self) -> &[(String, Resource)] {
        &self.resources
    }

    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, resource)| resource)
    }

    /// Project resources, in model order.
    pub fn projects(&self) -> impl Iterator<Item = (&str, &ProjectResource)> {
        self.resources.iter().filter_map(|(key, resource)| match resource {
            Resource::Project(project) => Some((key.as_str(), project)),
            _ => None,
        })
    }

    /// Project resources, mutably, so callers can resolve container images.
    pub fn projects_mut(&mut self) -> impl Iterator<Item = (&str, &mut ProjectResource)> {
        self.resources
            .iter_mut()
            .filter_map(|(key, resource)| match resource {
                Resource::Project(project) => Some((key.as_str(), project)),
                _ => None,
            })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
