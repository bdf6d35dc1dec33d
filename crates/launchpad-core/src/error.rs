use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Application model ──
    #[error("failed to read application model from {path}")]
    ModelLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse application model")]
    ModelParse { source: serde_json::Error },

    #[error("resource '{key}' has no \"type\" field")]
    MissingResourceType { key: String },

    #[error(
        "unsupported resource kind '{tag}'; supported kinds: {}",
        crate::resource::ResourceKind::supported_tags().join(", ")
    )]
    UnsupportedResourceKind { tag: String },

    #[error("invalid {kind} resource")]
    InvalidResource {
        kind: &'static str,
        source: serde_json::Error,
    },
}
