//! Core types and configuration for launchpad.
//!
//! This crate defines the application model ([`ApplicationModel`]), the closed
//! set of resource kinds with their decoders ([`Resource`], [`decode`]), the
//! `launchpad.toml` schema ([`LaunchpadConfig`]), and shared error types.

pub mod config;
pub mod error;
pub mod model;
pub mod resource;

pub use config::{BuildConfig, ContainerConfig, LaunchpadConfig, TemplateConfig};
pub use error::{Error, Result};
pub use model::ApplicationModel;
pub use resource::{
    PostgresDatabaseResource, PostgresServerResource, ProjectResource, Resource, ResourceKind,
    decode,
};
