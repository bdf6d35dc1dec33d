//! Kustomize manifest generation for launchpad.
//!
//! # Pipeline
//!
//! ```text
//! launchpad generate
//!   1. Decode     ── ApplicationModel::load()  (launchpad-core)
//!   2. Dispatch   ── processor_for(resource.kind())
//!   3. Clean      ── <output>/<key>/ removed and recreated
//!   4. Render     ── each manifest of the kind, then kustomization.yml
//! ```
//!
//! # Templates
//!
//! Every manifest file is rendered from a template of the same name.
//! When a template directory is configured and contains that file, it wins;
//! otherwise the built-in template is used. See [`template`] for the
//! placeholder vocabulary.
//!
//! # Idempotence
//!
//! A resource's output directory is always emptied before writing, and
//! environment entries render in sorted key order, so generating the same
//! model twice yields byte-identical trees.

pub mod builtin;
pub mod postgres;
pub mod processor;
pub mod project;
pub mod template;

pub use processor::{
    ManifestError, ManifestOutcome, ManifestProcessor, generate_all, processor_for,
    produce_manifests,
};
pub use template::{RenderError, TemplateData};
