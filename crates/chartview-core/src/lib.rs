//! chartview Core - shared types for the chart catalog
//!
//! This crate provides the foundational types used throughout chartview:
//! - `model`: Repositories, charts, templates and rendered manifests
//! - `Values`: Configuration values with deep merge support
//! - `manifest`: Splitting and filtering of rendered manifest text
//! - `ChartArchive`: In-memory view of a downloaded chart archive
//! - `digest`: Content hashing used for render cache keys

pub mod archive;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod model;
pub mod values;

pub use archive::{ChartArchive, ChartMetadata};
pub use digest::content_hash;
pub use error::{CoreError, Result};
pub use manifest::{post_process, split_manifests, stringify_manifests};
pub use model::{
    AnalyticsResult, Chart, ChartAnalysis, ChartDetail, KubernetesApiVersion, Manifest,
    ManifestResponse, Repo, Template,
};
pub use values::Values;
