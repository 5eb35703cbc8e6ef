//! chartview Engine - renders chart archives into manifest text
//!
//! Templates are Jinja2 (MiniJinja) with Helm-flavoured filters. Rendering a
//! chart produces one document per template output, each tagged with a
//! `# Source: <chart>/<path>` marker, and keeps lifecycle hooks apart so they
//! can be appended after the regular manifests.

pub mod context;
pub mod engine;
pub mod error;
pub mod filters;

pub use context::{ChartInfo, RenderContext, RenderOptions, ReleaseInfo};
pub use engine::{Engine, EngineBuilder, RenderedChart, RenderedDocument};
pub use error::{EngineError, Result, TemplateError, TemplateErrorKind};
