//! Engine error types

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template error in {}: {}", .0.template, .0.message)]
    Template(#[from] TemplateError),

    #[error("Chart error: {0}")]
    Chart(#[from] chartview_core::CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Broad category of a template failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedVariable,
    UnknownFilter,
    UnknownFunction,
    SyntaxError,
    TypeError,
    MissingTemplate,
    Other,
}

impl From<minijinja::ErrorKind> for TemplateErrorKind {
    fn from(kind: minijinja::ErrorKind) -> Self {
        use minijinja::ErrorKind;
        match kind {
            ErrorKind::UndefinedError => Self::UndefinedVariable,
            ErrorKind::UnknownFilter => Self::UnknownFilter,
            ErrorKind::UnknownFunction => Self::UnknownFunction,
            ErrorKind::SyntaxError => Self::SyntaxError,
            ErrorKind::TemplateNotFound => Self::MissingTemplate,
            ErrorKind::NonPrimitive | ErrorKind::NonKey | ErrorKind::InvalidOperation => {
                Self::TypeError
            }
            _ => Self::Other,
        }
    }
}

/// A template failed to parse or render
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(chartview::template::render))]
pub struct TemplateError {
    pub message: String,

    pub kind: TemplateErrorKind,

    /// Template path relative to the chart root
    pub template: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl TemplateError {
    pub fn from_minijinja(err: &minijinja::Error, template: &str, source: &str) -> Self {
        let message = match err.detail() {
            Some(detail) => format!("{}: {detail}", err.kind()),
            None => err.kind().to_string(),
        };

        Self {
            message,
            kind: err.kind().into(),
            template: template.to_string(),
            src: NamedSource::new(template, source.to_string()),
            span: err.line().and_then(|line| line_span(source, line)),
        }
    }

    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

/// Byte span covering a 1-based line
fn line_span(source: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (n, text) in source.split('\n').enumerate() {
        if n + 1 == line {
            return Some(SourceSpan::new(offset.into(), text.len()));
        }
        offset += text.len() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span() {
        let source = "a: 1\nbb: 2\nccc: 3";
        let span = line_span(source, 2).unwrap();
        assert_eq!(span.offset(), 5);
        assert_eq!(span.len(), 5);
        assert!(line_span(source, 4).is_none());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            TemplateErrorKind::from(minijinja::ErrorKind::UndefinedError),
            TemplateErrorKind::UndefinedVariable
        );
        assert_eq!(
            TemplateErrorKind::from(minijinja::ErrorKind::SyntaxError),
            TemplateErrorKind::SyntaxError
        );
    }
}
