//! Chart renderer based on MiniJinja

use chartview_core::{ChartArchive, Template, Values, split_manifests};
use minijinja::{Environment, UndefinedBehavior};

use crate::context::{RenderContext, RenderOptions};
use crate::error::{Result, TemplateError};
use crate::filters;

const TEMPLATES_PREFIX: &str = "templates/";
const NOTES_FILE: &str = "NOTES.txt";
const HOOK_ANNOTATION: &str = "helm.sh/hook";

/// One rendered YAML document and the template it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// `<chart>/<template path>`, e.g. `mychart/templates/service.yaml`
    pub path: String,
    pub content: String,
}

/// Output of rendering a whole chart
#[derive(Debug, Clone, Default)]
pub struct RenderedChart {
    /// Regular manifests in template path order
    pub manifests: Vec<RenderedDocument>,

    /// Documents annotated as lifecycle hooks
    pub hooks: Vec<RenderedDocument>,
}

impl RenderedChart {
    /// Flatten into a single multi-document text
    ///
    /// Regular manifests come first, each behind a `# Source:` marker; hooks
    /// are appended afterwards in the same shape.
    pub fn to_text(&self) -> String {
        let body = self
            .manifests
            .iter()
            .map(|doc| format!("---\n# Source: {}\n{}", doc.path, doc.content))
            .collect::<Vec<_>>()
            .join("\n");

        let mut text = format!("{}\n", body.trim());
        for hook in &self.hooks {
            text.push_str(&format!("---\n # Source: {}\n{}\n", hook.path, hook.content));
        }
        text
    }
}

/// Engine builder
#[derive(Debug, Default)]
pub struct EngineBuilder {
    strict: bool,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on undefined variables instead of rendering them empty
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            strict: self.strict,
        }
    }
}

/// The chart renderer
#[derive(Debug, Clone, Default)]
pub struct Engine {
    strict: bool,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(if self.strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        filters::register(&mut env);
        env
    }

    /// Render every template of a chart with `overrides` layered on its defaults
    ///
    /// Files whose name starts with `_` are helpers: they can be imported by
    /// other templates but produce no output of their own. NOTES.txt is not
    /// a manifest and is never rendered.
    pub fn render_chart(
        &self,
        chart: &ChartArchive,
        overrides: &Values,
        options: &RenderOptions,
    ) -> Result<RenderedChart> {
        let templates = chart.templates()?;

        let mut values = chart.values()?;
        values.merge(overrides);
        let ctx = RenderContext::new(values, &chart.metadata, options);

        let mut env = self.environment();
        for template in &templates {
            env.add_template_owned(lookup_name(template).to_string(), template.content.clone())
                .map_err(|e| TemplateError::from_minijinja(&e, &template.name, &template.content))?;
        }

        let mut output = RenderedChart::default();

        for template in &templates {
            let file_name = template.name.rsplit('/').next().unwrap_or(&template.name);
            if file_name.starts_with('_') || file_name == NOTES_FILE {
                continue;
            }

            let rendered = env
                .get_template(lookup_name(template))
                .and_then(|tmpl| tmpl.render(&ctx))
                .map_err(|e| TemplateError::from_minijinja(&e, &template.name, &template.content))?;

            let path = format!("{}/{}", chart.name(), template.name);
            for content in split_manifests(&rendered).into_values() {
                let doc = RenderedDocument {
                    path: path.clone(),
                    content,
                };
                if is_hook(&doc.content) {
                    output.hooks.push(doc);
                } else {
                    output.manifests.push(doc);
                }
            }
        }

        Ok(output)
    }
}

/// Name a template is registered under, relative to `templates/`
fn lookup_name(template: &Template) -> &str {
    template
        .name
        .strip_prefix(TEMPLATES_PREFIX)
        .unwrap_or(&template.name)
}

fn is_hook(document: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(document)
        .ok()
        .and_then(|doc| {
            doc.get("metadata")?
                .get("annotations")?
                .get(HOOK_ANNOTATION)
                .map(|_| ())
        })
        .is_some()
}
