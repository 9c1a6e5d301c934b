//! File-backed Liquid templates
//!
//! Templates live under the search roots at
//! `{template_dir}/{type}-{slug}.{extension}`, e.g. `blocks/block-hero.liquid`
//! or `blocks/preview-hero.liquid`. The first template found in the render
//! mode's lookup order is parsed and rendered with three globals:
//!
//! - `attributes`: the reconciled attribute values
//! - `block`: the full block definition
//! - `fields`: every attribute as echoed text, passed through the output filters

use std::fs;
use std::path::PathBuf;

use serde_json::Value as JsonValue;

use super::output::OutputFilters;
use super::render::{RenderMode, TemplateContext, TemplateRenderer};
use crate::config::LoaderConfig;
use crate::source::locator::TemplateLocator;

/// Template collaborator backed by Liquid files under the search roots
pub struct LiquidTemplates {
    locator: TemplateLocator,
    template_dir: String,
    extension: String,
    filters: OutputFilters,
    parser: liquid::Parser,
}

impl LiquidTemplates {
    /// Create a renderer using the template layout from `config`
    pub fn new(
        locator: TemplateLocator,
        config: &LoaderConfig,
        filters: OutputFilters,
    ) -> Result<Self, TemplateError> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| TemplateError::Parser(e.to_string()))?;

        Ok(Self {
            locator,
            template_dir: config.template_dir.clone(),
            extension: config.template_extension.clone(),
            filters,
            parser,
        })
    }

    pub fn filters(&self) -> &OutputFilters {
        &self.filters
    }

    /// Relative path of the template for one type and slug
    pub fn template_file(&self, template_type: &str, slug: &str) -> String {
        format!(
            "{}/{}-{}.{}",
            self.template_dir, template_type, slug, self.extension
        )
    }

    /// Locate the first template in `mode`'s lookup order
    pub fn locate(&self, slug: &str, mode: RenderMode) -> Result<PathBuf, TemplateError> {
        let mut last_tried = String::new();

        for template_type in mode.template_types() {
            last_tried = self.template_file(template_type, slug);
            if let Some(path) = self.locator.locate(&last_tried) {
                return Ok(path);
            }
        }

        Err(TemplateError::NotFound { file: last_tried })
    }

    /// Locate, parse and render a template
    pub fn try_render(
        &self,
        slug: &str,
        mode: RenderMode,
        context: &TemplateContext<'_>,
    ) -> Result<String, TemplateError> {
        let path = self.locate(slug, mode)?;
        let source = fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;

        let template = self
            .parser
            .parse(&source)
            .map_err(|e| TemplateError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let globals = self.globals(context)?;
        template.render(&globals).map_err(|e| TemplateError::Render {
            path,
            message: e.to_string(),
        })
    }

    /// Template globals.
    ///
    /// Every declared field has an entry in `attributes` and `fields`, even when
    /// no value was saved for it: `attributes` holds `nil` and `fields` holds
    /// the echoed text of the missing value.
    fn globals(&self, context: &TemplateContext<'_>) -> Result<liquid::Object, TemplateError> {
        let mut attributes: serde_json::Map<String, JsonValue> = context
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        for (name, _) in context.block.fields() {
            attributes.entry(name.as_str()).or_insert(JsonValue::Null);
        }

        let fields: serde_json::Map<String, JsonValue> = context
            .block
            .fields()
            .map(|(name, _)| name)
            .chain(context.attributes.keys())
            .map(|name| {
                let text = context.field_text(name, &self.filters);
                (name.clone(), JsonValue::String(text))
            })
            .collect();

        let block = serde_json::to_value(context.block)
            .map_err(|e| TemplateError::Context(e.to_string()))?;

        let mut globals = liquid::Object::new();
        for (key, value) in [
            ("attributes", JsonValue::Object(attributes)),
            ("block", block),
            ("fields", JsonValue::Object(fields)),
        ] {
            let value =
                liquid::model::to_value(&value).map_err(|e| TemplateError::Context(e.to_string()))?;
            globals.insert(key.into(), value);
        }

        Ok(globals)
    }
}

impl TemplateRenderer for LiquidTemplates {
    fn render(&self, slug: &str, mode: RenderMode, context: &TemplateContext<'_>) -> String {
        match self.try_render(slug, mode, context) {
            Ok(output) => output,
            Err(TemplateError::NotFound { file }) => {
                tracing::warn!(%slug, %file, "block template not found");
                not_found_notice(&file)
            }
            Err(e) => {
                tracing::warn!(%slug, %e, "failed to render block template");
                String::new()
            }
        }
    }
}

/// Markup shown in place of a block whose template is missing
pub fn not_found_notice(file: &str) -> String {
    format!(
        "<div class=\"notice notice-warning\">Template file <code>{}</code> not found.</div>",
        html_escape::encode_text(file)
    )
}

/// Template errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template exists for any type in the lookup order
    #[error("template file {file} not found")]
    NotFound { file: String },

    /// The Liquid parser could not be built
    #[error("failed to build template parser: {0}")]
    Parser(String),

    /// The template file could not be read
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template has invalid syntax
    #[error("failed to parse template {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Rendering failed
    #[error("failed to render template {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    /// Attributes or block could not be converted into template globals
    #[error("invalid template context: {0}")]
    Context(String),
}
