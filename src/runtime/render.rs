//! Render reconciliation
//!
//! Rendering a block merges the supplied attribute values with the block's
//! field defaults and hands both to a [`TemplateRenderer`] through an explicit
//! [`TemplateContext`]. On the front end, fields that were never saved get
//! their declared default. In the editor's preview the editor already sends
//! every value from its form, so nothing is injected there.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::output::{echo_text, OutputFilters, OutputValue};
use crate::core::block::{Attributes, BlockDefinition};

/// Request parameter value that selects the editor preview
pub const EDIT_CONTEXT: &str = "edit";

/// Template lookup order for a render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Front-end output: `block` templates only
    Block,
    /// Editor preview: `preview` templates first, then `block`
    Preview,
}

impl RenderMode {
    /// Template types to try, in order
    pub fn template_types(self) -> &'static [&'static str] {
        match self {
            RenderMode::Block => &["block"],
            RenderMode::Preview => &["preview", "block"],
        }
    }
}

/// Per-request render settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderContext {
    edit_preview: bool,
}

impl RenderContext {
    /// Front-end render
    pub fn front_end() -> Self {
        Self {
            edit_preview: false,
        }
    }

    /// Editor preview render
    pub fn edit_preview() -> Self {
        Self { edit_preview: true }
    }

    /// Build from the request's `context` parameter; `"edit"` selects the preview
    pub fn from_request(context: Option<&str>) -> Self {
        Self::from_request_with(context, EDIT_CONTEXT)
    }

    /// Build from the request's `context` parameter with a custom preview value
    pub fn from_request_with(context: Option<&str>, edit_value: &str) -> Self {
        Self {
            edit_preview: context == Some(edit_value),
        }
    }

    pub fn is_edit_preview(&self) -> bool {
        self.edit_preview
    }

    pub fn mode(&self) -> RenderMode {
        if self.edit_preview {
            RenderMode::Preview
        } else {
            RenderMode::Block
        }
    }
}

/// Everything a template sees for one render
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub attributes: &'a Attributes,
    pub block: &'a BlockDefinition,
}

impl<'a> TemplateContext<'a> {
    pub fn new(attributes: &'a Attributes, block: &'a BlockDefinition) -> Self {
        Self { attributes, block }
    }

    /// Raw attribute value
    pub fn attribute(&self, name: &str) -> Option<&JsonValue> {
        self.attributes.get(name)
    }

    /// Control type of a field, if the block declares one
    pub fn control(&self, name: &str) -> Option<&str> {
        self.block.field(name).and_then(|field| field.control())
    }

    /// Field value for a template.
    ///
    /// A missing attribute reads as `false`, which is how unchecked checkboxes
    /// arrive. When `echo` is set the value is first turned into text, then
    /// passed through the filter for the field's control type.
    pub fn field(&self, name: &str, echo: bool, filters: &OutputFilters) -> OutputValue {
        let value = self
            .attribute(name)
            .cloned()
            .unwrap_or(JsonValue::Bool(false));

        let value = if echo {
            JsonValue::String(echo_text(&value))
        } else {
            value
        };

        filters.resolve(value, self.control(name), echo)
    }

    /// Echoed text of a field
    pub fn field_text(&self, name: &str, filters: &OutputFilters) -> String {
        self.field(name, true, filters).to_echo_string()
    }
}

/// Template collaborator: renders the template for a block slug
pub trait TemplateRenderer: Send + Sync {
    /// Render the first template found for `slug` in `mode`'s lookup order
    fn render(&self, slug: &str, mode: RenderMode, context: &TemplateContext<'_>) -> String;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str, RenderMode, &TemplateContext<'_>) -> String + Send + Sync,
{
    fn render(&self, slug: &str, mode: RenderMode, context: &TemplateContext<'_>) -> String {
        self(slug, mode, context)
    }
}

/// Attribute set a template should see.
///
/// Outside the editor preview, every field missing from `supplied` that
/// declares a default gets that default.
pub fn reconcile_attributes(
    block: &BlockDefinition,
    supplied: &Attributes,
    context: &RenderContext,
) -> Attributes {
    let mut attributes = supplied.clone();

    if context.is_edit_preview() {
        return attributes;
    }

    for (name, field) in block.fields() {
        if attributes.contains_key(name) {
            continue;
        }
        if let Some(default) = field.default_value() {
            attributes.insert(name.clone(), default.clone());
        }
    }

    attributes
}

/// Reconcile attributes and render the block's template
pub fn render_block(
    block: &BlockDefinition,
    supplied: &Attributes,
    context: &RenderContext,
    templates: &dyn TemplateRenderer,
) -> String {
    let attributes = reconcile_attributes(block, supplied, context);
    let template_context = TemplateContext::new(&attributes, block);

    tracing::trace!(block = %block.name, mode = ?context.mode(), "rendering block");
    templates.render(&block.name, context.mode(), &template_context)
}

/// Render callback registered for one block.
///
/// Owns the block definition as it was at registration time, so later changes
/// to the loaded block map never alter how this block renders.
#[derive(Clone)]
pub struct BlockRenderer {
    block: BlockDefinition,
    templates: Arc<dyn TemplateRenderer>,
}

impl BlockRenderer {
    pub fn new(block: BlockDefinition, templates: Arc<dyn TemplateRenderer>) -> Self {
        Self { block, templates }
    }

    /// The captured block definition
    pub fn block(&self) -> &BlockDefinition {
        &self.block
    }

    pub fn render(&self, supplied: &Attributes, context: &RenderContext) -> String {
        render_block(&self.block, supplied, context, self.templates.as_ref())
    }
}

impl fmt::Debug for BlockRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockRenderer")
            .field("block", &self.block.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::FieldDefinition;
    use crate::runtime::output::{UserRecord, USER_CONTROL};
    use serde_json::json;
    use std::collections::HashMap;

    fn card() -> BlockDefinition {
        BlockDefinition::new("card")
            .with_field("color", FieldDefinition::new("color").with_default("red"))
            .with_field("title", FieldDefinition::new("title"))
    }

    fn echo_renderer(slug: &str, mode: RenderMode, ctx: &TemplateContext<'_>) -> String {
        format!(
            "{}|{}|{}",
            slug,
            mode.template_types().join(","),
            serde_json::to_string(ctx.attributes).unwrap()
        )
    }

    #[test]
    fn test_front_end_injects_defaults() {
        let attrs = reconcile_attributes(&card(), &Attributes::new(), &RenderContext::front_end());
        assert_eq!(attrs.get("color"), Some(&json!("red")));
        assert!(!attrs.contains_key("title"));
    }

    #[test]
    fn test_edit_preview_leaves_attributes_alone() {
        let attrs =
            reconcile_attributes(&card(), &Attributes::new(), &RenderContext::edit_preview());
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_supplied_values_win_over_defaults() {
        let mut supplied = Attributes::new();
        supplied.insert("color".into(), json!("blue"));

        let attrs = reconcile_attributes(&card(), &supplied, &RenderContext::front_end());
        assert_eq!(attrs.get("color"), Some(&json!("blue")));
    }

    #[test]
    fn test_supplied_null_is_not_replaced() {
        let mut supplied = Attributes::new();
        supplied.insert("color".into(), JsonValue::Null);

        let attrs = reconcile_attributes(&card(), &supplied, &RenderContext::front_end());
        assert_eq!(attrs.get("color"), Some(&JsonValue::Null));
    }

    #[test]
    fn test_falsy_default_is_injected() {
        let block = BlockDefinition::new("toggle").with_field(
            "enabled",
            FieldDefinition::new("enabled").with_type("boolean").with_default(false),
        );

        let attrs = reconcile_attributes(&block, &Attributes::new(), &RenderContext::front_end());
        assert_eq!(attrs.get("enabled"), Some(&json!(false)));
    }

    #[test]
    fn test_context_parameter() {
        assert!(RenderContext::from_request(Some("edit")).is_edit_preview());
        assert!(!RenderContext::from_request(Some("view")).is_edit_preview());
        assert!(!RenderContext::from_request(None).is_edit_preview());
        assert!(RenderContext::from_request_with(Some("preview"), "preview").is_edit_preview());
    }

    #[test]
    fn test_render_mode_lookup_order() {
        assert_eq!(RenderContext::front_end().mode().template_types(), &["block"]);
        assert_eq!(
            RenderContext::edit_preview().mode().template_types(),
            &["preview", "block"]
        );
    }

    #[test]
    fn test_render_block_passes_slug_mode_and_attributes() {
        let out = render_block(
            &card(),
            &Attributes::new(),
            &RenderContext::front_end(),
            &echo_renderer,
        );
        assert_eq!(out, r#"card|block|{"color":"red"}"#);

        let out = render_block(
            &card(),
            &Attributes::new(),
            &RenderContext::edit_preview(),
            &echo_renderer,
        );
        assert_eq!(out, "card|preview,block|{}");
    }

    #[test]
    fn test_block_renderer_keeps_captured_block() {
        let mut block = card();
        let renderer = BlockRenderer::new(block.clone(), Arc::new(echo_renderer));

        block.name = "changed".into();

        let out = renderer.render(&Attributes::new(), &RenderContext::front_end());
        assert!(out.starts_with("card|"));
        assert_eq!(renderer.block().name, "card");
    }

    #[test]
    fn test_field_helper() {
        let block = BlockDefinition::new("byline")
            .with_field("author", FieldDefinition::new("author").with_control(USER_CONTROL))
            .with_field("tags", FieldDefinition::new("tags").with_type("array"))
            .with_field("featured", FieldDefinition::new("featured").with_type("boolean"));

        let mut attributes = Attributes::new();
        attributes.insert("author".into(), json!("jdoe"));
        attributes.insert("tags".into(), json!(["news", "tech"]));

        let mut users = HashMap::new();
        users.insert("jdoe".to_string(), UserRecord::new(1, "jdoe", "Jane Doe"));
        let filters = OutputFilters::with_users(users);

        let ctx = TemplateContext::new(&attributes, &block);
        assert_eq!(ctx.field_text("author", &filters), "Jane Doe");
        assert_eq!(ctx.field_text("tags", &filters), "news, tech");
        assert_eq!(ctx.field_text("featured", &filters), "No");
        assert!(ctx.field("featured", false, &filters).is_absent());
        assert_eq!(
            ctx.field("author", false, &filters).as_user().map(|u| u.id),
            Some(1)
        );
    }
}
