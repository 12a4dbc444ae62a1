//! HTML template rendering for map visualizations
//!
//! Provides handlebars templates for the bundled visualization types, all of
//! which wrap a shared page layout.
//!
//! ## Layout and layers
//!
//! A visualization template wraps its layer script in `{{#> layout}} ... {{/layout}}`.
//! The parent template (`main` by default) is registered under the `layout`
//! partial name for each render and places the layer script through
//! `{{> @partial-block}}`, surrounded by three named blocks:
//!
//! - `upper_main_block` - document head, map container, map construction
//! - `middle_main_block` - opening of the `style.load` callback
//! - `lower_main_block` - closing of the callback and the document
//!
//! Child layers render with those blocks skipped (see [`skip_block`]), which
//! leaves only their layer script. The parent inlines the child fragments
//! through its `child_layers` parameter so all layers share one map.
//!
//! ## Rendering rules
//!
//! - Strict mode: any parameter a template references must be present in the
//!   context, otherwise rendering fails.
//! - No HTML auto-escaping; script values go through the `json` helper and
//!   attribute values through the `attr` helper.
//! - A fresh registry is built per render call; nothing is cached or shared.

pub mod skip_block;

use std::borrow::Cow;
use std::collections::BTreeMap;

use handlebars::{
    html_escape, no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext,
    RenderError, Renderable,
};
use serde_json::{Map, Value};

use crate::error::TemplateError;
pub use skip_block::{SkipBlocks, MAIN_BLOCKS};

/// Partial name the parent template is registered under
pub const LAYOUT_PARTIAL: &str = "layout";

/// Parent template used when none is configured
pub const DEFAULT_PARENT_TEMPLATE: &str = "main";

/// Named parameters passed to a template
pub type TemplateParams = Map<String, Value>;

/// Templates shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundledTemplate {
    /// Page layout with the three main blocks
    Main,
    Circle,
    GraduatedCircle,
    Heatmap,
    ClusteredCircle,
}

impl BundledTemplate {
    pub const ALL: [BundledTemplate; 5] = [
        BundledTemplate::Main,
        BundledTemplate::Circle,
        BundledTemplate::GraduatedCircle,
        BundledTemplate::Heatmap,
        BundledTemplate::ClusteredCircle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BundledTemplate::Main => "main",
            BundledTemplate::Circle => "circle",
            BundledTemplate::GraduatedCircle => "graduated_circle",
            BundledTemplate::Heatmap => "heatmap",
            BundledTemplate::ClusteredCircle => "clustered_circle",
        }
    }

    /// Get template content by type
    pub fn content(self) -> &'static str {
        match self {
            BundledTemplate::Main => include_str!("main.html.hbs"),
            BundledTemplate::Circle => include_str!("circle.html.hbs"),
            BundledTemplate::GraduatedCircle => include_str!("graduated_circle.html.hbs"),
            BundledTemplate::Heatmap => include_str!("heatmap.html.hbs"),
            BundledTemplate::ClusteredCircle => include_str!("clustered_circle.html.hbs"),
        }
    }
}

/// A named, read-only set of template sources
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, Cow<'static, str>>,
}

impl TemplateSet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// The templates shipped with the crate
    pub fn bundled() -> Self {
        let templates = BundledTemplate::ALL
            .iter()
            .map(|t| (t.name().to_string(), Cow::Borrowed(t.content())))
            .collect();
        TemplateSet { templates }
    }

    /// Add a template, replacing any existing one with the same name
    pub fn with_template<N, S>(mut self, name: N, source: S) -> Self
    where
        N: Into<String>,
        S: Into<Cow<'static, str>>,
    {
        self.templates.insert(name.into(), source.into());
        self
    }

    pub fn source(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|s| s.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Render `template` wrapped in `parent_template`
    ///
    /// Child layers render with the main layout blocks skipped.
    pub fn render(
        &self,
        template: &str,
        parent_template: &str,
        is_child: bool,
        params: &TemplateParams,
    ) -> Result<String, TemplateError> {
        let skip = if is_child {
            log::debug!("'{}' is a child layer, skipping main blocks", template);
            SkipBlocks::main_blocks()
        } else {
            SkipBlocks::new()
        };
        self.render_with_skip_blocks(template, parent_template, &skip, params)
    }

    /// Render with an explicit set of blocks to suppress
    pub fn render_with_skip_blocks(
        &self,
        template: &str,
        parent_template: &str,
        skip: &SkipBlocks,
        params: &TemplateParams,
    ) -> Result<String, TemplateError> {
        let source = self
            .source(template)
            .ok_or_else(|| TemplateError::UnknownTemplate(template.to_string()))?;
        let parent_source = self
            .source(parent_template)
            .ok_or_else(|| TemplateError::UnknownTemplate(parent_template.to_string()))?;

        let mut registry = new_registry();
        registry.register_template_string(template, filter_template(template, source, skip)?)?;
        registry.register_partial(
            LAYOUT_PARTIAL,
            filter_template(parent_template, parent_source, skip)?,
        )?;

        let mut context = params.clone();
        context.insert("viz".to_string(), Value::from(template));
        context.insert("parent_template".to_string(), Value::from(parent_template));

        let rendered = registry.render(template, &Value::Object(context))?;
        log::debug!("rendered '{}' ({} bytes)", template, rendered.len());
        Ok(rendered)
    }
}

fn filter_template(name: &str, source: &str, skip: &SkipBlocks) -> Result<String, TemplateError> {
    skip_block::filter_source(source, skip).map_err(|e| TemplateError::Syntax {
        template: name.to_string(),
        message: e.to_string(),
    })
}

fn new_registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(no_escape);
    registry.register_helper("block", Box::new(block_helper));
    registry.register_helper("json", Box::new(json_helper));
    registry.register_helper("attr", Box::new(attr_helper));
    registry
}

/// `{{#block "name"}}` renders its body unchanged; skipping happens before compilation
fn block_helper<'reg, 'rc>(
    h: &Helper<'reg, 'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    h.template()
        .map(|t| t.render(r, ctx, rc, out))
        .unwrap_or(Ok(()))
}

/// `{{json value}}` writes the value as a JSON literal safe inside `<script>`
fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = required_param(h, "json")?;
    out.write(&script_safe_json(value))?;
    Ok(())
}

/// `{{attr value}}` writes an HTML-escaped string for attribute positions
fn attr_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = required_param(h, "attr")?;
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    out.write(&html_escape(&text))?;
    Ok(())
}

fn required_param<'a>(h: &'a Helper, helper: &str) -> Result<&'a Value, RenderError> {
    let param = h
        .param(0)
        .ok_or_else(|| RenderError::new(format!("{} helper requires a parameter", helper)))?;
    if param.is_value_missing() {
        let path = param.relative_path().map(String::as_str).unwrap_or("?");
        return Err(RenderError::new(format!(
            "Variable \"{}\" not found in strict mode",
            path
        )));
    }
    Ok(param.value())
}

/// Serialize JSON so that embedded strings cannot close the surrounding script tag
pub fn script_safe_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}
