//! Map visualizations
//!
//! A [`MapViz`] holds a GeoJSON feature collection, the shared map options
//! and the styling for one visualization kind. Rendering assembles the
//! template parameters and hands them to the template renderer.
//!
//! Several visualizations can share one map: the parent renders the page
//! and each child contributes only its layer script. Composition is a single
//! level deep.

pub mod kinds;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::credentials::AccessToken;
use crate::display::{as_iframe, NotebookDisplay};
use crate::error::{LayerConfigurationError, MapVizError};
use crate::templates::{TemplateParams, TemplateSet, DEFAULT_PARENT_TEMPLATE};

pub use kinds::{
    CircleStyle, ClusteredCircleStyle, FunctionType, GraduatedCircleStyle, HeatmapStyle, Stop,
    Stops, VizKind,
};

/// Mapbox GL JS release loaded by the generated page
pub const GL_JS_VERSION: &str = "v0.44.0";

/// Layer id used by a standalone visualization that does not set one
pub const DEFAULT_LAYER_ID: &str = "layer_id";

const MAX_ZOOM_LEVEL: f64 = 24.0;

/// Map and layout options shared by every visualization kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Public Mapbox token; falls back to `MAPBOX_ACCESS_TOKEN`
    pub access_token: Option<String>,
    /// Map center as (longitude, latitude)
    pub center: (f64, f64),
    /// Existing style layer to insert the data layer beneath
    pub below_layer: String,
    /// Opacity of the data layer, 0..=1
    pub opacity: f64,
    /// HTML id of the map container
    pub div_id: String,
    /// CSS height of the frame
    pub height: String,
    /// CSS width of the frame
    pub width: String,
    pub style_url: String,
    /// Initial zoom level
    pub zoom: f64,
    /// Zoom range in which the layer is visible
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Distinguishes layers sharing a map; required for parents and children
    pub layer_id: Option<String>,
    /// Layout template the visualization is wrapped in
    pub parent_template: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            access_token: None,
            center: (0.0, 0.0),
            below_layer: String::new(),
            opacity: 1.0,
            div_id: "map".to_string(),
            height: "500px".to_string(),
            width: "100%".to_string(),
            style_url: "mapbox://styles/mapbox/light-v9?optimize=true".to_string(),
            zoom: 0.0,
            min_zoom: 0.0,
            max_zoom: MAX_ZOOM_LEVEL,
            layer_id: None,
            parent_template: DEFAULT_PARENT_TEMPLATE.to_string(),
        }
    }
}

impl MapOptions {
    pub fn with_access_token<S: Into<String>>(mut self, token: S) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_layer_id<S: Into<String>>(mut self, layer_id: S) -> Self {
        self.layer_id = Some(layer_id.into());
        self
    }

    pub fn with_div_id<S: Into<String>>(mut self, div_id: S) -> Self {
        self.div_id = div_id.into();
        self
    }

    pub fn with_center(mut self, longitude: f64, latitude: f64) -> Self {
        self.center = (longitude, latitude);
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_size<W: Into<String>, H: Into<String>>(mut self, width: W, height: H) -> Self {
        self.width = width.into();
        self.height = height.into();
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), MapVizError> {
        let in_zoom_range = |z: f64| (0.0..=MAX_ZOOM_LEVEL).contains(&z);

        if !in_zoom_range(self.min_zoom) || !in_zoom_range(self.max_zoom) {
            return Err(MapVizError::InvalidOptions(format!(
                "zoom bounds must be within 0..={}, got {}..{}",
                MAX_ZOOM_LEVEL, self.min_zoom, self.max_zoom
            )));
        }
        if !in_zoom_range(self.zoom) {
            return Err(MapVizError::InvalidOptions(format!(
                "zoom must be within 0..={}, got {}",
                MAX_ZOOM_LEVEL, self.zoom
            )));
        }
        let (longitude, latitude) = self.center;
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(MapVizError::InvalidOptions(format!(
                "center must be finite, got ({}, {})",
                longitude, latitude
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapVizError::InvalidOptions(format!(
                "min_zoom {} is greater than max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(MapVizError::InvalidOptions(format!(
                "opacity must be within 0..=1, got {}",
                self.opacity
            )));
        }
        if self.div_id.is_empty() {
            return Err(MapVizError::InvalidOptions("div_id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// What [`MapViz::show`] produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The iframe handed to the notebook display
    Displayed { iframe: String },
    /// A child layer's script fragment, for its parent to embed
    Fragment(String),
}

/// A map visualization, possibly with child layers
#[derive(Debug, Clone)]
pub struct MapViz {
    pub data: Value,
    pub options: MapOptions,
    pub kind: VizKind,
    access_token: AccessToken,
    pub is_child: bool,
    /// Recomputed from the child list on every render
    pub is_parent: bool,
    child_layers: Vec<MapViz>,
}

impl MapViz {
    /// Create a visualization, resolving and validating the access token
    pub fn new(kind: VizKind, data: Value, options: MapOptions) -> Result<Self, MapVizError> {
        kind.validate()?;
        options.validate()?;
        let access_token = AccessToken::resolve(options.access_token.as_deref())?;

        if !is_feature_collection(&data) {
            log::warn!(
                "{} visualization data is not a GeoJSON FeatureCollection",
                kind.template_name()
            );
        }

        Ok(MapViz {
            data,
            options,
            kind,
            access_token,
            is_child: false,
            is_parent: false,
            child_layers: Vec::new(),
        })
    }

    pub fn circle(data: Value, style: CircleStyle, options: MapOptions) -> Result<Self, MapVizError> {
        Self::new(VizKind::Circle(style), data, options)
    }

    pub fn graduated_circle(
        data: Value,
        style: GraduatedCircleStyle,
        options: MapOptions,
    ) -> Result<Self, MapVizError> {
        Self::new(VizKind::GraduatedCircle(style), data, options)
    }

    pub fn heatmap(data: Value, style: HeatmapStyle, options: MapOptions) -> Result<Self, MapVizError> {
        Self::new(VizKind::Heatmap(style), data, options)
    }

    pub fn clustered_circle(
        data: Value,
        style: ClusteredCircleStyle,
        options: MapOptions,
    ) -> Result<Self, MapVizError> {
        Self::new(VizKind::ClusteredCircle(style), data, options)
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn template_name(&self) -> &'static str {
        self.kind.template_name()
    }

    pub fn layer_id(&self) -> Option<&str> {
        self.options.layer_id.as_deref()
    }

    pub fn child_layers(&self) -> &[MapViz] {
        &self.child_layers
    }

    /// Whether this visualization has child layers
    pub fn check_is_parent(&self) -> bool {
        !self.child_layers.is_empty()
    }

    /// Attach `child` as a layer drawn on this visualization's map
    ///
    /// Only one level is supported: a child that already carries layers is
    /// rejected instead of losing them.
    pub fn add_child_layer(&mut self, mut child: MapViz) -> Result<(), LayerConfigurationError> {
        if !child.child_layers.is_empty() {
            return Err(LayerConfigurationError::NestedChildLayers {
                count: child.child_layers.len(),
            });
        }

        child.is_child = true;
        child.is_parent = false;
        child.child_layers.clear();
        log::debug!(
            "adding {} child layer {:?} to '{}'",
            child.template_name(),
            child.layer_id(),
            self.options.div_id
        );
        self.child_layers.push(child);
        Ok(())
    }

    /// Check that every layer sharing this map can be told apart
    pub fn validate_layers(&self) -> Result<(), LayerConfigurationError> {
        if self.is_child && !self.child_layers.is_empty() {
            return Err(LayerConfigurationError::NestedChildLayers {
                count: self.child_layers.len(),
            });
        }
        if (self.is_parent || self.is_child) && self.layer_id().is_none() {
            return Err(LayerConfigurationError::MissingLayerId {
                div_id: self.options.div_id.clone(),
                role: if self.is_child { "child" } else { "parent" },
            });
        }

        let mut seen: BTreeSet<&str> = self.layer_id().into_iter().collect();
        for child in &self.child_layers {
            if !child.child_layers.is_empty() {
                return Err(LayerConfigurationError::NestedChildLayers {
                    count: child.child_layers.len(),
                });
            }
            let id = child.layer_id().ok_or_else(|| LayerConfigurationError::MissingLayerId {
                div_id: self.options.div_id.clone(),
                role: "child",
            })?;
            if !seen.insert(id) {
                return Err(LayerConfigurationError::DuplicateLayerId(id.to_string()));
            }
        }
        Ok(())
    }

    /// Render with the bundled templates
    pub fn create_html(&mut self) -> Result<String, MapVizError> {
        self.create_html_with(&TemplateSet::bundled())
    }

    /// Render the visualization (and its child layers) to HTML
    ///
    /// A child renders to its layer script only; anything else renders a
    /// complete document.
    pub fn create_html_with(&mut self, templates: &TemplateSet) -> Result<String, MapVizError> {
        self.is_parent = self.check_is_parent();
        self.validate_layers()?;

        let mut fragments = Vec::with_capacity(self.child_layers.len());
        for child in &mut self.child_layers {
            fragments.push(Value::String(child.create_html_with(templates)?));
        }

        let mut params = self.base_template_variables(fragments);
        self.kind.add_unique_template_variables(&mut params)?;

        let html = templates.render(
            self.template_name(),
            &self.options.parent_template,
            self.is_child,
            &params,
        )?;

        log::info!(
            "rendered {} visualization '{}' (layer {}, {} child layers, {} bytes)",
            self.template_name(),
            self.options.div_id,
            self.effective_layer_id(),
            self.child_layers.len(),
            html.len()
        );
        Ok(html)
    }

    /// Render and show the visualization
    ///
    /// Child layers are not displayed on their own; their fragment is
    /// returned instead.
    pub fn show(&mut self, display: &mut dyn NotebookDisplay) -> Result<ShowOutcome, MapVizError> {
        let html = self.create_html()?;
        if self.is_child {
            return Ok(ShowOutcome::Fragment(html));
        }

        let iframe = self.as_iframe(&html);
        display.display_html(&iframe)?;
        Ok(ShowOutcome::Displayed { iframe })
    }

    /// Wrap a rendered document in an iframe sized by the options
    pub fn as_iframe(&self, html: &str) -> String {
        as_iframe(html, &self.options.div_id, &self.options.width, &self.options.height)
    }

    fn effective_layer_id(&self) -> &str {
        self.layer_id().unwrap_or(DEFAULT_LAYER_ID)
    }

    fn base_template_variables(&self, child_layers: Vec<Value>) -> TemplateParams {
        let options = &self.options;
        let label_property = match self.kind.label_property() {
            Some(property) => json!(format!("{{{}}}", property)),
            None => Value::Null,
        };

        let mut params = TemplateParams::new();
        let mut set = |key: &str, value: Value| {
            params.insert(key.to_string(), value);
        };
        set("gl_js_version", json!(GL_JS_VERSION));
        set("access_token", json!(self.access_token.as_str()));
        set("div_id", json!(options.div_id));
        set("style_url", json!(options.style_url));
        set("center", json!([options.center.0, options.center.1]));
        set("zoom", json!(options.zoom));
        set("geojson_data", self.data.clone());
        set("below_layer", json!(options.below_layer));
        set("opacity", json!(options.opacity));
        set("min_zoom", json!(options.min_zoom));
        set("max_zoom", json!(options.max_zoom));
        set("layer_id", json!(self.effective_layer_id()));
        set("is_parent", json!(self.is_parent));
        set("is_child", json!(self.is_child));
        set("parent_template", json!(options.parent_template));
        set("child_layers", Value::Array(child_layers));
        set("label_property", label_property);
        params
    }
}

fn is_feature_collection(data: &Value) -> bool {
    data.get("type").and_then(Value::as_str) == Some("FeatureCollection")
        && data.get("features").map_or(false, Value::is_array)
}
