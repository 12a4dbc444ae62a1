//! Declarative visualization configs
//!
//! A config describes one visualization and, optionally, the child layers
//! drawn on the same map. YAML is accepted (and JSON, being a subset):
//!
//! ```yaml
//! type: circle
//! color_property: density
//! color_stops: [[0, "blue"], [100, "red"]]
//! options:
//!   layer_id: stations
//!   zoom: 10
//! data:
//!   type: FeatureCollection
//!   features: []
//! layers:
//!   - type: heatmap
//!     options: { layer_id: heat }
//!     data: { type: FeatureCollection, features: [] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MapVizError;
use crate::viz::{MapOptions, MapViz, VizKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    /// Visualization type (`type` field) and its style fields
    #[serde(flatten)]
    pub kind: VizKind,

    /// GeoJSON feature collection
    pub data: Value,

    #[serde(default)]
    pub options: MapOptions,

    /// Child layers sharing this map
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<VizConfig>,
}

impl VizConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, MapVizError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, MapVizError> {
        serde_json::from_str(source).map_err(|source| MapVizError::Serialization {
            context: "visualization config",
            source,
        })
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MapVizError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        log::debug!("loading visualization config from {}", path.display());

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }

    /// Build the visualization, attaching child layers
    pub fn build(self) -> Result<MapViz, MapVizError> {
        let mut viz = MapViz::new(self.kind, self.data, self.options)?;
        for layer in self.layers {
            let child = layer.build()?;
            viz.add_child_layer(child)?;
        }
        Ok(viz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayerConfigurationError;
    use crate::viz::FunctionType;
    use serde_json::json;

    const YAML: &str = r#"
type: graduated_circle
color_property: density
color_stops: [[0, "blue"], [100, "red"]]
color_function_type: match
radius_property: size
options:
  access_token: pk.yaml
  layer_id: stations
  zoom: 10
  center: [-122.4, 37.8]
data:
  type: FeatureCollection
  features: []
layers:
  - type: heatmap
    options: { access_token: pk.yaml, layer_id: heat }
    data: { type: FeatureCollection, features: [] }
"#;

    #[test]
    fn test_yaml_config_builds_parent_with_children() {
        let config = VizConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.layers.len(), 1);

        let viz = config.build().unwrap();
        assert_eq!(viz.template_name(), "graduated_circle");
        assert_eq!(viz.layer_id(), Some("stations"));
        assert_eq!(viz.options.center, (-122.4, 37.8));
        assert_eq!(viz.options.div_id, "map");
        match &viz.kind {
            VizKind::GraduatedCircle(style) => {
                assert_eq!(style.color_function_type, FunctionType::Match);
                assert_eq!(style.color_stops.as_ref().map(Vec::len), Some(2));
            }
            other => panic!("unexpected kind {:?}", other),
        }

        let child = &viz.child_layers()[0];
        assert!(child.is_child);
        assert_eq!(child.template_name(), "heatmap");
    }

    #[test]
    fn test_json_config() {
        let source = json!({
            "type": "clustered_circle",
            "color_stops": [[0, "green"], [10, "yellow"]],
            "cluster_radius": 40,
            "options": {"access_token": "pk.json"},
            "data": {"type": "FeatureCollection", "features": []}
        })
        .to_string();

        let viz = VizConfig::from_json_str(&source).unwrap().build().unwrap();
        match &viz.kind {
            VizKind::ClusteredCircle(style) => {
                assert_eq!(style.cluster_radius, 40);
                assert_eq!(style.cluster_maxzoom, 14);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let err = VizConfig::from_yaml_str("type: pie\ndata: {}\n").unwrap_err();
        assert!(matches!(err, MapVizError::Config(_)));
    }

    #[test]
    fn test_nested_layers_are_rejected() {
        let yaml = r#"
type: circle
options: { access_token: pk.a, layer_id: a }
data: { type: FeatureCollection, features: [] }
layers:
  - type: circle
    options: { access_token: pk.a, layer_id: b }
    data: { type: FeatureCollection, features: [] }
    layers:
      - type: circle
        options: { access_token: pk.a, layer_id: c }
        data: { type: FeatureCollection, features: [] }
"#;
        let err = VizConfig::from_yaml_str(yaml).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            MapVizError::LayerConfiguration(LayerConfigurationError::NestedChildLayers { count: 1 })
        ));
    }
}
