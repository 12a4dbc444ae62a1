//! Per-type styling for each visualization kind
//!
//! Each kind contributes its own template parameters on top of the shared
//! map parameters assembled by [`MapViz`](super::MapViz).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::MapVizError;
use crate::templates::{BundledTemplate, TemplateParams};

/// A data-driven style stop: `(input, output)`, e.g. `(100, "#ff0000")`
pub type Stop = (Value, Value);

pub type Stops = Vec<Stop>;

/// How Mapbox maps property values onto stop outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    /// Linear interpolation between numeric stops
    #[default]
    Interpolate,
    /// Exact lookup of categorical values, falling back to the default
    Match,
}

impl FunctionType {
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionType::Interpolate => "interpolate",
            FunctionType::Match => "match",
        }
    }
}

/// Circle map colored by a feature property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleStyle {
    /// Property shown as a text label above each circle
    pub label_property: Option<String>,
    pub color_property: Option<String>,
    pub color_stops: Option<Stops>,
    /// Color used when no stop applies
    pub color_default: String,
    pub color_function_type: FunctionType,
}

impl Default for CircleStyle {
    fn default() -> Self {
        CircleStyle {
            label_property: None,
            color_property: None,
            color_stops: None,
            color_default: "grey".to_string(),
            color_function_type: FunctionType::Interpolate,
        }
    }
}

/// Circle map with data-driven color and radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraduatedCircleStyle {
    pub label_property: Option<String>,
    pub color_property: Option<String>,
    pub color_stops: Option<Stops>,
    pub color_default: String,
    pub color_function_type: FunctionType,
    pub radius_property: Option<String>,
    pub radius_stops: Option<Stops>,
    pub radius_default: f64,
    pub radius_function_type: FunctionType,
}

impl Default for GraduatedCircleStyle {
    fn default() -> Self {
        GraduatedCircleStyle {
            label_property: None,
            color_property: None,
            color_stops: None,
            color_default: "grey".to_string(),
            color_function_type: FunctionType::Interpolate,
            radius_property: None,
            radius_stops: None,
            radius_default: 1.0,
            radius_function_type: FunctionType::Interpolate,
        }
    }
}

/// Heatmap weighted by a feature property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapStyle {
    /// e.g. `"population"`
    pub weight_property: Option<String>,
    /// e.g. `[[10, 0], [100, 1]]`
    pub weight_stops: Option<Stops>,
    /// Heatmap density to color, e.g. `[[0, "red"], [0.5, "blue"], [1, "green"]]`
    pub color_stops: Option<Stops>,
    /// Zoom to radius, e.g. `[[0, 1], [12, 30]]`
    pub radius_stops: Option<Stops>,
}

/// Clustered circles sized and colored by point count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteredCircleStyle {
    /// Point count to color; the first stop's color is the base color
    pub color_stops: Stops,
    pub radius_stops: Option<Stops>,
    pub cluster_radius: u32,
    pub cluster_maxzoom: u32,
}

impl Default for ClusteredCircleStyle {
    fn default() -> Self {
        ClusteredCircleStyle {
            color_stops: Vec::new(),
            radius_stops: None,
            cluster_radius: 30,
            cluster_maxzoom: 14,
        }
    }
}

impl ClusteredCircleStyle {
    pub fn base_color(&self) -> Option<&Value> {
        self.color_stops.first().map(|(_, color)| color)
    }
}

/// The kind of visualization and its type-specific styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VizKind {
    Circle(CircleStyle),
    GraduatedCircle(GraduatedCircleStyle),
    Heatmap(HeatmapStyle),
    ClusteredCircle(ClusteredCircleStyle),
}

impl VizKind {
    pub fn template(&self) -> BundledTemplate {
        match self {
            VizKind::Circle(_) => BundledTemplate::Circle,
            VizKind::GraduatedCircle(_) => BundledTemplate::GraduatedCircle,
            VizKind::Heatmap(_) => BundledTemplate::Heatmap,
            VizKind::ClusteredCircle(_) => BundledTemplate::ClusteredCircle,
        }
    }

    pub fn template_name(&self) -> &'static str {
        self.template().name()
    }

    pub fn label_property(&self) -> Option<&str> {
        match self {
            VizKind::Circle(style) => style.label_property.as_deref(),
            VizKind::GraduatedCircle(style) => style.label_property.as_deref(),
            VizKind::Heatmap(_) | VizKind::ClusteredCircle(_) => None,
        }
    }

    /// Reject styling that cannot produce a valid layer
    pub fn validate(&self) -> Result<(), MapVizError> {
        if let VizKind::ClusteredCircle(style) = self {
            if style.color_stops.is_empty() {
                return Err(MapVizError::InvalidOptions(
                    "clustered circle visualization requires at least one color stop".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Add the template parameters specific to this kind
    pub fn add_unique_template_variables(&self, params: &mut TemplateParams) -> Result<(), MapVizError> {
        let mut set = |key: &str, value: Value| {
            params.insert(key.to_string(), value);
        };

        match self {
            VizKind::Circle(style) => {
                set("color_property", json!(style.color_property));
                set("color_type", json!(style.color_function_type.as_str()));
                set("color_stops", stops_param(style.color_stops.as_ref())?);
                set("default_color", json!(style.color_default));
            }
            VizKind::GraduatedCircle(style) => {
                set("color_property", json!(style.color_property));
                set("color_stops", stops_param(style.color_stops.as_ref())?);
                set("color_type", json!(style.color_function_type.as_str()));
                set("default_color", json!(style.color_default));
                set("radius_property", json!(style.radius_property));
                set("radius_stops", stops_param(style.radius_stops.as_ref())?);
                set("radius_type", json!(style.radius_function_type.as_str()));
                set("default_radius", json!(style.radius_default));
            }
            VizKind::Heatmap(style) => {
                set("color_stops", stops_param(style.color_stops.as_ref())?);
                set("radius_stops", stops_param(style.radius_stops.as_ref())?);
                set("weight_property", json!(style.weight_property));
                set("weight_stops", stops_param(style.weight_stops.as_ref())?);
            }
            VizKind::ClusteredCircle(style) => {
                let base_color = style.base_color().cloned().ok_or_else(|| {
                    MapVizError::InvalidOptions(
                        "clustered circle visualization requires at least one color stop".to_string(),
                    )
                })?;
                set("color_stops", stops_param(Some(&style.color_stops))?);
                set("base_color", base_color);
                set("radius_stops", stops_param(style.radius_stops.as_ref())?);
                set("cluster_radius", json!(style.cluster_radius));
                set("cluster_maxzoom", json!(style.cluster_maxzoom));
            }
        }
        Ok(())
    }
}

fn stops_param(stops: Option<&Stops>) -> Result<Value, MapVizError> {
    serde_json::to_value(stops).map_err(|source| MapVizError::Serialization {
        context: "style stops",
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(pairs: &[(i64, &str)]) -> Stops {
        pairs.iter().map(|(k, v)| (json!(k), json!(v))).collect()
    }

    #[test]
    fn test_template_names() {
        assert_eq!(VizKind::Circle(CircleStyle::default()).template_name(), "circle");
        assert_eq!(
            VizKind::GraduatedCircle(GraduatedCircleStyle::default()).template_name(),
            "graduated_circle"
        );
        assert_eq!(VizKind::Heatmap(HeatmapStyle::default()).template_name(), "heatmap");
        assert_eq!(
            VizKind::ClusteredCircle(ClusteredCircleStyle::default()).template_name(),
            "clustered_circle"
        );
    }

    #[test]
    fn test_circle_variables() {
        let kind = VizKind::Circle(CircleStyle {
            color_property: Some("density".to_string()),
            color_stops: Some(stops(&[(0, "blue"), (100, "red")])),
            ..CircleStyle::default()
        });
        let mut params = TemplateParams::new();
        kind.add_unique_template_variables(&mut params).unwrap();

        assert_eq!(params["color_property"], json!("density"));
        assert_eq!(params["color_type"], json!("interpolate"));
        assert_eq!(params["color_stops"], json!([[0, "blue"], [100, "red"]]));
        assert_eq!(params["default_color"], json!("grey"));
    }

    #[test]
    fn test_graduated_circle_variables() {
        let kind = VizKind::GraduatedCircle(GraduatedCircleStyle {
            radius_property: Some("size".to_string()),
            radius_stops: Some(vec![(json!(0), json!(1)), (json!(10), json!(8))]),
            radius_function_type: FunctionType::Match,
            ..GraduatedCircleStyle::default()
        });
        let mut params = TemplateParams::new();
        kind.add_unique_template_variables(&mut params).unwrap();

        assert_eq!(params["radius_property"], json!("size"));
        assert_eq!(params["radius_type"], json!("match"));
        assert_eq!(params["radius_stops"], json!([[0, 1], [10, 8]]));
        assert_eq!(params["default_radius"], json!(1.0));
        assert_eq!(params["color_stops"], Value::Null);
    }

    #[test]
    fn test_heatmap_variables() {
        let kind = VizKind::Heatmap(HeatmapStyle {
            weight_property: Some("population".to_string()),
            weight_stops: Some(vec![(json!(10), json!(0)), (json!(100), json!(1))]),
            ..HeatmapStyle::default()
        });
        let mut params = TemplateParams::new();
        kind.add_unique_template_variables(&mut params).unwrap();

        assert_eq!(params["weight_property"], json!("population"));
        assert_eq!(params["weight_stops"], json!([[10, 0], [100, 1]]));
        assert!(params.contains_key("color_stops"));
        assert!(params.contains_key("radius_stops"));
    }

    #[test]
    fn test_clustered_circle_base_color_is_first_stop() {
        let kind = VizKind::ClusteredCircle(ClusteredCircleStyle {
            color_stops: stops(&[(0, "#51bbd6"), (100, "#f1f075")]),
            ..ClusteredCircleStyle::default()
        });
        let mut params = TemplateParams::new();
        kind.add_unique_template_variables(&mut params).unwrap();

        assert_eq!(params["base_color"], json!("#51bbd6"));
        assert_eq!(params["cluster_radius"], json!(30));
        assert_eq!(params["cluster_maxzoom"], json!(14));
    }

    #[test]
    fn test_clustered_circle_without_stops_is_invalid() {
        let kind = VizKind::ClusteredCircle(ClusteredCircleStyle::default());
        assert!(matches!(kind.validate(), Err(MapVizError::InvalidOptions(_))));
        let mut params = TemplateParams::new();
        assert!(kind.add_unique_template_variables(&mut params).is_err());
    }

    #[test]
    fn test_label_property_only_for_circles() {
        let circle = VizKind::Circle(CircleStyle {
            label_property: Some("name".to_string()),
            ..CircleStyle::default()
        });
        assert_eq!(circle.label_property(), Some("name"));
        assert_eq!(VizKind::Heatmap(HeatmapStyle::default()).label_property(), None);
    }

    #[test]
    fn test_kind_deserializes_from_tagged_json() {
        let kind: VizKind = serde_json::from_value(json!({
            "type": "graduated_circle",
            "radius_property": "size",
            "color_function_type": "match"
        }))
        .unwrap();
        match kind {
            VizKind::GraduatedCircle(style) => {
                assert_eq!(style.radius_property.as_deref(), Some("size"));
                assert_eq!(style.color_function_type, FunctionType::Match);
                assert_eq!(style.color_default, "grey");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
