// Test parent/child layer composition through show()

use mapboxgl_viz::{
    CircleStyle, DomDisplay, HeatmapStyle, LayerConfigurationError, MapOptions, MapViz, MapVizError,
    NotebookDisplay, ShowOutcome,
};
use serde_json::{json, Value};

/// Display that keeps everything it is asked to show
#[derive(Default)]
struct RecordingDisplay {
    shown: Vec<String>,
}

impl NotebookDisplay for RecordingDisplay {
    fn display_html(&mut self, html: &str) -> Result<(), MapVizError> {
        self.shown.push(html.to_string());
        Ok(())
    }
}

fn feature_collection(name: &str) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [2.35, 48.85]},
            "properties": {"name": name, "weight": 3}
        }]
    })
}

fn options(layer_id: Option<&str>) -> MapOptions {
    let mut options = MapOptions::default().with_access_token("pk.integration");
    options.layer_id = layer_id.map(str::to_string);
    options
}

fn parent_with_children(ids: [Option<&str>; 3]) -> MapViz {
    let mut parent =
        MapViz::circle(feature_collection("parent"), CircleStyle::default(), options(ids[0])).unwrap();
    let first =
        MapViz::heatmap(feature_collection("first"), HeatmapStyle::default(), options(ids[1])).unwrap();
    let second =
        MapViz::circle(feature_collection("second"), CircleStyle::default(), options(ids[2])).unwrap();
    parent.add_child_layer(first).unwrap();
    parent.add_child_layer(second).unwrap();
    parent
}

#[test]
fn test_children_without_layer_ids_fail_to_show() {
    let mut parent = parent_with_children([Some("base"), None, None]);
    let mut display = RecordingDisplay::default();

    let err = parent.show(&mut display).unwrap_err();

    assert!(matches!(
        err,
        MapVizError::LayerConfiguration(LayerConfigurationError::MissingLayerId { .. })
    ));
    assert!(display.shown.is_empty(), "nothing should be displayed on failure");
}

#[test]
fn test_no_layer_ids_at_all_fail_to_show() {
    let mut parent = parent_with_children([None, None, None]);
    let err = parent.show(&mut RecordingDisplay::default()).unwrap_err();
    assert!(matches!(err, MapVizError::LayerConfiguration(_)));
}

#[test]
fn test_distinct_layer_ids_render_three_layers() {
    let mut parent = parent_with_children([Some("base"), Some("heat"), Some("points")]);
    let mut display = RecordingDisplay::default();

    let outcome = parent.show(&mut display).unwrap();

    let iframe = match outcome {
        ShowOutcome::Displayed { iframe } => iframe,
        other => panic!("parent should be displayed, got {:?}", other),
    };
    assert_eq!(display.shown, vec![iframe.clone()]);
    assert!(iframe.starts_with("<iframe id=\"map\" srcdoc=\""));

    // The srcdoc is escaped, so check the unescaped document directly
    let html = parent.create_html().unwrap();
    for id in ["base", "heat", "points"] {
        let declaration = format!("var layerId = \"{}\";", id);
        assert_eq!(html.matches(&declaration).count(), 1, "layer {} should appear once", id);
    }
    assert_eq!(html.matches("<div id='map' class='map'></div>").count(), 1);
    assert_eq!(html.matches("map.on('style.load'").count(), 1);
    assert!(html.contains("type: 'heatmap'"));
}

#[test]
fn test_children_are_flagged_and_parent_recomputed() {
    let mut parent = parent_with_children([Some("base"), Some("heat"), Some("points")]);
    parent.is_parent = false;
    parent.show(&mut RecordingDisplay::default()).unwrap();

    assert!(parent.is_parent);
    assert!(!parent.is_child);
    for child in parent.child_layers() {
        assert!(child.is_child);
        assert!(!child.is_parent);
    }
}

#[test]
fn test_child_show_returns_fragment() {
    let parent = parent_with_children([Some("base"), Some("heat"), Some("points")]);
    let mut child = parent.child_layers()[0].clone();
    let mut display = RecordingDisplay::default();

    match child.show(&mut display).unwrap() {
        ShowOutcome::Fragment(html) => {
            assert!(html.contains("var layerId = \"heat\";"));
            assert!(!html.contains("<html>"));
        }
        other => panic!("child should return its fragment, got {:?}", other),
    }
    assert!(display.shown.is_empty());
}

#[test]
fn test_standalone_show_uses_default_layer_id() {
    let mut viz =
        MapViz::circle(feature_collection("solo"), CircleStyle::default(), options(None)).unwrap();
    let mut display = RecordingDisplay::default();

    viz.show(&mut display).unwrap();

    assert_eq!(display.shown.len(), 1);
    assert!(display.shown[0].contains("&quot;layer_id&quot;"));
}

#[test]
fn test_quotes_in_data_stay_inside_srcdoc() {
    let data = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [0, 0]},
            "properties": {"name": "\"><script>alert(1)</script>"}
        }]
    });
    let mut viz = MapViz::circle(data, CircleStyle::default(), options(None)).unwrap();
    let mut display = RecordingDisplay::default();
    viz.show(&mut display).unwrap();

    let iframe = &display.shown[0];
    assert!(!iframe.contains("<script>alert(1)"));
    assert_eq!(iframe.matches("<iframe").count(), 1);
    assert!(iframe.ends_with("></iframe>"));
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn test_dom_display_reports_error_on_native() {
    let mut viz =
        MapViz::circle(feature_collection("solo"), CircleStyle::default(), options(None)).unwrap();

    let err = viz.show(&mut DomDisplay::new("map-host")).unwrap_err();

    assert!(matches!(err, MapVizError::Io(_)));
}
