//! Rendering operations for the WASM API
//!
//! Each function takes a visualization config object (the same shape as
//! [`VizConfig`](crate::config::VizConfig)) and builds a fresh visualization
//! from it, so no state is kept between calls.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize_config, to_js_error};
use crate::display::DomDisplay;
use crate::viz::{MapViz, ShowOutcome, GL_JS_VERSION};
use crate::{wasm_info, wasm_log};

fn build(config: JsValue) -> Result<MapViz, JsValue> {
    let viz = deserialize_config(config)?
        .build()
        .map_err(|e| to_js_error("Failed to build visualization", e))?;
    wasm_log!(
        "  {} visualization with {} child layers",
        viz.template_name(),
        viz.child_layers().len()
    );
    Ok(viz)
}

/// Render a visualization config to a complete HTML document
#[wasm_bindgen(js_name = renderMapHtml)]
pub fn render_map_html(config: JsValue) -> Result<String, JsValue> {
    wasm_info!("renderMapHtml called");

    let mut viz = build(config)?;
    let html = viz
        .create_html()
        .map_err(|e| to_js_error("Render error", e))?;

    wasm_info!("  HTML generated: {} bytes", html.len());
    Ok(html)
}

/// Render a visualization config to an iframe embedding the document
#[wasm_bindgen(js_name = renderMapIframe)]
pub fn render_map_iframe(config: JsValue) -> Result<String, JsValue> {
    wasm_info!("renderMapIframe called");

    let mut viz = build(config)?;
    let html = viz
        .create_html()
        .map_err(|e| to_js_error("Render error", e))?;
    Ok(viz.as_iframe(&html))
}

/// Render a visualization config into the element with id `element_id`
#[wasm_bindgen(js_name = showMap)]
pub fn show_map(config: JsValue, element_id: &str) -> Result<(), JsValue> {
    wasm_info!("showMap called for element '{}'", element_id);

    let mut viz = build(config)?;
    let mut display = DomDisplay::new(element_id);
    match viz.show(&mut display) {
        Ok(ShowOutcome::Displayed { iframe }) => {
            wasm_info!("  iframe displayed: {} bytes", iframe.len());
            Ok(())
        }
        Ok(ShowOutcome::Fragment(_)) => {
            Err(js_sys::Error::new("child layers cannot be shown on their own").into())
        }
        Err(e) => Err(to_js_error("Show error", e)),
    }
}

/// Mapbox GL JS version referenced by generated documents
#[wasm_bindgen(js_name = glJsVersion)]
pub fn gl_js_version() -> String {
    GL_JS_VERSION.to_string()
}
