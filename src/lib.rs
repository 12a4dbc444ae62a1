//! Mapbox GL JS map visualizations for notebooks
//!
//! Turns GeoJSON feature collections into self-contained HTML documents that
//! draw circle, graduated circle, heatmap or clustered circle layers with
//! Mapbox GL JS, and hands them to a notebook as an inline frame.
//!
//! ```rust,ignore
//! let options = MapOptions::default().with_access_token("pk.…");
//! let mut viz = MapViz::circle(data, CircleStyle::default(), options)?;
//! viz.show(&mut EvcxrDisplay::stdout())?;
//! ```

pub mod api;
pub mod config;
pub mod credentials;
pub mod display;
pub mod error;
pub mod templates;
pub mod viz;

// Re-export commonly used types
pub use config::VizConfig;
pub use credentials::AccessToken;
pub use display::{as_iframe, DomDisplay, EvcxrDisplay, NotebookDisplay};
pub use error::{CredentialError, LayerConfigurationError, MapVizError, TemplateError};
pub use templates::{SkipBlocks, TemplateSet};
pub use viz::{
    CircleStyle, ClusteredCircleStyle, FunctionType, GraduatedCircleStyle, HeatmapStyle,
    MapOptions, MapViz, ShowOutcome, VizKind, GL_JS_VERSION,
};

use wasm_bindgen::prelude::*;

// Runs once when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if console_log::init_with_level(log::Level::Debug).is_err() {
            api::helpers::log_error("logger already initialized");
        }
    }

    log::info!("mapboxgl-viz WASM module initialized");
}
