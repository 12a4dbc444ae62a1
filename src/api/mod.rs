//! Map visualization WASM API
//!
//! JavaScript-facing entry points for browser-hosted notebooks.
//!
//! # Module Structure
//!
//! - `helpers`: console logging, config deserialization and error conversion
//! - `render`: render a config to HTML or an iframe, or show it in a DOM element

pub mod helpers;
pub mod render;

pub use render::{gl_js_version, render_map_html, render_map_iframe, show_map};
