//! Notebook display adapters
//!
//! A rendered visualization is a complete HTML document. Notebooks show it
//! inside an inline frame whose `srcdoc` carries the escaped document, so the
//! map script runs isolated from the notebook page.

use std::io::{self, Write};

use handlebars::html_escape;

use crate::error::MapVizError;

/// Something that can show an HTML snippet in a notebook
pub trait NotebookDisplay {
    fn display_html(&mut self, html: &str) -> Result<(), MapVizError>;
}

/// Wrap a document in an inline frame sized by CSS width/height
///
/// Every attribute value is HTML-escaped, so quotes and markup in the
/// document (or in feature properties) cannot break out of `srcdoc`.
pub fn as_iframe(html: &str, div_id: &str, width: &str, height: &str) -> String {
    format!(
        "<iframe id=\"{}\" srcdoc=\"{}\" style=\"width: {}; height: {};\"></iframe>",
        html_escape(div_id),
        html_escape(html),
        html_escape(width),
        html_escape(height),
    )
}

/// Rich output for the evcxr Jupyter kernel
///
/// evcxr picks up content written between its begin/end markers on stdout and
/// forwards it to the notebook with the given MIME type.
pub struct EvcxrDisplay<W: Write> {
    writer: W,
}

impl EvcxrDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        EvcxrDisplay {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> EvcxrDisplay<W> {
    pub fn new(writer: W) -> Self {
        EvcxrDisplay { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> NotebookDisplay for EvcxrDisplay<W> {
    fn display_html(&mut self, html: &str) -> Result<(), MapVizError> {
        writeln!(self.writer, "EVCXR_BEGIN_CONTENT text/html")?;
        writeln!(self.writer, "{}", html)?;
        writeln!(self.writer, "EVCXR_END_CONTENT")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Display into a DOM element of the hosting page (browser notebooks)
pub struct DomDisplay {
    element_id: String,
}

impl DomDisplay {
    pub fn new<S: Into<String>>(element_id: S) -> Self {
        DomDisplay {
            element_id: element_id.into(),
        }
    }
}

impl NotebookDisplay for DomDisplay {
    #[cfg(target_arch = "wasm32")]
    fn display_html(&mut self, html: &str) -> Result<(), MapVizError> {
        let not_found =
            |what: &str| MapVizError::Io(io::Error::new(io::ErrorKind::NotFound, what.to_string()));

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| not_found("no document available"))?;
        let element = document
            .get_element_by_id(&self.element_id)
            .ok_or_else(|| not_found(&format!("element '{}' not found", self.element_id)))?;
        element.set_inner_html(html);
        Ok(())
    }

    // No DOM outside the browser; web-sys imports would panic here
    #[cfg(not(target_arch = "wasm32"))]
    fn display_html(&mut self, _html: &str) -> Result<(), MapVizError> {
        Err(MapVizError::Io(io::Error::new(
            io::ErrorKind::Unsupported,
            format!(
                "cannot display into element '{}': no DOM on this target",
                self.element_id
            ),
        )))
    }
}
