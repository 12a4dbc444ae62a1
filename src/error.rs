//! Error types for map visualization rendering
//!
//! Construction failures (credentials, options), layer composition failures,
//! and template failures all surface through [`MapVizError`]. Nothing here is
//! retried: every error is a configuration or template mistake to be fixed
//! by the caller.

use thiserror::Error;

/// Environment variable consulted when no access token is passed explicitly
pub const ACCESS_TOKEN_ENV_VAR: &str = "MAPBOX_ACCESS_TOKEN";

/// Top-level error type
#[derive(Debug, Error)]
pub enum MapVizError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    LayerConfiguration(#[from] LayerConfigurationError),

    #[error("Template rendering failed: {0}")]
    Template(#[from] TemplateError),

    /// Option values outside their valid range
    #[error("Invalid visualization options: {0}")]
    InvalidOptions(String),

    #[error("Failed to serialize {context}: {source}")]
    Serialization {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed YAML or JSON visualization config
    #[error("Invalid visualization config: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Reading a config file or writing display output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Access token problems, raised at construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No token passed and none found in the environment
    #[error("Mapbox access token missing: pass one explicitly or set {env_var}")]
    Missing { env_var: &'static str },

    /// Token present but not a public (`pk`) token
    #[error("Mapbox access token must be public (pk)")]
    NotPublic,
}

/// Multi-layer composition problems
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerConfigurationError {
    /// A parent or child layer was rendered without a layer id
    #[error("{role} layer in '{div_id}' has no layer_id; every layer of a multi-layer map needs one")]
    MissingLayerId { div_id: String, role: &'static str },

    /// Two layers on the same map share an id
    #[error("layer_id '{0}' is used by more than one layer on the same map")]
    DuplicateLayerId(String),

    /// Only one level of child layers is supported
    #[error("child layer already has {count} child layer(s); nested layers are not supported")]
    NestedChildLayers { count: usize },
}

/// Template lookup, parsing and rendering failures
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    /// The block lexer could not split the template source
    #[error("Syntax error in template '{template}': {message}")]
    Syntax { template: String, message: String },

    #[error(transparent)]
    Compile(#[from] Box<handlebars::TemplateError>),

    /// Includes references to parameters missing from the render context
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),
}

impl From<handlebars::TemplateError> for TemplateError {
    fn from(err: handlebars::TemplateError) -> Self {
        TemplateError::Compile(Box::new(err))
    }
}
