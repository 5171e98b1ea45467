use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource not found: {path}")]
    NotFound { path: String },
    #[error("invalid resource path: {path}")]
    InvalidPath { path: String },
    #[error("transport failure for {path}: {message}")]
    Transport { path: String, message: String },
}

impl FetchError {
    pub fn transport(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptLoadError {
    #[error("no script registered for {path}")]
    NotRegistered { path: String },
    #[error("script {path} failed: {message}")]
    Execution { path: String, message: String },
}

/// Failures of a single render invocation. None of these reach the visitor;
/// they are logged and the region is left absent or partially rendered.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("target element not found: {selector}")]
    TargetNotFound { selector: String },
    #[error("failed to fetch template {path}: {source}")]
    TemplateFetch {
        path: String,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    ScriptLoad(#[from] ScriptLoadError),
    #[error("overlay element not found: {selector}")]
    OverlayNotFound { selector: String },
}

#[derive(Debug, Error)]
pub enum PageDataError {
    #[error("unsupported page data format: {path}")]
    UnsupportedFormat { path: String },
    #[error("invalid TOML page data: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON page data: {0}")]
    Json(#[from] serde_json::Error),
}
