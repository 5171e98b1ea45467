use std::sync::Arc;

use async_trait::async_trait;
use page_dom::Document;
use shared::error::{FetchError, ScriptLoadError};
use tokio::sync::Mutex;

pub mod dialog;
pub mod page;
pub mod pipeline;
pub mod redirect;
pub mod scripts;
pub mod strategy;
pub mod substitution;
pub mod transport;

pub use dialog::{handle_redirect, DialogSelectors, DialogState, RedirectDialogController};
pub use pipeline::{RenderOutcome, RenderRequest, TemplatePipeline, DEFAULT_EMPTY_CONTENT};
pub use redirect::{DialogPanels, RedirectDecision};
pub use scripts::{PageScript, ScriptRegistry};
pub use strategy::RenderStrategy;
pub use substitution::substitute;
pub use transport::{FsTemplateFetcher, HttpTemplateFetcher};

/// The live page shared by every region renderer. The lock is only held while
/// mutating, never across a fetch or a script load.
pub type SharedDocument = Arc<Mutex<Document>>;

pub fn shared_document(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}

#[async_trait]
pub trait TemplateFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Runs the behavior behind a script path against the page.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    async fn load(&self, path: &str, pipeline: &TemplatePipeline) -> Result<(), ScriptLoadError>;
}

#[cfg(test)]
pub(crate) mod test_support;
