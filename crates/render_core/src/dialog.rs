use std::{slice, sync::Arc, time::Duration};

use async_trait::async_trait;
use page_dom::{Document, SessionHistory};
use shared::{domain::RedirectRecord, error::RenderError, protocol::RefreshDirective};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    page::{apply_styles, redirect_to_url},
    pipeline::{RenderRequest, TemplatePipeline},
    redirect::RedirectDecision,
    scripts::PageScript,
    SharedDocument,
};

/// Placeholder namespace and row class of the dialog fragment.
pub const DIALOG_ROW_CLASS: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSelectors {
    pub overlay: String,
    pub url_panel: String,
    pub prompt_panel: String,
    pub code_panel: String,
}

impl Default for DialogSelectors {
    fn default() -> Self {
        Self {
            overlay: ".overlay".into(),
            url_panel: ".dialog-url".into(),
            prompt_panel: ".dialog-prompt".into(),
            code_panel: ".dialog-code".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Hidden,
    Shown,
}

/// Drives the redirect confirmation dialog of one page.
pub struct RedirectDialogController {
    redirect: RedirectRecord,
    selectors: DialogSelectors,
    history: Option<Arc<dyn SessionHistory>>,
    state: Mutex<DialogState>,
}

impl RedirectDialogController {
    pub fn new(redirect: RedirectRecord) -> Self {
        Self {
            redirect,
            selectors: DialogSelectors::default(),
            history: None,
            state: Mutex::new(DialogState::Hidden),
        }
    }

    pub fn with_history(mut self, history: Arc<dyn SessionHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_selectors(mut self, selectors: DialogSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub async fn state(&self) -> DialogState {
        *self.state.lock().await
    }

    /// Reveals the overlay and the panels that have content. A redirect with
    /// nothing to show navigates immediately instead.
    pub async fn show(&self, document: &SharedDocument) -> RedirectDecision {
        let decision = RedirectDecision::classify(&self.redirect);
        let mut document = document.lock().await;

        match &decision {
            RedirectDecision::NoRedirect => {}
            RedirectDecision::SilentRedirect { url } => {
                redirect_to_url(&mut document, url, Duration::ZERO);
            }
            RedirectDecision::ConfirmRedirect { panels, .. } => {
                let selectors = &self.selectors;
                apply_styles(&mut document, &selectors.overlay, &[("display", "flex")]);
                apply_styles(&mut document, &selectors.url_panel, &[("display", "block")]);
                if panels.prompt {
                    apply_styles(&mut document, &selectors.prompt_panel, &[("display", "block")]);
                }
                if panels.code {
                    apply_styles(&mut document, &selectors.code_panel, &[("display", "block")]);
                }
                *self.state.lock().await = DialogState::Shown;
            }
        }
        decision
    }

    /// The visitor accepted: dismiss the dialog and navigate with no delay.
    pub async fn confirm(&self, document: &SharedDocument) -> Option<RefreshDirective> {
        if self.state().await != DialogState::Shown {
            warn!("redirect confirmed while the dialog is hidden; ignoring");
            return None;
        }

        let url = self.redirect.redirect_url.clone();
        let mut scheduled = None;
        self.close_dialog(
            document,
            false,
            Some(|document: &mut Document| {
                scheduled = Some(redirect_to_url(document, &url, Duration::ZERO));
            }),
        )
        .await
        .ok()?;
        scheduled
    }

    /// The visitor declined: dismiss the dialog and step back in history.
    pub async fn cancel(&self, document: &SharedDocument) -> Result<(), RenderError> {
        self.close_dialog(document, true, None::<fn(&mut Document)>)
            .await
    }

    /// Hides the overlay, then runs `callback` and optionally steps history
    /// back. A missing overlay is a warning and nothing else happens.
    pub async fn close_dialog<F>(
        &self,
        document: &SharedDocument,
        go_back: bool,
        callback: Option<F>,
    ) -> Result<(), RenderError>
    where
        F: FnOnce(&mut Document) + Send,
    {
        let mut document = document.lock().await;
        let Some(overlay) = document.query_selector(&self.selectors.overlay) else {
            let error = RenderError::OverlayNotFound {
                selector: self.selectors.overlay.clone(),
            };
            warn!(%error, "cannot close redirect dialog");
            return Err(error);
        };

        document.set_style(overlay, "display", "none");
        *self.state.lock().await = DialogState::Hidden;

        if let Some(callback) = callback {
            callback(&mut document);
        }

        if go_back {
            match &self.history {
                Some(history) => history.back(),
                None => warn!("session history is unavailable; cannot go back"),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PageScript for RedirectDialogController {
    async fn run(&self, pipeline: &TemplatePipeline) -> anyhow::Result<()> {
        let decision = self.show(pipeline.document()).await;
        info!(?decision, "redirect dialog evaluated");
        Ok(())
    }
}

/// Classifies the page's redirect record and acts on it: nothing for a
/// listing, immediate navigation for a silent redirect, and the dialog
/// fragment (bound under the `info` namespace) for a confirm redirect.
pub async fn handle_redirect(
    pipeline: &TemplatePipeline,
    dialog_template: &str,
    dialog_script: &str,
) -> RedirectDecision {
    let redirect = &pipeline.page().redirect;
    let decision = RedirectDecision::classify(redirect);

    match &decision {
        RedirectDecision::NoRedirect => {}
        RedirectDecision::SilentRedirect { url } => {
            let mut document = pipeline.document().lock().await;
            redirect_to_url(&mut document, url, Duration::ZERO);
        }
        RedirectDecision::ConfirmRedirect { .. } => {
            let record = redirect.to_record();
            pipeline
                .render(
                    RenderRequest::new(dialog_template, "body")
                        .rows(slice::from_ref(&record))
                        .row_class(DIALOG_ROW_CLASS)
                        .script(dialog_script)
                        .empty_content(""),
                )
                .await;
        }
    }
    decision
}

#[cfg(test)]
#[path = "tests/dialog_tests.rs"]
mod tests;
