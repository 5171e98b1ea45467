use std::sync::Arc;

use page_dom::{Document, NodeId};
use shared::{
    domain::{PageData, Record},
    error::RenderError,
};
use tracing::{debug, error};

use crate::{
    strategy::RenderStrategy, substitution::substitute, ScriptLoader, SharedDocument,
    TemplateFetcher,
};

pub const DEFAULT_ROW_CLASS: &str = "row";
pub const DEFAULT_EMPTY_CONTENT: &str = r#"<td colspan="6">这里空空如也(ˉ▽ˉ；)...</td>"#;
pub const EMPTY_ROW_CLASS: &str = "empty-row";
const ROW_TAG: &str = "tr";

/// One region to render: which template, where, and with what data.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub template_path: &'a str,
    pub target_selector: &'a str,
    /// `None` inserts the template verbatim; a slice binds one row per record.
    pub data: Option<&'a [Record]>,
    /// CSS class of every row, also the placeholder namespace.
    pub row_class: &'a str,
    /// Script run after raw and single-row renders. Empty for none.
    pub script_path: &'a str,
    pub empty_content: &'a str,
}

impl<'a> RenderRequest<'a> {
    pub fn new(template_path: &'a str, target_selector: &'a str) -> Self {
        Self {
            template_path,
            target_selector,
            data: None,
            row_class: DEFAULT_ROW_CLASS,
            script_path: "",
            empty_content: DEFAULT_EMPTY_CONTENT,
        }
    }

    pub fn rows(mut self, data: &'a [Record]) -> Self {
        self.data = Some(data);
        self
    }

    pub fn row_class(mut self, row_class: &'a str) -> Self {
        self.row_class = row_class;
        self
    }

    pub fn script(mut self, script_path: &'a str) -> Self {
        self.script_path = script_path;
        self
    }

    pub fn empty_content(mut self, empty_content: &'a str) -> Self {
        self.empty_content = empty_content;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    pub strategy: RenderStrategy,
    pub rows_appended: usize,
    pub script_loaded: bool,
}

/// Fetches templates, binds them to records and sequences dependent scripts
/// for one page.
pub struct TemplatePipeline {
    document: SharedDocument,
    fetcher: Arc<dyn TemplateFetcher>,
    scripts: Arc<dyn ScriptLoader>,
    page: Arc<PageData>,
}

impl TemplatePipeline {
    pub fn new(
        document: SharedDocument,
        fetcher: Arc<dyn TemplateFetcher>,
        scripts: Arc<dyn ScriptLoader>,
        page: Arc<PageData>,
    ) -> Self {
        Self {
            document,
            fetcher,
            scripts,
            page,
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn page(&self) -> &PageData {
        &self.page
    }

    /// Renders one region. Failures are logged with the template path and
    /// stop here, so sibling regions keep rendering.
    pub async fn render(&self, request: RenderRequest<'_>) -> Option<RenderOutcome> {
        match self.try_render(request).await {
            Ok(outcome) => Some(outcome),
            Err(error) => {
                error!(
                    template = %request.template_path,
                    target = %request.target_selector,
                    %error,
                    "failed to fetch and render template"
                );
                None
            }
        }
    }

    pub async fn try_render(&self, request: RenderRequest<'_>) -> Result<RenderOutcome, RenderError> {
        let target = {
            let document = self.document.lock().await;
            document
                .query_selector(request.target_selector)
                .ok_or_else(|| RenderError::TargetNotFound {
                    selector: request.target_selector.to_string(),
                })?
        };

        let template = self
            .fetcher
            .fetch(request.template_path)
            .await
            .map_err(|source| RenderError::TemplateFetch {
                path: request.template_path.to_string(),
                source,
            })?;

        let strategy = RenderStrategy::select(request.data);
        let rows_appended = {
            let mut document = self.document.lock().await;
            apply_strategy(&mut document, target, strategy, &template, &request)
        };
        debug!(
            template = %request.template_path,
            ?strategy,
            rows_appended,
            "rendered template"
        );

        let script_loaded = !request.script_path.is_empty() && strategy.loads_dependent_script();
        if script_loaded {
            self.scripts.load(request.script_path, self).await?;
        }

        Ok(RenderOutcome {
            strategy,
            rows_appended,
            script_loaded,
        })
    }
}

fn apply_strategy(
    document: &mut Document,
    target: NodeId,
    strategy: RenderStrategy,
    template: &str,
    request: &RenderRequest<'_>,
) -> usize {
    match (strategy, request.data) {
        (RenderStrategy::RawInsert, _) | (_, None) => {
            document.set_inner_html(target, template);
            0
        }
        (RenderStrategy::EmptyStateInsert, Some(_)) => {
            append_row(document, target, EMPTY_ROW_CLASS, request.empty_content);
            1
        }
        (RenderStrategy::SingleRowInsert | RenderStrategy::MultiRowInsert, Some(records)) => {
            for record in records {
                let html = substitute(template, request.row_class, record);
                append_row(document, target, request.row_class, &html);
            }
            records.len()
        }
    }
}

fn append_row(document: &mut Document, target: NodeId, class: &str, html: &str) {
    let row = document.create_element(ROW_TAG);
    document.add_class(row, class);
    document.set_inner_html(row, html);
    document.append_child(target, row);
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
