//! Behaviors behind the region scripts of the published site.

use anyhow::{bail, Context};
use async_trait::async_trait;
use page_dom::{Document, NodeId};
use percent_encoding::percent_decode_str;
use render_core::{page::insert_html, PageScript, RenderRequest, TemplatePipeline};
use url::Url;

pub const HEADER_TITLE_ID: &str = "header-title";
pub const BREADCRUMB_ID: &str = "path";
pub const FILE_LIST_BODY: &str = "#file-list-body";

/// Fills `#header-title` with the configured title markup.
pub struct HeaderTitleScript {
    title_html: String,
}

impl HeaderTitleScript {
    pub fn new(title_html: impl Into<String>) -> Self {
        Self {
            title_html: title_html.into(),
        }
    }
}

#[async_trait]
impl PageScript for HeaderTitleScript {
    async fn run(&self, pipeline: &TemplatePipeline) -> anyhow::Result<()> {
        let mut document = pipeline.document().lock().await;
        if !insert_html(&mut document, HEADER_TITLE_ID, &self.title_html) {
            bail!("header title element #{HEADER_TITLE_ID} is missing");
        }
        Ok(())
    }
}

/// Builds the `root / a / b` breadcrumb for the visited URL into `#path`.
pub struct BreadcrumbScript {
    page_url: Url,
}

impl BreadcrumbScript {
    pub fn new(page_url: Url) -> Self {
        Self { page_url }
    }
}

#[async_trait]
impl PageScript for BreadcrumbScript {
    async fn run(&self, pipeline: &TemplatePipeline) -> anyhow::Result<()> {
        let origin = self.page_url.origin().ascii_serialization();
        let parts = path_parts(self.page_url.path());

        let mut document = pipeline.document().lock().await;
        let container = document
            .get_element_by_id(BREADCRUMB_ID)
            .with_context(|| format!("breadcrumb container #{BREADCRUMB_ID} is missing"))?;

        append_link(&mut document, container, &origin, "root");
        for (index, part) in parts.iter().enumerate() {
            if !part.is_empty() {
                let href = format!("{origin}/{}", parts[1..=index].join("/"));
                append_link(&mut document, container, &href, &percent_decode(part));
            }
            if index + 2 < parts.len() {
                let separator = document.create_text("/");
                document.append_child(container, separator);
            }
        }
        Ok(())
    }
}

/// Renders the page's records into the listing table body.
pub struct FileListScript {
    row_template: String,
    empty_content: String,
}

impl FileListScript {
    pub fn new(row_template: impl Into<String>, empty_content: impl Into<String>) -> Self {
        Self {
            row_template: row_template.into(),
            empty_content: empty_content.into(),
        }
    }
}

#[async_trait]
impl PageScript for FileListScript {
    async fn run(&self, pipeline: &TemplatePipeline) -> anyhow::Result<()> {
        let files = &pipeline.page().files;
        pipeline
            .try_render(
                RenderRequest::new(&self.row_template, FILE_LIST_BODY)
                    .rows(files)
                    .empty_content(&self.empty_content),
            )
            .await?;
        Ok(())
    }
}

fn append_link(document: &mut Document, parent: NodeId, href: &str, text: &str) {
    let link = document.create_element("a");
    document.set_attribute(link, "href", href);
    let label = document.create_text(&escape_text(text));
    document.append_child(link, label);
    document.append_child(parent, link);
}

/// Splits on runs of `/`. Leading and trailing empty parts are kept so the
/// separator count matches the number of visible segments.
pub(crate) fn path_parts(path: &str) -> Vec<&str> {
    let raw: Vec<&str> = path.split('/').collect();
    let last = raw.len().saturating_sub(1);
    raw.iter()
        .enumerate()
        .filter(|(index, part)| !part.is_empty() || *index == 0 || *index == last)
        .map(|(_, part)| *part)
        .collect()
}

/// Decodes `%XX` escapes as UTF-8. Malformed input is returned unchanged.
pub(crate) fn percent_decode(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
#[path = "tests/behaviors_tests.rs"]
mod tests;
