use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use page_dom::Document;
use render_core::{
    handle_redirect,
    page::{scheduled_redirect, set_page_title},
    shared_document, RedirectDecision, RedirectDialogController, RenderRequest, ScriptRegistry,
    TemplateFetcher, TemplatePipeline,
};
use serde::Serialize;
use shared::{domain::PageData, error::FetchError, protocol::RefreshDirective};
use tracing::{info, warn};
use url::Url;

use crate::{
    behaviors::{BreadcrumbScript, FileListScript, HeaderTitleScript},
    config::Settings,
};

/// Used when the site has no shell page of its own.
pub const DEFAULT_SHELL: &str = concat!(
    "<!DOCTYPE html>",
    r#"<html lang="zh-CN"><head><meta charset="utf-8"><title></title></head>"#,
    r#"<body><header id="header"></header><nav id="nav"></nav><main id="file-list"></main></body>"#,
    "</html>",
);

/// Regions filled on every page, each with `<name>.html` and `<name>.js`
/// under the templates prefix.
const REGIONS: &[(&str, &str)] = &[
    ("header", "#header"),
    ("nav", "#nav"),
    ("file-list", "#file-list"),
];

const DIALOG_NAME: &str = "redirect-dialog";
const FILE_ROW_NAME: &str = "file-list-row";

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub path: String,
    pub title: String,
    pub decision: RedirectDecision,
    pub redirect: Option<RefreshDirective>,
    #[serde(skip)]
    pub html: String,
}

/// `/a/b` and `a/b/` both become `/a/b/`; page files such as
/// `/a/index.html` are kept. Dotted folder names (`v1.2`) stay folders.
pub fn normalize_page_path(path: &str) -> String {
    let mut normalized = format!("/{}", path.trim_start_matches('/'));
    let last = normalized.rsplit('/').next().unwrap_or_default();
    if !last.is_empty() && !is_page_file(last) {
        normalized.push('/');
    }
    normalized
}

fn is_page_file(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

/// Directory part of a normalized page path, with a trailing `/`.
pub fn page_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..=index],
        None => "/",
    }
}

pub async fn load_page_data(
    fetcher: &dyn TemplateFetcher,
    settings: &Settings,
    page_path: &str,
) -> Result<PageData> {
    let data_path = format!("{}{}", page_directory(page_path), settings.page_data_file);
    let raw = fetcher
        .fetch(&data_path)
        .await
        .with_context(|| format!("failed to load page data {data_path}"))?;
    PageData::parse_for_path(&raw, &data_path)
        .with_context(|| format!("invalid page data {data_path}"))
}

async fn load_shell(fetcher: &dyn TemplateFetcher, settings: &Settings) -> Result<String> {
    match fetcher.fetch(&settings.shell_path).await {
        Ok(shell) => Ok(shell),
        Err(FetchError::NotFound { path }) => {
            warn!(%path, "site shell not found; using the built-in shell");
            Ok(DEFAULT_SHELL.to_string())
        }
        Err(error) => {
            Err(error).with_context(|| format!("failed to load site shell {}", settings.shell_path))
        }
    }
}

/// Classifies a page without rendering it.
pub async fn classify_page(
    fetcher: &dyn TemplateFetcher,
    settings: &Settings,
    page_path: &str,
) -> Result<RedirectDecision> {
    let page_path = normalize_page_path(page_path);
    let page = load_page_data(fetcher, settings, &page_path).await?;
    Ok(RedirectDecision::classify(&page.redirect))
}

/// Loads the page data and shell, sets the title, then handles the redirect
/// while the header, nav and file-list regions render. A failing region is
/// logged and leaves the others untouched.
pub async fn render_page(
    fetcher: Arc<dyn TemplateFetcher>,
    settings: &Settings,
    page_path: &str,
) -> Result<RenderedPage> {
    let page_path = normalize_page_path(page_path);
    let page_url = Url::parse(&settings.site_origin)
        .and_then(|origin| origin.join(&page_path))
        .with_context(|| format!("invalid site origin {}", settings.site_origin))?;

    let page = Arc::new(load_page_data(fetcher.as_ref(), settings, &page_path).await?);
    let mut document = Document::parse(&load_shell(fetcher.as_ref(), settings).await?);
    set_page_title(&mut document, &page_path, &settings.page_title_suffix);

    let prefix = settings.templates_prefix.as_str();
    let dialog = Arc::new(RedirectDialogController::new(page.redirect.clone()));
    let registry = ScriptRegistry::new()
        .register(
            format!("{prefix}/header.js"),
            Arc::new(HeaderTitleScript::new(settings.header_title.clone())),
        )
        .register(
            format!("{prefix}/nav.js"),
            Arc::new(BreadcrumbScript::new(page_url)),
        )
        .register(
            format!("{prefix}/file-list.js"),
            Arc::new(FileListScript::new(
                format!("{prefix}/{FILE_ROW_NAME}.html"),
                settings.file_empty_content.clone(),
            )),
        )
        .register(format!("{prefix}/{DIALOG_NAME}.js"), dialog);

    let pipeline = TemplatePipeline::new(
        shared_document(document),
        fetcher,
        Arc::new(registry),
        page,
    );

    let regions: Vec<(String, String, &str)> = REGIONS
        .iter()
        .map(|(name, target)| {
            (
                format!("{prefix}/{name}.html"),
                format!("{prefix}/{name}.js"),
                *target,
            )
        })
        .collect();
    let renders = regions.iter().map(|(template, script, target)| {
        pipeline.render(
            RenderRequest::new(template, target)
                .row_class("")
                .script(script)
                .empty_content(&settings.file_empty_content),
        )
    });

    let dialog_template = format!("{prefix}/{DIALOG_NAME}.html");
    let dialog_script = format!("{prefix}/{DIALOG_NAME}.js");
    let (decision, outcomes) = tokio::join!(
        handle_redirect(&pipeline, &dialog_template, &dialog_script),
        join_all(renders),
    );

    let rendered = outcomes.iter().filter(|outcome| outcome.is_some()).count();
    info!(
        path = %page_path,
        ?decision,
        rendered,
        regions = REGIONS.len(),
        "page rendered"
    );

    let document = pipeline.document().lock().await;
    Ok(RenderedPage {
        title: document.title(),
        redirect: scheduled_redirect(&document),
        html: document.to_html(),
        decision,
        path: page_path,
    })
}

#[cfg(test)]
#[path = "tests/bootstrap_tests.rs"]
mod tests;
