use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::bail;
use async_trait::async_trait;
use page_dom::Document;
use shared::{domain::PageData, error::FetchError};
use tokio::sync::Mutex;

use crate::{
    pipeline::TemplatePipeline, scripts::PageScript, shared_document, ScriptRegistry,
    TemplateFetcher,
};

#[derive(Default)]
pub(crate) struct StaticFetcher {
    resources: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, path: &str, body: &str) -> Self {
        self.resources.insert(path.to_string(), body.to_string());
        self
    }

    pub(crate) async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl TemplateFetcher for StaticFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.requests.lock().await.push(path.to_string());
        self.resources
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                path: path.to_string(),
            })
    }
}

/// Counts runs and records whether `probe` matched when it ran.
pub(crate) struct CountingScript {
    runs: AtomicUsize,
    probe: Option<String>,
    probe_hits: AtomicUsize,
    fail_with: Option<String>,
}

impl CountingScript {
    pub(crate) fn ok() -> Self {
        Self {
            runs: AtomicUsize::new(0),
            probe: None,
            probe_hits: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    pub(crate) fn probing(selector: &str) -> Self {
        Self {
            probe: Some(selector.to_string()),
            ..Self::ok()
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::ok()
        }
    }

    pub(crate) fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub(crate) fn probe_hits(&self) -> usize {
        self.probe_hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageScript for CountingScript {
    async fn run(&self, pipeline: &TemplatePipeline) -> anyhow::Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(selector) = &self.probe {
            if pipeline.document().lock().await.query_selector(selector).is_some() {
                self.probe_hits.fetch_add(1, Ordering::SeqCst);
            }
        }
        if let Some(message) = &self.fail_with {
            bail!("{message}");
        }
        Ok(())
    }
}

pub(crate) struct Harness {
    pub(crate) pipeline: TemplatePipeline,
    pub(crate) fetcher: Arc<StaticFetcher>,
    pub(crate) scripts: Arc<ScriptRegistry>,
}

impl Harness {
    pub(crate) fn new(
        shell: &str,
        fetcher: StaticFetcher,
        scripts: ScriptRegistry,
        page: PageData,
    ) -> Self {
        let fetcher = Arc::new(fetcher);
        let scripts = Arc::new(scripts);
        let pipeline = TemplatePipeline::new(
            shared_document(Document::parse(shell)),
            fetcher.clone(),
            scripts.clone(),
            Arc::new(page),
        );
        Self {
            pipeline,
            fetcher,
            scripts,
        }
    }

    pub(crate) async fn inner_html(&self, selector: &str) -> String {
        let document = self.pipeline.document().lock().await;
        let node = document.query_selector(selector).expect("selector resolves");
        document.inner_html(node)
    }
}
