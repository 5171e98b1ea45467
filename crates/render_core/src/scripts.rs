use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use shared::error::ScriptLoadError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{pipeline::TemplatePipeline, ScriptLoader};

/// Behavior attached to a rendered fragment.
#[async_trait]
pub trait PageScript: Send + Sync {
    async fn run(&self, pipeline: &TemplatePipeline) -> anyhow::Result<()>;
}

/// Script paths resolved to in-process behaviors. Each `load` runs the
/// registered behavior once; unknown paths fail like an unreachable resource.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Arc<dyn PageScript>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, path: impl Into<String>, script: Arc<dyn PageScript>) -> Self {
        self.scripts.insert(path.into(), script);
        self
    }

    /// Paths executed so far, in execution order.
    pub async fn executed(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }
}

#[async_trait]
impl ScriptLoader for ScriptRegistry {
    async fn load(&self, path: &str, pipeline: &TemplatePipeline) -> Result<(), ScriptLoadError> {
        let Some(script) = self.scripts.get(path).cloned() else {
            warn!(script = %path, "no behavior registered for script");
            return Err(ScriptLoadError::NotRegistered {
                path: path.to_string(),
            });
        };

        self.executed.lock().await.push(path.to_string());
        script
            .run(pipeline)
            .await
            .map_err(|error| ScriptLoadError::Execution {
                path: path.to_string(),
                message: format!("{error:#}"),
            })?;
        debug!(script = %path, "script executed");
        Ok(())
    }
}
