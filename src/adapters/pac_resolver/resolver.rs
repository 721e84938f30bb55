use crate::domain::{EvaluationError, EvaluationRequest, PacError, PacEvaluator, ProxyChain, ProxyDirective, Result};
use crate::ports::ProxyResolverPort;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use tokio::task;
use url::Url;

/// Async front of a [`PacEvaluator`].
///
/// Script runs and DNS lookups block, so they are moved to tokio's blocking
/// pool. With no script loaded every URL goes `DIRECT`.
#[derive(Clone)]
pub struct PacProxyResolver {
    evaluator: Arc<PacEvaluator>,
}

impl PacProxyResolver {
    pub fn new(evaluator: Arc<PacEvaluator>) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &Arc<PacEvaluator> {
        &self.evaluator
    }

    async fn evaluate(&self, target_url: &Url) -> Result<ProxyChain> {
        let request = EvaluationRequest::from_url(target_url)
            .ok_or_else(|| PacError::InvalidUri(format!("{} has no host", target_url)))?;
        let evaluator = Arc::clone(&self.evaluator);

        task::spawn_blocking(move || evaluator.evaluate_request(&request))
            .await
            .map_err(|e| EvaluationError::Runtime(format!("evaluation task failed: {}", e)))?
    }
}

#[async_trait]
impl ProxyResolverPort for PacProxyResolver {
    async fn resolve_route(&self, target_url: &Url) -> Result<ProxyDirective> {
        let chain = self.resolve_all_routes(target_url).await?;
        Ok(chain.first().clone())
    }

    async fn resolve_all_routes(&self, target_url: &Url) -> Result<ProxyChain> {
        match self.evaluate(target_url).await {
            Err(PacError::Evaluation(EvaluationError::NotLoaded)) => {
                debug!("No PAC script loaded, {} goes direct", target_url);
                Ok(ProxyChain::direct())
            }
            other => other,
        }
    }

    async fn update_script(&self, source: Option<String>) -> Result<()> {
        match source {
            Some(source) => {
                let evaluator = Arc::clone(&self.evaluator);
                task::spawn_blocking(move || evaluator.load_script(&source))
                    .await
                    .map_err(|e| PacError::SourceLoad(format!("script load task failed: {}", e)))??;
            }
            None => self.evaluator.unload(),
        }
        Ok(())
    }
}
