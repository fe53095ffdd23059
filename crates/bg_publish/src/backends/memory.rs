use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use bg_core::{PublishRequest, PublishedArticle, Publisher, Result};

const DRY_RUN_COLLECTION: u64 = 0;

/// Keeps submissions in memory instead of sending them anywhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryPublisher {
    requests: Arc<RwLock<Vec<PublishRequest>>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn requests(&self) -> Vec<PublishRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishedArticle> {
        let mut requests = self.requests.write().await;
        requests.push(request.clone());
        let id = requests.len() as u64;
        tracing::info!("📝 [dry run] Draft #{} recorded: {}", id, request.title);
        tracing::debug!("[dry run] body:\n{}", request.body_html);

        Ok(PublishedArticle {
            id: Some(id),
            collection_id: DRY_RUN_COLLECTION,
            created_at: Some(Utc::now()),
            payload: serde_json::to_value(request)?,
        })
    }
}
