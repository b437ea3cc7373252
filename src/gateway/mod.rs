pub mod client;
pub mod wire;

use async_trait::async_trait;

use crate::{
    error::Result,
    review::{
        aggregate::BatchStats,
        models::{DocumentDetail, DocumentSummary},
    },
};

pub use client::HttpGateway;

/// Read operations of the remote verification service.
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    /// Documents of a batch in server order. An empty batch is `Ok(vec![])`.
    async fn get_batch_documents(&self, batch_id: &str) -> Result<Vec<DocumentSummary>>;

    async fn get_document_detail(&self, document_id: &str) -> Result<DocumentDetail>;

    /// Pre-aggregated statistics computed by the service.
    async fn get_batch_stats(&self, batch_id: &str) -> Result<BatchStats>;
}
