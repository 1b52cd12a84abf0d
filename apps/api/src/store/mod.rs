//! Persistence gateway: the document store CV requests are appended to.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::cv_request::{CvRequest, DocumentId};

pub mod firestore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Appends documents to a logical collection path.
///
/// Carried in `IntakeService` as `Arc<dyn PersistenceGateway>`, built once at
/// startup and shared read-only by every request.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn append(
        &self,
        collection_path: &str,
        document: &CvRequest,
    ) -> Result<DocumentId, StoreError>;
}
