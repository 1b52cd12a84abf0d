//! CV request intake: store the request, then tell the owner about it.
//!
//! The sequence is strictly write-then-notify. A failed write stops before
//! any email goes out; a failed notification leaves the stored record in
//! place and is reported as a distinct outcome.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::errors::IntakeError;
use crate::models::cv_request::{collection_path, CvRequest, CvRequestDetails, DocumentId};
use crate::notify::message::{CvRequestNotification, NotificationSettings};
use crate::notify::{NotificationDispatcher, NotifyError};
use crate::store::PersistenceGateway;

pub mod flash;
pub mod form;
pub mod handlers;
pub mod page;

pub struct IntakeService {
    /// `None` when the document store could not be initialised at startup.
    store: Option<Arc<dyn PersistenceGateway>>,
    /// `None` when the SMTP transport could not be built at startup.
    dispatcher: Option<Arc<dyn NotificationDispatcher>>,
    notification: NotificationSettings,
    collection_path: String,
}

impl IntakeService {
    pub fn new(
        store: Option<Arc<dyn PersistenceGateway>>,
        dispatcher: Option<Arc<dyn NotificationDispatcher>>,
        notification: NotificationSettings,
        app_id: &str,
    ) -> Self {
        Self {
            store,
            dispatcher,
            notification,
            collection_path: collection_path(app_id),
        }
    }

    pub fn store_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    /// Stamps, stores and announces one CV request.
    ///
    /// No deduplication: submitting the same details twice stores two records.
    pub async fn submit(&self, details: CvRequestDetails) -> Result<DocumentId, IntakeError> {
        let Some(store) = self.store.as_ref() else {
            warn!("CV request rejected: document store is not initialised");
            return Err(IntakeError::Unavailable);
        };

        let request = CvRequest::new(details, Utc::now());

        let document_id = store
            .append(&self.collection_path, &request)
            .await
            .map_err(|e| {
                error!("Error storing CV request: {e}");
                IntakeError::Write(e)
            })?;

        info!(
            document_id = %document_id,
            company = %request.company_name,
            "CV request stored"
        );

        if let Err(source) = self.notify(&request, &document_id).await {
            // The record stays PendingReview with nobody alerted; this log line
            // is the only trace that it needs a manual look.
            error!(
                document_id = %document_id,
                collection = %self.collection_path,
                needs_follow_up = true,
                "CV request stored but owner notification failed: {source}"
            );
            return Err(IntakeError::Notify {
                document_id,
                source,
            });
        }

        info!(document_id = %document_id, "CV request notification sent");
        Ok(document_id)
    }

    async fn notify(&self, request: &CvRequest, document_id: &DocumentId) -> Result<(), NotifyError> {
        let dispatcher = self.dispatcher.as_ref().ok_or(NotifyError::NotConfigured)?;

        let email = CvRequestNotification {
            request,
            collection_path: &self.collection_path,
            document_id,
        }
        .to_email(&self.notification)?;

        dispatcher.send(&email).await
    }
}
