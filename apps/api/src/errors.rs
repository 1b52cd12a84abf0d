use thiserror::Error;

use crate::intake::flash::FlashStatus;
use crate::models::cv_request::DocumentId;
use crate::notify::NotifyError;
use crate::store::StoreError;

/// Why a CV request submission did not complete cleanly.
///
/// Each variant maps to exactly one user-facing [`FlashStatus`]; the
/// underlying cause is logged server-side and never shown to the visitor.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The document store could not be initialised at startup.
    #[error("document store is not initialised")]
    Unavailable,

    #[error("failed to store CV request: {0}")]
    Write(#[source] StoreError),

    /// The record is durable but the owner was not notified.
    #[error("CV request {document_id} stored but notification failed: {source}")]
    Notify {
        document_id: DocumentId,
        #[source]
        source: NotifyError,
    },
}

impl IntakeError {
    pub fn flash_status(&self) -> FlashStatus {
        match self {
            IntakeError::Unavailable => FlashStatus::DatabaseUnavailable,
            IntakeError::Write(_) => FlashStatus::InternalError,
            IntakeError::Notify { .. } => FlashStatus::SavedNotificationFailed,
        }
    }
}
