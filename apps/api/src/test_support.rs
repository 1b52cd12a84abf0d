//! In-memory collaborators for exercising the intake workflow in tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::intake::IntakeService;
use crate::models::cv_request::{CvRequest, DocumentId};
use crate::notify::message::NotificationSettings;
use crate::notify::{NotificationDispatcher, NotifyError, OutgoingEmail};
use crate::store::{PersistenceGateway, StoreError};

pub const TEST_APP_ID: &str = "test-app";
pub const TEST_COLLECTION: &str = "artifacts/test-app/public/data/cv_requests";

/// Stores every appended document and hands out sequential ids.
#[derive(Default)]
pub struct RecordingStore {
    pub records: Mutex<Vec<(String, CvRequest)>>,
}

impl RecordingStore {
    pub fn stored(&self) -> Vec<(String, CvRequest)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceGateway for RecordingStore {
    async fn append(
        &self,
        collection_path: &str,
        document: &CvRequest,
    ) -> Result<DocumentId, StoreError> {
        let mut records = self.records.lock().unwrap();
        records.push((collection_path.to_string(), document.clone()));
        Ok(DocumentId(format!("doc-{}", records.len())))
    }
}

/// Rejects every write the way a misbehaving backend would.
pub struct FailingStore;

#[async_trait]
impl PersistenceGateway for FailingStore {
    async fn append(&self, _: &str, _: &CvRequest) -> Result<DocumentId, StoreError> {
        Err(StoreError::Api {
            status: 503,
            message: "backend unavailable".to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        Err(NotifyError::Address {
            address: email.sender.clone(),
            reason: "relay refused sender".to_string(),
        })
    }
}

pub fn notification_settings() -> NotificationSettings {
    NotificationSettings {
        sender: Some("site@example.com".to_string()),
        recipient: Some("owner@example.com".to_string()),
    }
}

pub fn healthy_service() -> (IntakeService, Arc<RecordingStore>, Arc<RecordingDispatcher>) {
    let store = Arc::new(RecordingStore::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let service = IntakeService::new(
        Some(store.clone() as Arc<dyn PersistenceGateway>),
        Some(dispatcher.clone() as Arc<dyn NotificationDispatcher>),
        notification_settings(),
        TEST_APP_ID,
    );
    (service, store, dispatcher)
}
