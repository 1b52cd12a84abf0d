use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Review state of a stored request. Every request starts as `PendingReview`;
/// the CV itself is sent by hand, so nothing here moves it further.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ReviewStatus {
    PendingReview,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::PendingReview => "PendingReview",
        }
    }
}

/// One visitor's request for the owner's CV, as written to the document store.
///
/// Only built through [`CvRequest::new`], which stamps the server clock and the
/// initial review status. There is no update or delete path.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CvRequest {
    pub full_name: String,
    pub phone_number: String,
    pub requester_email: String,
    pub company_name: String,
    pub position: String,
    pub company_email: String,
    pub company_address: Option<String>,
    pub company_contact: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: ReviewStatus,
}

/// Requester and company details as supplied by the visitor, before any
/// server-side metadata is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CvRequestDetails {
    pub full_name: String,
    pub phone_number: String,
    pub requester_email: String,
    pub company_name: String,
    pub position: String,
    pub company_email: String,
    pub company_address: Option<String>,
    pub company_contact: Option<String>,
}

impl CvRequest {
    pub fn new(details: CvRequestDetails, timestamp: DateTime<Utc>) -> Self {
        Self {
            full_name: details.full_name,
            phone_number: details.phone_number,
            requester_email: details.requester_email,
            company_name: details.company_name,
            position: details.position,
            company_email: details.company_email,
            company_address: details.company_address,
            company_contact: details.company_contact,
            timestamp,
            status: ReviewStatus::PendingReview,
        }
    }
}

/// Identifier the document store assigned to a written record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical collection that holds CV requests for one application id.
pub fn collection_path(app_id: &str) -> String {
    format!("artifacts/{app_id}/public/data/cv_requests")
}
