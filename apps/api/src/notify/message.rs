use std::fmt::{self, Display};

use super::{NotifyError, OutgoingEmail};
use crate::models::cv_request::{CvRequest, DocumentId};

const SUBJECT_PREFIX: &str = "New CV request";

/// Sender and recipient the owner notification goes between.
#[derive(Debug, Clone, Default)]
pub struct NotificationSettings {
    pub sender: Option<String>,
    pub recipient: Option<String>,
}

/// Plain-text owner notification for one stored CV request.
#[derive(Debug)]
pub struct CvRequestNotification<'a> {
    pub request: &'a CvRequest,
    pub collection_path: &'a str,
    pub document_id: &'a DocumentId,
}

impl CvRequestNotification<'_> {
    pub fn subject(&self) -> String {
        format!(
            "{SUBJECT_PREFIX}: {} ({})",
            self.request.company_name, self.request.position
        )
    }

    /// Addresses the notification, or `NotConfigured` when either end is missing.
    pub fn to_email(&self, settings: &NotificationSettings) -> Result<OutgoingEmail, NotifyError> {
        let (Some(sender), Some(recipient)) = (&settings.sender, &settings.recipient) else {
            return Err(NotifyError::NotConfigured);
        };

        Ok(OutgoingEmail {
            subject: self.subject(),
            sender: sender.clone(),
            recipients: vec![recipient.clone()],
            body: self.to_string(),
        })
    }
}

impl Display for CvRequestNotification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.request;
        let full_details = serde_json::to_string_pretty(r).map_err(|_| fmt::Error)?;

        writeln!(f, "A new CV request has been submitted on your portfolio.")?;
        writeln!(f)?;
        writeln!(f, "Requester details:")?;
        writeln!(f, "- Name: {}", r.full_name)?;
        writeln!(f, "- Email: {}", r.requester_email)?;
        writeln!(f, "- Phone: {}", r.phone_number)?;
        writeln!(f, "- Position: {}", r.position)?;
        writeln!(f, "- Company/Institution: {}", r.company_name)?;
        writeln!(f, "- Company email: {}", r.company_email)?;
        writeln!(f)?;
        writeln!(f, "Status: {}", r.status.as_str())?;
        writeln!(f, "Submitted at: {}", r.timestamp.to_rfc3339())?;
        writeln!(
            f,
            "Stored at: {}/{}",
            self.collection_path, self.document_id
        )?;
        writeln!(f)?;
        writeln!(f, "Full details:")?;
        writeln!(f, "{full_details}")
    }
}
