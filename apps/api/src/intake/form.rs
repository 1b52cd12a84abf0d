use serde::Deserialize;

use crate::models::cv_request::CvRequestDetails;

/// Fields posted by the request form. Every field is optional on the wire;
/// anything else the client sends (a timestamp, a status) is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvRequestForm {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub requester_email: Option<String>,
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub company_email: Option<String>,
    pub company_address: Option<String>,
    pub company_contact: Option<String>,
}

impl CvRequestForm {
    /// Values are kept verbatim: no trimming and no format checks.
    pub fn into_details(self) -> CvRequestDetails {
        CvRequestDetails {
            full_name: self.full_name.unwrap_or_default(),
            phone_number: self.phone_number.unwrap_or_default(),
            requester_email: self.requester_email.unwrap_or_default(),
            company_name: self.company_name.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            company_email: self.company_email.unwrap_or_default(),
            company_address: self.company_address,
            company_contact: self.company_contact,
        }
    }
}
