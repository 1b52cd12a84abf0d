/// Outcome of a submission, carried back to the form page on redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashStatus {
    Received,
    SavedNotificationFailed,
    DatabaseUnavailable,
    InternalError,
}

impl FlashStatus {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            FlashStatus::Received => "received",
            FlashStatus::SavedNotificationFailed => "saved_notification_failed",
            FlashStatus::DatabaseUnavailable => "database_unavailable",
            FlashStatus::InternalError => "internal_error",
        }
    }

    /// Unknown values are dropped rather than rejected.
    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "received" => Some(FlashStatus::Received),
            "saved_notification_failed" => Some(FlashStatus::SavedNotificationFailed),
            "database_unavailable" => Some(FlashStatus::DatabaseUnavailable),
            "internal_error" => Some(FlashStatus::InternalError),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FlashStatus::Received => {
                "Your CV request has been received! Please wait for the CV to be sent to your email."
            }
            FlashStatus::SavedNotificationFailed => {
                "Your CV request has been saved, but the notification could not be sent. It will still be reviewed."
            }
            FlashStatus::DatabaseUnavailable => {
                "The request service is currently unavailable. Please try again later."
            }
            FlashStatus::InternalError => {
                "There was an error processing your request. Please check your inputs and try again."
            }
        }
    }

    /// CSS class for the flash banner.
    pub fn category(&self) -> &'static str {
        match self {
            FlashStatus::Received => "success",
            FlashStatus::SavedNotificationFailed => "warning",
            FlashStatus::DatabaseUnavailable | FlashStatus::InternalError => "error",
        }
    }

    pub fn redirect_target(&self) -> String {
        format!("/request_cv?status={}", self.as_query_value())
    }
}
