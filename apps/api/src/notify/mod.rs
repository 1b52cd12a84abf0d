//! Notification dispatcher: tells the site owner a CV request arrived.

use async_trait::async_trait;
use thiserror::Error;

pub mod message;
pub mod smtp;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// No sender or recipient address is configured.
    #[error("email notifications are not configured")]
    NotConfigured,

    #[error("invalid email address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("email task failed to execute: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A single plain-text message ready to hand to a dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub body: String,
}

/// Sends one email. Built once at startup and shared by every request.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError>;
}
