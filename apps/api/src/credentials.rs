//! Service-account key resolution for the document store.
//!
//! Two sources exist: the whole key pasted into `FIREBASE_CREDENTIALS_JSON`
//! (hosted deployments) and a key file on disk (local development). The
//! source is picked once at startup by [`select_source`].

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::config::FirebaseConfig;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("could not read service account file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("service account key is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("service account key is missing `{0}`")]
    MissingField(&'static str),
}

/// The fields of a Google service-account key this service needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, CredentialsError> {
        let key: ServiceAccountKey = serde_json::from_str(raw)?;
        if key.project_id.trim().is_empty() {
            return Err(CredentialsError::MissingField("project_id"));
        }
        if key.client_email.trim().is_empty() {
            return Err(CredentialsError::MissingField("client_email"));
        }
        if key.private_key.trim().is_empty() {
            return Err(CredentialsError::MissingField("private_key"));
        }
        Ok(key)
    }
}

/// A place a service-account key can be loaded from.
pub trait CredentialSource: Send + Sync {
    /// Short label for startup logs.
    fn describe(&self) -> String;

    fn load(&self) -> Result<ServiceAccountKey, CredentialsError>;
}

/// Key supplied inline as a JSON document.
pub struct InlineJson(pub String);

impl CredentialSource for InlineJson {
    fn describe(&self) -> String {
        "inline JSON environment variable".to_string()
    }

    fn load(&self) -> Result<ServiceAccountKey, CredentialsError> {
        ServiceAccountKey::from_json(&self.0)
    }
}

/// Key stored in a file on disk.
pub struct KeyFile(pub PathBuf);

impl CredentialSource for KeyFile {
    fn describe(&self) -> String {
        format!("file path {}", self.0.display())
    }

    fn load(&self) -> Result<ServiceAccountKey, CredentialsError> {
        let raw = std::fs::read_to_string(&self.0).map_err(|source| CredentialsError::Read {
            path: self.0.clone(),
            source,
        })?;
        ServiceAccountKey::from_json(&raw)
    }
}

/// Inline JSON wins whenever it is set; the key file is the fallback.
pub fn select_source(config: &FirebaseConfig) -> Box<dyn CredentialSource> {
    match &config.credentials_json {
        Some(json) if !json.trim().is_empty() => Box::new(InlineJson(json.clone())),
        _ => Box::new(KeyFile(PathBuf::from(&config.service_account_path))),
    }
}
