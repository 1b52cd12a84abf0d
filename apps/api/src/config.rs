use anyhow::{Context, Result};

const DEFAULT_APP_ID: &str = "default-portfolio-app";
const DEFAULT_SERVICE_ACCOUNT_PATH: &str = "./serviceAccountKey.json";
const DEFAULT_MAIL_SERVER: &str = "smtp.gmail.com";

/// Application configuration loaded from environment variables.
/// Only the listen port and mail port are hard requirements; everything else
/// degrades so the site keeps serving with a partially configured backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub app_id: String,
    pub firebase: FirebaseConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Full service-account key pasted into the environment.
    pub credentials_json: Option<String>,
    pub service_account_path: String,
}

#[derive(Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

// Hand-written so the SMTP password never reaches the logs.
impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: parse_port(var("PORT"), 8000).context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            app_id: var("APP_ID").unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
            firebase: FirebaseConfig {
                credentials_json: var("FIREBASE_CREDENTIALS_JSON"),
                service_account_path: var("FIREBASE_SERVICE_ACCOUNT_PATH")
                    .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT_PATH.to_string()),
            },
            mail: MailConfig {
                server: var("MAIL_SERVER").unwrap_or_else(|| DEFAULT_MAIL_SERVER.to_string()),
                port: parse_port(var("MAIL_PORT"), 587)
                    .context("MAIL_PORT must be a valid port number")?,
                use_tls: var("MAIL_USE_TLS").as_deref().map(parse_flag).unwrap_or(false),
                username: var("MAIL_USERNAME"),
                password: var("MAIL_PASSWORD"),
                recipient: var("MAIL_RECIPIENT"),
            },
        })
    }
}

fn parse_port(raw: Option<String>, default: u16) -> Result<u16> {
    match raw {
        Some(value) => Ok(value.trim().parse::<u16>()?),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
