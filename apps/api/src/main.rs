mod config;
mod credentials;
mod errors;
mod intake;
mod models;
mod notify;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, FirebaseConfig, MailConfig};
use crate::credentials::select_source;
use crate::intake::IntakeService;
use crate::notify::message::NotificationSettings;
use crate::notify::smtp::SmtpMailer;
use crate::notify::NotificationDispatcher;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::firestore::FirestoreStore;
use crate::store::PersistenceGateway;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on unparseable ports)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio v{}", env!("CARGO_PKG_VERSION"));

    // A broken store or mailer degrades the form instead of stopping the site
    let store = build_store(&config.firebase);
    let dispatcher = build_dispatcher(&config.mail);

    let intake = IntakeService::new(
        store,
        dispatcher,
        NotificationSettings {
            sender: config.mail.username.clone(),
            recipient: config.mail.recipient.clone(),
        },
        &config.app_id,
    );
    info!("CV requests will be stored under {}", intake.collection_path());

    let state = AppState {
        intake: Arc::new(intake),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves the service-account key and builds the Firestore client.
/// Any failure is logged and leaves the store uninitialised.
fn build_store(config: &FirebaseConfig) -> Option<Arc<dyn PersistenceGateway>> {
    let source = select_source(config);

    let key = match source.load() {
        Ok(key) => key,
        Err(e) => {
            error!(
                "Failed to load Firebase credentials from {}: {e}",
                source.describe()
            );
            return None;
        }
    };

    match FirestoreStore::new(&key) {
        Ok(store) => {
            info!(
                "Firestore initialized for project {} using {}",
                store.project_id(),
                source.describe()
            );
            Some(Arc::new(store) as Arc<dyn PersistenceGateway>)
        }
        Err(e) => {
            error!("Failed to initialize Firestore: {e}");
            None
        }
    }
}

fn build_dispatcher(config: &MailConfig) -> Option<Arc<dyn NotificationDispatcher>> {
    if config.recipient.is_none() || config.username.is_none() {
        warn!("MAIL_USERNAME or MAIL_RECIPIENT not set; CV request notifications are disabled");
    }

    match SmtpMailer::new(config) {
        Ok(mailer) => {
            info!(
                "SMTP mailer configured for {}:{} (tls: {})",
                config.server, config.port, config.use_tls
            );
            Some(Arc::new(mailer) as Arc<dyn NotificationDispatcher>)
        }
        Err(e) => {
            error!("Failed to configure SMTP mailer: {e}");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl+c: {e}");
        std::future::pending::<()>().await;
    }
    info!("received ctrl+c interrupt, closing server");
}
