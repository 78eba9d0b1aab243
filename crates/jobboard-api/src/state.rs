//! Application state.

use std::sync::Arc;

use jobboard_firestore::FirestoreClient;

use crate::config::ApiConfig;
use crate::services::Mailer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub firestore: Arc<FirestoreClient>,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let firestore = FirestoreClient::from_env().await?;
        let mailer = Mailer::new(config.mail_relay_url.clone())?;

        Ok(Self {
            config,
            firestore: Arc::new(firestore),
            mailer: Arc::new(mailer),
        })
    }
}
