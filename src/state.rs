use std::sync::Arc;

use crate::clients::{MetadataExtractor, OpenGraphClient};
use crate::config::{Config, ExtractorConfig};
use crate::db::Store;
use crate::services::{
    AuthService, CollectionService, LinkService, LogMailer, Mailer, SeaOrmAuthService,
    SeaOrmCollectionService, SeaOrmLinkService,
};

/// Build the HTTP client used for page fetches.
/// One client is shared so connections are pooled across requests.
fn build_shared_http_client(config: &ExtractorConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub extractor: Arc<dyn MetadataExtractor>,

    pub auth_service: Arc<dyn AuthService>,

    pub link_service: Arc<dyn LinkService>,

    pub collection_service: Arc<dyn CollectionService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_mailer(config, Arc::new(LogMailer)).await
    }

    /// Like [`SharedState::new`] with a custom mail transport.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(&config.extractor)?;
        let extractor: Arc<dyn MetadataExtractor> =
            Arc::new(OpenGraphClient::with_shared_client(http_client));

        Ok(Self::from_parts(config, store, extractor, mailer))
    }

    /// Wires the services around already built collaborators.
    #[must_use]
    pub fn from_parts(
        config: Config,
        store: Store,
        extractor: Arc<dyn MetadataExtractor>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            config.password_reset.clone(),
            mailer,
        )) as Arc<dyn AuthService>;

        let link_service = Arc::new(SeaOrmLinkService::new(store.clone(), extractor.clone()))
            as Arc<dyn LinkService>;

        let collection_service =
            Arc::new(SeaOrmCollectionService::new(store.clone())) as Arc<dyn CollectionService>;

        Self {
            config: Arc::new(config),
            store,
            extractor,
            auth_service,
            link_service,
            collection_service,
        }
    }
}
