use mongodb::{Client, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::{MongoConfig, health::ping};
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Connect using `config` and verify the connection with a ping.
///
/// ```ignore
/// let config = MongoConfig::from_env()?;
/// let client = connect(&config).await?;
/// let db = client.database(&config.database);
/// ```
pub async fn connect(config: &MongoConfig) -> DatabaseResult<Client> {
    info!(url = %config.redacted_url(), "Attempting to connect to MongoDB");

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    if let Some(app_name) = &config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;

    ping(&client)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!(database = %config.database, "Successfully connected to MongoDB");
    Ok(client)
}

/// [`connect`] with exponential backoff, for startup while the database
/// may still be coming up.
pub async fn connect_with_retry(
    config: &MongoConfig,
    retry_config: RetryConfig,
) -> DatabaseResult<Client> {
    retry_with_backoff(|| connect(config), retry_config).await
}
