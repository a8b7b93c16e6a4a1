//! Command implementations.
//!
//! Session-scoped commands assemble the full client stack (gateway,
//! persisted cart, reactive store) so a CLI run exercises the same code
//! path the UI does. Catalog-only commands talk to the gateway directly.

pub mod cart;
pub mod orders;
pub mod products;

use secrecy::SecretString;
use thiserror::Error;

use shopsync_client::config::ConfigError;
use shopsync_client::gateway::{GatewayError, HttpGateway};
use shopsync_client::persist::JsonFileStorage;
use shopsync_client::{ClientConfig, ClientError, NotificationStream, StorefrontService, notify};
use shopsync_core::{SessionIdentity, UserId};

const DEFAULT_CART_FILE: &str = ".shopsync-cart.json";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration failed to load.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The client refused or failed the operation.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A direct gateway call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
}

pub(crate) type Service = StorefrontService<HttpGateway, JsonFileStorage>;

/// Build a gateway from the environment configuration.
pub(crate) fn gateway() -> Result<HttpGateway, CliError> {
    let config = ClientConfig::from_env()?;
    Ok(HttpGateway::new(&config)?)
}

/// Build the full client stack with a session for the given user.
///
/// The notification stream is returned so callers can drain failure
/// notices after a mutation; dropping it is also fine.
pub(crate) fn service_for(user: i64) -> Result<(Service, NotificationStream), CliError> {
    let token = std::env::var("SHOPSYNC_SESSION_TOKEN")
        .map_err(|_| CliError::MissingEnvVar("SHOPSYNC_SESSION_TOKEN"))?;

    let cart_file = std::env::var("SHOPSYNC_CART_FILE")
        .unwrap_or_else(|_| DEFAULT_CART_FILE.to_string());

    let (notifier, stream) = notify::channel();
    let service = StorefrontService::new(
        gateway()?,
        JsonFileStorage::new(cart_file),
        notifier,
    );
    service.set_session(SessionIdentity::new(
        UserId::new(user),
        SecretString::from(token),
    ));
    Ok((service, stream))
}
