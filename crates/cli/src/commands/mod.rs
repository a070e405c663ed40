//! CLI commands.
//!
//! Every command builds a [`Context`] from the environment. Cart and session
//! persist in the data directory, and notifications go to the log through
//! [`TracingShell`].

use std::sync::Arc;

use mangaverse_storefront::api::{ApiClient, ApiError};
use mangaverse_storefront::checkout::{CheckoutError, CheckoutFlow, ValidationError};
use mangaverse_storefront::config::{ConfigError, StorefrontConfig};
use mangaverse_storefront::services::{
    AccountError, AccountService, CatalogService, WelcomeEmailTrigger,
};
use mangaverse_storefront::shell::TracingShell;
use mangaverse_storefront::storage::{FileStorage, StorageError};
use mangaverse_storefront::stores::{AuthStore, CartStore};
use thiserror::Error;

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Aborted(&'static str),
}

/// Everything a command needs, built once per invocation.
pub struct Context {
    config: StorefrontConfig,
    storage: Arc<FileStorage>,
    shell: Arc<TracingShell>,
    api: ApiClient,
}

impl Context {
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the data
    /// directory cannot be created.
    pub fn load() -> Result<Self, CommandError> {
        let config = StorefrontConfig::from_env()?;
        let storage = Arc::new(FileStorage::open(&config.data_dir)?);
        let api = ApiClient::new(&config.api)?;
        tracing::debug!(api = %api.base_url(), data_dir = %config.data_dir.display(), "context ready");

        Ok(Self {
            config,
            storage,
            shell: Arc::new(TracingShell),
            api,
        })
    }

    pub fn cart(&self) -> CartStore {
        CartStore::load(self.storage.clone())
    }

    pub fn auth(&self) -> AuthStore {
        AuthStore::load(self.storage.clone(), self.shell.clone())
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.api.clone(), self.shell.clone())
    }

    /// # Errors
    ///
    /// Returns an error if the welcome email endpoint cannot be derived from
    /// the site URL.
    pub fn account(&self) -> Result<AccountService, CommandError> {
        let welcome = WelcomeEmailTrigger::new(&self.config.site_url, self.config.api.timeout)?;
        Ok(AccountService::new(
            self.api.clone(),
            self.shell.clone(),
            welcome,
        ))
    }

    pub fn checkout(&self) -> CheckoutFlow {
        CheckoutFlow::new(self.api.clone(), self.shell.clone())
    }
}
