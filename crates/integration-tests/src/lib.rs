//! End-to-end tests for the MangaVerse storefront.
//!
//! Each test gets a [`TestContext`]: a mock of the external API, a storage
//! directory that is removed afterwards, and a shell that records every
//! notification and navigation.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mangaverse-integration-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mangaverse_core::{Price, ProductId};
use mangaverse_storefront::api::ApiClient;
use mangaverse_storefront::checkout::{CheckoutFlow, ShippingForm};
use mangaverse_storefront::config::ApiConfig;
use mangaverse_storefront::services::{
    AccountService, CatalogService, WelcomeEmailTrigger,
};
use mangaverse_storefront::shell::RecordingShell;
use mangaverse_storefront::storage::FileStorage;
use mangaverse_storefront::stores::{AuthStore, CartProduct, CartStore};
use tempfile::TempDir;
use url::Url;
use wiremock::MockServer;

/// Mock API, on-disk storage and a recording shell.
pub struct TestContext {
    pub server: MockServer,
    pub shell: Arc<RecordingShell>,
    pub storage: Arc<FileStorage>,
    pub api: ApiClient,
    _dir: TempDir,
}

impl TestContext {
    /// # Panics
    ///
    /// Panics if the temporary directory or the client cannot be created.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().expect("temp dir");
        let storage = Arc::new(FileStorage::open(dir.path()).expect("file storage"));
        let api = ApiClient::new(&ApiConfig {
            base_url: Url::parse(&format!("{}/api", server.uri())).expect("mock url"),
            timeout: Duration::from_secs(5),
        })
        .expect("api client");

        Self {
            server,
            shell: Arc::new(RecordingShell::new()),
            storage,
            api,
            _dir: dir,
        }
    }

    /// A fresh cart store over this context's storage, as after a reload.
    pub fn cart(&self) -> CartStore {
        CartStore::load(self.storage.clone())
    }

    pub fn auth(&self) -> AuthStore {
        AuthStore::load(self.storage.clone(), self.shell.clone())
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.api.clone(), self.shell.clone())
    }

    /// Account service whose welcome email goes to the mock server.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid URL.
    pub fn account(&self) -> AccountService {
        let site = Url::parse(&self.server.uri()).expect("mock url");
        let welcome = WelcomeEmailTrigger::new(&site, Duration::from_secs(5)).expect("trigger");
        AccountService::new(self.api.clone(), self.shell.clone(), welcome)
    }

    pub fn checkout(&self) -> CheckoutFlow {
        CheckoutFlow::new(self.api.clone(), self.shell.clone())
    }
}

/// A product as the catalog endpoint returns it.
#[must_use]
pub fn product_json(id: &str, title: &str, price: f64, stock: u32) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "title": title,
        "author": "Naoki Urasawa",
        "price": price,
        "coverImage": format!("/covers/{id}.jpg"),
        "stock": stock
    })
}

/// A cart line ready to add.
///
/// # Panics
///
/// Panics if `cents` is not a valid price.
#[must_use]
pub fn cart_product(id: &str, title: &str, cents: i64) -> CartProduct {
    CartProduct {
        product_id: ProductId::new(id),
        title: title.to_owned(),
        author: "Naoki Urasawa".to_owned(),
        price: Price::from_cents(cents).expect("price"),
        cover_image: String::new(),
    }
}

/// A complete shipping form.
#[must_use]
pub fn shipping_form() -> ShippingForm {
    ShippingForm {
        full_name: "Kenzo Tenma".into(),
        address_line1: "Eisler Memorial Hospital".into(),
        city: "Düsseldorf".into(),
        country: "Germany".into(),
        phone: "+49 211 000000".into(),
        ..ShippingForm::default()
    }
}

/// An unsigned JWT whose payload carries `id`.
#[must_use]
pub fn token_for(user_id: &str) -> String {
    let claims = serde_json::json!({ "id": user_id });
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
