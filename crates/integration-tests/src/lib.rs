//! Integration tests for the Aura Sentiments storefront.
//!
//! Each test boots the real router on an ephemeral port with a
//! [`RecordingNotifier`] in place of the mail relay, then drives it over HTTP
//! with a cookie-holding client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aura-integration-tests
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use aura_core::{CheckoutData, SystemClock};
use aura_storefront::config::StorefrontConfig;
use aura_storefront::services::{NotifyError, OrderNotifier};
use aura_storefront::state::AppState;
use reqwest::Client;
use reqwest::redirect::Policy;

/// Catalog shipped with the storefront.
const CATALOG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/data/catalog.json");

/// Order notifier that records orders instead of sending mail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    orders: Mutex<Vec<CheckoutData>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Make subsequent dispatches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Orders dispatched so far.
    pub fn orders(&self) -> Vec<CheckoutData> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn notify_order(&self, order: &CheckoutData) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::NotConfigured);
        }
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order.clone());
        Ok(())
    }
}

/// A running storefront and a client bound to one visitor session.
pub struct TestContext {
    pub base_url: String,
    /// Follows redirects, like a browser.
    pub client: Client,
    /// Shares the session cookie with `client` but stops at redirects.
    pub raw_client: Client,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    /// Boot a storefront with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the catalog cannot be loaded or the server cannot bind.
    pub async fn new() -> Self {
        let config = StorefrontConfig::from_lookup(|_| None).expect("default config");
        let catalog = aura_storefront::catalog::load(Path::new(CATALOG_PATH)).expect("catalog");
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(
            config,
            catalog,
            Arc::clone(&notifier) as Arc<dyn OrderNotifier>,
            Arc::new(SystemClock),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let app = aura_storefront::app(state);
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("server");
        });

        let jar = Arc::new(reqwest::cookie::Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .expect("client");
        let raw_client = Client::builder()
            .cookie_provider(jar)
            .redirect(Policy::none())
            .build()
            .expect("raw client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            raw_client,
            notifier,
        }
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the body, asserting success.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the status is not 2xx.
    pub async fn page(&self, path: &str) -> String {
        let resp = self.client.get(self.url(path)).send().await.expect("GET");
        assert!(resp.status().is_success(), "GET {path}: {}", resp.status());
        resp.text().await.expect("body")
    }

    /// Add `quantity` of product `id` to the cart.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or does not end in a success page.
    pub async fn add_to_cart(&self, id: &str, quantity: u32) {
        let resp = self
            .client
            .post(self.url("/cart/add"))
            .form(&[
                ("id", id),
                ("quantity", &quantity.to_string()),
                ("return_to", "/cart"),
            ])
            .send()
            .await
            .expect("add to cart");
        assert!(resp.status().is_success(), "add {id}: {}", resp.status());
    }

    /// Current cart count from the badge fragment.
    ///
    /// # Panics
    ///
    /// Panics if the fragment is missing or malformed.
    pub async fn cart_count(&self) -> u32 {
        let body = self.page("/cart/count").await;
        let start = body.find('>').expect("badge open tag") + 1;
        let end = body[start..].find('<').expect("badge close tag") + start;
        body[start..end].trim().parse().expect("count")
    }

    /// Load the checkout page and return its one-time token.
    ///
    /// # Panics
    ///
    /// Panics if the page carries no token.
    pub async fn checkout_token(&self) -> String {
        hidden_value(&self.page("/checkout").await, "token").expect("checkout token")
    }
}

/// Value of the hidden input called `name`.
pub fn hidden_value(html: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\" value=\"");
    let start = html.find(&marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

/// Product ids of the product cards on a page, in order.
pub fn card_ids(html: &str) -> Vec<String> {
    const MARKER: &str = "data-product-id=\"";
    html.match_indices(MARKER)
        .filter_map(|(at, _)| {
            let start = at + MARKER.len();
            html[start..]
                .find('"')
                .map(|end| html[start..start + end].to_string())
        })
        .collect()
}

/// A complete contact form for `token`.
pub fn contact_form(token: &str) -> Vec<(&'static str, String)> {
    vec![
        ("token", token.to_string()),
        ("firstName", "Ayesha".to_string()),
        ("lastName", "Khan".to_string()),
        ("email", "ayesha@example.com".to_string()),
        ("phone", "03001234567".to_string()),
        ("address", "12 Canal Road".to_string()),
        ("apartment", String::new()),
        ("city", "Lahore".to_string()),
        ("postalCode", "54000".to_string()),
    ]
}
