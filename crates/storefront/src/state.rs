//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::firebase::{FirestoreClient, IdentityClient};
use crate::services::auth::{AuthGate, ProfileStore};
use crate::services::blog::BlogService;
use crate::services::whatsapp::WhatsAppLinks;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog, cart store and platform clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    carts: CartStore,
    auth: AuthGate,
    blog: BlogService,
    whatsapp: WhatsAppLinks,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds the identity and profile clients from the Firebase
    /// configuration and wires them into the auth gate and blog service.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let identity = Arc::new(IdentityClient::new(&config.firebase, &config.base_url));
        let firestore = Arc::new(FirestoreClient::new(&config.firebase));

        let auth = AuthGate::new(identity, Arc::clone(&firestore) as Arc<dyn ProfileStore>);
        let blog = BlogService::new(firestore);
        let whatsapp = WhatsAppLinks::new(config.whatsapp_number.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                carts: CartStore::new(),
                auth,
                blog,
                whatsapp,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the per-session cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    /// Get a reference to the auth gate.
    #[must_use]
    pub fn auth(&self) -> &AuthGate {
        &self.inner.auth
    }

    /// Get a reference to the blog service.
    #[must_use]
    pub fn blog(&self) -> &BlogService {
        &self.inner.blog
    }

    /// Get a reference to the WhatsApp link builder.
    #[must_use]
    pub fn whatsapp(&self) -> &WhatsAppLinks {
        &self.inner.whatsapp
    }
}
