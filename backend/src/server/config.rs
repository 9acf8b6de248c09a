//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use backend::domain::UserId;
use backend::outbound::persistence::DbPool;
use url::Url;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) push_endpoint: Option<Url>,
    pub(crate) admin_recipients: Vec<UserId>,
    pub(crate) allowed_ws_origins: Vec<Url>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            push_endpoint: None,
            admin_recipients: Vec::new(),
            allowed_ws_origins: Vec::new(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses database-backed implementations for
    /// the case and notification ports; otherwise fixtures serve requests.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the push relay endpoint for best-effort notification delivery.
    #[must_use]
    pub fn with_push_endpoint(mut self, endpoint: Url) -> Self {
        self.push_endpoint = Some(endpoint);
        self
    }

    /// Set the administrators notified on every workflow transition.
    #[must_use]
    pub fn with_admin_recipients(mut self, recipients: Vec<UserId>) -> Self {
        self.admin_recipients = recipients;
        self
    }

    /// Set the origins allowed to open the WebSocket feed.
    #[must_use]
    pub fn with_allowed_ws_origins(mut self, origins: Vec<Url>) -> Self {
        self.allowed_ws_origins = origins;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
