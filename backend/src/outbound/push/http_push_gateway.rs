//! Reqwest-backed push relay adapter.
//!
//! Posts stored notifications as JSON to a configured relay endpoint. This
//! adapter owns transport details only: request serialisation, timeout, and
//! HTTP error mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::Notification;
use crate::domain::ports::{PushGateway, PushGatewayError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Push gateway adapter that POSTs notifications to one relay endpoint.
pub struct HttpPushGateway {
    client: Client,
    endpoint: Url,
}

impl HttpPushGateway {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

fn map_transport_error(error: reqwest::Error) -> PushGatewayError {
    PushGatewayError::unreachable(error.to_string())
}

fn map_status_error(status: StatusCode) -> PushGatewayError {
    PushGatewayError::rejected(format!("relay responded with status {status}"))
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn push(&self, notification: &Notification) -> Result<(), PushGatewayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(notification)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        Ok(())
    }
}

/// Push gateway that drops every notification, for deployments without a
/// relay endpoint configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPushGateway;

#[async_trait]
impl PushGateway for NoOpPushGateway {
    async fn push(&self, _notification: &Notification) -> Result<(), PushGatewayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn status_errors_name_the_status() {
        let err = map_status_error(StatusCode::GONE);
        assert!(matches!(err, PushGatewayError::Rejected { .. }));
        assert!(err.to_string().contains("410"));
    }

    #[rstest]
    fn gateway_builds_with_custom_timeout() {
        let endpoint = Url::parse("https://push.example.net/relay").expect("valid url");
        HttpPushGateway::with_timeout(endpoint, Duration::from_secs(2))
            .expect("client builds");
    }
}
