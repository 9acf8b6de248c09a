//! Port for relaying notifications to an external push channel.

use async_trait::async_trait;

use crate::domain::Notification;

use super::define_port_error;

define_port_error! {
    /// Errors raised by push gateway adapters.
    pub enum PushGatewayError {
        /// The relay endpoint could not be reached.
        Unreachable { message: String } =>
            "push relay unreachable: {message}",
        /// The relay rejected the delivery.
        Rejected { message: String } =>
            "push relay rejected delivery: {message}",
    }
}

/// Port for best-effort push delivery.
///
/// Delivery is advisory: callers log failures and carry on, so an adapter
/// error never surfaces to the client that triggered the notification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Relay a stored notification to the push channel.
    async fn push(&self, notification: &Notification) -> Result<(), PushGatewayError>;
}

/// Fixture implementation for tests that do not exercise push delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePushGateway;

#[async_trait]
impl PushGateway for FixturePushGateway {
    async fn push(&self, _notification: &Notification) -> Result<(), PushGatewayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn rejected_error_formats_message() {
        let err = PushGatewayError::rejected("410 gone");
        assert!(err.to_string().contains("410 gone"));
    }
}
