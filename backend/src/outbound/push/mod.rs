//! Push relay adapters implementing the push gateway port.

mod http_push_gateway;

pub use http_push_gateway::{HttpPushGateway, NoOpPushGateway};
