//! HTTP inbound adapter exposing REST endpoints.

pub mod cases;
pub mod error;
pub mod health;
pub mod notifications;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
