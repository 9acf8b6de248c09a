//! Inbound adapters translating transport requests into domain operations.

pub mod http;
pub mod ws;
