//! In-process case event fan-out.

mod broadcast_bus;

pub use broadcast_bus::BroadcastCaseEventBus;
