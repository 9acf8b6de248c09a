//! Builders wiring repository-backed services into adapter state bundles.

use std::sync::Arc;

use backend::domain::ports::{
    CaseQuery, CaseWorkflowCommand, FixtureCaseQuery, FixtureCaseWorkflowCommand,
    FixtureNotifications,
};
use backend::domain::{CaseQueryService, CaseWorkflowService, NotificationService};
use backend::inbound::http::state::HttpState;
use backend::inbound::ws::state::WsState;
use backend::outbound::events::BroadcastCaseEventBus;
use backend::outbound::persistence::{
    DbPool, DieselCaseRepository, DieselNotificationRepository,
};
use backend::outbound::push::{HttpPushGateway, NoOpPushGateway};

use super::ServerConfig;

fn build_workflow_command(
    config: &ServerConfig,
    pool: &DbPool,
    event_bus: Arc<BroadcastCaseEventBus>,
) -> std::io::Result<Arc<dyn CaseWorkflowCommand>> {
    let case_repo = Arc::new(DieselCaseRepository::new(pool.clone()));
    let notification_repo = Arc::new(DieselNotificationRepository::new(pool.clone()));
    let clock = Arc::new(mockable::DefaultClock);
    let admin_recipients = config.admin_recipients.clone();

    match &config.push_endpoint {
        Some(endpoint) => {
            let gateway = HttpPushGateway::new(endpoint.clone()).map_err(|error| {
                std::io::Error::other(format!("push gateway client construction failed: {error}"))
            })?;
            Ok(Arc::new(CaseWorkflowService::new(
                case_repo,
                notification_repo,
                Arc::new(gateway),
                event_bus,
                clock,
                admin_recipients,
            )))
        }
        None => Ok(Arc::new(CaseWorkflowService::new(
            case_repo,
            notification_repo,
            Arc::new(NoOpPushGateway),
            event_bus,
            clock,
            admin_recipients,
        ))),
    }
}

/// Build the HTTP and WebSocket state bundles from configuration.
///
/// With a database pool the real Diesel-backed services serve requests;
/// without one, fixtures stand in so the server still boots for smoke tests.
pub(super) fn build_states(config: &ServerConfig) -> std::io::Result<(HttpState, WsState)> {
    let event_bus = Arc::new(BroadcastCaseEventBus::new());
    let ws_state = WsState::new(event_bus.clone(), config.allowed_ws_origins.clone());

    let http_state = match &config.db_pool {
        Some(pool) => {
            let workflow = build_workflow_command(config, pool, event_bus)?;
            let cases: Arc<dyn CaseQuery> = Arc::new(CaseQueryService::new(Arc::new(
                DieselCaseRepository::new(pool.clone()),
            )));
            let notifications = Arc::new(NotificationService::new(Arc::new(
                DieselNotificationRepository::new(pool.clone()),
            )));
            HttpState::new(workflow, cases, notifications)
        }
        None => HttpState::new(
            Arc::new(FixtureCaseWorkflowCommand),
            Arc::new(FixtureCaseQuery),
            Arc::new(FixtureNotifications),
        ),
    };

    Ok((http_state, ws_state))
}
