//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CaseQuery, CaseWorkflowCommand, Notifications};
use crate::domain::ports::{FixtureCaseQuery, FixtureCaseWorkflowCommand, FixtureNotifications};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub workflow: Arc<dyn CaseWorkflowCommand>,
    pub cases: Arc<dyn CaseQuery>,
    pub notifications: Arc<dyn Notifications>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{
    ///     FixtureCaseQuery, FixtureCaseWorkflowCommand, FixtureNotifications,
    /// };
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureCaseWorkflowCommand),
    ///     Arc::new(FixtureCaseQuery),
    ///     Arc::new(FixtureNotifications),
    /// );
    /// let _workflow = state.workflow.clone();
    /// ```
    pub fn new(
        workflow: Arc<dyn CaseWorkflowCommand>,
        cases: Arc<dyn CaseQuery>,
        notifications: Arc<dyn Notifications>,
    ) -> Self {
        Self {
            workflow,
            cases,
            notifications,
        }
    }

    /// Fixture-backed state for handlers under test that do not exercise a
    /// given port.
    pub fn fixture() -> Self {
        Self::new(
            Arc::new(FixtureCaseWorkflowCommand),
            Arc::new(FixtureCaseQuery),
            Arc::new(FixtureNotifications),
        )
    }
}
