use std::sync::Arc;

use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::config::Config;
use crate::lists::clipboard::Clipboard;
use crate::lists::Workspace;
use crate::notify::NotificationRelay;
use crate::support::TicketDesk;
use crate::tasks::TaskRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record lists, templates and the idempotency ledger behind one lock.
    pub workspace: Arc<RwLock<Workspace>>,
    pub relay: NotificationRelay,
    pub tasks: TaskRegistry,
    /// Source of "today" for status dates and discard dates.
    pub clock: Arc<dyn Clock>,
    pub clipboard: Arc<dyn Clipboard>,
    pub ticket_desk: Arc<dyn TicketDesk>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        workspace: Workspace,
        relay: NotificationRelay,
        clock: Arc<dyn Clock>,
        clipboard: Arc<dyn Clipboard>,
        ticket_desk: Arc<dyn TicketDesk>,
        config: Config,
    ) -> Self {
        AppState {
            workspace: Arc::new(RwLock::new(workspace)),
            tasks: TaskRegistry::new(relay.clone(), config.action_timeout),
            relay,
            clock,
            clipboard,
            ticket_desk,
            config,
        }
    }
}
