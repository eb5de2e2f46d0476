//! Change-feed dispatch.
//!
//! Converts inbound change notices into typed per-kind domain events and
//! nudges the affected view manager: a scoped refresh for just the changed
//! entity when the manager supports it, otherwise a full reload of its
//! list. This is the only bridge between the sync core and the rendering
//! layer; it never renders anything itself.

use crate::remote::{ChangeNotice, ChangeType};
use restdeck_types::{ApiRequest, Collection, DomainEvent, EntityKind, Team, TeamMember};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Refresh hook exposed by a view manager for one entity kind.
///
/// `refresh_record` returning false means the manager has no scoped
/// refresh; the dispatcher then falls back to `reload`.
pub trait ViewRefresh: Send + Sync {
    fn kind(&self) -> EntityKind;

    fn refresh_record(&self, record: &Value) -> bool {
        let _ = record;
        false
    }

    fn reload(&self);
}

pub struct ChangeFeedDispatcher {
    events: broadcast::Sender<DomainEvent>,
    views: HashMap<EntityKind, Arc<dyn ViewRefresh>>,
}

impl ChangeFeedDispatcher {
    pub fn new(events: broadcast::Sender<DomainEvent>) -> Self {
        Self {
            events,
            views: HashMap::new(),
        }
    }

    /// Registers the view manager for its kind, replacing any previous one.
    pub fn register_view(&mut self, view: Arc<dyn ViewRefresh>) {
        self.views.insert(view.kind(), view);
    }

    /// Translates one change notice into its domain event, broadcasts it,
    /// and triggers the view hook for the affected entity.
    pub fn dispatch(&self, notice: &ChangeNotice) {
        let Some(record) = notice.record() else {
            warn!("change notice for {} carried no record", notice.kind);
            return;
        };

        let event = match typed_event(notice.kind, notice.change_type, record) {
            Ok(event) => event,
            Err(e) => {
                warn!("dropping undecodable {} change: {e}", notice.kind);
                return;
            }
        };
        debug!("dispatching {}", event.name());
        let _ = self.events.send(event);

        if let Some(view) = self.views.get(&notice.kind) {
            if !view.refresh_record(record) {
                view.reload();
            }
        }
    }
}

fn typed_event(
    kind: EntityKind,
    change: ChangeType,
    record: &Value,
) -> Result<DomainEvent, serde_json::Error> {
    Ok(match kind {
        EntityKind::Collection => {
            let record: Collection = serde_json::from_value(record.clone())?;
            match change {
                ChangeType::Insert => DomainEvent::CollectionCreated { record },
                ChangeType::Update => DomainEvent::CollectionUpdated { record },
                ChangeType::Delete => DomainEvent::CollectionDeleted { record },
            }
        }
        EntityKind::Request => {
            let record: ApiRequest = serde_json::from_value(record.clone())?;
            match change {
                ChangeType::Insert => DomainEvent::RequestCreated { record },
                ChangeType::Update => DomainEvent::RequestUpdated { record },
                ChangeType::Delete => DomainEvent::RequestDeleted { record },
            }
        }
        EntityKind::Team => {
            let record: Team = serde_json::from_value(record.clone())?;
            match change {
                ChangeType::Insert => DomainEvent::TeamCreated { record },
                ChangeType::Update => DomainEvent::TeamUpdated { record },
                ChangeType::Delete => DomainEvent::TeamDeleted { record },
            }
        }
        EntityKind::TeamMember => {
            let record: TeamMember = serde_json::from_value(record.clone())?;
            match change {
                ChangeType::Insert => DomainEvent::TeamMemberCreated { record },
                ChangeType::Update => DomainEvent::TeamMemberUpdated { record },
                ChangeType::Delete => DomainEvent::TeamMemberDeleted { record },
            }
        }
    })
}
