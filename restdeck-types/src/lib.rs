//! Shared entity model for the RestDeck sync core.
//!
//! Defines the tracked entity kinds, the typed records exchanged with the
//! remote backend, and the tagged domain events consumed by view managers.

pub mod events;
pub mod model;

pub use events::DomainEvent;
pub use model::{
    ApiRequest, Collection, EntityKind, Team, TeamMember, TeamRole, UnknownEntityKind,
    NEW_ENTITY_ID,
};
