use crate::domain::entities::actor::{Actor, ActorRole};
use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ActorRow {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
    pub created_at: OffsetDateTime,
}

impl ActorRow {
    pub fn from_actor(actor: &Actor) -> Self {
        Self {
            id: actor.id.0,
            display_name: actor.display_name.clone(),
            role: actor.role.as_str().to_string(),
            created_at: actor.created_at.into_inner(),
        }
    }

    pub fn into_actor(self) -> Actor {
        Actor {
            id: ActorId(self.id),
            display_name: self.display_name,
            role: ActorRole::parse(&self.role).unwrap_or(ActorRole::Contractor),
            created_at: Timestamp::from(self.created_at),
        }
    }
}
