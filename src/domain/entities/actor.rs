use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Business,
    Contractor,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Business => "business",
            ActorRole::Contractor => "contractor",
        }
    }

    pub fn parse(value: &str) -> Option<ActorRole> {
        match value {
            "business" => Some(ActorRole::Business),
            "contractor" => Some(ActorRole::Contractor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub display_name: String,
    pub role: ActorRole,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorValidationError {
    EmptyDisplayName,
}

impl Actor {
    pub fn new(
        id: ActorId,
        display_name: String,
        role: ActorRole,
    ) -> Result<Self, ActorValidationError> {
        if display_name.trim().is_empty() {
            return Err(ActorValidationError::EmptyDisplayName);
        }
        Ok(Self {
            id,
            display_name,
            role,
            created_at: Timestamp::now_utc(),
        })
    }
}
